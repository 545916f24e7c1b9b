//! Line sheet pricing: discounted wholesale and derived retail prices
//!
//! Prices are rounded to the nearest multiple of 5. Retail is derived from the
//! rounded wholesale price, not from the tag price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record_store::{fields, Record, RecordStore};
use crate::search::{SearchError, SearchResult};

/// Discounts offered without a custom entry
pub const PRESET_DISCOUNTS: [u32; 4] = [15, 20, 25, 33];

/// Retail price multiplier applied to the wholesale price
pub const RETAIL_MARKUP: f64 = 2.5;

/// A validated discount percentage, strictly between 0 and 100
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Discount(f64);

impl Discount {
    pub fn new(percent: f64) -> SearchResult<Self> {
        if !percent.is_finite() || percent <= 0.0 || percent >= 100.0 {
            return Err(SearchError::InvalidInput(format!(
                "Discount must be between 0 and 100, got {}",
                percent
            )));
        }
        Ok(Self(percent))
    }

    /// One of the standard discounts (15, 20, 25, 33)
    pub fn preset(percent: u32) -> SearchResult<Self> {
        if !PRESET_DISCOUNTS.contains(&percent) {
            return Err(SearchError::InvalidInput(format!(
                "{}% is not a preset discount (expected one of {:?})",
                percent, PRESET_DISCOUNTS
            )));
        }
        Self::new(f64::from(percent))
    }

    pub fn percent(&self) -> f64 {
        self.0
    }

    pub fn is_preset(&self) -> bool {
        PRESET_DISCOUNTS.iter().any(|p| f64::from(*p) == self.0)
    }

    /// Wholesale price for a tag price
    pub fn wholesale(&self, tag_price: f64) -> f64 {
        round_to_nearest_5(tag_price * (1.0 - self.0 / 100.0))
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Round to the nearest multiple of 5; non-finite and zero prices become 0
pub fn round_to_nearest_5(price: f64) -> f64 {
    if !price.is_finite() || price == 0.0 {
        return 0.0;
    }
    (price / 5.0).round() * 5.0
}

pub fn retail_from_wholesale(wholesale: f64) -> f64 {
    round_to_nearest_5(wholesale * RETAIL_MARKUP)
}

/// One priced item on a line sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineSheetEntry {
    pub record_id: String,
    pub image: Option<String>,
    pub design: String,
    pub purity: String,
    pub set_cts: String,
    pub wholesale_price: f64,
    pub retail_price: f64,
}

impl LineSheetEntry {
    pub fn price(record: &Record, discount: Discount) -> Self {
        let wholesale_price = discount.wholesale(record.tag_price());
        Self {
            record_id: record.id.clone(),
            image: record.image_url(),
            design: record
                .text(fields::DESIGN)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            purity: record.text(fields::PURITY).unwrap_or_default(),
            set_cts: record.text(fields::SET_CTS).unwrap_or_default(),
            wholesale_price,
            retail_price: retail_from_wholesale(wholesale_price),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineSheet {
    pub discount_percent: Discount,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<LineSheetEntry>,
}

/// Price the given records, keeping their order
pub fn build_line_sheet(records: &[Record], discount: Discount) -> SearchResult<LineSheet> {
    if records.is_empty() {
        return Err(SearchError::InvalidInput(
            "Select at least one item for the line sheet".to_string(),
        ));
    }

    let items: Vec<LineSheetEntry> = records
        .iter()
        .map(|record| LineSheetEntry::price(record, discount))
        .collect();

    for item in items.iter().filter(|i| i.image.is_none()) {
        log::debug!("Line sheet item {} has no image", item.design);
    }

    Ok(LineSheet {
        discount_percent: discount,
        generated_at: Utc::now(),
        items,
    })
}

/// Fetch records by id and price them. Unknown ids are `NotFound`.
pub async fn line_sheet_for(
    store: &dyn RecordStore,
    record_ids: &[String],
    discount: Discount,
) -> SearchResult<LineSheet> {
    if record_ids.is_empty() {
        return Err(SearchError::InvalidInput(
            "Select at least one item for the line sheet".to_string(),
        ));
    }

    let mut records = Vec::with_capacity(record_ids.len());
    for id in record_ids {
        match store.get(id).await? {
            Some(record) => records.push(record),
            None => return Err(SearchError::NotFound(format!("Record {} not found", id))),
        }
    }

    let sheet = build_line_sheet(&records, discount)?;
    log::info!("Priced line sheet of {} items at {} off", sheet.items.len(), discount);
    Ok(sheet)
}
