// Record store models - inventory rows and the flattened views built from them
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend field names. These are case- and whitespace-sensitive.
pub mod fields {
    pub const JOB_NO: &str = "Job No.";
    pub const DESIGN: &str = "Design";
    pub const PURITY: &str = "Purity";
    pub const SET_CTS: &str = "Set Cts.";
    pub const AI_DESCRIPTION: &str = "AI Description";
    pub const HD_IMAGE: &str = "HD Image";
    pub const IMAGE: &str = "Image";
    pub const TAG_PRICE: &str = "Tag Price (CAD)";
    pub const TAG_PRICE_ROUNDED: &str = "Tag Price Rounded (CAD)";
    pub const IN_INVENTORY: &str = "In Inventory";
    pub const LAST_INVENTORY_DATE: &str = "Last Inventory Date";
    pub const GROSS_WEIGHT: &str = "Gross Weight (Gr. Wt.)";
}

/// Field name to value mapping as stored by the backend
pub type FieldMap = Map<String, Value>;

/// A single inventory row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
            created_time: None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Text value of a field. Numbers are rendered, other types yield `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric value of a field, accepting numeric strings as well
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Checkbox fields are simply absent when unchecked
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Bool(true)))
    }

    /// URL of an attachment-like field.
    ///
    /// Attachment fields arrive as an array of objects carrying a `url`; some
    /// tables store a plain URL string instead. Both are accepted.
    pub fn attachment_url(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Array(items) => items
                .first()
                .and_then(|item| item.get("url"))
                .and_then(Value::as_str)
                .map(str::to_string),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// Preferred display image: HD first, then the regular image
    pub fn image_url(&self) -> Option<String> {
        self.attachment_url(fields::HD_IMAGE)
            .or_else(|| self.attachment_url(fields::IMAGE))
    }

    pub fn job_no(&self) -> Option<String> {
        self.text(fields::JOB_NO)
    }

    /// Tag price used for valuation, rounded price first. Missing prices count as zero.
    pub fn tag_price(&self) -> f64 {
        self.number(fields::TAG_PRICE_ROUNDED)
            .or_else(|| self.number(fields::TAG_PRICE))
            .unwrap_or(0.0)
    }
}

/// Flattened view of a record returned by searches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub job_no: Option<String>,
    pub design: Option<String>,
    pub purity: Option<String>,
    pub set_cts: Option<f64>,
    pub image: Option<String>,
    pub ai_description: Option<String>,
    pub tag_price: Option<f64>,
    pub in_inventory: bool,
}

impl From<&Record> for InventoryItem {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            job_no: record.job_no(),
            design: record.text(fields::DESIGN),
            purity: record.text(fields::PURITY),
            set_cts: record.number(fields::SET_CTS),
            image: record.image_url(),
            ai_description: record.text(fields::AI_DESCRIPTION),
            tag_price: record.number(fields::TAG_PRICE),
            in_inventory: record.flag(fields::IN_INVENTORY),
        }
    }
}
