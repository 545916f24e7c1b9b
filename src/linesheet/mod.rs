// Line sheets: discounted price lists for selected items
pub mod pricing;

pub use pricing::{
    build_line_sheet, line_sheet_for, round_to_nearest_5, Discount, LineSheet, LineSheetEntry,
    PRESET_DISCOUNTS,
};
