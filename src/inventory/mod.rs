// Physical inventory counting
pub mod count;

pub use count::{inventory_timestamp, CountStats, InventoryCount, ScanOutcome, ScannedItem};
