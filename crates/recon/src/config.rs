use std::ops::Range;

/// Key column in the primary table. Also the de-duplication key in the
/// destination table, which carries a column of the same name.
pub const MAIN_KEY_COLUMN: &str = "BTS-ID -Don't Change";

/// Key column in the reference table.
pub const REFERENCE_KEY_COLUMN: &str = "BTS ID";

/// Attribute joined from the reference table onto every matched row.
pub const REFERENCE_ATTRIBUTE_COLUMN: &str = "Project";

/// Positional columns dropped from the filtered primary table
/// (zero-based, half-open, clipped to the actual width).
pub const DROP_RANGE: Range<usize> = 14..21;

/// Column names and the positional drop range the engine operates on.
///
/// Fixed in the current deployment; expressed as a config object so tests
/// and future callers can substitute their own schema.
#[derive(Debug, Clone)]
pub struct ReconConfig {
    pub main_key_column: String,
    pub reference_key_column: String,
    pub reference_attribute_column: String,
    pub destination_key_column: String,
    pub drop_range: Range<usize>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            main_key_column: MAIN_KEY_COLUMN.into(),
            reference_key_column: REFERENCE_KEY_COLUMN.into(),
            reference_attribute_column: REFERENCE_ATTRIBUTE_COLUMN.into(),
            destination_key_column: MAIN_KEY_COLUMN.into(),
            drop_range: DROP_RANGE,
        }
    }
}
