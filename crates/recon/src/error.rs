use std::fmt;

/// A required column absent from one of the input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    /// Which input table: "primary", "reference", or "destination".
    pub table: String,
    pub column: String,
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} table is missing column '{}'", self.table, self.column)
    }
}

#[derive(Debug)]
pub enum ReconError {
    /// Schema validation failed. Lists every missing column, not just the
    /// first; raised before any row is filtered.
    MissingColumns(Vec<MissingColumn>),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumns(missing) => {
                let list: Vec<String> = missing.iter().map(|m| m.to_string()).collect();
                write!(f, "missing expected columns: {}", list.join("; "))
            }
        }
    }
}

impl std::error::Error for ReconError {}
