/// Truncation of the diagnostic dumps of tiles and fragments.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DebugConfig {
    /// Rows printed before the dump is truncated.
    #[serde(default = "max_rows_default")]
    pub max_rows: usize,

    /// Columns printed before each row is truncated.
    #[serde(default = "max_cols_default")]
    pub max_cols: usize,

    /// Digits after the decimal point, full precision when unset.
    #[serde(default)]
    pub precision: Option<usize>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            max_rows: max_rows_default(),
            max_cols: max_cols_default(),
            precision: None,
        }
    }
}

fn max_rows_default() -> usize {
    16
}

fn max_cols_default() -> usize {
    16
}
