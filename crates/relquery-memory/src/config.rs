//! Engine configuration.

/// Configuration for a [`MemoryDb`](crate::MemoryDb).
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Column that receives an auto-assigned key on insert.
    pub key_column: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            key_column: "id".to_string(),
        }
    }
}

impl MemoryConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the auto-key column name.
    #[must_use]
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }
}
