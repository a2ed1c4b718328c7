use thiserror::Error;

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Canvas side must be finite and positive
    #[error("Invalid canvas side: {0}")]
    InvalidSide(f64),

    /// Thresholds and colors do not describe a usable palette
    #[error("Invalid palette: {0}")]
    InvalidPalette(String),
}
