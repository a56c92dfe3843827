/// Result alias that carries the custom [`VenetianError`] type.
pub type Result<T> = std::result::Result<T, VenetianError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VenetianError {
    /// A flap was submitted with more entries than the widget has stripes.
    /// Raised before the flap queue is touched.
    #[error("there isn't enough stripes for the contents submitted ({contents} contents, {stripes} stripes)")]
    CapacityExceeded { contents: usize, stripes: usize },
    /// The configuration cannot drive a widget.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON decoding errors for config and flap files.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_both_counts() {
        let err = VenetianError::CapacityExceeded {
            contents: 4,
            stripes: 3,
        };
        let text = format!("{err}");
        assert!(text.contains("4 contents"));
        assert!(text.contains("3 stripes"));
    }
}
