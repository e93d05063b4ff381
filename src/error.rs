//! Error types for the sheet and tab controllers
//!
//! Neither controller does I/O, so every variant here is a caller mistake
//! rather than a transient condition. Nothing is retried.

use thiserror::Error;

/// Misuse of the sheet control surface
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// A feature asked for the sheet before the host mounted one
    #[error("sheet controller is not installed; mount the sheet host before using it")]
    NotInstalled,

    /// `install` was called a second time on the same provider
    #[error("sheet controller is already installed")]
    AlreadyInstalled,

    /// The host that owned the controller has been dropped
    #[error("sheet host is gone; command dropped")]
    Detached,
}

/// Misuse of a tab group
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TabError {
    /// Tab index outside `0..len`
    #[error("tab index {index} out of range (tab count {len})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of tabs in the group
        len: usize,
    },

    /// A tab group needs at least one tab
    #[error("tab group has no tabs")]
    Empty,

    /// Page width must be positive
    #[error("invalid page width {0}")]
    InvalidPageWidth(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_page_width_is_reported() {
        let err = TabError::InvalidPageWidth(-2.5);
        assert_eq!(err, TabError::InvalidPageWidth(-2.5));
        assert_ne!(err, TabError::InvalidPageWidth(0.0));
        assert_eq!(err.to_string(), "invalid page width -2.5");
    }
}
