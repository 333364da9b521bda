//! bwilcd library
//!
//! An interactive terminal client for ILCD Network (soda4LCA) nodes: list a
//! node's data stocks, browse and search their process datasets, inspect a
//! dataset's exchanges and download whole stocks as ZIP archives.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        // Test that our constants are accessible
        assert_eq!(DEFAULT_PAGE_SIZE, 20);
        assert!(USER_AGENT.starts_with("bwilcd/"));
        assert_eq!(render::PROMPT, "bwilcd> ");
    }

    #[test]
    fn test_error_types() {
        // Test that our error types work correctly
        let api_error = errors::ApiError::Auth { status: 401 };
        let app_error = AppError::Api(api_error);

        assert_eq!(app_error.category(), "authentication");
        assert!(app_error.is_recoverable());
    }
}
