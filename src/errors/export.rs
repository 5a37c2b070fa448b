//! Cost sheet export error types

use thiserror::Error;

use super::RecipeError;

/// Cost sheet export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// Requested export format is not supported
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Loading the recipe failed
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// JSON serialization failed
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the export failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format() {
        let err = ExportError::UnsupportedFormat("xlsx".to_string());
        assert_eq!(err.to_string(), "Unsupported export format: xlsx");
    }

    #[test]
    fn test_recipe_error_is_transparent() {
        let err = ExportError::from(RecipeError::NotFound(5));
        assert_eq!(err.to_string(), "Recipe 5 not found");
    }
}
