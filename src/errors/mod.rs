//! Domain-specific error types for restaurant-ops
//!
//! # Error Categories
//!
//! - **RecipeError**: recipe, ingredient line, instruction and catalog lookups,
//!   including the serving-size validation rule
//! - **ExportError**: cost sheet rendering to JSON or CSV
//!
//! # Examples
//!
//! ```rust
//! use restaurant_ops::errors::RecipeError;
//!
//! let err = RecipeError::InvalidServingSize(0);
//! assert!(err.is_validation());
//!
//! let err = RecipeError::NotFound(42);
//! assert!(err.is_not_found());
//! ```

pub mod export;
pub mod recipe;

pub use export::ExportError;
pub use recipe::RecipeError;

/// Result type alias for recipe operations
pub type RecipeResult<T> = Result<T, RecipeError>;

/// Result type alias for cost sheet export
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_result_alias() {
        let result: RecipeResult<i32> = Err(RecipeError::NotFound(42));
        assert!(result.is_err());
    }

    #[test]
    fn test_export_result_alias() {
        let result: ExportResult<()> = Err(ExportError::UnsupportedFormat("xml".to_string()));
        assert!(result.is_err());
    }
}
