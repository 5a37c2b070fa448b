//! Recipe costing error types
//!
//! The only domain validation failure of the costing rules is a serving size
//! that is not strictly positive. Blank names and blank instruction text are
//! reported through the same validation category.
//!
//! # Examples
//!
//! ```rust
//! use restaurant_ops::errors::RecipeError;
//!
//! let err = RecipeError::InvalidServingSize(-1);
//! assert_eq!(err.to_string(), "Serving size must be greater than 0 (got -1)");
//!
//! let err = RecipeError::ProductNotFound(7);
//! assert!(err.is_not_found());
//! ```

use thiserror::Error;

/// Recipe, ingredient line and instruction errors
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Recipe not found by ID
    #[error("Recipe {0} not found")]
    NotFound(i32),

    /// Ingredient line not found by ID
    #[error("Ingredient line {0} not found")]
    IngredientNotFound(i32),

    /// Instruction step not found by ID
    #[error("Instruction {0} not found")]
    InstructionNotFound(i32),

    /// Referenced product does not exist
    #[error("Product {0} not found")]
    ProductNotFound(i32),

    /// Referenced unit of measure does not exist
    #[error("Unit of measure {0} not found")]
    UnitOfMeasureNotFound(i32),

    /// Serving size written as zero or negative
    #[error("Serving size must be greater than 0 (got {0})")]
    InvalidServingSize(i32),

    /// Child record addressed through a recipe that does not own it
    #[error("{kind} {id} does not belong to recipe {recipe_id}")]
    NotOwnedByRecipe {
        /// Child record kind ("Instruction", "Ingredient line")
        kind: &'static str,
        /// Child record identifier
        id: i32,
        /// Recipe the caller addressed
        recipe_id: i32,
    },

    /// Validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl RecipeError {
    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RecipeError::InvalidServingSize(_) | RecipeError::Validation(_)
        )
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecipeError::NotFound(_)
                | RecipeError::IngredientNotFound(_)
                | RecipeError::InstructionNotFound(_)
                | RecipeError::ProductNotFound(_)
                | RecipeError::UnitOfMeasureNotFound(_)
        )
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        self.is_validation()
            || self.is_not_found()
            || matches!(self, RecipeError::NotOwnedByRecipe { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            RecipeError::NotFound(_)
            | RecipeError::IngredientNotFound(_)
            | RecipeError::InstructionNotFound(_)
            | RecipeError::ProductNotFound(_)
            | RecipeError::UnitOfMeasureNotFound(_) => "NOT_FOUND",
            RecipeError::InvalidServingSize(_) | RecipeError::Validation(_) => {
                "VALIDATION_FAILED"
            }
            RecipeError::NotOwnedByRecipe { .. } => "CONFLICT",
            RecipeError::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_not_found() {
        let err = RecipeError::NotFound(42);
        assert_eq!(err.to_string(), "Recipe 42 not found");
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_invalid_serving_size() {
        let err = RecipeError::InvalidServingSize(0);
        assert_eq!(
            err.to_string(),
            "Serving size must be greater than 0 (got 0)"
        );
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_not_owned_by_recipe() {
        let err = RecipeError::NotOwnedByRecipe {
            kind: "Instruction",
            id: 3,
            recipe_id: 9,
        };
        assert_eq!(err.to_string(), "Instruction 3 does not belong to recipe 9");
        assert!(err.is_client_error());
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_database_error_is_not_client_error() {
        let err = RecipeError::from(sea_orm::DbErr::Custom("boom".to_string()));
        assert!(!err.is_client_error());
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
