use crate::errors::{RecipeError, RecipeResult};

pub const MAX_RECIPE_NAME_LEN: usize = 200;

const COPY_SUFFIX: &str = " (copy)";

/// Service for input validation and normalisation of recipe fields
pub struct ValidationService;

impl ValidationService {
    /// Trim and validate a recipe name
    pub fn validate_recipe_name(name: &str) -> RecipeResult<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(RecipeError::Validation(
                "Recipe name cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > MAX_RECIPE_NAME_LEN {
            return Err(RecipeError::Validation(format!(
                "Recipe name is too long (max {} characters)",
                MAX_RECIPE_NAME_LEN
            )));
        }

        Ok(trimmed.to_string())
    }

    /// Default name for a duplicated recipe, shortened to fit the name limit
    pub fn copy_name(source: &str) -> RecipeResult<String> {
        let budget = MAX_RECIPE_NAME_LEN - COPY_SUFFIX.chars().count();
        let base: String = source.trim().chars().take(budget).collect();
        Self::validate_recipe_name(&format!("{}{}", base.trim_end(), COPY_SUFFIX))
    }

    /// Preparation time in minutes cannot be negative
    pub fn validate_prep_time(prep_time: i32) -> RecipeResult<i32> {
        if prep_time < 0 {
            return Err(RecipeError::Validation(format!(
                "Preparation time cannot be negative (got {})",
                prep_time
            )));
        }
        Ok(prep_time)
    }

    /// Instruction steps must carry text
    pub fn validate_instruction_text(text: &str) -> RecipeResult<String> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(RecipeError::Validation(
                "Instruction text cannot be empty".to_string(),
            ));
        }

        Ok(trimmed.to_string())
    }

    /// Blank notes are stored as NULL
    pub fn normalize_notes(notes: Option<String>) -> Option<String> {
        notes.and_then(|value| {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    /// Catalog names (products, units of measure)
    pub fn validate_catalog_name(kind: &str, name: &str) -> RecipeResult<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(RecipeError::Validation(format!(
                "{} name cannot be empty",
                kind
            )));
        }

        Ok(trimmed.to_string())
    }

    /// Prices must be finite so that derived costs stay comparable
    pub fn validate_price(price: f64) -> RecipeResult<f64> {
        if !price.is_finite() {
            return Err(RecipeError::Validation(format!(
                "Standard price must be a finite number (got {})",
                price
            )));
        }
        Ok(price)
    }

    /// Quantities may be zero or negative but must be finite
    pub fn validate_quantity(quantity: f64) -> RecipeResult<f64> {
        if !quantity.is_finite() {
            return Err(RecipeError::Validation(format!(
                "Quantity must be a finite number (got {})",
                quantity
            )));
        }
        Ok(quantity)
    }
}
