//! Pure cost roll-up rules.
//!
//! Each derived field of the recipe model has exactly one function here.
//! The services call them at the end of every mutating operation:
//!
//! ```text
//! product.standard_price --> ingredient.unit_cost --> ingredient.total_cost
//! ingredient.total_cost (all lines) --> recipe.total_cost --> recipe.cost_per_serving
//! recipe.serving_size ---------------------------------------> recipe.cost_per_serving
//! ```

use crate::errors::{RecipeError, RecipeResult};

/// Line cost of an ingredient: `quantity * unit_cost`.
///
/// Quantity is not constrained; zero and negative quantities produce zero and
/// negative line costs.
pub fn ingredient_total_cost(quantity: f64, unit_cost: f64) -> f64 {
    quantity * unit_cost
}

/// Sum of the given line costs.
///
/// Callers pass lines in a stable order (by id) so that repeated runs over the
/// same rows produce bit-identical totals.
pub fn recipe_total_cost<I>(line_costs: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    line_costs.into_iter().fold(0.0, |acc, cost| acc + cost)
}

/// Cost per serving, or `0.0` when the serving size is not positive.
pub fn cost_per_serving(total_cost: f64, serving_size: i32) -> f64 {
    if serving_size > 0 {
        total_cost / f64::from(serving_size)
    } else {
        0.0
    }
}

/// Reject a serving size that is zero or negative.
pub fn validate_serving_size(serving_size: i32) -> RecipeResult<i32> {
    if serving_size <= 0 {
        return Err(RecipeError::InvalidServingSize(serving_size));
    }
    Ok(serving_size)
}

/// Derived recipe fields computed from the current lines and serving size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecipeCosts {
    pub total_cost: f64,
    pub cost_per_serving: f64,
}

impl RecipeCosts {
    pub fn compute<I>(line_costs: I, serving_size: i32) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let total_cost = recipe_total_cost(line_costs);
        Self {
            total_cost,
            cost_per_serving: cost_per_serving(total_cost, serving_size),
        }
    }
}
