//! Database side of the cost roll-up.
//!
//! Every function takes any `ConnectionTrait` so services can run it inside
//! the transaction of the write that triggered it. Ingredient lines are always
//! settled before the recipe totals are written.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::costing::{self, RecipeCosts};
use crate::database::entities::{products, recipe_ingredients, recipes};
use crate::errors::{RecipeError, RecipeResult};

pub async fn load_recipe<C>(conn: &C, recipe_id: i32) -> RecipeResult<recipes::Model>
where
    C: ConnectionTrait,
{
    recipes::Entity::find_by_id(recipe_id)
        .one(conn)
        .await?
        .ok_or(RecipeError::NotFound(recipe_id))
}

pub async fn load_lines<C>(conn: &C, recipe_id: i32) -> RecipeResult<Vec<recipe_ingredients::Model>>
where
    C: ConnectionTrait,
{
    let lines = recipe_ingredients::Entity::find()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .order_by_asc(recipe_ingredients::Column::Id)
        .all(conn)
        .await?;

    Ok(lines)
}

/// Write `unit_cost` and the matching `total_cost` onto a line.
///
/// Nothing is written when the stored values already match.
pub async fn settle_line<C>(
    conn: &C,
    line: recipe_ingredients::Model,
    unit_cost: f64,
) -> RecipeResult<recipe_ingredients::Model>
where
    C: ConnectionTrait,
{
    let total_cost = costing::ingredient_total_cost(line.quantity, unit_cost);
    if line.unit_cost == unit_cost && line.total_cost == total_cost {
        return Ok(line);
    }

    let mut active: recipe_ingredients::ActiveModel = line.into();
    active.unit_cost = Set(unit_cost);
    active.total_cost = Set(total_cost);
    Ok(active.update(conn).await?)
}

/// Recompute every derived field of a recipe from its current lines.
pub async fn recompute_recipe<C>(conn: &C, recipe_id: i32) -> RecipeResult<recipes::Model>
where
    C: ConnectionTrait,
{
    let recipe = load_recipe(conn, recipe_id).await?;

    let mut line_costs = Vec::new();
    for line in load_lines(conn, recipe_id).await? {
        let unit_cost = line.unit_cost;
        let settled = settle_line(conn, line, unit_cost).await?;
        line_costs.push(settled.total_cost);
    }

    let costs = RecipeCosts::compute(line_costs, recipe.serving_size);
    apply_recipe_costs(conn, recipe, costs).await
}

/// Re-read each line's product price, then recompute the recipe.
pub async fn refresh_unit_costs<C>(conn: &C, recipe_id: i32) -> RecipeResult<recipes::Model>
where
    C: ConnectionTrait,
{
    load_recipe(conn, recipe_id).await?;

    let lines = recipe_ingredients::Entity::find()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .order_by_asc(recipe_ingredients::Column::Id)
        .find_also_related(products::Entity)
        .all(conn)
        .await?;

    for (line, product) in lines {
        let product = product.ok_or(RecipeError::ProductNotFound(line.product_id))?;
        settle_line(conn, line, product.standard_price).await?;
    }

    recompute_recipe(conn, recipe_id).await
}

async fn apply_recipe_costs<C>(
    conn: &C,
    recipe: recipes::Model,
    costs: RecipeCosts,
) -> RecipeResult<recipes::Model>
where
    C: ConnectionTrait,
{
    if recipe.total_cost == costs.total_cost && recipe.cost_per_serving == costs.cost_per_serving {
        return Ok(recipe);
    }

    debug!(
        "Recipe {} costs: total {} -> {}, per serving {} -> {}",
        recipe.id,
        recipe.total_cost,
        costs.total_cost,
        recipe.cost_per_serving,
        costs.cost_per_serving
    );

    let mut active: recipes::ActiveModel = recipe.into();
    active.total_cost = Set(costs.total_cost);
    active.cost_per_serving = Set(costs.cost_per_serving);
    active.updated_at = Set(Utc::now());
    Ok(active.update(conn).await?)
}
