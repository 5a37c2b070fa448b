use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, DatabaseConnection, EntityTrait, Set,
    TransactionTrait,
};
use tracing::{debug, info};

use crate::costing;
use crate::database::entities::{products, recipe_ingredients, recipes, units_of_measure};
use crate::errors::{RecipeError, RecipeResult};
use crate::services::cost_rollup;
use crate::services::ValidationService;

pub const DEFAULT_QUANTITY: f64 = 1.0;

#[derive(Clone)]
pub struct IngredientService {
    db: DatabaseConnection,
}

#[derive(Clone, Debug)]
pub struct IngredientCreateRequest {
    pub product_id: i32,
    pub quantity: Option<f64>,
    /// Overrides the product's default unit of measure
    pub uom_id: Option<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct IngredientUpdateRequest {
    pub product_id: Option<i32>,
    pub quantity: Option<f64>,
    pub uom_id: Option<i32>,
}

/// Point a line at a product: copies the product's default unit of measure
/// and its current standard price. Runs only when the product is (re)assigned.
fn assign_product(line: &mut recipe_ingredients::ActiveModel, product: &products::Model) {
    line.product_id = Set(product.id);
    line.uom_id = Set(product.uom_id);
    line.unit_cost = Set(product.standard_price);
}

async fn load_product<C>(conn: &C, product_id: i32) -> RecipeResult<products::Model>
where
    C: ConnectionTrait,
{
    products::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or(RecipeError::ProductNotFound(product_id))
}

async fn ensure_unit<C>(conn: &C, uom_id: i32) -> RecipeResult<()>
where
    C: ConnectionTrait,
{
    units_of_measure::Entity::find_by_id(uom_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(RecipeError::UnitOfMeasureNotFound(uom_id))
}

async fn load_line<C>(conn: &C, line_id: i32) -> RecipeResult<recipe_ingredients::Model>
where
    C: ConnectionTrait,
{
    recipe_ingredients::Entity::find_by_id(line_id)
        .one(conn)
        .await?
        .ok_or(RecipeError::IngredientNotFound(line_id))
}

impl IngredientService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn add_ingredient(
        &self,
        recipe_id: i32,
        request: IngredientCreateRequest,
    ) -> RecipeResult<recipe_ingredients::Model> {
        let txn = self.db.begin().await?;

        cost_rollup::load_recipe(&txn, recipe_id).await?;
        let product = load_product(&txn, request.product_id).await?;
        let quantity = ValidationService::validate_quantity(
            request.quantity.unwrap_or(DEFAULT_QUANTITY),
        )?;

        let mut line = recipe_ingredients::ActiveModel {
            id: NotSet,
            recipe_id: Set(recipe_id),
            quantity: Set(quantity),
            ..Default::default()
        };
        assign_product(&mut line, &product);

        if let Some(uom_id) = request.uom_id {
            ensure_unit(&txn, uom_id).await?;
            line.uom_id = Set(uom_id);
        }

        line.total_cost = Set(costing::ingredient_total_cost(
            quantity,
            product.standard_price,
        ));

        let created = line.insert(&txn).await?;
        let recipe = cost_rollup::recompute_recipe(&txn, recipe_id).await?;
        txn.commit().await?;

        info!(
            "Added {} x '{}' to recipe {} (total now {})",
            created.quantity, product.name, recipe_id, recipe.total_cost
        );

        Ok(created)
    }

    pub async fn get_ingredient(&self, line_id: i32) -> RecipeResult<recipe_ingredients::Model> {
        load_line(&self.db, line_id).await
    }

    pub async fn list_ingredients(
        &self,
        recipe_id: i32,
    ) -> RecipeResult<Vec<recipe_ingredients::Model>> {
        cost_rollup::load_recipe(&self.db, recipe_id).await?;
        cost_rollup::load_lines(&self.db, recipe_id).await
    }

    /// Edit a line. Changing the product resets the unit of measure to the
    /// product's default unless the same request names a unit.
    pub async fn update_ingredient(
        &self,
        line_id: i32,
        request: IngredientUpdateRequest,
    ) -> RecipeResult<recipe_ingredients::Model> {
        let txn = self.db.begin().await?;

        let current = load_line(&txn, line_id).await?;
        let recipe_id = current.recipe_id;
        let mut quantity = current.quantity;
        let mut unit_cost = current.unit_cost;
        let previous_product = current.product_id;
        let mut line: recipe_ingredients::ActiveModel = current.into();

        if let Some(product_id) = request.product_id {
            if product_id != previous_product {
                let product = load_product(&txn, product_id).await?;
                debug!(
                    "Line {} product {} -> {}",
                    line_id, previous_product, product_id
                );
                assign_product(&mut line, &product);
                unit_cost = product.standard_price;
            }
        }

        if let Some(value) = request.quantity {
            let value = ValidationService::validate_quantity(value)?;
            line.quantity = Set(value);
            quantity = value;
        }

        if let Some(uom_id) = request.uom_id {
            ensure_unit(&txn, uom_id).await?;
            line.uom_id = Set(uom_id);
        }

        line.total_cost = Set(costing::ingredient_total_cost(quantity, unit_cost));
        let updated = line.update(&txn).await?;

        cost_rollup::recompute_recipe(&txn, recipe_id).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Remove a line and return the recomputed recipe
    pub async fn remove_ingredient(&self, line_id: i32) -> RecipeResult<recipes::Model> {
        let txn = self.db.begin().await?;

        let line = load_line(&txn, line_id).await?;
        recipe_ingredients::Entity::delete_by_id(line.id)
            .exec(&txn)
            .await?;

        let recipe = cost_rollup::recompute_recipe(&txn, line.recipe_id).await?;
        txn.commit().await?;

        info!(
            "Removed ingredient line {} from recipe {} (total now {})",
            line_id, recipe.id, recipe.total_cost
        );

        Ok(recipe)
    }
}
