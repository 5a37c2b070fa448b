use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::database::entities::{products, recipe_ingredients, units_of_measure};
use crate::errors::{RecipeError, RecipeResult};
use crate::services::cost_rollup;
use crate::services::ValidationService;

/// Read access to product and unit master data, plus the price-change hook
/// that keeps ingredient unit costs in sync with `standard_price`.
#[derive(Clone)]
pub struct ProductService {
    db: DatabaseConnection,
}

#[derive(Clone, Debug)]
pub struct ProductCreateRequest {
    pub name: String,
    pub standard_price: f64,
    pub uom_id: i32,
}

/// Result of a price change
#[derive(Clone, Debug)]
pub struct PriceUpdate {
    pub product: products::Model,
    pub updated_lines: usize,
    pub recomputed_recipes: Vec<i32>,
}

impl ProductService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_unit(&self, name: &str) -> RecipeResult<units_of_measure::Model> {
        let name = ValidationService::validate_catalog_name("Unit of measure", name)?;

        let unit = units_of_measure::ActiveModel {
            id: NotSet,
            name: Set(name),
        }
        .insert(&self.db)
        .await?;

        Ok(unit)
    }

    pub async fn find_unit_by_name(
        &self,
        name: &str,
    ) -> RecipeResult<Option<units_of_measure::Model>> {
        let unit = units_of_measure::Entity::find()
            .filter(units_of_measure::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await?;

        Ok(unit)
    }

    pub async fn get_unit(&self, id: i32) -> RecipeResult<units_of_measure::Model> {
        units_of_measure::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecipeError::UnitOfMeasureNotFound(id))
    }

    pub async fn list_units(&self) -> RecipeResult<Vec<units_of_measure::Model>> {
        let units = units_of_measure::Entity::find()
            .order_by_asc(units_of_measure::Column::Name)
            .all(&self.db)
            .await?;

        Ok(units)
    }

    pub async fn create_product(&self, request: ProductCreateRequest) -> RecipeResult<products::Model> {
        let name = ValidationService::validate_catalog_name("Product", &request.name)?;
        let price = ValidationService::validate_price(request.standard_price)?;
        self.get_unit(request.uom_id).await?;
        let now = Utc::now();

        let product = products::ActiveModel {
            id: NotSet,
            name: Set(name),
            standard_price: Set(price),
            uom_id: Set(request.uom_id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(product)
    }

    pub async fn get_product(&self, id: i32) -> RecipeResult<products::Model> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecipeError::ProductNotFound(id))
    }

    pub async fn find_product_by_name(&self, name: &str) -> RecipeResult<Option<products::Model>> {
        let product = products::Entity::find()
            .filter(products::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await?;

        Ok(product)
    }

    pub async fn list_products(&self) -> RecipeResult<Vec<products::Model>> {
        let products = products::Entity::find()
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?;

        Ok(products)
    }

    /// Change a product's standard price and push it through every ingredient
    /// line that references the product and every recipe owning such a line,
    /// all in one transaction.
    pub async fn update_standard_price(
        &self,
        product_id: i32,
        standard_price: f64,
    ) -> RecipeResult<PriceUpdate> {
        let standard_price = ValidationService::validate_price(standard_price)?;
        let txn = self.db.begin().await?;

        let product = products::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or(RecipeError::ProductNotFound(product_id))?;
        let previous_price = product.standard_price;

        let mut active: products::ActiveModel = product.into();
        active.standard_price = Set(standard_price);
        active.updated_at = Set(Utc::now());
        let product = active.update(&txn).await?;

        let lines = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::ProductId.eq(product_id))
            .order_by_asc(recipe_ingredients::Column::Id)
            .all(&txn)
            .await?;

        let updated_lines = lines.len();
        let mut recipe_ids = BTreeSet::new();
        for line in lines {
            recipe_ids.insert(line.recipe_id);
            cost_rollup::settle_line(&txn, line, standard_price).await?;
        }

        for recipe_id in &recipe_ids {
            cost_rollup::recompute_recipe(&txn, *recipe_id).await?;
        }

        txn.commit().await?;
        info!(
            "Product {} '{}' price {} -> {}: {} line(s) across {} recipe(s) updated",
            product.id,
            product.name,
            previous_price,
            standard_price,
            updated_lines,
            recipe_ids.len()
        );

        Ok(PriceUpdate {
            product,
            updated_lines,
            recomputed_recipes: recipe_ids.into_iter().collect(),
        })
    }
}
