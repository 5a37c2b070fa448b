use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use crate::costing;
use crate::database::entities::{recipe_ingredients, recipe_instructions, recipes, Category};
use crate::errors::RecipeResult;
use crate::services::cost_rollup;
use crate::services::ValidationService;

#[derive(Clone)]
pub struct RecipeService {
    db: DatabaseConnection,
}

#[derive(Clone, Debug, Default)]
pub struct RecipeCreateRequest {
    pub name: String,
    pub category: Option<Category>,
    pub prep_time: Option<i32>,
    pub serving_size: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct RecipeUpdateRequest {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub prep_time: Option<i32>,
    pub serving_size: Option<i32>,
    pub notes: Option<String>,
    pub notes_is_set: bool,
    pub active: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct RecipeListFilter {
    pub include_inactive: bool,
    pub category: Option<Category>,
}

/// A recipe with its ingredient lines (by id) and instructions (by sequence)
#[derive(Clone, Debug, Serialize)]
pub struct RecipeDetail {
    pub recipe: recipes::Model,
    pub ingredients: Vec<recipe_ingredients::Model>,
    pub instructions: Vec<recipe_instructions::Model>,
}

impl RecipeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_recipe(&self, request: RecipeCreateRequest) -> RecipeResult<recipes::Model> {
        let name = ValidationService::validate_recipe_name(&request.name)?;
        let serving_size = costing::validate_serving_size(request.serving_size.unwrap_or(1))?;
        let prep_time = ValidationService::validate_prep_time(request.prep_time.unwrap_or(0))?;
        let now = Utc::now();

        let recipe = recipes::ActiveModel {
            id: NotSet,
            name: Set(name),
            category: Set(request.category.unwrap_or_default()),
            prep_time: Set(prep_time),
            serving_size: Set(serving_size),
            total_cost: Set(0.0),
            cost_per_serving: Set(costing::cost_per_serving(0.0, serving_size)),
            notes: Set(ValidationService::normalize_notes(request.notes)),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = recipe.insert(&self.db).await?;
        info!("Created recipe {} '{}'", created.id, created.name);

        Ok(created)
    }

    pub async fn get_recipe(&self, id: i32) -> RecipeResult<recipes::Model> {
        cost_rollup::load_recipe(&self.db, id).await
    }

    pub async fn get_recipe_detail(&self, id: i32) -> RecipeResult<RecipeDetail> {
        let recipe = cost_rollup::load_recipe(&self.db, id).await?;
        let ingredients = cost_rollup::load_lines(&self.db, id).await?;
        let instructions = recipe_instructions::Entity::find()
            .filter(recipe_instructions::Column::RecipeId.eq(id))
            .order_by_asc(recipe_instructions::Column::Sequence)
            .order_by_asc(recipe_instructions::Column::Id)
            .all(&self.db)
            .await?;

        Ok(RecipeDetail {
            recipe,
            ingredients,
            instructions,
        })
    }

    /// Recipes ordered by name
    pub async fn list_recipes(&self, filter: RecipeListFilter) -> RecipeResult<Vec<recipes::Model>> {
        let mut query = recipes::Entity::find();

        if !filter.include_inactive {
            query = query.filter(recipes::Column::Active.eq(true));
        }

        if let Some(category) = filter.category {
            query = query.filter(recipes::Column::Category.eq(category));
        }

        let recipes = query
            .order_by_asc(recipes::Column::Name)
            .order_by_asc(recipes::Column::Id)
            .all(&self.db)
            .await?;

        Ok(recipes)
    }

    /// Update recipe fields. A rejected value leaves the stored recipe untouched.
    pub async fn update_recipe(
        &self,
        id: i32,
        request: RecipeUpdateRequest,
    ) -> RecipeResult<recipes::Model> {
        let txn = self.db.begin().await?;

        let recipe = cost_rollup::load_recipe(&txn, id).await?;
        let mut active: recipes::ActiveModel = recipe.into();

        if let Some(name) = request.name {
            active.name = Set(ValidationService::validate_recipe_name(&name)?);
        }

        if let Some(category) = request.category {
            active.category = Set(category);
        }

        if let Some(prep_time) = request.prep_time {
            active.prep_time = Set(ValidationService::validate_prep_time(prep_time)?);
        }

        if let Some(serving_size) = request.serving_size {
            active.serving_size = Set(costing::validate_serving_size(serving_size)?);
        }

        if request.notes_is_set {
            active.notes = Set(ValidationService::normalize_notes(request.notes));
        }

        if let Some(flag) = request.active {
            active.active = Set(flag);
        }

        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        let updated = cost_rollup::recompute_recipe(&txn, id).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Soft-hide a recipe
    pub async fn archive_recipe(&self, id: i32) -> RecipeResult<recipes::Model> {
        self.set_active(id, false).await
    }

    pub async fn restore_recipe(&self, id: i32) -> RecipeResult<recipes::Model> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: i32, flag: bool) -> RecipeResult<recipes::Model> {
        let recipe = cost_rollup::load_recipe(&self.db, id).await?;
        if recipe.active == flag {
            return Ok(recipe);
        }

        let mut active: recipes::ActiveModel = recipe.into();
        active.active = Set(flag);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;
        info!(
            "Recipe {} {}",
            id,
            if flag { "restored" } else { "archived" }
        );

        Ok(updated)
    }

    /// Hard delete; ingredient lines and instructions go with the recipe
    pub async fn delete_recipe(&self, id: i32) -> RecipeResult<()> {
        let txn = self.db.begin().await?;

        let recipe = cost_rollup::load_recipe(&txn, id).await?;

        let lines = recipe_ingredients::Entity::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;

        let steps = recipe_instructions::Entity::delete_many()
            .filter(recipe_instructions::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;

        recipes::Entity::delete_by_id(recipe.id).exec(&txn).await?;

        txn.commit().await?;
        info!(
            "Deleted recipe {} '{}' ({} ingredient lines, {} instructions)",
            recipe.id, recipe.name, lines.rows_affected, steps.rows_affected
        );

        Ok(())
    }

    /// Recompute derived costs from the stored lines without touching prices
    pub async fn recompute_costs(&self, id: i32) -> RecipeResult<recipes::Model> {
        let txn = self.db.begin().await?;
        let recipe = cost_rollup::recompute_recipe(&txn, id).await?;
        txn.commit().await?;
        Ok(recipe)
    }

    /// Pull current product prices into every line, then recompute
    pub async fn refresh_unit_costs(&self, id: i32) -> RecipeResult<recipes::Model> {
        let txn = self.db.begin().await?;
        let recipe = cost_rollup::refresh_unit_costs(&txn, id).await?;
        txn.commit().await?;
        Ok(recipe)
    }

    /// Copy a recipe with its lines and instructions
    pub async fn duplicate_recipe(
        &self,
        id: i32,
        new_name: Option<String>,
    ) -> RecipeResult<recipes::Model> {
        let txn = self.db.begin().await?;

        let source = cost_rollup::load_recipe(&txn, id).await?;
        let name = match new_name {
            Some(name) => ValidationService::validate_recipe_name(&name)?,
            None => ValidationService::copy_name(&source.name)?,
        };
        let now = Utc::now();

        let copy = recipes::ActiveModel {
            id: NotSet,
            name: Set(name),
            category: Set(source.category),
            prep_time: Set(source.prep_time),
            serving_size: Set(source.serving_size),
            total_cost: Set(0.0),
            cost_per_serving: Set(0.0),
            notes: Set(source.notes.clone()),
            active: Set(source.active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for line in cost_rollup::load_lines(&txn, source.id).await? {
            recipe_ingredients::ActiveModel {
                id: NotSet,
                recipe_id: Set(copy.id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                uom_id: Set(line.uom_id),
                unit_cost: Set(line.unit_cost),
                total_cost: Set(line.total_cost),
            }
            .insert(&txn)
            .await?;
        }

        let instructions = recipe_instructions::Entity::find()
            .filter(recipe_instructions::Column::RecipeId.eq(source.id))
            .order_by_asc(recipe_instructions::Column::Sequence)
            .order_by_asc(recipe_instructions::Column::Id)
            .all(&txn)
            .await?;

        for step in instructions {
            recipe_instructions::ActiveModel {
                id: NotSet,
                recipe_id: Set(copy.id),
                sequence: Set(step.sequence),
                instruction: Set(step.instruction),
            }
            .insert(&txn)
            .await?;
        }

        let copy = cost_rollup::recompute_recipe(&txn, copy.id).await?;
        txn.commit().await?;
        info!("Duplicated recipe {} as {} '{}'", id, copy.id, copy.name);

        Ok(copy)
    }
}
