use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::database::entities::recipe_instructions::{self, DEFAULT_SEQUENCE};
use crate::errors::{RecipeError, RecipeResult};
use crate::services::cost_rollup;
use crate::services::ValidationService;

/// Gap between sequences assigned by a reorder
const SEQUENCE_STEP: i32 = 10;

#[derive(Clone)]
pub struct InstructionService {
    db: DatabaseConnection,
}

#[derive(Clone, Debug, Default)]
pub struct InstructionUpdateRequest {
    pub instruction: Option<String>,
    pub sequence: Option<i32>,
}

async fn load_ordered<C>(conn: &C, recipe_id: i32) -> RecipeResult<Vec<recipe_instructions::Model>>
where
    C: ConnectionTrait,
{
    let steps = recipe_instructions::Entity::find()
        .filter(recipe_instructions::Column::RecipeId.eq(recipe_id))
        .order_by_asc(recipe_instructions::Column::Sequence)
        .order_by_asc(recipe_instructions::Column::Id)
        .all(conn)
        .await?;

    Ok(steps)
}

/// Requested ids first, then the remaining steps in their current order.
fn reordered_ids(
    recipe_id: i32,
    current: &[recipe_instructions::Model],
    requested: &[i32],
) -> RecipeResult<Vec<i32>> {
    let owned: HashSet<i32> = current.iter().map(|step| step.id).collect();
    let mut seen = HashSet::new();

    for id in requested {
        if !owned.contains(id) {
            return Err(RecipeError::NotOwnedByRecipe {
                kind: "Instruction",
                id: *id,
                recipe_id,
            });
        }
        if !seen.insert(*id) {
            return Err(RecipeError::Validation(format!(
                "Instruction {} listed more than once",
                id
            )));
        }
    }

    let mut order = requested.to_vec();
    order.extend(
        current
            .iter()
            .map(|step| step.id)
            .filter(|id| !seen.contains(id)),
    );

    Ok(order)
}

impl InstructionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append a step; `sequence` defaults to 10
    pub async fn add_instruction(
        &self,
        recipe_id: i32,
        instruction: &str,
        sequence: Option<i32>,
    ) -> RecipeResult<recipe_instructions::Model> {
        let text = ValidationService::validate_instruction_text(instruction)?;
        cost_rollup::load_recipe(&self.db, recipe_id).await?;

        let step = recipe_instructions::ActiveModel {
            id: NotSet,
            recipe_id: Set(recipe_id),
            sequence: Set(sequence.unwrap_or(DEFAULT_SEQUENCE)),
            instruction: Set(text),
        }
        .insert(&self.db)
        .await?;

        Ok(step)
    }

    /// Steps ordered by sequence; ties keep creation order
    pub async fn list_instructions(
        &self,
        recipe_id: i32,
    ) -> RecipeResult<Vec<recipe_instructions::Model>> {
        cost_rollup::load_recipe(&self.db, recipe_id).await?;
        load_ordered(&self.db, recipe_id).await
    }

    pub async fn update_instruction(
        &self,
        id: i32,
        request: InstructionUpdateRequest,
    ) -> RecipeResult<recipe_instructions::Model> {
        let step = recipe_instructions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecipeError::InstructionNotFound(id))?;

        let mut active: recipe_instructions::ActiveModel = step.clone().into();
        let mut changed = false;

        if let Some(text) = request.instruction {
            active.instruction = Set(ValidationService::validate_instruction_text(&text)?);
            changed = true;
        }

        if let Some(sequence) = request.sequence {
            active.sequence = Set(sequence);
            changed = true;
        }

        if !changed {
            return Ok(step);
        }

        Ok(active.update(&self.db).await?)
    }

    pub async fn remove_instruction(&self, id: i32) -> RecipeResult<()> {
        let result = recipe_instructions::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RecipeError::InstructionNotFound(id));
        }

        Ok(())
    }

    /// Renumber steps 10, 20, 30... following `ordered_ids`. Steps not listed
    /// keep their relative order after the listed ones.
    pub async fn reorder_instructions(
        &self,
        recipe_id: i32,
        ordered_ids: &[i32],
    ) -> RecipeResult<Vec<recipe_instructions::Model>> {
        let txn = self.db.begin().await?;

        cost_rollup::load_recipe(&txn, recipe_id).await?;
        let current = load_ordered(&txn, recipe_id).await?;
        let order = reordered_ids(recipe_id, &current, ordered_ids)?;

        for (position, id) in order.iter().enumerate() {
            let sequence = (position as i32 + 1) * SEQUENCE_STEP;
            let Some(step) = current.iter().find(|step| step.id == *id) else {
                continue;
            };
            if step.sequence == sequence {
                continue;
            }

            debug!("Instruction {} sequence {} -> {}", id, step.sequence, sequence);
            let mut active: recipe_instructions::ActiveModel = step.clone().into();
            active.sequence = Set(sequence);
            active.update(&txn).await?;
        }

        let steps = load_ordered(&txn, recipe_id).await?;
        txn.commit().await?;

        Ok(steps)
    }
}
