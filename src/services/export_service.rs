use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::database::entities::{
    products, recipe_ingredients, recipe_instructions, units_of_measure, Category,
};
use crate::errors::{ExportError, ExportResult, RecipeResult};
use crate::services::cost_rollup;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(value.to_string())),
        }
    }
}

/// Flattened, display-ready view of a recipe's costing
#[derive(Clone, Debug, Serialize)]
pub struct CostSheet {
    pub recipe_id: i32,
    pub name: String,
    pub category: Category,
    pub prep_time: i32,
    pub serving_size: i32,
    pub active: bool,
    pub total_cost: f64,
    pub cost_per_serving: f64,
    pub notes: Option<String>,
    pub lines: Vec<CostSheetLine>,
    pub steps: Vec<CostSheetStep>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CostSheetLine {
    pub line_id: i32,
    pub product: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub total_cost: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CostSheetStep {
    pub sequence: i32,
    pub instruction: String,
}

pub struct ExportService {
    db: DatabaseConnection,
}

impl ExportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn build_cost_sheet(&self, recipe_id: i32) -> RecipeResult<CostSheet> {
        let recipe = cost_rollup::load_recipe(&self.db, recipe_id).await?;

        let lines = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredients::Column::Id)
            .find_also_related(products::Entity)
            .all(&self.db)
            .await?;

        let uom_ids: BTreeSet<i32> = lines.iter().map(|(line, _)| line.uom_id).collect();
        let unit_names: HashMap<i32, String> = units_of_measure::Entity::find()
            .filter(units_of_measure::Column::Id.is_in(uom_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|unit| (unit.id, unit.name))
            .collect();

        let lines = lines
            .into_iter()
            .map(|(line, product)| CostSheetLine {
                line_id: line.id,
                product: product
                    .map(|product| product.name)
                    .unwrap_or_else(|| format!("product #{}", line.product_id)),
                quantity: line.quantity,
                unit: unit_names
                    .get(&line.uom_id)
                    .cloned()
                    .unwrap_or_else(|| format!("unit #{}", line.uom_id)),
                unit_cost: line.unit_cost,
                total_cost: line.total_cost,
            })
            .collect();

        let steps = recipe_instructions::Entity::find()
            .filter(recipe_instructions::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_instructions::Column::Sequence)
            .order_by_asc(recipe_instructions::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|step| CostSheetStep {
                sequence: step.sequence,
                instruction: step.instruction,
            })
            .collect();

        Ok(CostSheet {
            recipe_id: recipe.id,
            name: recipe.name,
            category: recipe.category,
            prep_time: recipe.prep_time,
            serving_size: recipe.serving_size,
            active: recipe.active,
            total_cost: recipe.total_cost,
            cost_per_serving: recipe.cost_per_serving,
            notes: recipe.notes,
            lines,
            steps,
        })
    }

    pub async fn export_recipe(&self, recipe_id: i32, format: &str) -> ExportResult<String> {
        let format = format.parse::<ExportFormat>()?;
        let sheet = self.build_cost_sheet(recipe_id).await?;
        render(&sheet, format)
    }
}

pub fn render(sheet: &CostSheet, format: ExportFormat) -> ExportResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(sheet)?),
        ExportFormat::Csv => to_csv(sheet),
    }
}

/// Trailing CSV row; shares the column names of `CostSheetLine`
#[derive(Serialize)]
struct CostSheetTotalRow<'a> {
    line_id: Option<i32>,
    product: &'a str,
    quantity: Option<f64>,
    unit: Option<&'a str>,
    unit_cost: Option<f64>,
    total_cost: f64,
}

/// One row per ingredient line followed by a TOTAL row
fn to_csv(sheet: &CostSheet) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for line in &sheet.lines {
        writer.serialize(line)?;
    }

    writer.serialize(CostSheetTotalRow {
        line_id: None,
        product: "TOTAL",
        quantity: None,
        unit: None,
        unit_cost: None,
        total_cost: sheet.total_cost,
    })?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| {
        ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
