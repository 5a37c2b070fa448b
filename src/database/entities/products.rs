use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product master data. Recipes only read `standard_price` and `uom_id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub standard_price: f64,
    pub uom_id: i32, // default unit of measure for new ingredient lines
    pub active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::units_of_measure::Entity",
        from = "Column::UomId",
        to = "super::units_of_measure::Column::Id"
    )]
    UnitsOfMeasure,
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    RecipeIngredients,
}

impl Related<super::units_of_measure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnitsOfMeasure.def()
    }
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
