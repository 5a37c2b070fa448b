use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub recipe_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub uom_id: i32,
    pub unit_cost: f64,  // derived: products.standard_price at last refresh
    pub total_cost: f64, // derived: quantity * unit_cost
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recipes::Entity",
        from = "Column::RecipeId",
        to = "super::recipes::Column::Id",
        on_delete = "Cascade"
    )]
    Recipes,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_delete = "Restrict"
    )]
    Products,
    #[sea_orm(
        belongs_to = "super::units_of_measure::Entity",
        from = "Column::UomId",
        to = "super::units_of_measure::Column::Id",
        on_delete = "Restrict"
    )]
    UnitsOfMeasure,
}

impl Related<super::recipes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::units_of_measure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnitsOfMeasure.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
