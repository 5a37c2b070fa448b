use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Iterable};
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "appetizer")]
    Appetizer,
    #[sea_orm(string_value = "sushi")]
    Sushi,
    #[sea_orm(string_value = "sashimi")]
    Sashimi,
    #[sea_orm(string_value = "roll")]
    Roll,
    #[sea_orm(string_value = "dessert")]
    Dessert,
    #[sea_orm(string_value = "beverage")]
    Beverage,
    #[default]
    #[sea_orm(string_value = "other")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Appetizer => "appetizer",
            Category::Sushi => "sushi",
            Category::Sashimi => "sashimi",
            Category::Roll => "roll",
            Category::Dessert => "dessert",
            Category::Beverage => "beverage",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("Unknown recipe category '{}'", value))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: Category,
    pub prep_time: i32, // minutes
    pub serving_size: i32,
    pub total_cost: f64,       // derived: sum of ingredient line costs
    pub cost_per_serving: f64, // derived: total_cost / serving_size
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    RecipeIngredients,
    #[sea_orm(has_many = "super::recipe_instructions::Entity")]
    RecipeInstructions,
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl Related<super::recipe_instructions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeInstructions.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let ActiveValue::Set(serving_size) = &self.serving_size {
            if *serving_size <= 0 {
                return Err(DbErr::Custom(format!(
                    "Serving size must be greater than 0 (got {})",
                    serving_size
                )));
            }
        }
        Ok(self)
    }
}
