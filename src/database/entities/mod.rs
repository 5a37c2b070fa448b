pub mod products;
pub mod recipe_ingredients;
pub mod recipe_instructions;
pub mod recipes;
pub mod units_of_measure;

pub use recipes::Category;
