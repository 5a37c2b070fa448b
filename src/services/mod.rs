pub mod cost_rollup;
pub mod export_service;
pub mod ingredient_service;
pub mod instruction_service;
pub mod product_service;
pub mod recipe_service;
pub mod validation;

pub use export_service::*;
pub use ingredient_service::*;
pub use instruction_service::*;
pub use product_service::*;
pub use recipe_service::*;
pub use validation::*;
