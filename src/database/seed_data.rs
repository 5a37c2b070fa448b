use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::database::entities::{products, units_of_measure, Category};
use crate::services::{
    IngredientCreateRequest, IngredientService, InstructionService, ProductCreateRequest,
    ProductService, RecipeCreateRequest, RecipeListFilter, RecipeService,
};

struct ExampleRecipe {
    name: &'static str,
    category: Category,
    prep_time: i32,
    serving_size: i32,
    notes: Option<&'static str>,
    ingredients: &'static [(&'static str, f64)],
    steps: &'static [&'static str],
}

const UNITS: &[&str] = &["kg", "l", "piece", "sheet"];

// (product, unit, standard price per unit)
const PRODUCTS: &[(&str, &str, f64)] = &[
    ("Salmon", "kg", 20.0),
    ("Tuna", "kg", 28.0),
    ("Sushi Rice", "kg", 4.0),
    ("Rice Vinegar", "l", 3.5),
    ("Nori", "sheet", 0.15),
    ("Crab Stick", "kg", 12.0),
    ("Avocado", "piece", 1.2),
    ("Cucumber", "piece", 0.6),
    ("Green Tea Leaves", "kg", 45.0),
];

const RECIPES: &[ExampleRecipe] = &[
    ExampleRecipe {
        name: "Salmon Nigiri",
        category: Category::Sushi,
        prep_time: 15,
        serving_size: 2,
        notes: Some("Serve with pickled ginger and wasabi"),
        ingredients: &[("Salmon", 0.2), ("Sushi Rice", 0.3)],
        steps: &[
            "Season the cooked rice with rice vinegar and let it cool",
            "Slice the salmon against the grain",
            "Shape the rice into small oblong mounds",
            "Drape a slice of salmon over each mound",
        ],
    },
    ExampleRecipe {
        name: "Tuna Sashimi",
        category: Category::Sashimi,
        prep_time: 10,
        serving_size: 1,
        notes: None,
        ingredients: &[("Tuna", 0.15)],
        steps: &[
            "Trim the tuna block",
            "Cut into slices about 5 mm thick",
            "Fan the slices on a chilled plate",
        ],
    },
    ExampleRecipe {
        name: "California Roll",
        category: Category::Roll,
        prep_time: 20,
        serving_size: 2,
        notes: Some("Inside-out roll"),
        ingredients: &[
            ("Sushi Rice", 0.25),
            ("Rice Vinegar", 0.02),
            ("Nori", 1.0),
            ("Crab Stick", 0.1),
            ("Avocado", 0.5),
            ("Cucumber", 0.5),
        ],
        steps: &[
            "Spread seasoned rice over the nori",
            "Flip the sheet and lay out crab, avocado and cucumber",
            "Roll tightly with a bamboo mat",
            "Cut into eight pieces",
        ],
    },
    ExampleRecipe {
        name: "Green Tea",
        category: Category::Beverage,
        prep_time: 5,
        serving_size: 4,
        notes: None,
        ingredients: &[("Green Tea Leaves", 0.012)],
        steps: &["Heat water to 80 degrees", "Steep the leaves for two minutes"],
    },
];

/// Load the demo catalog and recipes. Safe to run repeatedly.
pub async fn create_example_recipes(db: &DatabaseConnection) -> Result<()> {
    let recipe_service = RecipeService::new(db.clone());
    let existing = recipe_service
        .list_recipes(RecipeListFilter {
            include_inactive: true,
            category: None,
        })
        .await?;

    let product_service = ProductService::new(db.clone());
    let mut units = Vec::new();
    for name in UNITS {
        units.push(find_or_create_unit(&product_service, name).await?);
    }

    let mut catalog = Vec::new();
    for (name, unit, price) in PRODUCTS {
        let uom = units
            .iter()
            .find(|u| u.name == *unit)
            .with_context(|| format!("unit '{}' missing from seed units", unit))?;
        catalog.push(find_or_create_product(&product_service, name, uom.id, *price).await?);
    }
    info!("Catalog ready: {} units, {} products", units.len(), catalog.len());

    let ingredient_service = IngredientService::new(db.clone());
    let instruction_service = InstructionService::new(db.clone());

    for example in RECIPES {
        if existing.iter().any(|r| r.name == example.name) {
            info!("Example recipe '{}' already exists, skipping", example.name);
            continue;
        }

        let recipe = recipe_service
            .create_recipe(RecipeCreateRequest {
                name: example.name.to_string(),
                category: Some(example.category),
                prep_time: Some(example.prep_time),
                serving_size: Some(example.serving_size),
                notes: example.notes.map(str::to_string),
            })
            .await?;

        for (product_name, quantity) in example.ingredients {
            let product = catalog
                .iter()
                .find(|p| p.name == *product_name)
                .with_context(|| format!("product '{}' missing from seed catalog", product_name))?;
            ingredient_service
                .add_ingredient(
                    recipe.id,
                    IngredientCreateRequest {
                        product_id: product.id,
                        quantity: Some(*quantity),
                        uom_id: None,
                    },
                )
                .await?;
        }

        for (position, step) in example.steps.iter().enumerate() {
            let sequence = (position as i32 + 1) * 10;
            instruction_service
                .add_instruction(recipe.id, step, Some(sequence))
                .await?;
        }

        let recipe = recipe_service.get_recipe(recipe.id).await?;
        info!(
            "Created example recipe {} '{}' (total {:.2}, per serving {:.2})",
            recipe.id, recipe.name, recipe.total_cost, recipe.cost_per_serving
        );
    }

    Ok(())
}

async fn find_or_create_unit(
    service: &ProductService,
    name: &str,
) -> Result<units_of_measure::Model> {
    if let Some(unit) = service.find_unit_by_name(name).await? {
        return Ok(unit);
    }
    Ok(service.create_unit(name).await?)
}

async fn find_or_create_product(
    service: &ProductService,
    name: &str,
    uom_id: i32,
    standard_price: f64,
) -> Result<products::Model> {
    if let Some(product) = service.find_product_by_name(name).await? {
        return Ok(product);
    }
    Ok(service
        .create_product(ProductCreateRequest {
            name: name.to_string(),
            standard_price,
            uom_id,
        })
        .await?)
}
