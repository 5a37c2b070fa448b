use restaurant_ops::database::entities::{products, Category};
use restaurant_ops::database::migrations::Migrator;
use restaurant_ops::services::{
    ExportService, IngredientCreateRequest, IngredientService, IngredientUpdateRequest,
    InstructionService, ProductCreateRequest, ProductService, RecipeCreateRequest,
    RecipeListFilter, RecipeService, RecipeUpdateRequest,
};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

struct Catalog {
    kg: i32,
    piece: i32,
    salmon: i32,
    tuna: i32,
    avocado: i32,
}

async fn create_catalog(db: &DatabaseConnection) -> Catalog {
    let service = ProductService::new(db.clone());
    let kg = service.create_unit("kg").await.unwrap();
    let piece = service.create_unit("piece").await.unwrap();

    let mut ids = Vec::new();
    for (name, price, uom_id) in [
        ("Salmon", 20.0, kg.id),
        ("Tuna", 28.0, kg.id),
        ("Avocado", 1.2, piece.id),
    ] {
        let product = service
            .create_product(ProductCreateRequest {
                name: name.to_string(),
                standard_price: price,
                uom_id,
            })
            .await
            .unwrap();
        ids.push(product.id);
    }

    Catalog {
        kg: kg.id,
        piece: piece.id,
        salmon: ids[0],
        tuna: ids[1],
        avocado: ids[2],
    }
}

async fn create_recipe(db: &DatabaseConnection, name: &str, category: Category) -> i32 {
    RecipeService::new(db.clone())
        .create_recipe(RecipeCreateRequest {
            name: name.to_string(),
            category: Some(category),
            serving_size: Some(2),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

async fn add_line(db: &DatabaseConnection, recipe_id: i32, product_id: i32, quantity: f64) -> i32 {
    IngredientService::new(db.clone())
        .add_ingredient(
            recipe_id,
            IngredientCreateRequest {
                product_id,
                quantity: Some(quantity),
                uom_id: None,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_duplicate_unit_name_is_rejected() {
    let db = setup_test_db().await.unwrap();
    let service = ProductService::new(db);
    service.create_unit("kg").await.unwrap();

    let err = service.create_unit("kg").await.unwrap_err();
    assert_eq!(err.error_code(), "DATABASE_ERROR");
}

#[tokio::test]
async fn test_product_requires_existing_unit() {
    let db = setup_test_db().await.unwrap();
    let err = ProductService::new(db)
        .create_product(ProductCreateRequest {
            name: "Salmon".to_string(),
            standard_price: 20.0,
            uom_id: 77,
        })
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_add_ingredient_defaults() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let recipe_id = create_recipe(&db, "Avocado Maki", Category::Roll).await;

    let line = IngredientService::new(db)
        .add_ingredient(
            recipe_id,
            IngredientCreateRequest {
                product_id: catalog.avocado,
                quantity: None,
                uom_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(line.quantity, 1.0);
    assert_eq!(line.uom_id, catalog.piece);
    assert_close(line.unit_cost, 1.2);
    assert_close(line.total_cost, 1.2);
}

#[tokio::test]
async fn test_add_ingredient_unknown_product() {
    let db = setup_test_db().await.unwrap();
    let recipe_id = create_recipe(&db, "Mystery", Category::Other).await;

    let err = IngredientService::new(db.clone())
        .add_ingredient(
            recipe_id,
            IngredientCreateRequest {
                product_id: 404,
                quantity: Some(1.0),
                uom_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let recipe = RecipeService::new(db).get_recipe(recipe_id).await.unwrap();
    assert_eq!(recipe.total_cost, 0.0);
}

#[tokio::test]
async fn test_product_change_resets_unit_unless_overridden() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let recipe_id = create_recipe(&db, "Poke Bowl", Category::Other).await;
    let line_id = add_line(&db, recipe_id, catalog.salmon, 0.5).await;
    let ingredients = IngredientService::new(db.clone());

    // explicit unit edit survives recomputation
    let line = ingredients
        .update_ingredient(
            line_id,
            IngredientUpdateRequest {
                uom_id: Some(catalog.piece),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(line.uom_id, catalog.piece);
    RecipeService::new(db.clone())
        .refresh_unit_costs(recipe_id)
        .await
        .unwrap();
    let line = ingredients.get_ingredient(line_id).await.unwrap();
    assert_eq!(line.uom_id, catalog.piece);

    // reassigning the product picks up its default unit and price
    let line = ingredients
        .update_ingredient(
            line_id,
            IngredientUpdateRequest {
                product_id: Some(catalog.avocado),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(line.product_id, catalog.avocado);
    assert_eq!(line.uom_id, catalog.piece);
    assert_close(line.unit_cost, 1.2);
    assert_close(line.total_cost, 0.6);

    // an explicit unit in the same request wins over the product default
    let line = ingredients
        .update_ingredient(
            line_id,
            IngredientUpdateRequest {
                product_id: Some(catalog.tuna),
                uom_id: Some(catalog.piece),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(line.uom_id, catalog.piece);
    assert_close(line.unit_cost, 28.0);

    let line = ingredients
        .update_ingredient(
            line_id,
            IngredientUpdateRequest {
                product_id: Some(catalog.salmon),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(line.uom_id, catalog.kg);

    let recipe = RecipeService::new(db).get_recipe(recipe_id).await.unwrap();
    assert_close(recipe.total_cost, 10.0);
}

#[tokio::test]
async fn test_price_change_propagates_to_every_recipe() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let nigiri = create_recipe(&db, "Salmon Nigiri", Category::Sushi).await;
    let sashimi = create_recipe(&db, "Salmon Sashimi", Category::Sashimi).await;
    let tuna_only = create_recipe(&db, "Tuna Sashimi", Category::Sashimi).await;
    add_line(&db, nigiri, catalog.salmon, 0.2).await;
    add_line(&db, sashimi, catalog.salmon, 0.3).await;
    add_line(&db, tuna_only, catalog.tuna, 0.1).await;

    let update = ProductService::new(db.clone())
        .update_standard_price(catalog.salmon, 25.0)
        .await
        .unwrap();
    assert_eq!(update.updated_lines, 2);
    assert_eq!(update.recomputed_recipes, vec![nigiri, sashimi]);
    assert_close(update.product.standard_price, 25.0);

    let recipes = RecipeService::new(db);
    let nigiri = recipes.get_recipe(nigiri).await.unwrap();
    assert_close(nigiri.total_cost, 5.0);
    assert_close(nigiri.cost_per_serving, 2.5);
    let sashimi = recipes.get_recipe(sashimi).await.unwrap();
    assert_close(sashimi.total_cost, 7.5);
    let tuna_only = recipes.get_recipe(tuna_only).await.unwrap();
    assert_close(tuna_only.total_cost, 2.8);
}

#[tokio::test]
async fn test_refresh_picks_up_external_price_change() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let recipe_id = create_recipe(&db, "Salmon Nigiri", Category::Sushi).await;
    add_line(&db, recipe_id, catalog.salmon, 0.2).await;

    let product = products::Entity::find_by_id(catalog.salmon)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: products::ActiveModel = product.into();
    active.standard_price = Set(30.0);
    active.update(&db).await.unwrap();

    let recipes = RecipeService::new(db);
    let stale = recipes.recompute_costs(recipe_id).await.unwrap();
    assert_close(stale.total_cost, 4.0);

    let fresh = recipes.refresh_unit_costs(recipe_id).await.unwrap();
    assert_close(fresh.total_cost, 6.0);
    assert_close(fresh.cost_per_serving, 3.0);
}

#[tokio::test]
async fn test_price_must_be_finite() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let err = ProductService::new(db)
        .update_standard_price(catalog.salmon, f64::NAN)
        .await
        .unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn test_list_archive_and_restore() {
    let db = setup_test_db().await.unwrap();
    let roll = create_recipe(&db, "California Roll", Category::Roll).await;
    let tea = create_recipe(&db, "Green Tea", Category::Beverage).await;
    let avocado = create_recipe(&db, "Avocado Maki", Category::Roll).await;
    let recipes = RecipeService::new(db);

    let names: Vec<String> = recipes
        .list_recipes(RecipeListFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|recipe| recipe.name)
        .collect();
    assert_eq!(names, vec!["Avocado Maki", "California Roll", "Green Tea"]);

    recipes.archive_recipe(tea).await.unwrap();
    let active = recipes.list_recipes(RecipeListFilter::default()).await.unwrap();
    assert_eq!(active.len(), 2);

    let all = recipes
        .list_recipes(RecipeListFilter {
            include_inactive: true,
            category: None,
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let rolls: Vec<i32> = recipes
        .list_recipes(RecipeListFilter {
            include_inactive: false,
            category: Some(Category::Roll),
        })
        .await
        .unwrap()
        .into_iter()
        .map(|recipe| recipe.id)
        .collect();
    assert_eq!(rolls, vec![avocado, roll]);

    let restored = recipes.restore_recipe(tea).await.unwrap();
    assert!(restored.active);
}

#[tokio::test]
async fn test_duplicate_recipe_copies_lines_and_steps() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let source = create_recipe(&db, "Salmon Nigiri", Category::Sushi).await;
    add_line(&db, source, catalog.salmon, 0.2).await;
    InstructionService::new(db.clone())
        .add_instruction(source, "Shape the rice", None)
        .await
        .unwrap();

    let recipes = RecipeService::new(db.clone());
    let copy = recipes.duplicate_recipe(source, None).await.unwrap();
    assert_ne!(copy.id, source);
    assert_eq!(copy.name, "Salmon Nigiri (copy)");
    assert_eq!(copy.category, Category::Sushi);
    assert_close(copy.total_cost, 4.0);
    assert_close(copy.cost_per_serving, 2.0);

    let detail = recipes.get_recipe_detail(copy.id).await.unwrap();
    assert_eq!(detail.ingredients.len(), 1);
    assert_eq!(detail.instructions.len(), 1);

    // the copy is independent of the source
    let lines = IngredientService::new(db).list_ingredients(source).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_ne!(lines[0].id, detail.ingredients[0].id);

    let named = recipes
        .duplicate_recipe(source, Some("Salmon Nigiri Deluxe".to_string()))
        .await
        .unwrap();
    assert_eq!(named.name, "Salmon Nigiri Deluxe");
}

#[tokio::test]
async fn test_reorder_instructions() {
    let db = setup_test_db().await.unwrap();
    let recipe_id = create_recipe(&db, "Tuna Sashimi", Category::Sashimi).await;
    let other_id = create_recipe(&db, "Green Tea", Category::Beverage).await;
    let service = InstructionService::new(db);

    let trim = service.add_instruction(recipe_id, "Trim", Some(10)).await.unwrap();
    let slice = service.add_instruction(recipe_id, "Slice", Some(20)).await.unwrap();
    let plate = service.add_instruction(recipe_id, "Plate", Some(30)).await.unwrap();
    let foreign = service.add_instruction(other_id, "Steep", None).await.unwrap();

    let steps = service
        .reorder_instructions(recipe_id, &[plate.id, trim.id])
        .await
        .unwrap();
    let order: Vec<(i32, i32)> = steps.iter().map(|s| (s.id, s.sequence)).collect();
    assert_eq!(order, vec![(plate.id, 10), (trim.id, 20), (slice.id, 30)]);

    let err = service
        .reorder_instructions(recipe_id, &[foreign.id])
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");

    let unchanged = service.list_instructions(recipe_id).await.unwrap();
    assert_eq!(unchanged[0].id, plate.id);
}

#[tokio::test]
async fn test_export_cost_sheet() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let recipe_id = create_recipe(&db, "Salmon Nigiri", Category::Sushi).await;
    add_line(&db, recipe_id, catalog.salmon, 0.2).await;
    let other = create_recipe(&db, "Avocado Maki", Category::Roll).await;
    add_line(&db, other, catalog.avocado, 1.0).await;

    let export = ExportService::new(db);
    let sheet = export.build_cost_sheet(recipe_id).await.unwrap();
    assert_eq!(sheet.lines.len(), 1);
    assert_eq!(sheet.lines[0].product, "Salmon");
    assert_eq!(sheet.lines[0].unit, "kg");

    let maki = export.build_cost_sheet(other).await.unwrap();
    assert_eq!(maki.lines[0].product, "Avocado");
    assert_eq!(maki.lines[0].unit, "piece");
    assert!(export.build_cost_sheet(999).await.unwrap_err().is_not_found());

    let csv = export.export_recipe(recipe_id, "csv").await.unwrap();
    assert!(csv.contains("Salmon,0.2,kg,20.0,4.0"));
    assert!(csv.trim_end().ends_with(",TOTAL,,,,4.0"));

    let json = export.export_recipe(recipe_id, "json").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "Salmon Nigiri");

    assert!(export.export_recipe(recipe_id, "xml").await.is_err());
}

#[tokio::test]
async fn test_duplicate_of_long_name_stays_within_limit() {
    let db = setup_test_db().await.unwrap();
    let long_name = "Omakase ".repeat(25);
    let source = create_recipe(&db, &long_name, Category::Sushi).await;
    let recipes = RecipeService::new(db);

    let copy = recipes.duplicate_recipe(source, None).await.unwrap();
    assert_eq!(copy.name.chars().count(), 200);
    assert!(copy.name.ends_with(" (copy)"));

    // the generated name survives a round trip through update
    let renamed = recipes
        .update_recipe(
            copy.id,
            RecipeUpdateRequest {
                name: Some(copy.name.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, copy.name);
}

#[tokio::test]
async fn test_non_finite_quantity_is_rejected() {
    let db = setup_test_db().await.unwrap();
    let catalog = create_catalog(&db).await;
    let recipe_id = create_recipe(&db, "Tuna Sashimi", Category::Sashimi).await;
    let ingredients = IngredientService::new(db.clone());

    let err = ingredients
        .add_ingredient(
            recipe_id,
            IngredientCreateRequest {
                product_id: catalog.tuna,
                quantity: Some(f64::INFINITY),
                uom_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let line_id = add_line(&db, recipe_id, catalog.tuna, -0.1).await;
    let err = ingredients
        .update_ingredient(
            line_id,
            IngredientUpdateRequest {
                quantity: Some(f64::NAN),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let line = ingredients.get_ingredient(line_id).await.unwrap();
    assert_close(line.quantity, -0.1);
    let recipe = RecipeService::new(db).get_recipe(recipe_id).await.unwrap();
    assert_close(recipe.total_cost, -2.8);
}
