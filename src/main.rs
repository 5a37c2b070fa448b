use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use restaurant_ops::config::AppConfig;
use restaurant_ops::database::entities::Category;
use restaurant_ops::database::{
    establish_connection, get_database_url, migrate_database, seed_data, setup_database,
    MigrateDirection,
};
use restaurant_ops::services::{
    CostSheet, ExportService, ProductService, RecipeListFilter, RecipeService,
};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(short, long, global = true, default_value = "restaurant-ops.yaml")]
    config: String,
    /// Overrides the database path from the config file
    #[clap(short, long, global = true)]
    database: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Load the demo catalog and recipes
    Seed,
    Recipe {
        #[clap(subcommand)]
        command: RecipeCommands,
    },
    Product {
        #[clap(subcommand)]
        command: ProductCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init,
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
    },
}

#[derive(Subcommand, Debug)]
enum RecipeCommands {
    List {
        /// Include archived recipes
        #[clap(short, long)]
        all: bool,
        #[clap(long)]
        category: Option<Category>,
    },
    Show {
        id: i32,
    },
    Export {
        id: i32,
        #[clap(short, long, default_value = "json")]
        format: String,
        #[clap(short, long)]
        output: Option<String>,
    },
    Archive {
        id: i32,
    },
    Restore {
        id: i32,
    },
    Delete {
        id: i32,
    },
    /// Pull current product prices and recompute totals
    Recompute {
        id: i32,
    },
}

#[derive(Subcommand, Debug)]
enum ProductCommands {
    SetPrice { id: i32, price: f64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::load(&args.config)?;
    setup_logging(args.log_level.as_ref().or(config.log_level.as_ref()));

    let database = args.database.unwrap_or(config.database);
    let db = establish_connection(&get_database_url(Some(&database)))
        .await
        .with_context(|| format!("failed to open database {}", database))?;

    match args.command {
        Commands::Db { command } => match command {
            DbCommands::Init => {
                info!("Initializing database: {}", database);
                setup_database(&db).await?;
                if config.seed_demo_data {
                    seed_data::create_example_recipes(&db).await?;
                }
            }
            DbCommands::Migrate { direction } => {
                info!("Running database migration: {:?}", direction);
                migrate_database(&db, direction).await?;
            }
        },
        Commands::Seed => {
            setup_database(&db).await?;
            seed_data::create_example_recipes(&db).await?;
        }
        Commands::Recipe { command } => {
            setup_database(&db).await?;
            run_recipe_command(&db, command).await?;
        }
        Commands::Product { command } => {
            setup_database(&db).await?;
            match command {
                ProductCommands::SetPrice { id, price } => {
                    let update = ProductService::new(db.clone())
                        .update_standard_price(id, price)
                        .await?;
                    println!(
                        "{} now costs {:.2}; {} line(s) updated, recipes recomputed: {:?}",
                        update.product.name,
                        update.product.standard_price,
                        update.updated_lines,
                        update.recomputed_recipes
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_recipe_command(db: &DatabaseConnection, command: RecipeCommands) -> Result<()> {
    let recipes = RecipeService::new(db.clone());

    match command {
        RecipeCommands::List { all, category } => {
            let filter = RecipeListFilter {
                include_inactive: all,
                category,
            };
            for recipe in recipes.list_recipes(filter).await? {
                let marker = if recipe.active { "" } else { " (archived)" };
                println!(
                    "{:>4}  {:<30} {:<10} total {:>8.2}  per serving {:>8.2}{}",
                    recipe.id,
                    recipe.name,
                    recipe.category,
                    recipe.total_cost,
                    recipe.cost_per_serving,
                    marker
                );
            }
        }
        RecipeCommands::Show { id } => {
            let sheet = ExportService::new(db.clone()).build_cost_sheet(id).await?;
            print_cost_sheet(&sheet);
        }
        RecipeCommands::Export { id, format, output } => {
            let rendered = ExportService::new(db.clone())
                .export_recipe(id, &format)
                .await?;
            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path))?;
                    info!("Exported recipe {} to {}", id, path);
                }
                None => println!("{}", rendered),
            }
        }
        RecipeCommands::Archive { id } => {
            let recipe = recipes.archive_recipe(id).await?;
            println!("Archived '{}'", recipe.name);
        }
        RecipeCommands::Restore { id } => {
            let recipe = recipes.restore_recipe(id).await?;
            println!("Restored '{}'", recipe.name);
        }
        RecipeCommands::Delete { id } => {
            recipes.delete_recipe(id).await?;
            println!("Deleted recipe {}", id);
        }
        RecipeCommands::Recompute { id } => {
            let recipe = recipes.refresh_unit_costs(id).await?;
            println!(
                "'{}': total {:.2}, per serving {:.2}",
                recipe.name, recipe.total_cost, recipe.cost_per_serving
            );
        }
    }

    Ok(())
}

fn print_cost_sheet(sheet: &CostSheet) {
    println!("{} {}", sheet.name.bold(), format!("[{}]", sheet.category).dimmed());
    if !sheet.active {
        println!("{}", "archived".yellow());
    }
    println!(
        "Prep time: {} min, serves {}",
        sheet.prep_time, sheet.serving_size
    );
    if let Some(notes) = &sheet.notes {
        println!("{}", notes.italic());
    }

    println!("\n{}", "Ingredients".green().bold());
    for line in &sheet.lines {
        println!(
            "  {:<24} {:>8.3} {:<6} @ {:>8.2} = {:>8.2}",
            line.product, line.quantity, line.unit, line.unit_cost, line.total_cost
        );
    }
    println!(
        "  {:<50} {:>8.2}",
        "Total".bold(),
        sheet.total_cost
    );
    println!(
        "  {:<50} {:>8.2}",
        "Per serving".bold(),
        sheet.cost_per_serving
    );

    if !sheet.steps.is_empty() {
        println!("\n{}", "Instructions".green().bold());
        for step in &sheet.steps {
            println!("  {:>3}. {}", step.sequence, step.instruction);
        }
    }
}

fn setup_logging(log_level: Option<&String>) {
    let log_level = match log_level
        .map(|level| level.to_lowercase())
        .as_deref()
        .unwrap_or("info")
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
