// Copyright 2023 Remi Bernotavicius

use chrono::NaiveDate;
use clap::Parser;
use clap::Subcommand;
use database::models::RecipeId;
use database::query;
use std::path::{Path, PathBuf};

mod config;
mod cost;
mod database;
mod forms;
mod label;
mod ui;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
struct Args {
    /// Configuration file. Defaults to `config.toml` in the data directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configuration.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Run,
    RegisterStore {
        login_id: String,
        store_name: String,
    },
    Stores,
    Cost {
        login_id: String,
        recipe_id: i32,
    },
    Labels {
        login_id: String,
        recipe_id: i32,
        #[arg(long, default_value_t = 8)]
        count: usize,
        /// Production date as YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, conflicts_with = "custom")]
        preset: Option<String>,
        /// w,h,cols,rows,margin_left,margin_top,gap_x,gap_y in millimetres
        #[arg(long)]
        custom: Option<String>,
        #[arg(long)]
        show_cost: bool,
        #[arg(long)]
        show_price: bool,
        /// Defaults to the suggested file name in the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Presets,
    Migrations {
        /// Revert the newest migration.
        #[arg(long)]
        revert: bool,
    },
}

/// This is where the database and other user-data lives on-disk. On Linux it should be like:
/// `~/.local/share/bakery_labels/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or("failed to get user home directory")?;
    let path = dirs.data_dir().join("bakery_labels");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn run(conn: database::Connection, config: config::Config, data_path: PathBuf) -> Result<()> {
    let native_options = eframe::NativeOptions {
        window_builder: Some(Box::new(|mut b: egui::viewport::ViewportBuilder| {
            b.maximized = Some(true);
            b
        })),
        ..Default::default()
    };
    eframe::run_native(
        "Bakery Labels",
        native_options,
        Box::new(|_cc| Ok(Box::new(ui::BakeryManager::new(conn, config, data_path)))),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

fn store_for_login(
    conn: &mut database::Connection,
    login_id: &str,
) -> Result<database::models::Store> {
    Ok(query::find_store_by_login(conn, login_id)?
        .ok_or_else(|| format!("no store with login id {login_id:?}"))?)
}

fn print_stores(conn: &mut database::Connection) -> Result<()> {
    for store in query::list_stores(conn)? {
        println!("{:<16}{}", store.login_id, store.store_name);
    }
    Ok(())
}

fn print_cost(conn: &mut database::Connection, login_id: &str, recipe_id: i32) -> Result<()> {
    let store = store_for_login(conn, login_id)?;
    let recipe = query::get_recipe(conn, store.id, RecipeId::new(recipe_id))?;
    let costs = query::store_costs(conn, store.id)?;
    println!("{}", recipe.recipe.product_name);
    println!("{}", costs.calculator().breakdown(&recipe));
    Ok(())
}

fn print_presets() {
    for preset in label::PRESETS {
        println!("{:<16}{}", preset.key, preset.name);
    }
}

struct LabelArgs {
    count: usize,
    date: Option<String>,
    grid: label::GridSource,
    show_cost: bool,
    show_price: bool,
    output: Option<PathBuf>,
}

fn write_labels(
    conn: &mut database::Connection,
    config: &config::Config,
    login_id: &str,
    recipe_id: i32,
    args: LabelArgs,
) -> Result<()> {
    let store = store_for_login(conn, login_id)?;
    let recipe = query::get_recipe(conn, store.id, RecipeId::new(recipe_id))?;
    let costs = query::store_costs(conn, store.id)?;
    let today = today();
    let production_date = args
        .date
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    let job = label::LabelJob {
        recipe: &recipe,
        calculator: costs.calculator(),
        store_name: &store.store_name,
        show_cost: args.show_cost,
        show_price: args.show_price,
        production_date: &production_date,
        label_count: args.count,
        grid: args.grid,
    };
    let font = label::LabelFont::discover(config.labels.font_path.as_deref());
    let document = label::generate(&job, &font, today)?;

    let output = args
        .output
        .unwrap_or_else(|| Path::new(".").join(&document.filename));
    std::fs::write(&output, &document.bytes)?;
    println!(
        "wrote {} ({} page(s))",
        output.display(),
        document.page_count
    );
    Ok(())
}

fn migrations(conn: &mut database::Connection, revert: bool) -> Result<()> {
    if revert {
        println!("reverted {}", database::revert_last_migration(conn)?);
    } else {
        for version in database::applied_migrations(conn)? {
            println!("{version}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let data_path = data_path()?;
    let config_path = args
        .config
        .unwrap_or_else(|| data_path.join(config::FILE_NAME));
    let config = config::Config::load(&config_path)?;

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        config.level_filter()?
    };
    simple_logger::SimpleLogger::new().with_level(level).init()?;

    if let Commands::Presets = args.commands {
        print_presets();
        return Ok(());
    }

    let mut conn = database::establish_connection(config.database_path(&data_path))?;
    match args.commands {
        Commands::Run => run(conn, config, data_path)?,
        Commands::RegisterStore {
            login_id,
            store_name,
        } => {
            let store = query::register_store(&mut conn, &login_id, &store_name)?;
            println!("registered {} ({})", store.store_name, store.login_id);
        }
        Commands::Stores => print_stores(&mut conn)?,
        Commands::Cost {
            login_id,
            recipe_id,
        } => print_cost(&mut conn, &login_id, recipe_id)?,
        Commands::Labels {
            login_id,
            recipe_id,
            count,
            date,
            preset,
            custom,
            show_cost,
            show_price,
            output,
        } => {
            let grid = match custom {
                Some(custom) => label::GridSource::Custom(label::GridConfig::parse(&custom)?),
                None => label::GridSource::Preset(
                    preset.unwrap_or_else(|| config.labels.default_preset.clone()),
                ),
            };
            let label_args = LabelArgs {
                count,
                date,
                grid,
                show_cost,
                show_price,
                output,
            };
            write_labels(&mut conn, &config, &login_id, recipe_id, label_args)?
        }
        Commands::Migrations { revert } => migrations(&mut conn, revert)?,
        Commands::Presets => {}
    }
    Ok(())
}
