use canteen_catalog_rs::catalog_operations::Catalog;
use canteen_catalog_rs::constants::CATALOG_JSON;
use canteen_catalog_rs::data_types::drafts::{CanteenDraft, FoodItemDraft, StoreDraft};
use canteen_catalog_rs::data_types::time_range::TimeRange;
use canteen_catalog_rs::data_types::vocabulary::{Day, Frequency, LabelSet};
use canteen_catalog_rs::data_types::{Canteen, Category, EntityId};
use canteen_catalog_rs::db_operations::SqliteStore;
use canteen_catalog_rs::errors::CatalogError;
use canteen_catalog_rs::export::export_json;
use canteen_catalog_rs::session::{CatalogPersistence, Session};
use canteen_catalog_rs::shared_main::{logger_init, open_persistence};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Data entry for canteens, their stores and the stores' menus.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Catalog file in the embedded JSON format
    #[arg(short, long, env = "CATALOG_FILE", default_value = CATALOG_JSON)]
    file: PathBuf,
    /// SQLite database with separate canteen and store collections.{n}Takes precedence over --file
    #[arg(long, env = "CATALOG_DB")]
    db: Option<PathBuf>,
    /// enable verbose logging{n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every canteen with its stores and menus
    List,
    /// Add a canteen
    AddCanteen {
        name: String,
        /// Busy period, repeatable
        #[arg(long = "busy", value_name = "HH:MM-HH:MM")]
        busy: Vec<TimeRange>,
        #[arg(long)]
        air_conditioning: bool,
    },
    /// Change a canteen's name, busy periods or air conditioning
    EditCanteen {
        /// Canteen id or name
        canteen: String,
        #[arg(long)]
        name: Option<String>,
        /// Replaces all busy periods, repeatable
        #[arg(long = "busy", value_name = "HH:MM-HH:MM")]
        busy: Vec<TimeRange>,
        /// Remove all busy periods
        #[arg(long, conflicts_with = "busy")]
        clear_busy: bool,
        #[arg(long)]
        air_conditioning: Option<bool>,
    },
    /// Delete a canteen and its stores
    DeleteCanteen {
        /// Canteen id or name
        canteen: String,
    },
    /// Add a store to a canteen
    AddStore {
        /// Canteen id or name
        canteen: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        hours: HoursArgs,
    },
    /// Change a store's name, description or opening hours
    EditStore {
        /// Store id
        store: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        hours: HoursArgs,
    },
    /// Delete a store and its menu
    DeleteStore {
        /// Store id
        store: String,
    },
    /// Append a food item to a store's menu
    AddFood {
        /// Store id
        store: String,
        #[command(flatten)]
        food: FoodArgs,
    },
    /// Replace the food item at a menu position
    EditFood {
        /// Store id
        store: String,
        /// Menu position, starting at 1
        position: usize,
        #[command(flatten)]
        food: FoodArgs,
    },
    /// Remove the food item at a menu position
    DeleteFood {
        /// Store id
        store: String,
        /// Menu position, starting at 1
        position: usize,
    },
    /// Print the catalog as JSON without internal ids
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy the whole catalog into a SQLite database
    Migrate {
        #[arg(long)]
        to: PathBuf,
    },
    /// Delete stores whose canteen no longer exists
    PurgeOrphans,
}

#[derive(clap::Args, Debug)]
struct HoursArgs {
    /// everyday, every_other_day, specific_days or date_range (Thai labels work too)
    #[arg(long, value_parser = parse_frequency)]
    frequency: Option<Frequency>,
    /// Hours for everyday / every_other_day, rejected for the other frequencies
    #[arg(long, value_name = "HH:MM-HH:MM")]
    hours: Option<TimeRange>,
    /// Hours of one day for specific_days / date_range, repeatable.{n}Rejected for the other frequencies
    #[arg(long = "day", value_name = "DAY=HH:MM-HH:MM", value_parser = parse_day_hours)]
    days: Vec<(Day, TimeRange)>,
    /// First day of a date range (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day of a date range (YYYY-MM-DD)
    #[arg(long)]
    until: Option<NaiveDate>,
}

impl HoursArgs {
    fn apply_to(self, mut draft: StoreDraft) -> Result<StoreDraft> {
        if let Some(frequency) = self.frequency {
            draft.frequency = frequency;
        }
        let single_range = matches!(
            draft.frequency,
            Frequency::Everyday | Frequency::EveryOtherDay
        );
        if self.hours.is_some() && !single_range {
            bail!(
                "--hours only applies to everyday and every_other_day, use --day for {}",
                draft.frequency
            );
        }
        if !self.days.is_empty() && single_range {
            bail!(
                "--day only applies to specific_days and date_range, use --hours for {}",
                draft.frequency
            );
        }
        if (self.from.is_some() || self.until.is_some()) && draft.frequency != Frequency::DateRange {
            bail!("--from and --until only apply to date_range");
        }

        if let Some(hours) = self.hours {
            draft.everyday_hours = (hours.start(), hours.end());
        }
        if !self.days.is_empty() {
            draft.day_hours.clear();
            for (day, hours) in self.days {
                draft = draft.with_day(day, hours);
            }
        }
        draft.start_date = self.from.or(draft.start_date);
        draft.end_date = self.until.or(draft.end_date);
        Ok(draft)
    }
}

#[derive(clap::Args, Debug)]
struct FoodArgs {
    name: String,
    /// Normal price
    #[arg(long)]
    price: f64,
    /// Special (large / extra) price
    #[arg(long)]
    special: Option<f64>,
    #[arg(long)]
    description: Option<String>,
    /// MAIN, SIDE, DRINK or VEGETARIAN
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
}

impl From<FoodArgs> for FoodItemDraft {
    fn from(args: FoodArgs) -> Self {
        FoodItemDraft {
            name: args.name,
            normal_price: args.price,
            special_price: args.special,
            description: args.description,
            category: args.category,
        }
    }
}

fn parse_frequency(text: &str) -> Result<Frequency, String> {
    Frequency::parse(text).ok_or_else(|| format!("unknown frequency '{text}'"))
}

fn parse_category(text: &str) -> Result<Category, String> {
    Category::parse(text).ok_or_else(|| format!("unknown category '{text}'"))
}

fn parse_day_hours(text: &str) -> Result<(Day, TimeRange), String> {
    let (day, hours) = text
        .split_once('=')
        .ok_or_else(|| format!("expected DAY=HH:MM-HH:MM, got '{text}'"))?;
    let day = Day::parse(day.trim()).ok_or_else(|| format!("unknown day '{day}'"))?;
    let hours = hours.parse::<TimeRange>().map_err(|e| e.to_string())?;
    Ok((day, hours))
}

/// Looks a canteen up by id first, then by exact name.
fn find_canteen<'a>(catalog: &'a Catalog, key: &str) -> Result<&'a Canteen, CatalogError> {
    catalog
        .canteen(&EntityId::from(key))
        .or_else(|err| catalog.canteen_by_name(key).ok_or(err))
}

fn menu_index(position: usize) -> Result<usize, CatalogError> {
    position.checked_sub(1).ok_or(CatalogError::NotFound {
        kind: "food item",
        id: position.to_string(),
    })
}

fn print_catalog(catalog: &Catalog) {
    if catalog.canteens().is_empty() {
        println!("No canteens yet.");
    }
    for canteen in catalog.canteens() {
        let busy: Vec<String> = canteen.busy_periods.iter().map(ToString::to_string).collect();
        println!("{} [{}]", canteen.name, canteen.id);
        println!("  busy: {}", if busy.is_empty() { "-".to_string() } else { busy.join(", ") });
        println!(
            "  air conditioning: {}",
            if canteen.with_air_conditioning { "yes" } else { "no" }
        );
        println!("  stores: {}", canteen.stores.len());

        for store in &canteen.stores {
            let hours = &store.opening_hours;
            println!("  - {} [{}] ({})", store.name, store.id, hours.frequency());
            if let Some((start, end)) = hours.validity_window() {
                println!("      {start} to {end}");
            }
            for (day, range) in hours.resolve() {
                println!("      {:<9} {}", day.label(LabelSet::English), range);
            }
            for (position, item) in store.food_items.iter().enumerate() {
                let mut prices = format!("{:.2} THB", item.prices.normal);
                if let Some(special) = item.prices.special {
                    prices += &format!(" (special: {special:.2} THB)");
                }
                println!("      {}. {} - {}", position + 1, item.name, prices);
            }
        }
    }

    for store in catalog.orphaned_stores() {
        println!(
            "orphaned store {} [{}], canteen {} is gone",
            store.name, store.id, store.canteen_id
        );
    }
}

fn run<P: CatalogPersistence>(session: &mut Session<P>, command: Command) -> Result<()> {
    match command {
        Command::List => print_catalog(&session.load()?),
        Command::AddCanteen {
            name,
            busy,
            air_conditioning,
        } => {
            let draft = CanteenDraft {
                name,
                busy_periods: busy,
                with_air_conditioning: air_conditioning,
            };
            let id = session.add_canteen(draft)?;
            println!("Added canteen {id}");
        }
        Command::EditCanteen {
            canteen,
            name,
            busy,
            clear_busy,
            air_conditioning,
        } => {
            let catalog = session.load()?;
            let canteen = find_canteen(&catalog, &canteen)?;
            let mut draft = CanteenDraft::for_edit(canteen);
            if let Some(name) = name {
                draft.name = name;
            }
            if clear_busy || !busy.is_empty() {
                draft.busy_periods = busy;
            }
            if let Some(air_conditioning) = air_conditioning {
                draft.with_air_conditioning = air_conditioning;
            }
            session.edit_canteen(&canteen.id, draft)?;
            println!("Saved canteen {}", canteen.id);
        }
        Command::DeleteCanteen { canteen } => {
            let id = find_canteen(&session.load()?, &canteen)?.id.clone();
            let removed = session.delete_canteen(&id)?;
            println!("Deleted canteen {} ({} stores)", removed.name, removed.stores.len());
        }
        Command::AddStore {
            canteen,
            name,
            description,
            hours,
        } => {
            let canteen_id = find_canteen(&session.load()?, &canteen)?.id.clone();
            let draft = hours.apply_to(StoreDraft {
                name,
                description,
                ..StoreDraft::default()
            })?;
            let id = session.add_store(&canteen_id, draft)?;
            println!("Added store {id}");
        }
        Command::EditStore {
            store,
            name,
            description,
            hours,
        } => {
            let id = EntityId::from(store);
            let mut draft = StoreDraft::for_edit(session.load()?.store(&id)?);
            if let Some(name) = name {
                draft.name = name;
            }
            if description.is_some() {
                draft.description = description;
            }
            session.edit_store(&id, hours.apply_to(draft)?)?;
            println!("Saved store {id}");
        }
        Command::DeleteStore { store } => {
            let removed = session.delete_store(&EntityId::from(store))?;
            println!(
                "Deleted store {} ({} food items)",
                removed.name,
                removed.food_items.len()
            );
        }
        Command::AddFood { store, food } => {
            let position = session.add_food_item(&EntityId::from(store), food.into())? + 1;
            println!("Added food item at position {position}");
        }
        Command::EditFood {
            store,
            position,
            food,
        } => {
            session.edit_food_item(&EntityId::from(store), menu_index(position)?, food.into())?;
            println!("Saved food item {position}");
        }
        Command::DeleteFood { store, position } => {
            let removed = session.delete_food_item(&EntityId::from(store), menu_index(position)?)?;
            println!("Deleted food item {}", removed.name);
        }
        Command::Export { output } => {
            let json = export_json(session.load()?.canteens())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!("Exported catalog to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Migrate { to } => {
            let mut target = SqliteStore::open(&to)?;
            let count = session.migrate_to(&mut target)?;
            println!("Migrated {count} canteens to {}", to.display());
        }
        Command::PurgeOrphans => {
            let count = session.purge_orphaned_stores()?;
            println!("Removed {count} orphaned stores");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());

    let persistence = open_persistence(&args.file, args.db.as_deref())?;
    let mut session = Session::new(persistence);
    run(&mut session, args.command)
}
