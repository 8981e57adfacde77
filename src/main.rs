// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use drive_hive::{grid_view, ComparisonSet, GridView, SearchForm, Settings};

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut settings = Settings::from_env();

    // --catalog <path> wins over DRIVEHIVE_CATALOG
    if let Some(pos) = args.iter().position(|a| a == "--catalog") {
        let path = args
            .get(pos + 1)
            .cloned()
            .context("--catalog needs a path")?;
        settings.catalog_path = Some(PathBuf::from(path));
        args.remove(pos);
        args.remove(pos);
    }

    if args.first().map(String::as_str) == Some("list") {
        drive_hive::init_tracing("warn", settings.log_file.as_deref())?;
        run_list(&settings, &args[1..])?;
    } else {
        // UI mode (default)
        run_ui_mode(&settings)?;
    }

    Ok(())
}

/// Parse `key=value` arguments into a search form
fn parse_form(args: &[String]) -> Result<SearchForm> {
    let mut form = SearchForm::default();

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("Expected key=value, got '{}'", arg))?;

        let slot = match key {
            "make" => &mut form.make,
            "model" => &mut form.model,
            "year" => &mut form.year,
            "min" => &mut form.price_min,
            "max" => &mut form.price_max,
            "location" => &mut form.location,
            other => anyhow::bail!(
                "Unknown filter '{}' (use make, model, year, min, max, location)",
                other
            ),
        };
        *slot = value.to_string();
    }

    Ok(form)
}

fn run_list(settings: &Settings, args: &[String]) -> Result<()> {
    let catalog = settings.load_catalog()?;
    let criteria = parse_form(args)?.criteria();

    println!("🚗 DriveHive - {} vehicles in catalog", catalog.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match grid_view(&catalog, Some(&criteria), &ComparisonSet::new()) {
        GridView::NoResults { title, hint, .. } => {
            println!("\n{}", title);
            println!("{}", hint);
        }
        GridView::Results { items } => {
            for item in &items {
                let was = item
                    .original_price
                    .as_deref()
                    .map(|p| format!(" (was {})", p))
                    .unwrap_or_default();
                println!("\n{} {}  [#{}]", item.vehicle.image, item.title, item.id());
                println!("   {}{}", item.price, was);
                println!("   {}", item.details);
                println!("   📍 {}", item.dealer_line);
            }
            println!("\n✓ {} matching vehicles", items.len());
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings) -> Result<()> {
    // Logging to stderr would tear the alternate screen
    let level = if settings.log_file.is_some() { "info" } else { "error" };
    drive_hive::init_tracing(level, settings.log_file.as_deref())?;

    let catalog = settings.load_catalog()?;
    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80);

    let controller = drive_hive::Controller::new(catalog, settings, drive_hive::FeedbackLog::new());
    let mut app = ui::App::new(controller, settings, width);
    ui::run_ui(&mut app)?;

    println!("\n✅ DriveHive closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or list vehicles: drive-hive list make=honda");
    std::process::exit(1);
}
