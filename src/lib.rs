// DriveHive - Core Library
// Catalog browsing, filtering and comparison as plain data transformations.
// Front ends (TUI, HTTP server) are thin adapters over `Controller`.

pub mod catalog;
pub mod filter;
pub mod comparison;
pub mod view;
pub mod feedback;
pub mod timing;
pub mod controller;
pub mod config;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, Vehicle, VehicleId};
pub use filter::{filter, models_for_make, parse_price, FilterCriteria, SearchForm};
pub use comparison::{
    ComparisonAction, ComparisonChange, ComparisonError, ComparisonSet, MAX_COMPARED,
};
pub use view::{
    compare_view, grid_view, CompareCard, CompareView, GridItem, GridView, ModelOptions,
    ViewModel,
};
pub use feedback::{Announcer, FeedbackLog, Notification, NotificationLevel, Notifier};
pub use timing::{Debouncer, SearchGate};
pub use controller::{AppState, Controller, PriceBound};
pub use config::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set up `tracing` output.
///
/// `DRIVEHIVE_LOG` takes precedence over `default_level`. With a log file
/// the output goes there, otherwise to stderr.
pub fn init_tracing(default_level: &str, log_file: Option<&std::path::Path>) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(config::ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
