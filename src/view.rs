// 🖼️ View Reconciler - render-ready view-models
// Recomputed in full after every state change; renderers only read these.

use serde::Serialize;

use crate::catalog::{Catalog, Vehicle, VehicleId};
use crate::comparison::ComparisonSet;
use crate::filter::{self, FilterCriteria};

// ============================================================================
// GRID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    pub vehicle: Vehicle,
    pub title: String,
    pub in_comparison: bool,
    pub compare_label: &'static str,
    pub compare_icon: &'static str,
    pub price: String,
    pub original_price: Option<String>,
    /// Original price is above the asking price
    pub on_sale: bool,
    /// "25,000 miles • Automatic • FWD"
    pub details: String,
    /// "Toyota Center - Downtown"
    pub dealer_line: String,
}

impl GridItem {
    fn new(vehicle: &Vehicle, in_comparison: bool) -> Self {
        let (compare_label, compare_icon) = if in_comparison {
            ("Remove from comparison", "✓")
        } else {
            ("Add to comparison", "+")
        };

        GridItem {
            vehicle: vehicle.clone(),
            title: vehicle.title(),
            in_comparison,
            compare_label,
            compare_icon,
            price: format_price(vehicle.price),
            original_price: vehicle.original_price.map(format_price),
            on_sale: vehicle.has_discount(),
            details: format!(
                "{} • {} • {}",
                format_mileage(vehicle.mileage),
                vehicle.transmission,
                vehicle.drivetrain
            ),
            dealer_line: format!("{} - {}", vehicle.dealer, vehicle.location),
        }
    }

    pub fn id(&self) -> VehicleId {
        self.vehicle.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum GridView {
    Results { items: Vec<GridItem> },
    /// Explicit empty state, with a "clear filters" action
    NoResults {
        title: &'static str,
        hint: &'static str,
        action: &'static str,
    },
}

impl GridView {
    fn from_items(items: Vec<GridItem>) -> Self {
        if items.is_empty() {
            GridView::NoResults {
                title: "No vehicles found",
                hint: "Try adjusting your search criteria",
                action: "Clear Filters",
            }
        } else {
            GridView::Results { items }
        }
    }

    pub fn items(&self) -> &[GridItem] {
        match self {
            GridView::Results { items } => items,
            GridView::NoResults { .. } => &[],
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, GridView::NoResults { .. })
    }
}

// ============================================================================
// COMPARISON PANEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareCard {
    pub id: VehicleId,
    pub title: String,
    pub image: String,
    pub price: String,
    pub mileage: String,
    pub transmission: String,
    pub drivetrain: String,
}

impl CompareCard {
    fn new(vehicle: &Vehicle) -> Self {
        CompareCard {
            id: vehicle.id,
            title: vehicle.title(),
            image: vehicle.image.clone(),
            price: format_price(vehicle.price),
            mileage: format_mileage(vehicle.mileage),
            transmission: vehicle.transmission.clone(),
            drivetrain: vehicle.drivetrain.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CompareView {
    Placeholder {
        message: &'static str,
        action: &'static str,
    },
    Comparing {
        header: String,
        cards: Vec<CompareCard>,
    },
}

impl CompareView {
    pub fn cards(&self) -> &[CompareCard] {
        match self {
            CompareView::Comparing { cards, .. } => cards,
            CompareView::Placeholder { .. } => &[],
        }
    }
}

// ============================================================================
// MODEL SELECTOR
// ============================================================================

/// Options for the dependent model selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "models", rename_all = "camelCase")]
pub enum ModelOptions {
    /// No make chosen: selector disabled, model is a wildcard
    Disabled,
    Enabled(Vec<String>),
}

impl ModelOptions {
    pub fn for_make(catalog: &Catalog, make: &str) -> Self {
        if make.is_empty() {
            ModelOptions::Disabled
        } else {
            ModelOptions::Enabled(catalog.models_for_make(make))
        }
    }

    pub fn models(&self) -> &[String] {
        match self {
            ModelOptions::Enabled(models) => models,
            ModelOptions::Disabled => &[],
        }
    }
}

// ============================================================================
// RECONCILIATION
// ============================================================================

/// Grid for the active criteria. `None` means no filter has been applied.
pub fn grid_view(
    catalog: &Catalog,
    criteria: Option<&FilterCriteria>,
    comparison: &ComparisonSet,
) -> GridView {
    let visible: Vec<&Vehicle> = match criteria {
        Some(criteria) => filter::filter(catalog.vehicles(), criteria),
        None => catalog.vehicles().iter().collect(),
    };

    let items = visible
        .into_iter()
        .map(|vehicle| GridItem::new(vehicle, comparison.contains(vehicle.id)))
        .collect();

    GridView::from_items(items)
}

pub fn compare_view(catalog: &Catalog, comparison: &ComparisonSet) -> CompareView {
    let cards: Vec<CompareCard> = comparison
        .vehicles(catalog)
        .into_iter()
        .map(CompareCard::new)
        .collect();

    if cards.is_empty() {
        return CompareView::Placeholder {
            message: "Select vehicles from our listings to compare side-by-side",
            action: "Browse Cars",
        };
    }

    CompareView::Comparing {
        header: compare_header(cards.len()),
        cards,
    }
}

fn compare_header(count: usize) -> String {
    let noun = if count == 1 { "Vehicle" } else { "Vehicles" };
    format!("Comparing {} {}", count, noun)
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub grid: GridView,
    pub compare: CompareView,
    pub models: ModelOptions,
    pub result_count: usize,
    pub searching: bool,
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Thousands separators: 1234567 -> "1,234,567"
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_price(price: u64) -> String {
    format!("${}", format_thousands(price))
}

pub fn format_mileage(mileage: u64) -> String {
    format!("{} miles", format_thousands(mileage))
}
