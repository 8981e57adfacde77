// 🚗 Catalog Store - the vehicles available for one browsing session
// Loaded once at startup, read-only afterwards

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::filter;

/// Stable identity key of a vehicle (always positive)
pub type VehicleId = u32;

// ============================================================================
// VEHICLE
// ============================================================================

/// A single listing. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub make: String,
    pub model: String,
    pub year: i32,

    /// Asking price in whole currency units
    pub price: u64,

    /// Pre-discount price, present only when a discount applies.
    /// Informational: never checked against `price`.
    #[serde(default)]
    pub original_price: Option<u64>,

    pub mileage: u64,
    pub transmission: String,
    pub drivetrain: String,
    pub dealer: String,
    pub location: String,

    /// Display glyph
    #[serde(default = "default_image")]
    pub image: String,
}

fn default_image() -> String {
    "🚗".to_string()
}

impl Vehicle {
    /// "<year> <make> <model>", the wording used everywhere a vehicle is named
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    pub fn has_discount(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Ids start at 1
    #[error("vehicle '{title}' has id 0; ids must be positive")]
    ZeroId { title: String },

    #[error("duplicate vehicle id {0}")]
    DuplicateId(VehicleId),
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    vehicles: Vec<Vehicle>,
}

impl Catalog {
    /// Build a catalog, rejecting zero or duplicate ids
    pub fn new(vehicles: Vec<Vehicle>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(vehicles.len());

        for vehicle in &vehicles {
            if vehicle.id == 0 {
                return Err(CatalogError::ZeroId {
                    title: vehicle.title(),
                });
            }
            if !seen.insert(vehicle.id) {
                return Err(CatalogError::DuplicateId(vehicle.id));
            }
        }

        Ok(Catalog { vehicles })
    }

    /// The five listings shipped with the application
    pub fn seeded() -> Self {
        Catalog {
            vehicles: seed_vehicles(),
        }
    }

    /// Load from a `.csv` or `.json` file, chosen by extension
    pub fn load(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::load_csv(path),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::load_json(path),
            _ => anyhow::bail!("Unsupported catalog format: {:?} (expected .csv or .json)", path),
        }
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open catalog CSV: {:?}", path))?;

        let mut vehicles = Vec::new();
        for result in rdr.deserialize() {
            let vehicle: Vehicle = result.context("Failed to deserialize vehicle")?;
            vehicles.push(vehicle);
        }

        let catalog = Catalog::new(vehicles)?;
        tracing::info!(path = ?path, vehicles = catalog.len(), "catalog loaded from CSV");
        Ok(catalog)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;

        let vehicles: Vec<Vehicle> =
            serde_json::from_str(&content).context("Failed to parse catalog JSON")?;

        let catalog = Catalog::new(vehicles)?;
        tracing::info!(path = ?path, vehicles = catalog.len(), "catalog loaded from JSON");
        Ok(catalog)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn find(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.find(id).is_some()
    }

    /// Distinct makes, sorted case-insensitively. The first spelling seen wins.
    pub fn makes(&self) -> Vec<String> {
        let mut makes: Vec<String> = Vec::new();
        for vehicle in &self.vehicles {
            if !makes.iter().any(|m| m.eq_ignore_ascii_case(&vehicle.make)) {
                makes.push(vehicle.make.clone());
            }
        }
        makes.sort_by_key(|m| m.to_lowercase());
        makes
    }

    /// Distinct model years, newest first
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.vehicles.iter().map(|v| v.year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }

    pub fn models_for_make(&self, make: &str) -> Vec<String> {
        filter::models_for_make(&self.vehicles, make)
    }
}

fn seed_vehicles() -> Vec<Vehicle> {
    fn listing(
        id: VehicleId,
        (make, model, year): (&str, &str, i32),
        (price, original_price): (u64, Option<u64>),
        (mileage, transmission, drivetrain): (u64, &str, &str),
        (dealer, location): (&str, &str),
        image: &str,
    ) -> Vehicle {
        Vehicle {
            id,
            make: make.to_string(),
            model: model.to_string(),
            year,
            price,
            original_price,
            mileage,
            transmission: transmission.to_string(),
            drivetrain: drivetrain.to_string(),
            dealer: dealer.to_string(),
            location: location.to_string(),
            image: image.to_string(),
        }
    }

    vec![
        listing(
            1,
            ("Toyota", "Camry", 2023),
            (24999, Some(26999)),
            (25000, "Automatic", "FWD"),
            ("Toyota Center", "Downtown"),
            "🚗",
        ),
        listing(
            2,
            ("Honda", "Civic", 2022),
            (22499, None),
            (18500, "Manual", "FWD"),
            ("Honda World", "Midtown"),
            "🚗",
        ),
        listing(
            3,
            ("BMW", "3 Series", 2024),
            (39999, Some(42999)),
            (5200, "Automatic", "AWD"),
            ("BMW Elite", "Uptown"),
            "🚗",
        ),
        listing(
            4,
            ("Ford", "Mustang", 2023),
            (32999, None),
            (12000, "Manual", "RWD"),
            ("Ford Performance", "Westside"),
            "🏎️",
        ),
        listing(
            5,
            ("Mercedes", "C-Class", 2024),
            (45999, Some(48999)),
            (8500, "Automatic", "AWD"),
            ("Mercedes Luxury", "Downtown"),
            "🚗",
        ),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_seeded_catalog() {
        let catalog = Catalog::seeded();

        assert_eq!(catalog.len(), 5);
        let ids: Vec<VehicleId> = catalog.vehicles().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let mustang = catalog.find(4).unwrap();
        assert_eq!(mustang.title(), "2023 Ford Mustang");
        assert_eq!(mustang.image, "🏎️");
        assert!(!mustang.has_discount());

        assert!(catalog.find(1).unwrap().has_discount());
        assert!(catalog.find(99).is_none());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut vehicles = Catalog::seeded().vehicles().to_vec();
        vehicles[4].id = 2;

        let result = Catalog::new(vehicles);
        assert_eq!(result.unwrap_err(), CatalogError::DuplicateId(2));
    }

    #[test]
    fn test_rejects_zero_id() {
        let mut vehicles = Catalog::seeded().vehicles().to_vec();
        vehicles[0].id = 0;

        let err = Catalog::new(vehicles).unwrap_err();
        assert!(err.to_string().contains("2023 Toyota Camry"));
    }

    #[test]
    fn test_discount_is_informational() {
        let mut vehicle = Catalog::seeded().find(2).unwrap().clone();
        vehicle.original_price = Some(1000);

        // Lower "original" price is accepted as-is, just not a discount
        assert!(!vehicle.has_discount());
        assert!(Catalog::new(vec![vehicle]).is_ok());
    }

    #[test]
    fn test_makes_and_years() {
        let catalog = Catalog::seeded();

        assert_eq!(
            catalog.makes(),
            vec!["BMW", "Ford", "Honda", "Mercedes", "Toyota"]
        );
        assert_eq!(catalog.years(), vec![2024, 2023, 2022]);
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "id,make,model,year,price,originalPrice,mileage,transmission,drivetrain,dealer,location,image"
        )
        .unwrap();
        writeln!(file, "7,Subaru,Outback,2021,27500,,30100,Automatic,AWD,Peak Motors,Northside,🚙").unwrap();
        writeln!(file, "8,Subaru,Crosstrek,2022,24900,25900,14000,Manual,AWD,Peak Motors,Northside,🚙").unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);

        let outback = catalog.find(7).unwrap();
        assert_eq!(outback.original_price, None);
        assert_eq!(outback.mileage, 30100);

        let crosstrek = catalog.find(8).unwrap();
        assert_eq!(crosstrek.original_price, Some(25900));
        assert_eq!(catalog.models_for_make("subaru"), vec!["Crosstrek", "Outback"]);
    }

    #[test]
    fn test_load_json_round_trips_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::to_string(Catalog::seeded().vehicles()).unwrap();
        fs::write(&path, json).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.vehicles(), Catalog::seeded().vehicles());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let result = Catalog::load(Path::new("listings.xml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unsupported catalog format"));
    }

    #[test]
    fn test_load_json_with_duplicate_ids_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dupes.json");
        let mut vehicles = Catalog::seeded().vehicles().to_vec();
        vehicles[1].id = 1;
        fs::write(&path, serde_json::to_string(&vehicles).unwrap()).unwrap();

        let err = Catalog::load_json(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate vehicle id 1"));
    }
}
