// 🔎 Filter Engine - criteria in, matching subset out
// Pure functions over the catalog. Catalog order is always preserved.

use serde::{Deserialize, Serialize};

use crate::catalog::Vehicle;

// ============================================================================
// FILTER CRITERIA
// ============================================================================

/// Active constraints. Absent or empty fields never exclude a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Case-insensitive exact match
    pub make: Option<String>,

    /// Case-insensitive exact match
    pub model: Option<String>,

    /// Exact match against the year's decimal text
    pub year: Option<String>,

    /// May be negative: typed input is taken at face value
    pub price_min: i64,

    /// `None` = unbounded. A negative maximum excludes everything.
    pub price_max: Option<i64>,

    /// Case-insensitive substring match
    pub location: Option<String>,
}

impl FilterCriteria {
    /// Check whether a single vehicle satisfies every constraint
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        let matches_make = active(&self.make)
            .map_or(true, |make| vehicle.make.to_lowercase() == make.to_lowercase());

        let matches_model = active(&self.model)
            .map_or(true, |model| vehicle.model.to_lowercase() == model.to_lowercase());

        let matches_year = active(&self.year).map_or(true, |year| vehicle.year.to_string() == year);

        let price = i128::from(vehicle.price);
        let matches_price = price >= i128::from(self.price_min)
            && self.price_max.map_or(true, |max| price <= i128::from(max));

        let matches_location = active(&self.location).map_or(true, |location| {
            vehicle
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
        });

        matches_make && matches_model && matches_year && matches_price && matches_location
    }

    /// True when every field is wildcard/default
    pub fn is_empty(&self) -> bool {
        active(&self.make).is_none()
            && active(&self.model).is_none()
            && active(&self.year).is_none()
            && self.price_min == 0
            && self.price_max.is_none()
            && active(&self.location).is_none()
    }
}

/// Empty strings behave exactly like absent ones
fn active(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

// ============================================================================
// FILTER
// ============================================================================

/// Subsequence of `catalog` matching `criteria`, in catalog order.
///
/// No validation is done on the price range: `price_min > price_max`
/// simply yields nothing.
pub fn filter<'a>(catalog: &'a [Vehicle], criteria: &FilterCriteria) -> Vec<&'a Vehicle> {
    catalog.iter().filter(|v| criteria.matches(v)).collect()
}

/// Distinct models offered under `make` (case-insensitive), sorted.
/// An empty make offers nothing.
pub fn models_for_make(catalog: &[Vehicle], make: &str) -> Vec<String> {
    if make.is_empty() {
        return Vec::new();
    }

    let make_lower = make.to_lowercase();
    let mut models: Vec<String> = catalog
        .iter()
        .filter(|v| v.make.to_lowercase() == make_lower)
        .map(|v| v.model.clone())
        .collect();

    models.sort();
    models.dedup();
    models
}

// ============================================================================
// SEARCH FORM
// ============================================================================

/// Raw state of the search controls, exactly as typed or selected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchForm {
    pub make: String,
    pub model: String,
    pub year: String,
    pub price_min: String,
    pub price_max: String,
    pub location: String,
}

impl SearchForm {
    /// Derive criteria from the raw fields.
    ///
    /// Malformed prices are soft errors: a missing minimum is 0, and a
    /// missing (or zero) maximum is unbounded. Negative values are kept.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            make: non_empty(&self.make),
            model: non_empty(&self.model),
            year: non_empty(&self.year),
            price_min: parse_price(&self.price_min).unwrap_or(0),
            price_max: parse_price(&self.price_max).filter(|&max| max != 0),
            location: non_empty(&self.location),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Signed integer-prefix parse: skips leading whitespace, accepts one
/// optional sign, then reads the leading digits ("25k" -> 25, "-5" -> -5).
/// Anything without digits after the sign is `None`.
pub fn parse_price(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];

    if digits.is_empty() {
        return None;
    }

    // Saturate rather than fail on absurdly long input
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, VehicleId};

    fn ids(vehicles: &[&Vehicle]) -> Vec<VehicleId> {
        vehicles.iter().map(|v| v.id).collect()
    }

    #[test]
    fn test_make_is_case_insensitive() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            make: Some("honda".to_string()),
            ..Default::default()
        };

        let result = filter(catalog.vehicles(), &criteria);
        assert_eq!(ids(&result), vec![2]);
        assert_eq!(result[0].model, "Civic");
    }

    #[test]
    fn test_price_range_preserves_catalog_order() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            price_min: 30000,
            price_max: Some(40000),
            ..Default::default()
        };

        let result = filter(catalog.vehicles(), &criteria);
        assert_eq!(ids(&result), vec![3, 4]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            price_min: 24999,
            price_max: Some(32999),
            ..Default::default()
        };

        assert_eq!(ids(&filter(catalog.vehicles(), &criteria)), vec![1, 4]);
    }

    #[test]
    fn test_inverted_price_range_is_empty() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            price_min: 40000,
            price_max: Some(30000),
            ..Default::default()
        };

        assert!(filter(catalog.vehicles(), &criteria).is_empty());
    }

    #[test]
    fn test_unknown_make_matches_nothing() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            make: Some("Tesla".to_string()),
            ..Default::default()
        };

        assert!(filter(catalog.vehicles(), &criteria).is_empty());
    }

    #[test]
    fn test_year_matches_as_text() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            year: Some("2024".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(catalog.vehicles(), &criteria)), vec![3, 5]);

        let padded = FilterCriteria {
            year: Some(" 2024".to_string()),
            ..Default::default()
        };
        assert!(filter(catalog.vehicles(), &padded).is_empty());
    }

    #[test]
    fn test_location_is_substring() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            location: Some("TOWN".to_string()),
            ..Default::default()
        };

        // Downtown, Midtown, Uptown, Downtown
        assert_eq!(ids(&filter(catalog.vehicles(), &criteria)), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_model_requires_exact_match() {
        let catalog = Catalog::seeded();
        let exact = FilterCriteria {
            model: Some("c-class".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(catalog.vehicles(), &exact)), vec![5]);

        let partial = FilterCriteria {
            model: Some("class".to_string()),
            ..Default::default()
        };
        assert!(filter(catalog.vehicles(), &partial).is_empty());
    }

    #[test]
    fn test_empty_criteria_returns_whole_catalog() {
        let catalog = Catalog::seeded();

        let criteria = FilterCriteria::default();
        assert!(criteria.is_empty());
        assert_eq!(filter(catalog.vehicles(), &criteria).len(), catalog.len());

        // Empty strings are wildcards too
        let blanks = FilterCriteria {
            make: Some(String::new()),
            model: Some(String::new()),
            year: Some(String::new()),
            location: Some(String::new()),
            ..Default::default()
        };
        assert!(blanks.is_empty());
        assert_eq!(filter(catalog.vehicles(), &blanks).len(), catalog.len());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            location: Some("down".to_string()),
            price_max: Some(46000),
            ..Default::default()
        };

        let once: Vec<Vehicle> = filter(catalog.vehicles(), &criteria)
            .into_iter()
            .cloned()
            .collect();
        let twice = filter(&once, &criteria);

        assert_eq!(ids(&twice), once.iter().map(|v| v.id).collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_result_is_subsequence() {
        let catalog = Catalog::seeded();
        let criteria = FilterCriteria {
            price_min: 23000,
            ..Default::default()
        };

        let result = ids(&filter(catalog.vehicles(), &criteria));
        let positions: Vec<usize> = result
            .iter()
            .map(|id| catalog.vehicles().iter().position(|v| v.id == *id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_models_for_make() {
        let catalog = Catalog::seeded();

        assert_eq!(models_for_make(catalog.vehicles(), "Toyota"), vec!["Camry"]);
        assert_eq!(models_for_make(catalog.vehicles(), "toyota"), vec!["Camry"]);
        assert!(models_for_make(catalog.vehicles(), "").is_empty());
        assert!(models_for_make(catalog.vehicles(), "Tesla").is_empty());
    }

    #[test]
    fn test_models_for_make_sorted_and_deduplicated() {
        let mut vehicles = Catalog::seeded().vehicles().to_vec();
        let mut corolla = vehicles[0].clone();
        corolla.id = 10;
        corolla.model = "Corolla".to_string();
        let mut camry = vehicles[0].clone();
        camry.id = 11;
        camry.make = "TOYOTA".to_string();
        vehicles.push(corolla);
        vehicles.push(camry);

        assert_eq!(models_for_make(&vehicles, "Toyota"), vec!["Camry", "Corolla"]);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("30000"), Some(30000));
        assert_eq!(parse_price("  42"), Some(42));
        assert_eq!(parse_price("25k"), Some(25));
        assert_eq!(parse_price("+7"), Some(7));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("-5"), Some(-5));
        assert_eq!(parse_price(" -12 dollars"), Some(-12));
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price("--5"), None);
        assert_eq!(parse_price("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_price("-99999999999999999999999"), Some(-i64::MAX));
    }

    #[test]
    fn test_form_criteria_soft_validation() {
        let form = SearchForm {
            make: "ford".to_string(),
            price_min: "cheap".to_string(),
            price_max: "lots".to_string(),
            ..Default::default()
        };

        let criteria = form.criteria();
        assert_eq!(criteria.make.as_deref(), Some("ford"));
        assert_eq!(criteria.model, None);
        assert_eq!(criteria.price_min, 0);
        assert_eq!(criteria.price_max, None);
    }

    #[test]
    fn test_form_zero_max_is_unbounded() {
        let form = SearchForm {
            price_max: "0".to_string(),
            ..Default::default()
        };

        assert_eq!(form.criteria().price_max, None);
        assert!(form.criteria().is_empty());

        let negative_zero = SearchForm {
            price_max: "-0".to_string(),
            ..Default::default()
        };
        assert_eq!(negative_zero.criteria().price_max, None);
    }

    #[test]
    fn test_form_negative_max_matches_nothing() {
        let catalog = Catalog::seeded();
        let form = SearchForm {
            price_max: "-5".to_string(),
            ..Default::default()
        };

        let criteria = form.criteria();
        assert_eq!(criteria.price_min, 0);
        assert_eq!(criteria.price_max, Some(-5));
        assert!(filter(catalog.vehicles(), &criteria).is_empty());
    }

    #[test]
    fn test_form_negative_min_is_kept() {
        let catalog = Catalog::seeded();
        let form = SearchForm {
            price_min: "-100".to_string(),
            price_max: "30000".to_string(),
            ..Default::default()
        };

        let criteria = form.criteria();
        assert_eq!(criteria.price_min, -100);
        assert_eq!(ids(&filter(catalog.vehicles(), &criteria)), vec![1, 2]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use proptest::test_runner::Config;

        const MAKES: [&str; 4] = ["Toyota", "Honda", "BMW", "Ford"];
        const MODELS: [&str; 5] = ["Camry", "Civic", "3 Series", "Mustang", "Corolla"];
        const LOCATIONS: [&str; 4] = ["Downtown", "Midtown", "Uptown", "Airport"];
        const LOCATION_QUERIES: [&str; 5] = ["town", "DOWN", "mid", "air", "harbor"];

        fn listing(
            id: VehicleId,
            (make, model, year, price, location): (usize, usize, i32, u64, usize),
        ) -> Vehicle {
            Vehicle {
                id,
                make: MAKES[make].to_string(),
                model: MODELS[model].to_string(),
                year,
                price,
                original_price: None,
                mileage: 1000,
                transmission: "Automatic".to_string(),
                drivetrain: "FWD".to_string(),
                dealer: format!("{} Dealer", MAKES[make]),
                location: LOCATIONS[location].to_string(),
                image: "🚗".to_string(),
            }
        }

        /// Catalogs with unique ids 1..=n in generation order
        fn arb_catalog() -> impl Strategy<Value = Vec<Vehicle>> {
            prop::collection::vec(
                (
                    0..MAKES.len(),
                    0..MODELS.len(),
                    2018..2025_i32,
                    0_u64..60_000,
                    0..LOCATIONS.len(),
                ),
                0..24,
            )
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, row)| listing(i as VehicleId + 1, row))
                    .collect()
            })
        }

        /// A pool word in mixed case
        fn arb_word(pool: &[&'static str]) -> impl Strategy<Value = String> {
            (prop::sample::select(pool.to_vec()), 0..3_u8).prop_map(|(word, case)| match case {
                0 => word.to_string(),
                1 => word.to_lowercase(),
                _ => word.to_uppercase(),
            })
        }

        fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
            (
                prop::option::of(arb_word(&MAKES)),
                prop::option::of(arb_word(&MODELS)),
                prop::option::of((2017..2026_i32).prop_map(|y| y.to_string())),
                -1000_i64..70_000,
                prop::option::of(-1000_i64..70_000),
                prop::option::of(arb_word(&LOCATION_QUERIES)),
            )
                .prop_map(|(make, model, year, price_min, price_max, location)| {
                    FilterCriteria {
                        make,
                        model,
                        year,
                        price_min,
                        price_max,
                        location,
                    }
                })
        }

        proptest! {
            #![proptest_config(Config::with_cases(128))]

            #[test]
            fn filter_is_ordered_subsequence(catalog in arb_catalog(), criteria in arb_criteria()) {
                let result = filter(&catalog, &criteria);

                let positions: Vec<usize> = result
                    .iter()
                    .map(|v| catalog.iter().position(|c| c.id == v.id).unwrap())
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(result.iter().all(|v| criteria.matches(v)));
                prop_assert_eq!(
                    result.len(),
                    catalog.iter().filter(|v| criteria.matches(v)).count()
                );
            }

            #[test]
            fn filter_twice_changes_nothing(catalog in arb_catalog(), criteria in arb_criteria()) {
                let once: Vec<Vehicle> = filter(&catalog, &criteria).into_iter().cloned().collect();
                let twice = filter(&once, &criteria);

                prop_assert_eq!(ids(&twice), once.iter().map(|v| v.id).collect::<Vec<_>>());
            }

            #[test]
            fn empty_criteria_keeps_everything(catalog in arb_catalog()) {
                let result = filter(&catalog, &FilterCriteria::default());
                prop_assert_eq!(ids(&result), catalog.iter().map(|v| v.id).collect::<Vec<_>>());
            }

            #[test]
            fn models_are_sorted_unique_and_scoped(
                catalog in arb_catalog(),
                make in arb_word(&MAKES),
            ) {
                let models = models_for_make(&catalog, &make);

                prop_assert!(models.windows(2).all(|w| w[0] < w[1]));

                let offered: Vec<&Vehicle> = catalog
                    .iter()
                    .filter(|v| v.make.eq_ignore_ascii_case(&make))
                    .collect();
                prop_assert!(models.iter().all(|m| offered.iter().any(|v| &v.model == m)));
                prop_assert!(offered.iter().all(|v| models.contains(&v.model)));
            }
        }
    }
}
