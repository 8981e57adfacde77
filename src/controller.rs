// 🎛️ Controller - owns the application state and applies input events
//
// Every front end (TUI, HTTP, tests) talks to the core through this type.
// Events go in, feedback goes out to the sink, view-models come back.

use std::time::{Duration, Instant};

use crate::catalog::{Catalog, VehicleId};
use crate::comparison::{ComparisonError, ComparisonSet};
use crate::config::Settings;
use crate::feedback::{self, Announcer, NotificationLevel, Notifier};
use crate::filter::{self, FilterCriteria, SearchForm};
use crate::timing::{Debouncer, SearchGate};
use crate::view::{self, CompareView, GridView, ModelOptions, ViewModel};

/// Which price field was edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBound {
    Min,
    Max,
}

/// Session state. One instance per session, owned by the controller.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub form: SearchForm,
    /// `None` until a filter is applied, and again after clearing
    pub criteria: Option<FilterCriteria>,
    pub comparison: ComparisonSet,
    price_debounce: Debouncer<()>,
    search: SearchGate,
}

impl AppState {
    pub fn new(catalog: Catalog, price_debounce: Duration, search_latency: Duration) -> Self {
        AppState {
            catalog,
            form: SearchForm::default(),
            criteria: None,
            comparison: ComparisonSet::new(),
            price_debounce: Debouncer::new(price_debounce),
            search: SearchGate::new(search_latency),
        }
    }
}

pub struct Controller<F> {
    state: AppState,
    feedback: F,
}

impl<F: Announcer + Notifier> Controller<F> {
    /// Initial load: criteria derived from the (empty) form, like a first search
    pub fn new(catalog: Catalog, settings: &Settings, feedback: F) -> Self {
        let state = AppState::new(catalog, settings.price_debounce, settings.search_delay);
        let mut controller = Controller { state, feedback };
        controller.apply_filters();
        controller
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    pub fn form(&self) -> &SearchForm {
        &self.state.form
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    pub fn is_searching(&self) -> bool {
        self.state.search.is_busy()
    }

    // ------------------------------------------------------------------------
    // Filter events
    // ------------------------------------------------------------------------

    /// Changing the make rebuilds the model options, which resets the model
    pub fn select_make(&mut self, make: &str) {
        self.state.form.make = make.to_string();
        self.state.form.model.clear();
        self.apply_filters();
    }

    pub fn select_model(&mut self, model: &str) {
        self.state.form.model = model.to_string();
        self.apply_filters();
    }

    pub fn select_year(&mut self, year: &str) {
        self.state.form.year = year.to_string();
        self.apply_filters();
    }

    /// Price edits are debounced; the filter runs from `tick`
    pub fn edit_price(&mut self, bound: PriceBound, text: &str, now: Instant) {
        match bound {
            PriceBound::Min => self.state.form.price_min = text.to_string(),
            PriceBound::Max => self.state.form.price_max = text.to_string(),
        }
        self.state.price_debounce.call((), now);
    }

    /// Takes effect on the next recomputation
    pub fn edit_location(&mut self, text: &str) {
        self.state.form.location = text.to_string();
    }

    /// Start the simulated search. Refused while one is in flight.
    pub fn submit_search(&mut self, now: Instant) -> bool {
        let started = self.state.search.submit(now);
        if started {
            tracing::debug!("search submitted");
        } else {
            tracing::debug!("search already in flight, submission ignored");
        }
        started
    }

    pub fn clear_filters(&mut self) {
        self.state.form = SearchForm::default();
        self.state.criteria = None;
        self.state.price_debounce.cancel();
        tracing::info!("filters cleared");
        self.feedback.announce(feedback::FILTERS_CLEARED.to_string());
    }

    /// Advance timers. Returns true if the view may have changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self.state.price_debounce.poll(now).is_some() {
            self.apply_filters();
            changed = true;
        }

        if self.state.search.poll(now) {
            let count = self.apply_filters();
            tracing::info!(matches = count, "search completed");
            self.feedback.announce(feedback::search_results_message(count));
            changed = true;
        }

        changed
    }

    /// Earliest moment `tick` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.state.price_debounce.deadline(), self.state.search.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Re-read the whole form into active criteria. Returns the match count.
    fn apply_filters(&mut self) -> usize {
        let criteria = self.state.form.criteria();
        let count = filter::filter(self.state.catalog.vehicles(), &criteria).len();
        tracing::debug!(?criteria, matches = count, "filters applied");
        self.state.criteria = Some(criteria);
        count
    }

    // ------------------------------------------------------------------------
    // Comparison events
    // ------------------------------------------------------------------------

    /// Returns true when the set changed
    pub fn toggle_compare(&mut self, id: VehicleId) -> bool {
        let state = &mut self.state;

        match state.comparison.toggle(&state.catalog, id) {
            Ok(change) => {
                tracing::info!(id, action = ?change.action, size = state.comparison.len(), "comparison changed");
                self.feedback.announce(feedback::comparison_message(&change));
                true
            }
            Err(ComparisonError::CapacityExceeded { limit }) => {
                tracing::warn!(id, limit, "comparison limit reached");
                self.feedback
                    .notify(NotificationLevel::Warning, feedback::capacity_message());
                false
            }
            Err(ComparisonError::NotFound(id)) => {
                tracing::debug!(id, "toggle for unknown vehicle ignored");
                false
            }
        }
    }

    pub fn clear_compare(&mut self) {
        let removed = self.state.comparison.clear();
        tracing::info!(removed, "comparison cleared");
        self.feedback.announce(feedback::COMPARISON_CLEARED.to_string());
    }

    // ------------------------------------------------------------------------
    // Listing actions
    // ------------------------------------------------------------------------

    pub fn view_details(&mut self, id: VehicleId) {
        if let Some(vehicle) = self.state.catalog.find(id) {
            self.feedback
                .notify(NotificationLevel::Info, feedback::details_message(vehicle));
        }
    }

    pub fn contact_dealer(&mut self, id: VehicleId) {
        if let Some(vehicle) = self.state.catalog.find(id) {
            self.feedback
                .notify(NotificationLevel::Info, feedback::contact_message(vehicle));
        }
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn grid_view(&self) -> GridView {
        view::grid_view(
            &self.state.catalog,
            self.state.criteria.as_ref(),
            &self.state.comparison,
        )
    }

    pub fn compare_view(&self) -> CompareView {
        view::compare_view(&self.state.catalog, &self.state.comparison)
    }

    pub fn model_options(&self) -> ModelOptions {
        ModelOptions::for_make(&self.state.catalog, &self.state.form.make)
    }

    pub fn view(&self) -> ViewModel {
        let grid = self.grid_view();
        let result_count = grid.items().len();

        ViewModel {
            grid,
            compare: self.compare_view(),
            models: self.model_options(),
            result_count,
            searching: self.is_searching(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
