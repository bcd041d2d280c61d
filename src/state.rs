use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{filtered_indices, DateRange, FilterCriteria};
use crate::data::loader::DatasetCache;
use crate::data::model::{BookingDataset, BookingRecord, CategoryColumn};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is opened). Shared with the cache.
    pub dataset: Option<Arc<BookingDataset>>,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Values shown in the date pickers, kept while the date filter is off.
    pub date_inputs: Option<DateRange>,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Chart tables for the visible records.
    pub summary: DashboardSummary,

    /// Stable colours per categorical column.
    pub color_maps: BTreeMap<CategoryColumn, ColorMap>,

    /// Every dataset opened during this session.
    pub cache: DatasetCache,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` (or reuse the cached copy) and make it the active dataset.
    /// On failure the previous dataset stays on screen.
    pub fn open_path(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                log::info!(
                    "Showing {} ({} datasets cached)",
                    path.display(),
                    self.cache.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, reset filters to "everything" and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<BookingDataset>) {
        self.criteria = FilterCriteria::all_of(&dataset);
        self.date_inputs = self.criteria.date_range;
        self.color_maps = dataset
            .unique_values
            .iter()
            .map(|(col, vals)| (*col, ColorMap::new(vals)))
            .collect();

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the visible records and every chart table.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(&ds.records, &self.criteria);
        let rows: Vec<&BookingRecord> = self
            .visible_indices
            .iter()
            .map(|&i| &ds.records[i])
            .collect();
        self.summary = DashboardSummary::compute(&rows);
        log::debug!(
            "Filter matched {} of {} bookings",
            self.visible_indices.len(),
            ds.len()
        );
    }

    /// Records passing the current filters, in file order.
    pub fn visible_records(&self) -> Vec<&BookingRecord> {
        match &self.dataset {
            Some(ds) => self
                .visible_indices
                .iter()
                .map(|&i| &ds.records[i])
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn date_filter_enabled(&self) -> bool {
        self.criteria.date_range.is_some()
    }

    /// Turn the date interval on or off. Off lets null-date bookings through.
    pub fn set_date_filter_enabled(&mut self, enabled: bool) {
        self.criteria.date_range = if enabled { self.date_inputs } else { None };
        self.refilter();
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let range = DateRange::new(start, end);
        self.date_inputs = Some(range);
        if self.criteria.date_range.is_some() {
            self.criteria.date_range = Some(range);
        }
        self.refilter();
    }

    pub fn is_selected(&self, column: CategoryColumn, value: &str) -> bool {
        self.criteria
            .categories
            .get(&column)
            .map_or(true, |selected| selected.contains(value))
    }

    /// Toggle a single value in a column's filter. An unconstrained column
    /// starts from every observed value.
    pub fn toggle_filter_value(&mut self, column: CategoryColumn, value: &str) {
        let observed = self
            .dataset
            .as_ref()
            .and_then(|ds| ds.unique_values.get(&column))
            .cloned()
            .unwrap_or_default();
        let selected = self.criteria.categories.entry(column).or_insert(observed);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: CategoryColumn) {
        if let Some(ds) = &self.dataset {
            if let Some(all_vals) = ds.unique_values.get(&column) {
                self.criteria.categories.insert(column, all_vals.clone());
                self.refilter();
            }
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: CategoryColumn) {
        self.criteria.categories.insert(column, BTreeSet::new());
        self.refilter();
    }
}
