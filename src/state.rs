use std::collections::BTreeSet;
use std::path::Path;

use crate::config::DashboardConfig;
use crate::data::filter::{self, FilterSet};
use crate::data::loader;
use crate::data::model::{CellValue, ColumnNotFound, RecordSet};
use crate::report::{self, ReportDefinition, ReportOutcome};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The three multi-select filters of the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Gender,
    AgeGroup,
    Month,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 3] = [FilterColumn::Gender, FilterColumn::AgeGroup, FilterColumn::Month];

    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::Gender => "Select Gender",
            FilterColumn::AgeGroup => "Select Age Group",
            FilterColumn::Month => "Select Admit Month",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded records (None until user loads a file).
    pub dataset: Option<RecordSet>,

    /// Selectable values per multi-select, as offered after loading.
    pub options: FilterSet,

    /// Current search text and selections.
    pub filters: FilterSet,

    /// Records passing the current filters.
    pub filtered: Option<RecordSet>,

    /// Report definitions evaluated on every change.
    pub reports: Vec<ReportDefinition>,

    /// Latest report results, in definition order.
    pub outcomes: Vec<ReportOutcome>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let reports = report::catalog(config.top_n);
        Self {
            config,
            dataset: None,
            options: FilterSet::default(),
            filters: FilterSet::default(),
            filtered: None,
            reports,
            outcomes: Vec::new(),
            status_message: None,
        }
    }

    /// Load a file and make it the current dataset.  On failure the error is
    /// shown and any previous dataset is cleared.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path, &self.config.load) {
            Ok(records) => {
                if let Err(e) = self.set_dataset(records) {
                    self.fail(format!("Error loading data: {e}"));
                }
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.fail(format!("Error loading data: {e}"));
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.dataset = None;
        self.filtered = None;
        self.outcomes.clear();
        self.status_message = Some(message);
    }

    /// Ingest a newly loaded dataset with every filter value selected.
    pub fn set_dataset(&mut self, dataset: RecordSet) -> Result<(), ColumnNotFound> {
        self.options = FilterSet::all(&dataset)?;
        self.filters = self.options.clone();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
        Ok(())
    }

    /// Recompute the filtered records and every report from scratch.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        match filter::apply(ds, &self.filters) {
            Ok(filtered) => {
                self.outcomes = report::build_reports(ds, &filtered, &self.reports);
                self.filtered = Some(filtered);
            }
            Err(e) => {
                log::error!("Filtering failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn set_name_search(&mut self, text: String) {
        self.filters.name_search = text;
        self.refilter();
    }

    /// Toggle a single categorical value in a column's selection.
    pub fn toggle_value(&mut self, column: FilterColumn, value: &CellValue) {
        let selected = match column {
            FilterColumn::Gender => &mut self.filters.gender,
            FilterColumn::AgeGroup => &mut self.filters.age_group,
            FilterColumn::Month => return,
        };
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    pub fn toggle_month(&mut self, month: i64) {
        if !self.filters.month.remove(&month) {
            self.filters.month.insert(month);
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: FilterColumn) {
        match column {
            FilterColumn::Gender => self.filters.gender = self.options.gender.clone(),
            FilterColumn::AgeGroup => self.filters.age_group = self.options.age_group.clone(),
            FilterColumn::Month => self.filters.month = self.options.month.clone(),
        }
        self.refilter();
    }

    /// Deselect all values in a column.  An empty selection filters nothing.
    pub fn select_none(&mut self, column: FilterColumn) {
        match column {
            FilterColumn::Gender => self.filters.gender = BTreeSet::new(),
            FilterColumn::AgeGroup => self.filters.age_group = BTreeSet::new(),
            FilterColumn::Month => self.filters.month = BTreeSet::new(),
        }
        self.refilter();
    }

    /// (selected, offered) counts for a filter header.
    pub fn selection_counts(&self, column: FilterColumn) -> (usize, usize) {
        match column {
            FilterColumn::Gender => (self.filters.gender.len(), self.options.gender.len()),
            FilterColumn::AgeGroup => (self.filters.age_group.len(), self.options.age_group.len()),
            FilterColumn::Month => (self.filters.month.len(), self.options.month.len()),
        }
    }

    pub fn visible_count(&self) -> usize {
        self.filtered.as_ref().map_or(0, RecordSet::len)
    }
}
