use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use sales_dashboard::color::CategoryColors;
use sales_dashboard::config::DashboardConfig;
use sales_dashboard::data::cache::DatasetCache;
use sales_dashboard::data::export;
use sales_dashboard::data::filter::{self, FilterSelection};
use sales_dashboard::data::model::SalesDataset;
use sales_dashboard::data::view::{self, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which page the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    RawData,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// File the dataset is (re)loaded from.
    pub source_path: PathBuf,

    cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<SalesDataset>>,

    /// Current filter selection; rebuilt to "everything" for each new dataset.
    pub selection: FilterSelection,

    /// Aggregates for the current selection (cached between frames).
    pub view: Option<DashboardView>,

    /// Colours per product line, stable across filter changes.
    pub product_line_colors: Option<CategoryColors>,

    /// Colours per deal size.
    pub deal_size_colors: Option<CategoryColors>,

    pub tab: Tab,

    /// Error shown in the UI.
    pub status_message: Option<String>,

    /// Last successful action, e.g. an export.
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let source_path = config.source_path.clone();
        let mut state = Self {
            config,
            source_path,
            cache: DatasetCache::new(),
            dataset: None,
            selection: FilterSelection::default(),
            view: None,
            product_line_colors: None,
            deal_size_colors: None,
            tab: Tab::Overview,
            status_message: None,
            notice: None,
        };
        state.refresh();
        state
    }

    /// Switch to another source file.
    pub fn open(&mut self, path: &Path) {
        self.source_path = path.to_path_buf();
        self.refresh();
    }

    /// Drop the cached dataset and read the source again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.refresh();
    }

    /// Make sure the dataset matches the source file, then re-render.
    ///
    /// Called on every interaction; a cache hit costs one `stat`.
    pub fn refresh(&mut self) {
        match self.cache.get_or_load(&self.source_path) {
            Ok(dataset) => {
                let unchanged = self
                    .dataset
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &dataset));
                if !unchanged {
                    self.set_dataset(dataset);
                }
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", self.source_path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.rerender();
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    fn set_dataset(&mut self, dataset: Arc<SalesDataset>) {
        log::info!(
            "Using {} rows from {}",
            dataset.len(),
            self.source_path.display()
        );
        self.selection = FilterSelection::all(&dataset);
        self.product_line_colors = Some(CategoryColors::new(&dataset.facets().product_lines));
        self.deal_size_colors = Some(CategoryColors::new(&dataset.facets().deal_sizes));
        self.dataset = Some(dataset);
    }

    /// Recompute the dashboard view after a selection change.
    pub fn rerender(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .map(|ds| view::render(ds, &self.selection, self.config.top_customers));
    }

    /// The filtered rows as CSV bytes, with the number of rows.
    pub fn filtered_csv(&self) -> Result<(Vec<u8>, usize)> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        let view = filter::apply(dataset, &self.selection);
        let bytes = export::to_csv_bytes(&view).context("serialising filtered rows")?;
        Ok((bytes, view.len()))
    }

    /// Write the filtered rows to `path`; returns the number of rows written.
    pub fn export_to(&mut self, path: &Path) -> Result<usize> {
        let (bytes, rows) = self.filtered_csv()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {rows} rows to {}", path.display());
        self.notice = Some(format!("Exported {rows} rows to {}", path.display()));
        Ok(rows)
    }
}
