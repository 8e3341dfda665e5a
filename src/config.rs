//! Runtime settings of the dashboard.

use std::path::PathBuf;

pub const DEFAULT_SOURCE: &str = "sales_data.csv";
pub const DEFAULT_TOP_CUSTOMERS: usize = 10;
pub const DEFAULT_EXPORT_NAME: &str = "filtered_sales_data.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Sales table opened at startup.
    pub source_path: PathBuf,
    /// Length of the top-customers ranking.
    pub top_customers: usize,
    /// File name suggested by the export dialog.
    pub export_file_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE),
            top_customers: DEFAULT_TOP_CUSTOMERS,
            export_file_name: DEFAULT_EXPORT_NAME.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Build from process arguments (program name first). The only accepted
    /// argument is an optional source path.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().nth(1) {
            config.source_path = PathBuf::from(path);
        }
        config
    }
}
