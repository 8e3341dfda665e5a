use super::aggregate::{self, Kpis, ScatterPoint};
use super::filter::{self, FilterSelection};
use super::model::SalesDataset;

/// Everything the dashboard draws for one filter selection.
///
/// Owned, so the UI can keep it between frames and rebuild it only when the
/// selection or the dataset changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub kpis: Kpis,
    pub monthly_sales: Vec<(String, f64)>,
    pub sales_by_product_line: Vec<(String, f64)>,
    pub sales_by_country: Vec<(String, f64)>,
    pub deal_sizes: Vec<(String, usize)>,
    pub top_customers: Vec<(String, f64)>,
    pub scatter: Vec<ScatterPoint>,
    /// Indices of the filtered rows, for the raw data table.
    pub rows: Vec<usize>,
}

/// Run the filter-and-aggregate pipeline once.
pub fn render(dataset: &SalesDataset, selection: &FilterSelection, top_n: usize) -> DashboardView {
    let view = filter::apply(dataset, selection);
    DashboardView {
        kpis: aggregate::kpis(&view),
        monthly_sales: aggregate::monthly_sales_trend(&view),
        sales_by_product_line: aggregate::sales_by_product_line(&view),
        sales_by_country: aggregate::sales_by_country(&view),
        deal_sizes: aggregate::deal_size_distribution(&view),
        top_customers: aggregate::top_customers(&view, top_n),
        scatter: aggregate::profit_scatter(&view),
        rows: view.indices().to_vec(),
    }
}
