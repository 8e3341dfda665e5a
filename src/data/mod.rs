/// Data layer: schema, loading, caching, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset   (cached by `cache`)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset │  Vec<SaleRecord> with derived columns, facets
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredView (row indices)
///   └──────────┘
///        │
///        ├──────────────► export     (CSV bytes)
///        ▼
///   ┌──────────┐
///   │ aggregate │  KPIs and chart series → DashboardView (`view`)
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod parse;
pub mod schema;
pub mod view;
