//! Sales business-intelligence pipeline.
//!
//! The library owns everything that is not drawing: loading and caching the
//! source table, derived columns, filtering, aggregation and CSV export. The
//! `sales-dashboard` binary renders a [`data::view::DashboardView`] with egui.

pub mod color;
pub mod config;
pub mod data;
pub mod format;
