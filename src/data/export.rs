use std::io::Write;

use super::filter::FilteredView;
use super::model::SaleRecord;
use super::schema::{Column, DerivedColumn, SourceLayout, SourceSlot};

/// Write `view` as CSV: the source columns in source order, then the derived
/// columns. Reloading the output reproduces the same records.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> csv::Result<()> {
    let layout = view.dataset().layout();
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(layout.export_headers())?;

    for rec in view.records() {
        out.write_record(record_cells(layout, rec))?;
    }

    out.flush()?;
    Ok(())
}

/// The export as UTF-8 bytes, ready for a download or save dialog.
pub fn to_csv_bytes(view: &FilteredView<'_>) -> csv::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(buf)
}

/// One record as text, aligned with [`SourceLayout::export_headers`].
pub fn record_cells(layout: &SourceLayout, rec: &SaleRecord) -> Vec<String> {
    let mut cells: Vec<String> = layout
        .slots()
        .filter_map(|(_, slot)| match slot {
            SourceSlot::Known(col) => Some(known_cell(rec, col)),
            SourceSlot::Extra(i) => Some(rec.extras().get(i).cloned().unwrap_or_default()),
            SourceSlot::Derived(_) => None,
        })
        .collect();
    cells.extend(DerivedColumn::ALL.iter().map(|d| derived_cell(rec, *d)));
    cells
}

fn known_cell(rec: &SaleRecord, col: Column) -> String {
    let f = rec.fields();
    match col {
        Column::OrderNumber => f.order_number.to_string(),
        Column::OrderDate => f.order_date.format("%Y-%m-%d").to_string(),
        Column::QuantityOrdered => f.quantity_ordered.to_string(),
        Column::PriceEach => f.price_each.to_string(),
        Column::Msrp => f.msrp.to_string(),
        Column::Sales => f.sales.to_string(),
        Column::ProductLine => f.product_line.clone(),
        Column::ProductCode => f.product_code.clone(),
        Column::Country => f.country.clone(),
        Column::DealSize => f.deal_size.clone(),
        Column::Status => f.status.clone(),
        Column::CustomerName => f.customer_name.clone(),
        Column::Year => f.year.to_string(),
    }
}

fn derived_cell(rec: &SaleRecord, col: DerivedColumn) -> String {
    match col {
        DerivedColumn::YearMonth => rec.year_month().to_string(),
        DerivedColumn::Profit => rec.profit().to_string(),
        // Written empty, the way NaN round-trips through CSV.
        DerivedColumn::ProfitMargin if rec.profit_margin().is_nan() => String::new(),
        DerivedColumn::ProfitMargin => rec.profit_margin().to_string(),
    }
}
