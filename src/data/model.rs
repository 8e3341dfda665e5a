use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::schema::SourceLayout;

// ---------------------------------------------------------------------------
// SaleFields – the values read from one source row
// ---------------------------------------------------------------------------

/// Typed source values of one sale. Everything else is derived from these.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleFields {
    /// Not unique: one order spans several rows (one per product).
    pub order_number: i64,
    pub order_date: NaiveDate,
    pub quantity_ordered: u32,
    pub price_each: f64,
    /// Manufacturer suggested price, used as the cost basis.
    pub msrp: f64,
    /// Not necessarily `quantity_ordered * price_each`.
    pub sales: f64,
    pub product_line: String,
    pub product_code: String,
    pub country: String,
    pub deal_size: String,
    pub status: String,
    pub customer_name: String,
    pub year: i32,
}

// ---------------------------------------------------------------------------
// SaleRecord – one row with its derived columns
// ---------------------------------------------------------------------------

/// A loaded sale. Derived columns are computed once in [`SaleRecord::new`]
/// and are read-only afterwards.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    fields: SaleFields,
    year_month: String,
    profit: f64,
    profit_margin: f64,
    /// Pass-through values of unknown source columns.
    extras: Vec<String>,
}

impl SaleRecord {
    pub fn new(fields: SaleFields, extras: Vec<String>) -> Self {
        let year_month = year_month(fields.order_date);
        let profit = profit(fields.price_each, fields.msrp);
        let profit_margin = profit_margin(fields.price_each, fields.msrp);
        SaleRecord {
            fields,
            year_month,
            profit,
            profit_margin,
            extras,
        }
    }

    pub fn fields(&self) -> &SaleFields {
        &self.fields
    }

    /// Order month as `YYYY-MM`.
    pub fn year_month(&self) -> &str {
        &self.year_month
    }

    pub fn profit(&self) -> f64 {
        self.profit
    }

    /// Profit as a percentage of the unit price; NaN when the price is zero.
    pub fn profit_margin(&self) -> f64 {
        self.profit_margin
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }
}

/// Two undefined margins (zero unit price) compare equal, so a record always
/// equals itself.
impl PartialEq for SaleRecord {
    fn eq(&self, other: &Self) -> bool {
        let same_margin = self.profit_margin == other.profit_margin
            || (self.profit_margin.is_nan() && other.profit_margin.is_nan());
        self.fields == other.fields
            && self.year_month == other.year_month
            && self.profit == other.profit
            && same_margin
            && self.extras == other.extras
    }
}

/// Month bucket key, sortable as text.
pub fn year_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn profit(price_each: f64, msrp: f64) -> f64 {
    price_each - msrp
}

pub fn profit_margin(price_each: f64, msrp: f64) -> f64 {
    if price_each == 0.0 {
        return f64::NAN;
    }
    profit(price_each, msrp) / price_each * 100.0
}

// ---------------------------------------------------------------------------
// Facets – distinct values of the four filter dimensions
// ---------------------------------------------------------------------------

/// Sorted distinct values for each filterable dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub years: BTreeSet<i32>,
    pub statuses: BTreeSet<String>,
    pub product_lines: BTreeSet<String>,
    pub deal_sizes: BTreeSet<String>,
}

impl Facets {
    fn collect(records: &[SaleRecord]) -> Self {
        let mut facets = Facets::default();
        for rec in records {
            let f = rec.fields();
            facets.years.insert(f.year);
            facets.statuses.insert(f.status.clone());
            facets.product_lines.insert(f.product_line.clone());
            facets.deal_sizes.insert(f.deal_size.clone());
        }
        facets
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with its source layout and facet index.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataset {
    records: Vec<SaleRecord>,
    layout: SourceLayout,
    facets: Facets,
}

impl SalesDataset {
    /// Build the facet index over `records`.
    pub fn new(records: Vec<SaleRecord>, layout: SourceLayout) -> Self {
        let facets = Facets::collect(&records);
        SalesDataset {
            records,
            layout,
            facets,
        }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
