use std::collections::{BTreeMap, HashSet};

use super::filter::FilteredView;
use super::model::SaleRecord;

// ---------------------------------------------------------------------------
// Scalar KPIs
// ---------------------------------------------------------------------------

/// Headline metrics of a filtered view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kpis {
    pub total_sales: f64,
    /// NaN on an empty view.
    pub average_order_value: f64,
    pub distinct_orders: usize,
    /// Mean over finite margins only; NaN when there are none.
    pub average_profit_margin: f64,
}

pub fn total_sales(view: &FilteredView<'_>) -> f64 {
    view.records().map(|r| r.fields().sales).sum()
}

pub fn average_order_value(view: &FilteredView<'_>) -> f64 {
    mean(view.records().map(|r| r.fields().sales))
}

pub fn distinct_orders(view: &FilteredView<'_>) -> usize {
    view.records()
        .map(|r| r.fields().order_number)
        .collect::<HashSet<_>>()
        .len()
}

/// Zero-price rows carry a NaN margin and are skipped.
pub fn average_profit_margin(view: &FilteredView<'_>) -> f64 {
    mean(view.records().map(|r| r.profit_margin()).filter(|m| !m.is_nan()))
}

pub fn kpis(view: &FilteredView<'_>) -> Kpis {
    Kpis {
        total_sales: total_sales(view),
        average_order_value: average_order_value(view),
        distinct_orders: distinct_orders(view),
        average_profit_margin: average_profit_margin(view),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

// ---------------------------------------------------------------------------
// Grouped series
// ---------------------------------------------------------------------------

/// Sum of sales per key, sorted by key.
fn sales_by<'a>(
    view: &FilteredView<'a>,
    key: impl Fn(&'a SaleRecord) -> &'a str,
) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for rec in view.records() {
        *groups.entry(key(rec)).or_default() += rec.fields().sales;
    }
    groups.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Sales per `YYYY-MM` bucket, oldest first.
pub fn monthly_sales_trend(view: &FilteredView<'_>) -> Vec<(String, f64)> {
    sales_by(view, |r| r.year_month())
}

pub fn sales_by_product_line(view: &FilteredView<'_>) -> Vec<(String, f64)> {
    sales_by(view, |r| r.fields().product_line.as_str())
}

pub fn sales_by_country(view: &FilteredView<'_>) -> Vec<(String, f64)> {
    sales_by(view, |r| r.fields().country.as_str())
}

/// Row count per deal size, largest first; ties by name.
pub fn deal_size_distribution(view: &FilteredView<'_>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in view.records() {
        *counts.entry(rec.fields().deal_size.as_str()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    // Stable sort keeps the name order among equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Customers ranked by summed sales, descending, at most `n` entries.
///
/// Ties keep customer name order.
pub fn top_customers(view: &FilteredView<'_>, n: usize) -> Vec<(String, f64)> {
    let mut ranked = sales_by(view, |r| r.fields().customer_name.as_str());
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Scatter series
// ---------------------------------------------------------------------------

/// One unaggregated point of the profit-vs-quantity scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub quantity: u32,
    pub profit: f64,
    pub product_line: String,
    pub sales: f64,
    pub product_code: String,
    pub price_each: f64,
    pub msrp: f64,
}

pub fn profit_scatter(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.records()
        .map(|r| {
            let f = r.fields();
            ScatterPoint {
                quantity: f.quantity_ordered,
                profit: r.profit(),
                product_line: f.product_line.clone(),
                sales: f.sales,
                product_code: f.product_code.clone(),
                price_each: f.price_each,
                msrp: f.msrp,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::{FilterSelection, apply};
    use crate::data::model::tests::sale;
    use crate::data::model::{SaleFields, SaleRecord, SalesDataset};
    use crate::data::schema::SourceLayout;

    fn dataset(records: Vec<SaleRecord>) -> SalesDataset {
        SalesDataset::new(records, SourceLayout::canonical())
    }

    #[test]
    fn year_filter_scenario() {
        let ds = dataset(vec![
            sale(10100, 2003, "A", "Ships", 100.0),
            sale(10200, 2004, "B", "Ships", 200.0),
        ]);
        let mut selection = FilterSelection::all(&ds);
        selection.years = BTreeSet::from([2003]);
        let view = apply(&ds, &selection);

        assert_eq!(total_sales(&view), 100.0);
        assert_eq!(distinct_orders(&view), 1);
    }

    #[test]
    fn kpis_over_the_full_view() {
        let ds = dataset(vec![
            sale(1, 2003, "A", "Ships", 100.0),
            sale(1, 2003, "A", "Planes", 300.0),
            sale(2, 2004, "B", "Ships", 200.0),
        ]);
        let k = kpis(&apply(&ds, &FilterSelection::all(&ds)));
        assert_eq!(k.total_sales, 600.0);
        assert_eq!(k.average_order_value, 200.0);
        assert_eq!(k.distinct_orders, 2);
        assert_eq!(k.average_profit_margin, 20.0);
    }

    #[test]
    fn empty_view_degrades_gracefully() {
        let ds = dataset(vec![sale(1, 2003, "A", "Ships", 100.0)]);
        let mut selection = FilterSelection::all(&ds);
        selection.years.clear();
        let view = apply(&ds, &selection);

        let k = kpis(&view);
        assert_eq!(k.total_sales, 0.0);
        assert!(k.average_order_value.is_nan());
        assert_eq!(k.distinct_orders, 0);
        assert!(k.average_profit_margin.is_nan());
        assert!(monthly_sales_trend(&view).is_empty());
        assert!(deal_size_distribution(&view).is_empty());
        assert!(top_customers(&view, 10).is_empty());
        assert!(profit_scatter(&view).is_empty());
    }

    #[test]
    fn zero_price_margin_is_excluded_from_the_mean() {
        let zero_price = SaleRecord::new(
            SaleFields {
                price_each: 0.0,
                ..sale(9, 2003, "Z", "Ships", 0.0).fields().clone()
            },
            Vec::new(),
        );
        let ds = dataset(vec![sale(1, 2003, "A", "Ships", 100.0), zero_price]);
        let view = apply(&ds, &FilterSelection::all(&ds));
        assert_eq!(average_profit_margin(&view), 20.0);
    }

    #[test]
    fn monthly_trend_is_sorted_by_bucket() {
        let ds = dataset(vec![
            sale(1, 2004, "A", "Ships", 5.0),
            sale(2, 2003, "A", "Ships", 7.0),
            sale(3, 2004, "B", "Ships", 1.0),
        ]);
        let trend = monthly_sales_trend(&apply(&ds, &FilterSelection::all(&ds)));
        assert_eq!(
            trend,
            vec![("2003-03".to_string(), 7.0), ("2004-03".to_string(), 6.0)]
        );
    }

    #[test]
    fn product_lines_are_summed() {
        let ds = dataset(vec![
            sale(1, 2003, "A", "Ships", 5.0),
            sale(2, 2003, "A", "Planes", 7.0),
            sale(3, 2004, "B", "Ships", 1.0),
        ]);
        let view = apply(&ds, &FilterSelection::all(&ds));
        assert_eq!(
            sales_by_product_line(&view),
            vec![("Planes".to_string(), 7.0), ("Ships".to_string(), 6.0)]
        );
        assert_eq!(sales_by_country(&view), vec![("USA".to_string(), 13.0)]);
    }

    #[test]
    fn top_customers_rank_descending_and_truncate() {
        let records = (0..12)
            .map(|i| sale(i, 2003, &format!("Customer {i:02}"), "Ships", (i * 10) as f64))
            .collect();
        let ds = dataset(records);
        let top = top_customers(&apply(&ds, &FilterSelection::all(&ds)), 10);

        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ("Customer 11".to_string(), 110.0));
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn top_customer_ties_keep_name_order() {
        let ds = dataset(vec![
            sale(1, 2003, "Zeta", "Ships", 50.0),
            sale(2, 2003, "Alpha", "Ships", 50.0),
        ]);
        let top = top_customers(&apply(&ds, &FilterSelection::all(&ds)), 10);
        assert_eq!(top[0].0, "Alpha");
        assert_eq!(top[1].0, "Zeta");
    }

    #[test]
    fn deal_size_counts_sum_to_row_count() {
        let mut records = vec![sale(1, 2003, "A", "Ships", 5.0)];
        let mut large = sale(2, 2003, "B", "Ships", 5.0).fields().clone();
        large.deal_size = "Large".to_string();
        records.push(SaleRecord::new(large.clone(), Vec::new()));
        records.push(SaleRecord::new(large, Vec::new()));

        let ds = dataset(records);
        let view = apply(&ds, &FilterSelection::all(&ds));
        let dist = deal_size_distribution(&view);
        assert_eq!(dist[0], ("Large".to_string(), 2));
        assert_eq!(dist.iter().map(|(_, c)| c).sum::<usize>(), view.len());
    }

    #[test]
    fn scatter_keeps_one_point_per_row() {
        let ds = dataset(vec![
            sale(1, 2003, "A", "Ships", 5.0),
            sale(2, 2003, "B", "Planes", 7.0),
        ]);
        let points = profit_scatter(&apply(&ds, &FilterSelection::all(&ds)));
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].product_line, "Planes");
        assert_eq!(points[1].profit, 20.0);
        assert_eq!(points[1].quantity, 10);
    }
}
