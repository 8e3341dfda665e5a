use std::collections::HashMap;

use super::loader::LoadError;

// ---------------------------------------------------------------------------
// Column catalogue
// ---------------------------------------------------------------------------

/// A required column of the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    OrderNumber,
    OrderDate,
    QuantityOrdered,
    PriceEach,
    Msrp,
    Sales,
    ProductLine,
    ProductCode,
    Country,
    DealSize,
    Status,
    CustomerName,
    Year,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::OrderNumber,
        Column::OrderDate,
        Column::QuantityOrdered,
        Column::PriceEach,
        Column::Msrp,
        Column::Sales,
        Column::ProductLine,
        Column::ProductCode,
        Column::Country,
        Column::DealSize,
        Column::Status,
        Column::CustomerName,
        Column::Year,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Column::OrderNumber => "ORDER_NUMBER",
            Column::OrderDate => "ORDER_DATE",
            Column::QuantityOrdered => "QUANTITY_ORDERED",
            Column::PriceEach => "PRICE_EACH",
            Column::Msrp => "MSRP",
            Column::Sales => "SALES",
            Column::ProductLine => "PRODUCTLINE",
            Column::ProductCode => "PRODUCTCODE",
            Column::Country => "COUNTRY",
            Column::DealSize => "DEALSIZE",
            Column::Status => "STATUS",
            Column::CustomerName => "CUSTOMER_NAME",
            Column::Year => "YEAR",
        }
    }
}

/// A column computed at load time. Never read from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedColumn {
    YearMonth,
    Profit,
    ProfitMargin,
}

impl DerivedColumn {
    pub const ALL: [DerivedColumn; 3] = [
        DerivedColumn::YearMonth,
        DerivedColumn::Profit,
        DerivedColumn::ProfitMargin,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DerivedColumn::YearMonth => "YEAR_MONTH",
            DerivedColumn::Profit => "PROFIT",
            DerivedColumn::ProfitMargin => "PROFIT_MARGIN",
        }
    }
}

fn matches_header(header: &str, name: &str) -> bool {
    header.trim().eq_ignore_ascii_case(name)
}

// ---------------------------------------------------------------------------
// SourceLayout – how the headers of one source file map onto the schema
// ---------------------------------------------------------------------------

/// What a single source column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSlot {
    Known(Column),
    /// Index into the record's pass-through values.
    Extra(usize),
    /// A derived column written by a previous export; recomputed instead.
    Derived(DerivedColumn),
}

/// Header layout of a loaded source, kept so export reproduces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    headers: Vec<String>,
    slots: Vec<SourceSlot>,
    positions: HashMap<Column, usize>,
    extra_count: usize,
}

impl SourceLayout {
    /// Resolve `headers` against the schema.
    ///
    /// Every [`Column`] must be present exactly once; unknown headers become
    /// pass-through extras.
    pub fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let mut slots = Vec::with_capacity(headers.len());
        let mut positions = HashMap::new();
        let mut extra_count = 0;

        for (idx, header) in headers.iter().enumerate() {
            if headers[..idx]
                .iter()
                .any(|earlier| matches_header(earlier, header))
            {
                return Err(LoadError::DuplicateColumn(header.trim().to_string()));
            }

            let slot = if let Some(col) = Column::ALL
                .iter()
                .find(|c| matches_header(header, c.name()))
            {
                positions.insert(*col, idx);
                SourceSlot::Known(*col)
            } else if let Some(derived) = DerivedColumn::ALL
                .iter()
                .find(|d| matches_header(header, d.name()))
            {
                SourceSlot::Derived(*derived)
            } else {
                extra_count += 1;
                SourceSlot::Extra(extra_count - 1)
            };
            slots.push(slot);
        }

        let missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| !positions.contains_key(c))
            .map(|c| c.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::SchemaMismatch {
                missing,
                found: headers.iter().map(|h| h.trim().to_string()).collect(),
            });
        }

        Ok(SourceLayout {
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
            slots,
            positions,
            extra_count,
        })
    }

    /// The canonical layout: every known column in schema order, no extras.
    pub fn canonical() -> Self {
        let headers: Vec<String> = Column::ALL.iter().map(|c| c.name().to_string()).collect();
        let slots = Column::ALL.iter().map(|c| SourceSlot::Known(*c)).collect();
        let positions = Column::ALL.iter().enumerate().map(|(i, c)| (*c, i)).collect();
        SourceLayout {
            headers,
            slots,
            positions,
            extra_count: 0,
        }
    }

    /// Position of a required column in the source row.
    pub fn position(&self, column: Column) -> usize {
        // `resolve` and `canonical` guarantee every column is mapped.
        self.positions[&column]
    }

    pub fn extra_count(&self) -> usize {
        self.extra_count
    }

    /// Source headers paired with their slot, in source order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, SourceSlot)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.slots.iter().copied())
    }

    /// Header row for export: source columns (minus stale derived ones) then
    /// the derived columns.
    pub fn export_headers(&self) -> Vec<String> {
        self.slots()
            .filter(|(_, slot)| !matches!(slot, SourceSlot::Derived(_)))
            .map(|(h, _)| h.to_string())
            .chain(DerivedColumn::ALL.iter().map(|d| d.name().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn canonical_names() -> Vec<String> {
        Column::ALL.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn resolves_headers_in_any_order_and_case() {
        let mut names = canonical_names();
        names.reverse();
        names[0] = " year ".to_string();
        let layout = SourceLayout::resolve(&names).unwrap();
        assert_eq!(layout.position(Column::Year), 0);
        assert_eq!(layout.position(Column::OrderNumber), 12);
        assert_eq!(layout.extra_count(), 0);
    }

    #[test]
    fn missing_columns_are_reported() {
        let names = headers(&["ORDER_NUMBER", "SALES"]);
        match SourceLayout::resolve(&names) {
            Err(LoadError::SchemaMismatch { missing, found }) => {
                assert!(missing.contains(&"ORDER_DATE".to_string()));
                assert!(!missing.contains(&"SALES".to_string()));
                assert_eq!(found, names);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let mut names = canonical_names();
        names.push("sales".to_string());
        assert!(matches!(
            SourceLayout::resolve(&names),
            Err(LoadError::DuplicateColumn(name)) if name == "sales"
        ));
    }

    #[test]
    fn extras_and_derived_columns_are_classified() {
        let mut names = canonical_names();
        names.insert(2, "TERRITORY".to_string());
        names.push("PROFIT".to_string());
        let layout = SourceLayout::resolve(&names).unwrap();
        assert_eq!(layout.extra_count(), 1);

        let slots: Vec<SourceSlot> = layout.slots().map(|(_, s)| s).collect();
        assert_eq!(slots[2], SourceSlot::Extra(0));
        assert_eq!(slots[14], SourceSlot::Derived(DerivedColumn::Profit));

        let exported = layout.export_headers();
        assert_eq!(exported.len(), 14 + 3);
        assert_eq!(exported[2], "TERRITORY");
        assert_eq!(&exported[14..], &["YEAR_MONTH", "PROFIT", "PROFIT_MARGIN"]);
    }
}
