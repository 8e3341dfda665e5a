use std::collections::BTreeSet;

use super::model::{Facets, SaleRecord, SalesDataset};

// ---------------------------------------------------------------------------
// FilterSelection: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Selected values for each of the four filter dimensions.
///
/// A record passes when its year, status, product line and deal size are
/// all selected. An empty set selects nothing, so the view is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub statuses: BTreeSet<String>,
    pub product_lines: BTreeSet<String>,
    pub deal_sizes: BTreeSet<String>,
}

impl FilterSelection {
    /// Every distinct value of every dimension selected (show everything).
    pub fn all(dataset: &SalesDataset) -> Self {
        let Facets {
            years,
            statuses,
            product_lines,
            deal_sizes,
        } = dataset.facets().clone();
        FilterSelection {
            years,
            statuses,
            product_lines,
            deal_sizes,
        }
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        let f = record.fields();
        self.years.contains(&f.year)
            && self.statuses.contains(&f.status)
            && self.product_lines.contains(&f.product_line)
            && self.deal_sizes.contains(&f.deal_size)
    }

    /// Whether this selection covers every facet value, i.e. filters nothing.
    pub fn selects_all(&self, facets: &Facets) -> bool {
        facets.years.is_subset(&self.years)
            && facets.statuses.is_subset(&self.statuses)
            && facets.product_lines.is_subset(&self.product_lines)
            && facets.deal_sizes.is_subset(&self.deal_sizes)
    }
}

// ---------------------------------------------------------------------------
// FilteredView: the rows passing a selection
// ---------------------------------------------------------------------------

/// Rows of a dataset that pass a [`FilterSelection`], in source order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a SalesDataset {
        self.dataset
    }

    /// Indices into [`SalesDataset::records`].
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a SaleRecord> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of `dataset` passing `selection`.
pub fn apply<'a>(dataset: &'a SalesDataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices: Vec<usize> = if selection.selects_all(dataset.facets()) {
        (0..dataset.len()).collect()
    } else {
        dataset
            .records()
            .iter()
            .enumerate()
            .filter(|(_, rec)| selection.matches(rec))
            .map(|(i, _)| i)
            .collect()
    };
    log::debug!("Filter kept {} of {} rows", indices.len(), dataset.len());
    FilteredView { dataset, indices }
}
