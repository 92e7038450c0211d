use crate::prelude::Filter;
use crate::records::{LightCurvePoint, LightCurveRow};
use std::collections::BTreeMap;

/// Time-ordered points of one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSeries {
    pub filter: Filter,
    pub rows: Vec<LightCurveRow>,
}

impl FilterSeries {
    pub fn points(&self) -> impl Iterator<Item = &LightCurvePoint> {
        self.rows.iter().map(|row| &row.point)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Multi-band light curve: one non-empty series per filter, in filter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightCurve {
    pub series: Vec<FilterSeries>,
}

impl LightCurve {
    /// All rows, grouped by filter and time-ordered within each filter.
    pub fn rows(&self) -> impl Iterator<Item = &LightCurveRow> {
        self.series.iter().flat_map(|series| series.rows.iter())
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.series.iter().map(|series| series.filter).collect()
    }

    pub fn series(&self, filter: Filter) -> Option<&FilterSeries> {
        self.series.iter().find(|series| series.filter == filter)
    }

    pub fn len(&self) -> usize {
        self.series.iter().map(FilterSeries::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Accumulates rows per filter across observations.
#[derive(Debug, Default)]
pub struct SeriesBuilder {
    by_filter: BTreeMap<Filter, Vec<LightCurveRow>>,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, filter: Filter, rows: impl IntoIterator<Item = LightCurveRow>) {
        self.by_filter.entry(filter).or_default().extend(rows);
    }

    /// Orders every series by MJD and drops filters that collected nothing.
    pub fn finish(self) -> LightCurve {
        let series = self
            .by_filter
            .into_iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(filter, mut rows)| {
                rows.sort_by(|a, b| a.point.mjd.value().total_cmp(&b.point.mjd.value()));
                FilterSeries { filter, rows }
            })
            .collect();
        LightCurve { series }
    }
}
