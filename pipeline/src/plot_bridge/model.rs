use serde::{Deserialize, Serialize};
use uvotcore::math::StatsHelper;
use uvotcore::processing::LightCurve;
use uvotcore::Filter;

/// Everything a plotting front end needs for one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub time: f64,
    pub value: f64,
    /// Error-bar length towards brighter magnitudes.
    pub upper: f64,
    /// Error-bar length towards fainter magnitudes; zero for limits.
    pub lower: f64,
    pub is_limit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub filter: Filter,
    pub points: Vec<PlotPoint>,
}

/// Per-filter light curve in the shape handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlotModel {
    pub target: String,
    pub x_label: String,
    pub y_label: String,
    /// Magnitudes: brighter is up.
    pub invert_y: bool,
    pub y_range: Option<(f64, f64)>,
    pub series: Vec<PlotSeries>,
}

impl PlotModel {
    pub fn from_curve(target: &str, curve: &LightCurve) -> Self {
        let series: Vec<PlotSeries> = curve
            .series
            .iter()
            .map(|series| PlotSeries {
                filter: series.filter,
                points: series
                    .points()
                    .map(|point| PlotPoint {
                        time: point.mjd.value(),
                        value: point.value,
                        upper: point.upper.abs(),
                        lower: point.lower.abs(),
                        is_limit: point.is_limit,
                    })
                    .collect(),
            })
            .collect();

        let values: Vec<f64> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.value))
            .collect();

        Self {
            target: target.to_string(),
            x_label: "MJD".into(),
            y_label: "m".into(),
            invert_y: true,
            y_range: StatsHelper::finite_range(&values),
            series,
        }
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}
