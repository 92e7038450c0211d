use crate::plot_bridge::model::{PlotModel, PlotPoint};
use crate::plot_bridge::sink::PlotSink;
use anyhow::Context;
use plotters::prelude::*;
use std::fs;
use std::path::PathBuf;
use uvotcore::Filter;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 640;
/// Magnitudes of headroom above and below the plotted range.
const Y_PAD: f64 = 0.5;

fn filter_color(filter: Filter) -> RGBColor {
    match filter {
        Filter::V => RGBColor(0, 150, 0),
        Filter::B => RGBColor(0, 0, 220),
        Filter::U => RGBColor(120, 0, 200),
        Filter::UW1 => RGBColor(220, 0, 180),
        Filter::UM2 => RGBColor(230, 100, 0),
        Filter::UW2 => RGBColor(200, 0, 0),
        Filter::W => RGBColor(90, 90, 90),
    }
}

/// Renders the light curve to an SVG chart: error bars for detections and
/// downward arrows for limits, brighter magnitudes at the top.
pub struct SvgPlotSink {
    path: PathBuf,
}

impl SvgPlotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn plotted(point: &PlotPoint) -> bool {
    point.time.is_finite() && point.value.is_finite()
}

fn time_range(model: &PlotModel) -> (f64, f64) {
    let (lo, hi) = model
        .series
        .iter()
        .flat_map(|s| s.points.iter())
        .filter(|p| plotted(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.time), hi.max(p.time))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}

impl PlotSink for SvgPlotSink {
    fn publish(&self, model: &PlotModel) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        // Plot -m when inverted so brighter points sit higher.
        let flip = if model.invert_y { -1.0 } else { 1.0 };
        let (m_lo, m_hi) = model.y_range.unwrap_or((15.0, 20.0));
        let (y_lo, y_hi) = if model.invert_y {
            (-m_hi - Y_PAD, -m_lo + Y_PAD)
        } else {
            (m_lo - Y_PAD, m_hi + Y_PAD)
        };
        let (x_lo, x_hi) = time_range(model);

        let root = SVGBackend::new(&self.path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&model.target, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        let magnitude_label = move |y: &f64| format!("{:.1}", flip * y);
        chart
            .configure_mesh()
            .x_desc(model.x_label.as_str())
            .y_desc(model.y_label.as_str())
            .x_label_formatter(&|x| format!("{x:.1}"))
            .y_label_formatter(&magnitude_label)
            .draw()?;

        for series in &model.series {
            let color = filter_color(series.filter);
            let detections: Vec<&PlotPoint> = series
                .points
                .iter()
                .filter(|p| plotted(p) && !p.is_limit)
                .collect();
            let limits: Vec<&PlotPoint> = series
                .points
                .iter()
                .filter(|p| plotted(p) && p.is_limit)
                .collect();

            chart.draw_series(
                detections
                    .iter()
                    .filter(|p| p.upper.is_finite() && p.lower.is_finite())
                    .map(|p| {
                        let bright = flip * (p.value - p.upper);
                        let faint = flip * (p.value + p.lower);
                        ErrorBar::new_vertical(
                            p.time,
                            bright.min(faint),
                            flip * p.value,
                            bright.max(faint),
                            color.stroke_width(1),
                            6,
                        )
                    }),
            )?;

            chart.draw_series(limits.iter().map(|p| {
                EmptyElement::at((p.time, flip * p.value))
                    + PathElement::new(vec![(0, 0), (0, 12)], color.stroke_width(1))
                    + Polygon::new(vec![(-4, 10), (4, 10), (0, 16)], color.filled())
            }))?;

            chart
                .draw_series(
                    detections
                        .iter()
                        .map(|p| Circle::new((p.time, flip * p.value), 3, color.filled())),
                )?
                .label(series.filter.code())
                .legend(move |(x, y)| Circle::new((x + 5, y), 3, color.filled()));
        }

        if !model.series.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()
            .with_context(|| format!("writing plot image {}", self.path.display()))?;
        println!(
            "[plot] {} filters, {} points -> {}",
            model.series.len(),
            model.point_count(),
            self.path.display()
        );
        Ok(())
    }
}
