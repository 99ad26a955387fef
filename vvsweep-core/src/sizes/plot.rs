//! Distribution plot of aggregated sizes.
//!
//! Renders to SVG to avoid system font dependencies.

use std::path::Path;

use plotters::prelude::*;

use crate::{Error, Result, DEFAULT_PLOT_HEIGHT, DEFAULT_PLOT_WIDTH};

use super::stats::{gaussian_kde, SeriesSummary};
use super::{Category, SizeData};

/// Number of points the density of each violin is evaluated at.
const DENSITY_POINTS: usize = 100;
/// Largest half-width of a violin, in category slots.
const VIOLIN_HALF_WIDTH: f64 = 0.4;
const BOX_HALF_WIDTH: f64 = 0.06;

/// Plot appearance settings.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub caption: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            width: DEFAULT_PLOT_WIDTH,
            height: DEFAULT_PLOT_HEIGHT,
            caption: "Cell volumes".to_string(),
        }
    }
}

/// Draws a violin plot with one slot per category, in fixed category
/// order, and writes it as SVG to the given path.
///
/// Empty categories keep their slot and label but have nothing drawn in
/// them. If all the categories are empty a placeholder note is drawn
/// instead of the chart.
pub fn plot_sizes(data: &SizeData, path: &Path, config: &PlotConfig) -> Result<()> {
    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    if data.is_empty() {
        warn!("no size data to plot");
        root.draw(&Text::new(
            "No size data",
            (config.width as i32 / 2 - 50, config.height as i32 / 2),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))?;
        root.present()?;
        return Ok(());
    }

    let (min, max) = value_range(data)?;
    let slots = Category::ALL.len();

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.caption, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..slots as f64 - 0.5, min..max)?;

    // Labels land on slot centers and the half steps between them,
    // `category_label` blanks the latter.
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2 * slots + 1)
        .x_label_formatter(&|x| category_label(*x))
        .y_desc("Volume")
        .draw()?;

    for (category, values) in data.iter() {
        let summary = match SeriesSummary::from_values(values) {
            Some(s) => s,
            None => {
                debug!("skipping empty category: {}", category);
                continue;
            }
        };
        let center = category.index() as f64;
        let color = Palette99::pick(category.index());

        chart.draw_series(std::iter::once(Polygon::new(
            violin_outline(values, center),
            color.mix(0.4).filled(),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            violin_outline(values, center),
            color.stroke_width(1),
        )))?;

        let (low, high) = summary.whiskers(values);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(center, low), (center, high)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (center - BOX_HALF_WIDTH, summary.q1),
                (center + BOX_HALF_WIDTH, summary.q3),
            ],
            BLACK.filled(),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (center - BOX_HALF_WIDTH, summary.median),
                (center + BOX_HALF_WIDTH, summary.median),
            ],
            WHITE.stroke_width(2),
        )))?;
    }

    root.present()?;
    info!("saved size plot to {}", path.to_string_lossy());
    Ok(())
}

fn category_label(x: f64) -> String {
    let n = x.round();
    if (x - n).abs() > 1e-6 || n < 0. {
        return String::new();
    }
    Category::ALL
        .get(n as usize)
        .map(|c| c.as_str().to_string())
        .unwrap_or_default()
}

/// Value axis range covering all the violins, padded by 5%.
///
/// Fails if the densities can't be evaluated in `f64`, which happens for
/// series spanning close to the whole representable range.
fn value_range(data: &SizeData) -> Result<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (category, values) in data.iter() {
        for (y, d) in gaussian_kde(values, DENSITY_POINTS) {
            if !y.is_finite() || !d.is_finite() {
                return Err(Error::PlotError(format!(
                    "volumes of {} are too far apart to plot",
                    category
                )));
            }
            min = min.min(y);
            max = max.max(y);
        }
    }
    let pad = if max > min {
        (max - min) * 0.05
    } else {
        min.abs().max(1.) * 0.05
    };
    let (low, high) = (min - pad, max + pad);
    if !(low.is_finite() && high.is_finite() && (high - low).is_finite() && high > low) {
        return Err(Error::PlotError(format!(
            "value range {} to {} can't be plotted",
            min, max
        )));
    }
    Ok((low, high))
}

/// Closed outline of a violin centered at `center`, mirrored density on
/// both sides.
fn violin_outline(values: &[f64], center: f64) -> Vec<(f64, f64)> {
    let kde = gaussian_kde(values, DENSITY_POINTS);
    let peak = kde.iter().map(|(_, d)| *d).fold(0., f64::max);
    let scale = if peak > 0. {
        VIOLIN_HALF_WIDTH / peak
    } else {
        0.
    };
    let right = kde.iter().map(|(y, d)| (center + d * scale, *y));
    let left = kde.iter().rev().map(|(y, d)| (center - d * scale, *y));
    let mut outline: Vec<(f64, f64)> = right.chain(left).collect();
    if let Some(first) = outline.first().cloned() {
        outline.push(first);
    }
    outline
}
