//! Scatter plot of significant weight correlations

use crate::structs::{CorrelationTable, GrowthError, Outcome, Result, SignificantSubset};
use plotters::prelude::*;
use std::path::Path;

/// 10 x 6 inches at 300 dpi
const PLOT_SIZE: (u32, u32) = (3000, 1800);

const LOW_P_COLOR: RGBColor = RGBColor(68, 1, 84);
const HIGH_P_COLOR: RGBColor = RGBColor(253, 231, 37);

fn plot_err(e: impl std::fmt::Display) -> GrowthError {
    GrowthError::Plot(e.to_string())
}

/// Linear blend between the low and high p-value colors, `t` in [0, 1]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn gradient(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(
        mix(LOW_P_COLOR.0, HIGH_P_COLOR.0),
        mix(LOW_P_COLOR.1, HIGH_P_COLOR.1),
        mix(LOW_P_COLOR.2, HIGH_P_COLOR.2),
    )
}

/// Render correlation coefficient (x) per taxon (y), colored by adjusted p-value
///
/// # Errors
/// Returns error if the chart cannot be drawn or the PNG cannot be written
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn write_weight_plot(
    path: &Path,
    table: &CorrelationTable,
    subset: &SignificantSubset,
) -> Result<()> {
    let points: Vec<(&str, f64, f64)> = subset
        .rows
        .iter()
        .filter_map(|&i| {
            let record = table.records.get(i)?;
            Some((
                record.taxon.as_str(),
                record.weight_corr,
                table.p_adj(i, Outcome::Weight),
            ))
        })
        .collect();

    let p_min = points.iter().map(|p| p.2).fold(f64::INFINITY, f64::min);
    let p_max = points.iter().map(|p| p.2).fold(f64::NEG_INFINITY, f64::max);
    let p_span = p_max - p_min;
    let shade = |p: f64| {
        if p_span > 0.0 {
            gradient((p - p_min) / p_span)
        } else {
            gradient(0.0)
        }
    };

    let names: Vec<&str> = points.iter().map(|p| p.0).collect();
    let longest = names.iter().map(|n| n.len()).max().unwrap_or(0) as u32;
    let n = points.len() as i32;

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Bacterial taxa correlated with infant weight-for-age",
            ("sans-serif", 60),
        )
        .margin(40)
        .x_label_area_size(120)
        .y_label_area_size(40 + longest * 22)
        .build_cartesian_2d(-1.05_f64..1.05_f64, -1_i32..n)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Spearman correlation coefficient")
        .y_desc("taxon")
        .y_labels(points.len() + 2)
        .y_label_formatter(&|idx: &i32| {
            usize::try_from(*idx)
                .ok()
                .and_then(|i| names.get(i))
                .map(|s| (*s).to_string())
                .unwrap_or_default()
        })
        .label_style(("sans-serif", 36))
        .axis_desc_style(("sans-serif", 42))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            points
                .iter()
                .zip(0_i32..)
                .map(|(&(_, corr, p), y)| Circle::new((corr, y), 18, shade(p).filled())),
        )
        .map_err(plot_err)?;

    for (label, p) in [("min", p_min), ("max", p_max)] {
        let color = shade(p);
        chart
            .draw_series(std::iter::empty::<Circle<(f64, i32), i32>>())
            .map_err(plot_err)?
            .label(format!("weight_p_adj {label} = {p:.2e}"))
            .legend(move |(x, y)| Circle::new((x, y), 14, color.filled()));
    }

    chart
        .configure_series_labels()
        .label_font(("sans-serif", 36))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
