//! Cluster scatter plot rendering using Plotters.

use crate::data::TrainingData;
use crate::model::KMeansModel;
use crate::segments::Segment;
use plotters::prelude::*;
use std::path::Path;

/// Plot colors per segment id, matching the descriptor table's hex colors.
const SEGMENT_COLORS: [RGBColor; 5] = [
    RGBColor(0x6b, 0x72, 0x80), // Gray
    RGBColor(0x05, 0x96, 0x69), // Green
    RGBColor(0xea, 0x58, 0x0c), // Orange
    RGBColor(0xdc, 0x26, 0x26), // Red
    RGBColor(0x25, 0x63, 0xeb), // Blue
];

/// Render the segmented training table as a 2-D scatter in original units,
/// with the 5 original-unit centroids overlaid as black crosses.
///
/// Callers treat a failure here as non-fatal: the plot is a convenience for
/// the form page, not an artifact the predictor depends on.
pub fn render_cluster_plot(
    data: &TrainingData,
    model: &KMeansModel,
    output_path: &Path,
) -> crate::Result<()> {
    let income: Vec<f64> = data.raw.column(0).to_vec();
    let score: Vec<f64> = data.raw.column(1).to_vec();
    let labels = &model.labels;
    let centroids = model.centroids_original(&data.scaler);

    let income_min = income.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 5.0;
    let income_max = income.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 5.0;
    let score_min = score.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 5.0;
    let score_max = score.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 5.0;

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("K-Means Customer Segmentation", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(income_min..income_max, score_min..score_max)?;

    chart
        .configure_mesh()
        .x_desc("Annual Income (k$)")
        .y_desc("Spending Score (1-100)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // Data points, one series per segment so the legend stays readable
    for (segment_id, segment) in Segment::ALL.iter().enumerate() {
        let color = SEGMENT_COLORS[segment_id];
        chart
            .draw_series(
                income
                    .iter()
                    .zip(score.iter())
                    .zip(labels.iter())
                    .filter(|(_, &label)| label == segment_id)
                    .map(|((&x, &y), _)| Circle::new((x, y), 4, color.filled())),
            )?
            .label(segment.label())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    // Centroids in original units
    chart.draw_series(centroids.iter().map(|&[x, y]| {
        Cross::new((x, y), 8, ShapeStyle::from(&BLACK).stroke_width(3))
    }))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
