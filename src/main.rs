//! Segmint entrypoint: offline training, one-shot prediction, and serving.

use anyhow::{Context, Result};
use clap::Parser;
use segmint::{
    artifacts, fit_kmeans, load_training_data, server, viz, Cli, Command, Predictor, RawValue,
    Segment,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Train {
            ref input,
            ref plot,
            max_iters,
            tolerance,
            seed,
        } => run_training(&cli.artifacts_dir, input, plot, max_iters, tolerance, seed),
        Command::Predict {
            ref income,
            ref score,
        } => run_prediction(&cli.artifacts_dir, income, score),
        Command::Serve {
            ref host,
            port,
            ref static_dir,
        } => run_server(&cli.artifacts_dir, host, port, static_dir).await,
    }
}

/// One-shot offline training run: load, scale, cluster, persist, plot.
fn run_training(
    artifacts_dir: &Path,
    input: &Path,
    plot: &Path,
    max_iters: usize,
    tolerance: f64,
    seed: u64,
) -> Result<()> {
    let start_time = Instant::now();

    info!(input = %input.display(), "loading training table");
    let data = load_training_data(input)?;
    info!(samples = data.n_samples(), "table loaded and scaled");

    info!(max_iters, tolerance, seed, "fitting K-Means");
    let model = fit_kmeans(&data, max_iters, tolerance, seed)?;
    info!(inertia = model.inertia, "model fitted");

    artifacts::save_artifacts(artifacts_dir, &data.scaler, &model)
        .context("failed to persist artifacts")?;
    info!(dir = %artifacts_dir.display(), "artifacts written");

    // The plot is a display convenience; a render failure must not undo a
    // successful training run.
    if let Some(parent) = plot.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(error = %e, "could not create plot directory, skipping visualization");
        }
    }
    match viz::render_cluster_plot(&data, &model, plot) {
        Ok(()) => info!(plot = %plot.display(), "cluster plot rendered"),
        Err(e) => warn!(error = %e, "cluster plot rendering failed, continuing"),
    }

    print_training_summary(&data.scaler, &model);
    println!(
        "\nTraining complete in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn print_training_summary(scaler: &segmint::StandardScaler, model: &segmint::KMeansModel) {
    let sizes = model.cluster_sizes();
    let total: usize = sizes.iter().sum();
    let centroids = model.centroids_original(scaler);

    println!("\n=== Segment Summary ===");
    println!("  id | size  | income | score | label");
    println!("  ---|-------|--------|-------|------");
    for (id, segment) in Segment::ALL.iter().enumerate() {
        let pct = (sizes[id] as f64 / total as f64) * 100.0;
        println!(
            "  {:2} | {:4} ({:4.1}%) | {:6.2} | {:5.2} | {}",
            id, sizes[id], pct, centroids[id][0], centroids[id][1], segment.label()
        );
    }
}

/// Predict the segment for a single query against persisted artifacts.
fn run_prediction(artifacts_dir: &Path, income: &str, score: &str) -> Result<()> {
    let predictor = Predictor::load(artifacts_dir)?;

    let prediction = predictor
        .predict(&RawValue::from(income), &RawValue::from(score))
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("Segment:     {}", prediction.label);
    println!("Color:       {}", prediction.color);
    println!("Description: {}", prediction.description);
    println!(
        "Centroid:    income {:.2} k$, score {:.2}",
        prediction.centroid_income, prediction.centroid_score
    );

    Ok(())
}

/// Load artifacts once and serve predictions until interrupted.
async fn run_server(artifacts_dir: &Path, host: &str, port: u16, static_dir: &Path) -> Result<()> {
    // ArtifactError here is fatal: refuse to start serving
    let predictor = Predictor::load(artifacts_dir)?;
    let state = Arc::new(predictor);

    let app = server::create_router(state, static_dir);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "serving predictions");
    println!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
