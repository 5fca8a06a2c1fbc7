//! Command-line interface definitions and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Customer segmentation: K-Means training and segment prediction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the persisted artifacts
    #[arg(long, global = true, default_value = ".")]
    pub artifacts_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the offline training pipeline: scale, cluster, persist, plot
    Train {
        /// Path to the customer CSV
        #[arg(short, long, default_value = "Mall_Customers.csv")]
        input: PathBuf,

        /// Output path for the cluster scatter plot
        #[arg(short, long, default_value = "static/cluster.png")]
        plot: PathBuf,

        /// Maximum iterations for K-Means convergence
        #[arg(long, default_value = "300")]
        max_iters: usize,

        /// Convergence tolerance for K-Means
        #[arg(long, default_value = "1e-4")]
        tolerance: f64,

        /// RNG seed for reproducible centroid initialization
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Predict the segment for a single (income, score) pair
    Predict {
        /// Annual income in k$
        income: String,

        /// Spending score (1-100)
        score: String,
    },

    /// Serve predictions over HTTP
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Directory of static assets (form page, cluster plot)
        #[arg(long, default_value = "static")]
        static_dir: PathBuf,
    },
}
