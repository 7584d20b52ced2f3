use clap::Parser;
use mcc::external::DEFAULT_PROGRAM;
use std::path::PathBuf;

/// Separate ground from non-ground LiDAR returns with multiscale
/// curvature classification.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input point file (`.txt`/`.csv`/`.xyz` or `.geojson`).
    #[arg(long)]
    pub input: PathBuf,

    /// Output file for ground points.
    #[arg(long)]
    pub ground: PathBuf,

    /// Output file for non-ground points.
    #[arg(long)]
    pub nonground: PathBuf,

    /// Number of scale domains.
    #[arg(long, default_value_t = 3)]
    pub nl: usize,

    /// Curvature tolerance of the first scale domain.
    #[arg(short, default_value_t = 0.3)]
    pub t: f64,

    /// Convergence threshold.
    #[arg(short, default_value_t = 0.1)]
    pub j: f64,

    /// Spline tension.
    #[arg(short, default_value_t = 2.0)]
    pub f: f64,

    /// Interpolation grid density.
    #[arg(short, default_value_t = 10)]
    pub s: u32,

    /// Filter negative outliers instead of positive ones.
    #[arg(short)]
    pub n: bool,

    /// East-west resolution of the middle scale domain. Defaults to
    /// the input's mean point spacing.
    #[arg(long, requires = "ns_res")]
    pub ew_res: Option<f64>,

    /// North-south resolution of the middle scale domain. Defaults to
    /// the input's mean point spacing.
    #[arg(long, requires = "ew_res")]
    pub ns_res: Option<f64>,

    /// Outlier detection program.
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    pub classifier: PathBuf,

    /// Argument passed to the outlier detection program ahead of the
    /// generated ones. May be repeated.
    #[arg(long = "classifier-arg", allow_hyphen_values = true)]
    pub classifier_args: Vec<String>,

    /// Write a JSON report of every scale domain and iteration.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Hide the progress bar.
    #[arg(short, long)]
    pub quiet: bool,
}
