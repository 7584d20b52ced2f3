use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MccError {
    #[error("invalid parameter '{0}': {1}")]
    Param(&'static str, String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("input {0} not found")]
    InputNotFound(PathBuf),

    #[error("input {0} contains no points")]
    EmptyInput(PathBuf),

    #[error("{path}:{line}: {msg}")]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("{0}")]
    GeoJson(#[from] geojson::Error),

    #[error("classifier '{program}' failed: {msg}")]
    External { program: String, msg: String },

    #[error("scale domain {domain}, iteration {iteration}: {source}")]
    Classifier {
        domain: usize,
        iteration: usize,
        source: Box<MccError>,
    },

    #[error(
        "scale domain {domain}, iteration {iteration}: classifier returned {ground} ground + {non_ground} non-ground points for {input} input points"
    )]
    Conservation {
        domain: usize,
        iteration: usize,
        input: usize,
        ground: usize,
        non_ground: usize,
    },
}
