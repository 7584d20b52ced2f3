//! # Multiscale Curvature Classification
//!
//! `mcc` separates ground from non-ground returns in a LiDAR point
//! cloud by repeatedly handing the still-unclassified points to an
//! outlier detection primitive, over several scale domains, until each
//! domain stops finding new outliers.
//!
//! The outlier detection itself is delegated to an
//! [`OutlierClassifier`], typically an [`ExternalClassifier`] wrapping a
//! GIS command.
//!
//! # References
//!
//! 1. Evans, J. S.; Hudak, A. T. (2007). A Multiscale Curvature
//!    Algorithm for Classifying Discrete Return LiDAR in Forested
//!    Environments. IEEE Transactions on Geoscience and Remote Sensing
//!    45(4): 1029-1038.

mod classifier;
mod error;
pub mod external;
pub mod io;
mod point;
pub mod schedule;
mod scratch;
mod sweep;

pub use crate::{
    classifier::{
        classify_points, CallSite, ClassificationResult, ClassifierParams, FilterDirection,
        OutlierClassifier,
    },
    error::MccError,
    external::ExternalClassifier,
    point::{LidarPoint, PointSet},
    schedule::{Resolution, ScaleDomain},
    scratch::ScratchSpace,
    sweep::{
        DomainReport, IterationStats, Sweep, SweepBuilder, SweepOutput, SweepReport,
        MAX_SCALE_DOMAINS,
    },
};
pub use geo;
