//! The seam between the sweep and the outlier detection primitive.

use crate::{point::PointSet, schedule::Resolution, MccError};
use log::debug;
use serde::Serialize;
use std::fmt;

/// Which side of the interpolated surface counts as an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDirection {
    /// Points above the surface (vegetation, buildings).
    #[default]
    Positive,
    /// Points below the surface.
    Negative,
}

impl fmt::Display for FilterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("positive"),
            Self::Negative => f.write_str("negative"),
        }
    }
}

/// Parameters handed to the classifier for a single call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    pub resolution: Resolution,
    pub curvature_tolerance: f64,
    pub tension: f64,
    /// Interpolation grid density.
    pub grid_density: u32,
    pub filter: FilterDirection,
}

/// Partition of a classifier's input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationResult {
    /// Points still considered ground.
    pub ground_candidate: PointSet,
    /// Points classified as objects above (or below) the terrain.
    pub non_ground: PointSet,
}

impl ClassificationResult {
    pub fn len(&self) -> usize {
        self.ground_candidate.len() + self.non_ground.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ground_candidate.is_empty() && self.non_ground.is_empty()
    }
}

/// Something which separates ground from non-ground points.
///
/// Implementations are called synchronously and may be stateful; any
/// error returned is fatal for the whole run.
pub trait OutlierClassifier {
    fn classify(
        &mut self,
        points: &PointSet,
        params: &ClassifierParams,
    ) -> Result<ClassificationResult, MccError>;
}

/// Location of a classifier call within the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub domain: usize,
    pub iteration: usize,
}

/// Runs `classifier` over `points`.
///
/// Empty inputs short-circuit to an empty result without calling the
/// classifier. Errors are tagged with `site`, and a result which does
/// not account for every input point exactly once is rejected.
pub fn classify_points<C>(
    classifier: &mut C,
    points: &PointSet,
    params: &ClassifierParams,
    site: CallSite,
) -> Result<ClassificationResult, MccError>
where
    C: OutlierClassifier + ?Sized,
{
    if points.is_empty() {
        return Ok(ClassificationResult::default());
    }

    let result = classifier
        .classify(points, params)
        .map_err(|e| MccError::Classifier {
            domain: site.domain,
            iteration: site.iteration,
            source: Box::new(e),
        })?;

    if result.len() != points.len() {
        return Err(MccError::Conservation {
            domain: site.domain,
            iteration: site.iteration,
            input: points.len(),
            ground: result.ground_candidate.len(),
            non_ground: result.non_ground.len(),
        });
    }

    debug!(
        "classify; domain: {}, iteration: {}, in: {}, non_ground: {}",
        site.domain,
        site.iteration,
        points.len(),
        result.non_ground.len()
    );

    Ok(result)
}
