//! Scale domain sweep and the per-domain convergence loop.

use crate::{
    classifier::{
        classify_points, CallSite, ClassificationResult, ClassifierParams, FilterDirection,
        OutlierClassifier,
    },
    point::PointSet,
    schedule::{Resolution, ScaleDomain},
    MccError,
};
use log::{debug, info};
use serde::Serialize;

/// Resolution used when none was configured and the input's extent is
/// degenerate.
const FALLBACK_RESOLUTION: f64 = 1.0;

/// Upper bound on the number of scale domains.
pub const MAX_SCALE_DOMAINS: usize = 100;

/// A validated multiscale curvature classification run.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    scale_domains: usize,
    curvature_tolerance: f64,
    convergence_threshold: f64,
    tension: f64,
    grid_density: u32,
    filter: FilterDirection,
    resolution: Option<Resolution>,
}

/// Outcome of a successful sweep.
#[derive(Debug, Clone)]
pub struct SweepOutput {
    /// Points never classified as non-ground.
    pub ground: PointSet,

    /// Every point classified as non-ground, in classification order.
    pub non_ground: PointSet,

    pub report: SweepReport,
}

/// Summary of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub input: usize,
    pub ground: usize,
    pub non_ground: usize,
    pub classifier_calls: usize,
    pub domains: Vec<DomainReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainReport {
    #[serde(flatten)]
    pub domain: ScaleDomain,
    /// Points classified as non-ground in this domain.
    pub non_ground: usize,
    pub iterations: Vec<IterationStats>,
}

/// What happened during a single classifier call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationStats {
    pub domain: usize,
    pub iteration: usize,
    /// Ground candidates entering this iteration.
    pub points_in: usize,
    /// Points newly classified as non-ground.
    pub non_ground: usize,
    /// `non_ground / points_in`.
    pub ratio: f64,
}

impl Sweep {
    pub fn builder() -> SweepBuilder {
        SweepBuilder {
            scale_domains: 3,
            curvature_tolerance: 0.3,
            convergence_threshold: 0.1,
            tension: 2.0,
            grid_density: 10,
            filter: FilterDirection::Positive,
            resolution: None,
        }
    }

    pub fn scale_domains(&self) -> usize {
        self.scale_domains
    }

    /// Returns the resolution targeted by the middle scale domain for
    /// `points`.
    pub fn target_resolution(&self, points: &PointSet) -> Resolution {
        self.resolution.unwrap_or_else(|| {
            let spacing = points.mean_spacing().unwrap_or(FALLBACK_RESOLUTION);
            Resolution::new(spacing, spacing)
        })
    }

    /// Classifies `points` into ground and non-ground.
    pub fn run<C>(&self, points: PointSet, classifier: &mut C) -> Result<SweepOutput, MccError>
    where
        C: OutlierClassifier + ?Sized,
    {
        self.run_with(points, classifier, |_| ())
    }

    /// Same as [`Sweep::run`], calling `observer` after every classifier
    /// call.
    pub fn run_with<C, F>(
        &self,
        points: PointSet,
        classifier: &mut C,
        mut observer: F,
    ) -> Result<SweepOutput, MccError>
    where
        C: OutlierClassifier + ?Sized,
        F: FnMut(&IterationStats),
    {
        let input = points.len();
        let target = self.target_resolution(&points);
        let domains = ScaleDomain::schedule(self.scale_domains, target, self.curvature_tolerance);

        let mut current = points;
        let mut non_ground = PointSet::new();
        let mut reports = Vec::with_capacity(self.scale_domains);

        for domain in domains {
            info!(
                "scale domain {}/{}; res: {} x {}, t: {}, points: {}",
                domain.index,
                self.scale_domains,
                domain.resolution.x,
                domain.resolution.y,
                domain.curvature_tolerance,
                current.len()
            );
            let params = ClassifierParams {
                resolution: domain.resolution,
                curvature_tolerance: domain.curvature_tolerance,
                tension: self.tension,
                grid_density: self.grid_density,
                filter: self.filter,
            };
            let outcome = self.converge(domain.index, current, &params, classifier, &mut observer)?;
            reports.push(DomainReport {
                domain,
                non_ground: outcome.non_ground.len(),
                iterations: outcome.iterations,
            });
            non_ground.append(outcome.non_ground);
            current = outcome.remaining;
        }

        let report = SweepReport {
            input,
            ground: current.len(),
            non_ground: non_ground.len(),
            classifier_calls: reports.iter().map(|d| d.iterations.len()).sum(),
            domains: reports,
        };

        Ok(SweepOutput {
            ground: current,
            non_ground,
            report,
        })
    }
}

/// Private API.
impl Sweep {
    /// Repeatedly classifies what is left of `points` at a fixed scale
    /// domain until the share of newly found non-ground points drops to
    /// the convergence threshold or nothing is left.
    fn converge<C, F>(
        &self,
        domain: usize,
        points: PointSet,
        params: &ClassifierParams,
        classifier: &mut C,
        observer: &mut F,
    ) -> Result<DomainOutcome, MccError>
    where
        C: OutlierClassifier + ?Sized,
        F: FnMut(&IterationStats),
    {
        let mut current = points;
        let mut non_ground = PointSet::new();
        let mut iterations = Vec::new();
        let mut state = ConvergenceState::new(current.len());

        while !state.is_converged(self.convergence_threshold) {
            let site = CallSite {
                domain,
                iteration: iterations.len() + 1,
            };
            let points_in = current.len();
            let ClassificationResult {
                ground_candidate,
                non_ground: found,
            } = classify_points(classifier, &current, params, site)?;

            state.advance(points_in, found.len());
            let stats = IterationStats {
                domain,
                iteration: site.iteration,
                points_in,
                non_ground: found.len(),
                ratio: state.ratio,
            };
            debug!(
                "converge; domain: {}, iteration: {}, ratio: {:.4}, remaining: {}",
                domain, site.iteration, stats.ratio, state.remaining
            );
            observer(&stats);
            iterations.push(stats);

            non_ground.append(found);
            current = ground_candidate;
        }

        Ok(DomainOutcome {
            remaining: current,
            non_ground,
            iterations,
        })
    }
}

struct DomainOutcome {
    remaining: PointSet,
    non_ground: PointSet,
    iterations: Vec<IterationStats>,
}

/// Convergence bookkeeping for one scale domain.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ConvergenceState {
    /// Ground candidates left for the next iteration.
    remaining: usize,
    /// Share of the last iteration's input classified as non-ground.
    ratio: f64,
}

impl ConvergenceState {
    fn new(remaining: usize) -> Self {
        let ratio = if remaining == 0 { 0.0 } else { f64::INFINITY };
        Self { remaining, ratio }
    }

    fn advance(&mut self, points_in: usize, non_ground: usize) {
        self.remaining = points_in - non_ground;
        self.ratio = if points_in == 0 {
            0.0
        } else {
            non_ground as f64 / points_in as f64
        };
    }

    fn is_converged(&self, threshold: f64) -> bool {
        self.remaining == 0 || self.ratio <= threshold
    }
}

pub struct SweepBuilder {
    /// Number of scale domains (defaults to 3).
    scale_domains: usize,

    /// Curvature tolerance of the first scale domain (defaults to
    /// 0.3).
    curvature_tolerance: f64,

    /// Convergence threshold (defaults to 0.1).
    convergence_threshold: f64,

    /// Spline tension (defaults to 2).
    tension: f64,

    /// Interpolation grid density (defaults to 10).
    grid_density: u32,

    /// Outlier direction (defaults to positive).
    filter: FilterDirection,

    /// Resolution of the middle scale domain (defaults to the input's
    /// mean point spacing).
    resolution: Option<Resolution>,
}

impl SweepBuilder {
    #[must_use]
    pub fn scale_domains(mut self, nl: usize) -> Self {
        self.scale_domains = nl;
        self
    }

    #[must_use]
    pub fn curvature_tolerance(mut self, t: f64) -> Self {
        self.curvature_tolerance = t;
        self
    }

    #[must_use]
    pub fn convergence_threshold(mut self, j: f64) -> Self {
        self.convergence_threshold = j;
        self
    }

    #[must_use]
    pub fn tension(mut self, f: f64) -> Self {
        self.tension = f;
        self
    }

    #[must_use]
    pub fn grid_density(mut self, s: u32) -> Self {
        self.grid_density = s;
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: FilterDirection) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn build(&self) -> Result<Sweep, MccError> {
        if self.scale_domains < 1 {
            return Err(param("nl", "must be at least 1"));
        }
        if self.scale_domains > MAX_SCALE_DOMAINS {
            return Err(MccError::Param(
                "nl",
                format!("must be at most {MAX_SCALE_DOMAINS}"),
            ));
        }
        if !positive(self.curvature_tolerance) {
            return Err(param("t", "must be greater than 0"));
        }
        if !positive(self.convergence_threshold) {
            return Err(param("j", "must be greater than 0"));
        }
        if !positive(self.tension) {
            return Err(param("f", "must be greater than 0"));
        }
        if self.grid_density == 0 {
            return Err(param("s", "must be greater than 0"));
        }
        if let Some(res) = self.resolution {
            if !positive(res.x) {
                return Err(param("ew_res", "must be greater than 0"));
            }
            if !positive(res.y) {
                return Err(param("ns_res", "must be greater than 0"));
            }
        }

        Ok(Sweep {
            scale_domains: self.scale_domains,
            curvature_tolerance: self.curvature_tolerance,
            convergence_threshold: self.convergence_threshold,
            tension: self.tension,
            grid_density: self.grid_density,
            filter: self.filter,
            resolution: self.resolution,
        })
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn param(name: &'static str, msg: &str) -> MccError {
    MccError::Param(name, msg.to_string())
}
