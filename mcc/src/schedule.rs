//! Per scale domain cell resolution and curvature tolerance.

use num_traits::{Float, FromPrimitive};
use serde::Serialize;

/// Cell resolution along the east-west (`x`) and north-south (`y`)
/// axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolution<T = f64> {
    pub x: T,
    pub y: T,
}

impl<T> Resolution<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// Returns the resolution to use for scale domain `l` (1-based) out of
/// `nl` domains.
///
/// The domain at `mid = (nl + 1) / 2` (integer division) uses `target`
/// exactly. Domains before it divide `target` by their distance to
/// `mid` plus one; domains after it multiply by the same factor.
pub fn scale_resolution<T>(l: usize, nl: usize, target: Resolution<T>) -> Resolution<T>
where
    T: Float + FromPrimitive,
{
    debug_assert!(l >= 1 && l <= nl);
    let mid = nl / 2 + nl % 2;
    match l.cmp(&mid) {
        std::cmp::Ordering::Less => {
            let divisor = factor::<T>(mid - l + 1);
            Resolution::new(target.x / divisor, target.y / divisor)
        }
        std::cmp::Ordering::Equal => target,
        std::cmp::Ordering::Greater => {
            let multiplier = factor::<T>(l - mid + 1);
            Resolution::new(target.x * multiplier, target.y * multiplier)
        }
    }
}

/// Returns the curvature tolerance for scale domain `l` (1-based).
///
/// Each domain raises the tolerance by a third of `t0`.
pub fn curvature_tolerance<T>(l: usize, t0: T) -> T
where
    T: Float + FromPrimitive,
{
    let step = t0 / factor::<T>(3);
    t0 + factor::<T>(l - 1) * step
}

fn factor<T: FromPrimitive>(n: usize) -> T {
    // Scale domain counts are tiny, any float type represents them.
    T::from_usize(n).expect("usize is representable as a float")
}

/// One pass of the scale sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleDomain {
    /// 1-based position in the sweep.
    pub index: usize,
    pub resolution: Resolution,
    pub curvature_tolerance: f64,
}

impl ScaleDomain {
    /// Returns an iterator over all `nl` scale domains in sweep order.
    pub fn schedule(
        nl: usize,
        target: Resolution,
        t0: f64,
    ) -> impl Iterator<Item = ScaleDomain> {
        (1..=nl).map(move |index| ScaleDomain {
            index,
            resolution: scale_resolution(index, nl, target),
            curvature_tolerance: curvature_tolerance(index, t0),
        })
    }
}
