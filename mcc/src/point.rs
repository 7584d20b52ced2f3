use geo::{
    geometry::{Coord, MultiPoint, Rect},
    BoundingRect,
};
use serde::Serialize;

/// A single LiDAR return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LidarPoint {
    pub x: f64,
    pub y: f64,
    /// Elevation. Two-dimensional inputs carry `0.0`.
    pub z: f64,
}

impl LidarPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal position of this return.
    pub fn coord(&self) -> Coord {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

/// An ordered collection of points.
///
/// No uniqueness constraint is implied: the same coordinates may appear
/// more than once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet(Vec<LidarPoint>);

impl PointSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LidarPoint> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LidarPoint] {
        &self.0
    }

    /// Moves every point of `other` onto the end of `self`.
    pub fn append(&mut self, mut other: PointSet) {
        self.0.append(&mut other.0);
    }

    /// Horizontal extent of this set, `None` when empty.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let multi: MultiPoint = self.iter().map(|p| geo::Point::from(p.coord())).collect();
        multi.bounding_rect()
    }

    /// Average horizontal distance between neighboring points, assuming
    /// they are spread evenly over the bounding rectangle.
    ///
    /// Returns `None` when the set is empty or its extent has no area.
    pub fn mean_spacing(&self) -> Option<f64> {
        let rect = self.bounding_rect()?;
        let area = rect.width() * rect.height();
        if area > 0.0 {
            Some((area / self.len() as f64).sqrt())
        } else {
            None
        }
    }
}

impl From<Vec<LidarPoint>> for PointSet {
    fn from(points: Vec<LidarPoint>) -> Self {
        Self(points)
    }
}

impl FromIterator<LidarPoint> for PointSet {
    fn from_iter<I: IntoIterator<Item = LidarPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PointSet {
    type Item = LidarPoint;
    type IntoIter = std::vec::IntoIter<LidarPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a LidarPoint;
    type IntoIter = std::slice::Iter<'a, LidarPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
