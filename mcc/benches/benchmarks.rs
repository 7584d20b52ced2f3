use criterion::{criterion_group, criterion_main, Criterion};
use mcc::{
    ClassificationResult, ClassifierParams, LidarPoint, MccError, OutlierClassifier, PointSet,
    Resolution, Sweep,
};

/// Flags up to 5% of its input per call: every point more than the
/// curvature tolerance above a flat surface at `z = 0`.
struct Flat;

impl OutlierClassifier for Flat {
    fn classify(
        &mut self,
        points: &PointSet,
        params: &ClassifierParams,
    ) -> Result<ClassificationResult, MccError> {
        let budget = points.len() / 20 + 1;
        let mut result = ClassificationResult::default();
        let mut flagged = Vec::new();
        let mut kept = Vec::new();
        for p in points {
            if p.z > params.curvature_tolerance && flagged.len() < budget {
                flagged.push(*p);
            } else {
                kept.push(*p);
            }
        }
        result.non_ground = PointSet::from(flagged);
        result.ground_candidate = PointSet::from(kept);
        Ok(result)
    }
}

fn cloud(side: usize) -> PointSet {
    (0..side * side)
        .map(|i| {
            let (x, y) = ((i % side) as f64, (i / side) as f64);
            let z = if i % 7 == 0 { 12.0 } else { 0.0 };
            LidarPoint::new(x, y, z)
        })
        .collect()
}

fn sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sweep");

    let sweep = Sweep::builder()
        .resolution(Resolution::new(1.0, 1.0))
        .convergence_threshold(0.01)
        .build()
        .unwrap();

    for side in [100, 300] {
        let points = cloud(side);
        group.bench_with_input(format!("{side}x{side}"), &points, |b, points| {
            b.iter(|| sweep.run(points.clone(), &mut Flat).unwrap())
        });
    }
}

criterion_group!(benches, sweep);
criterion_main!(benches);
