use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lidsor::{KdTree, PointCloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_cloud(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let x: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0f32..100.0)).collect();
    let y: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0f32..100.0)).collect();
    let z: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0f32..100.0)).collect();
    PointCloud::from_xyz(x, y, z)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");
    for size in [100_000, 1_000_000] {
        let cloud = random_cloud(size, 42);
        group.bench_with_input(BenchmarkId::new("lidsor", size), &cloud, |b, cloud| {
            b.iter(|| KdTree::build(cloud))
        });
    }
    group.finish();
}

fn bench_knn_excluding(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_knn_excluding");
    let cloud = random_cloud(100_000, 42);
    let tree = KdTree::build(&cloud);
    for k in [10, 30, 50] {
        // Fixed point index; the cloud is random so it sits anywhere
        group.bench_with_input(BenchmarkId::new("lidsor", k), &k, |b, &k| {
            b.iter(|| tree.knn_excluding(500, k))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_knn_excluding);
criterion_main!(benches);
