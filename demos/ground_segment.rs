use lidsor::{segment_and_filter, LidsorConfig, PointCloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let config = LidsorConfig::from_yaml_str("filter:\n  k: 10\n  s: 1.0\n")?;

    // Road surface, a parked car and some airborne noise
    let mut rng = StdRng::seed_from_u64(1);
    let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());
    for _ in 0..10_000 {
        x.push(rng.gen_range(-15.0f32..15.0));
        y.push(rng.gen_range(-15.0f32..15.0));
        z.push(rng.gen_range(-0.03f32..0.03));
    }
    for _ in 0..1_500 {
        x.push(4.0 + rng.gen_range(-2.0f32..2.0));
        y.push(-3.0 + rng.gen_range(-0.9f32..0.9));
        z.push(rng.gen_range(0.4f32..1.5));
    }
    for _ in 0..100 {
        x.push(rng.gen_range(-20.0f32..20.0));
        y.push(rng.gen_range(-20.0f32..20.0));
        z.push(rng.gen_range(2.0f32..8.0));
    }
    let cloud = PointCloud::from_xyz(x, y, z);
    println!("Original cloud: {} points", cloud.len());

    let out = segment_and_filter(&cloud, &config.segmenter(), &config.filter)?;
    println!(
        "Ground: {} points, non-ground kept: {} of {}",
        out.partition.ground().len(),
        out.filtered.kept_indices.len(),
        out.partition.nonground().len()
    );
    println!(
        "Merged cloud: {} points ({} removed)",
        out.merged.len(),
        out.removed_input_indices().len()
    );
    Ok(())
}
