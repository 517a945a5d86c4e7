use lidsor::{filter_lidsor, LidsorConfig, PointCloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional YAML config as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => LidsorConfig::from_yaml(path)?,
        None => LidsorConfig::default(),
    };

    // Dense cube of 1000 points plus 10 stray returns far away
    let mut rng = StdRng::seed_from_u64(7);
    let mut rows = Vec::with_capacity(1010 * 4);
    for i in 0..1010 {
        let offset = if i < 1000 { 0.0 } else { 100.0 };
        rows.push(offset + rng.gen_range(0.0f32..1.0));
        rows.push(offset + rng.gen_range(0.0f32..1.0));
        rows.push(offset + rng.gen_range(0.0f32..1.0));
        rows.push(rng.gen_range(0.0f32..255.0));
    }
    let cloud = PointCloud::from_rows(&rows, 4)?;
    println!("Original cloud: {} points", cloud.len());

    let result = filter_lidsor(&cloud, &config.filter)?;
    println!(
        "Kept {} points, removed {}: {:?}",
        result.kept_indices.len(),
        result.removed_indices.len(),
        result.removed_indices
    );
    if let Some(summary) = result.summary {
        println!(
            "mean={:.4} std_dev={:.4} threshold={:.4}",
            summary.mean, summary.std_dev, summary.threshold
        );
    }
    Ok(())
}
