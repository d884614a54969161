//! Cluster a synthetic table with automatic cluster-count selection
//!
//! ```sh
//! cargo run -p clusterrows --example cluster_table
//! ```

use clusterrows::prelude::*;
use scirs2_core::random::{Distribution, RandNormal as Normal, SeedableRng, StdRng};

fn main() -> anyhow::Result<()> {
    let centers = [[0.0, 0.0, 0.0], [6.0, 1.0, -2.0], [-3.0, 7.0, 4.0]];
    let rows = 450;
    let cols = 3;

    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::new(0.0, 1.0).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let data: Vec<f64> = (0..rows)
        .flat_map(|row| centers[row % 3])
        .map(|c| c + noise.sample(&mut rng))
        .collect();

    let request = ClusterRequest::new(0, 10, 100, false).with_seed(7);
    let mut labels = vec![0; rows];
    let mut confidences = vec![0.0; rows];

    let started = std::time::Instant::now();
    let outcome = cluster_rows(&data, rows, cols, &request, &mut labels, &mut confidences)?;
    let elapsed = started.elapsed();

    if let ClusterOutcome::Trained(report) = &outcome {
        println!("Candidates:");
        for candidate in &report.candidates {
            match (candidate.score, &candidate.error) {
                (Some(score), _) => println!("  k={:<2} score={:.4}", candidate.clusters, score),
                (None, Some(e)) => println!("  k={:<2} failed: {}", candidate.clusters, e),
                (None, None) => println!("  k={:<2} skipped", candidate.clusters),
            }
        }
        println!(
            "Selected {} clusters in {:.2?}",
            report.selected_clusters, elapsed
        );
    }

    let mut sizes = std::collections::BTreeMap::new();
    for &label in &labels {
        *sizes.entry(label).or_insert(0usize) += 1;
    }
    println!("Cluster sizes: {:?}", sizes);

    let mean_confidence = confidences.iter().sum::<f64>() / rows as f64;
    println!("Mean confidence: {:.3}", mean_confidence);

    Ok(())
}
