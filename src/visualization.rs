use crate::clustering::model::closest;
use crate::clustering::KMedoidsModel;
use colored::Colorize;
use std::fmt;

/// Prints per-cluster sizes and distances to the medoid for `data` under `model`.
pub fn print_cluster_analysis<T>(model: &KMedoidsModel<T>, data: &[T]) {
    println!("\n{}", "=== Cluster Analysis ===".bold());

    let stats = calculate_cluster_stats(model, data);
    print_summary_statistics(&stats);
    print_detailed_cluster_info(&stats);
}

fn calculate_cluster_stats<T>(model: &KMedoidsModel<T>, data: &[T]) -> Vec<ClusterStats> {
    let mut stats: Vec<ClusterStats> = (0..model.k())
        .map(|cluster_id| ClusterStats {
            cluster_id,
            size: 0,
            avg_distance_to_medoid: 0.0,
            sum_distance_to_medoid: 0.0,
            max_distance_to_medoid: 0.0,
        })
        .collect();

    for x in data {
        let (idx, dist) = closest(x, model.medoids(), model.metric().as_ref());
        if let Some(stat) = stats.get_mut(idx) {
            stat.size += 1;
            stat.sum_distance_to_medoid += dist;
            stat.max_distance_to_medoid = stat.max_distance_to_medoid.max(dist);
        }
    }

    for stat in stats.iter_mut().filter(|s| s.size > 0) {
        stat.avg_distance_to_medoid = stat.sum_distance_to_medoid / stat.size as f64;
    }
    stats
}

#[derive(Debug)]
struct ClusterStats {
    cluster_id: usize,
    size: usize,
    avg_distance_to_medoid: f64,
    sum_distance_to_medoid: f64,
    max_distance_to_medoid: f64,
}

impl fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cluster {}: {} points, Avg Distance: {:.4}, Sum Distance: {:.4}, Max Distance: {:.4}",
            self.cluster_id,
            self.size,
            self.avg_distance_to_medoid,
            self.sum_distance_to_medoid,
            self.max_distance_to_medoid
        )
    }
}

fn print_summary_statistics(stats: &[ClusterStats]) {
    println!("\n{}", "Summary Statistics:".bold());
    println!("Total Clusters: {}", stats.len());

    let total_points: usize = stats.iter().map(|s| s.size).sum();
    if stats.is_empty() || total_points == 0 {
        println!("Total Points: 0");
        return;
    }
    let avg_cluster_size = total_points as f64 / stats.len() as f64;
    let total_sum_distance: f64 = stats.iter().map(|s| s.sum_distance_to_medoid).sum();
    let overall_avg_distance = total_sum_distance / total_points as f64;

    println!("Total Points: {}", total_points);
    println!("Average Cluster Size: {:.2}", avg_cluster_size);
    println!("Total Sum of Distances: {:.4}", total_sum_distance);
    println!("Overall Average Distance: {:.4}", overall_avg_distance);
}

fn print_detailed_cluster_info(stats: &[ClusterStats]) {
    println!("\n{}", "Detailed Cluster Information:".bold());
    let total_points: usize = stats.iter().map(|s| s.size).sum();
    let expected = total_points as f64 / stats.len().max(1) as f64;
    for stat in stats {
        let info = format!("{}", stat);
        // Colour by how far the cluster size is from an even split
        match stat.size as f64 {
            size if size < expected / 2.0 => println!("{}", info.red()),
            size if size > expected * 2.0 => println!("{}", info.yellow()),
            _ => println!("{}", info.green()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn abs_diff(a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    #[test]
    fn test_cluster_stats() {
        let model = KMedoidsModel::new(vec![1.0, 10.0, 50.0], Arc::new(abs_diff));
        let data = vec![0.0, 1.0, 3.0, 9.0, 12.0];
        let stats = calculate_cluster_stats(&model, &data);

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].size, 3);
        assert!((stats[0].sum_distance_to_medoid - 3.0).abs() < 1e-12);
        assert!((stats[0].avg_distance_to_medoid - 1.0).abs() < 1e-12);
        assert_eq!(stats[0].max_distance_to_medoid, 2.0);
        assert_eq!(stats[1].size, 2);
        assert_eq!(stats[2].size, 0);
        assert_eq!(stats[2].avg_distance_to_medoid, 0.0);
    }
}
