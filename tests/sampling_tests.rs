#[cfg(test)]
mod tests {
    use kmedoids::clustering::{sample_by_size, sample_distinct, DataSource};
    use kmedoids::core::ClusteringError;
    use kmedoids::distances::FeatureVector;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_size_in_expectation() {
        let source: Vec<u32> = (0..10_000).collect();
        let runs = 50;
        let total: usize = (0..runs)
            .map(|seed| sample_by_size(&source, 1000, seed).len())
            .sum();
        let mean = total as f64 / runs as f64;
        assert!((mean - 1000.0).abs() < 30.0, "mean sample size {}", mean);
    }

    #[test]
    fn test_sample_keeps_source_order() {
        let source: Vec<u32> = (0..5_000).collect();
        let sample = sample_by_size(&source, 500, 4);
        assert!(sample.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sample, sample_by_size(&source, 500, 4));
    }

    #[test]
    fn test_sample_edges() {
        let source: Vec<u32> = (0..100).collect();
        assert_eq!(sample_by_size(&source, 100, 1), source);
        assert_eq!(sample_by_size(&source, 1_000, 1), source);
        assert!(sample_by_size(&source, 0, 1).is_empty());

        let empty: Vec<u32> = Vec::new();
        assert!(sample_by_size(&empty, 10, 1).is_empty());
        assert_eq!(source.count(), 100);
    }

    #[test]
    fn test_sample_distinct() {
        let mut rng = SmallRng::seed_from_u64(12);
        // Heavily duplicated data forces the exact fallback
        let data: Vec<u32> = (0..200).map(|i| if i < 195 { 0 } else { i }).collect();
        let picked = sample_distinct(&data, 6, &mut rng).unwrap();
        let unique: HashSet<u32> = picked.iter().copied().collect();
        assert_eq!(picked.len(), 6);
        assert_eq!(unique.len(), 6);
        assert!(picked.iter().all(|p| data.contains(p)));

        assert_eq!(
            sample_distinct(&data, 7, &mut rng),
            Err(ClusteringError::InsufficientDistinct {
                requested: 7,
                available: 6
            })
        );
        assert_eq!(sample_distinct(&data, 0, &mut rng), Ok(Vec::new()));
    }

    #[test]
    fn test_sample_distinct_signed_zero() {
        let mut rng = SmallRng::seed_from_u64(3);
        let data = vec![
            FeatureVector::from(vec![0.0, 2.0]),
            FeatureVector::from(vec![-0.0, 2.0]),
            FeatureVector::from(vec![0.0, 2.0]),
        ];
        assert_eq!(
            sample_distinct(&data, 2, &mut rng),
            Err(ClusteringError::InsufficientDistinct {
                requested: 2,
                available: 1
            })
        );
    }
}
