#[cfg(test)]
mod tests {
    use kmedoids::distances::{
        ChebyshevDistance, DistanceMetric, EuclideanDistance, FeatureVector, ManhattanDistance,
    };
    use ndarray::array;

    #[test]
    fn test_euclidean_distance() {
        let point1 = FeatureVector::new(array![1.0, 2.0, 3.0]);
        let point2 = FeatureVector::new(array![4.0, 5.0, 6.0]);
        let distance = EuclideanDistance.compute(&point1, &point2);
        assert!((distance - 5.19615242).abs() < 1e-6);
    }

    #[test]
    fn test_manhattan_distance() {
        let point1 = FeatureVector::new(array![1.0, 2.0, 3.0]);
        let point2 = FeatureVector::new(array![4.0, 5.0, 6.0]);
        assert_eq!(ManhattanDistance.compute(&point1, &point2), 9.0);
    }

    #[test]
    fn test_chebyshev_distance() {
        let point1 = FeatureVector::new(array![1.0f32, 2.0, 3.0]);
        let point2 = FeatureVector::new(array![4.0f32, 7.0, 6.0]);
        assert_eq!(ChebyshevDistance.compute(&point1, &point2), 5.0);
    }

    #[test]
    fn test_closure_metric() {
        let hamming = |a: &String, b: &String| {
            a.chars().zip(b.chars()).filter(|(x, y)| x != y).count() as f64
        };
        let a = "karolin".to_string();
        let b = "kathrin".to_string();
        assert_eq!(hamming.compute(&a, &b), 3.0);
        assert_eq!(hamming.compute(&a, &a), 0.0);
    }
}
