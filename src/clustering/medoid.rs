use crate::distances::DistanceMetric;
use log::trace;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Finds the index of the medoid of `cluster`: the element whose summed
/// distance to every element of the cluster is smallest. Returns the index and
/// that sum, or `None` for an empty cluster.
///
/// Candidates are scored in parallel on the current rayon pool; run it inside
/// `ThreadPool::install` to bound the width. Each candidate's sum is taken in
/// cluster order and equal sums resolve to the lowest index, so the result is
/// the same whatever the scheduling.
pub fn medoid_index<T, M>(cluster: &[T], metric: &M) -> Option<(usize, f64)>
where
    T: Sync,
    M: DistanceMetric<T> + ?Sized,
{
    let best = (0..cluster.len())
        .into_par_iter()
        .map(|candidate| {
            let total: f64 = cluster
                .iter()
                .map(|x| metric.compute(&cluster[candidate], x))
                .sum();
            (candidate, total)
        })
        .reduce_with(lowest_cost);

    if let Some((idx, total)) = best {
        trace!(
            "Medoid of {} elements is #{} with total distance {}",
            cluster.len(),
            idx,
            total
        );
    }
    best
}

/// The medoid element itself.
pub fn medoid<'a, T, M>(cluster: &'a [T], metric: &M) -> Option<&'a T>
where
    T: Sync,
    M: DistanceMetric<T> + ?Sized,
{
    medoid_index(cluster, metric).map(|(idx, _)| &cluster[idx])
}

/// Order-independent reduction: smaller cost wins, then smaller index.
/// NaN costs sort after every number.
fn lowest_cost(a: (usize, f64), b: (usize, f64)) -> (usize, f64) {
    match a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)) {
        Ordering::Greater => b,
        _ => a,
    }
}
