//! Drawing the in-memory working set and distinct seed elements.

use crate::core::{ClusteringError, ClusteringResult};
use fxhash::FxHashSet;
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::hash::Hash;

/// A collection the trainer can draw its working set from.
///
/// Only these three capabilities are used; how the elements are stored
/// (in memory, on disk, across machines) is up to the implementor.
pub trait DataSource<T> {
    /// Number of elements in the collection.
    fn count(&self) -> usize;

    /// Every element, in collection order.
    fn collect_all(&self) -> Vec<T>;

    /// Independent inclusion of each element with probability `fraction`,
    /// reproducible for a given `seed`.
    fn sample_fraction(&self, fraction: f64, seed: u64) -> Vec<T>;
}

impl<T: Clone> DataSource<T> for [T] {
    fn count(&self) -> usize {
        self.len()
    }

    fn collect_all(&self) -> Vec<T> {
        self.to_vec()
    }

    fn sample_fraction(&self, fraction: f64, seed: u64) -> Vec<T> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let p = fraction.clamp(0.0, 1.0);
        self.iter()
            .filter(|_| rng.random_bool(p))
            .cloned()
            .collect()
    }
}

impl<T: Clone> DataSource<T> for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }

    fn collect_all(&self) -> Vec<T> {
        self.clone()
    }

    fn sample_fraction(&self, fraction: f64, seed: u64) -> Vec<T> {
        self.as_slice().sample_fraction(fraction, seed)
    }
}

/// Samples roughly `target_size` elements from `source`.
///
/// The fraction `target_size / count` is applied as a Bernoulli sample, so the
/// result size only matches `target_size` in expectation. A target of zero
/// gives an empty sample and a target covering the whole source returns all
/// of it.
pub fn sample_by_size<T, S>(source: &S, target_size: usize, seed: u64) -> Vec<T>
where
    S: DataSource<T> + ?Sized,
{
    let count = source.count();
    if count == 0 || target_size == 0 {
        return Vec::new();
    }

    let fraction = (target_size as f64 / count as f64).min(1.0);
    if fraction >= 1.0 {
        return source.collect_all();
    }

    let sample = source.sample_fraction(fraction, seed);
    debug!(
        "Sampled {} of {} elements (fraction {:.4}, target {})",
        sample.len(),
        count,
        fraction,
        target_size
    );
    sample
}

/// Draws `k` distinct elements from `data`.
///
/// Random indices are tried first, up to `2k` draws. If duplicates leave the
/// set short, the rest is chosen exactly from the distinct elements not yet
/// picked. Fails when `data` holds fewer than `k` distinct elements.
pub fn sample_distinct<T, R>(data: &[T], k: usize, rng: &mut R) -> ClusteringResult<Vec<T>>
where
    T: Clone + Eq + Hash,
    R: Rng + ?Sized,
{
    let mut selected: Vec<T> = Vec::with_capacity(k);
    let mut seen: FxHashSet<&T> = FxHashSet::default();

    if !data.is_empty() {
        for _ in 0..2 * k {
            if selected.len() == k {
                break;
            }
            let element = &data[rng.random_range(0..data.len())];
            if seen.insert(element) {
                selected.push(element.clone());
            }
        }
    }

    if selected.len() < k {
        let mut remaining: Vec<&T> = Vec::new();
        for element in data {
            if seen.insert(element) {
                remaining.push(element);
            }
        }

        let needed = k - selected.len();
        if remaining.len() < needed {
            return Err(ClusteringError::InsufficientDistinct {
                requested: k,
                available: selected.len() + remaining.len(),
            });
        }

        debug!(
            "Rejection sampling found {} of {} distinct elements, choosing {} exactly from {}",
            selected.len(),
            k,
            needed,
            remaining.len()
        );
        for idx in choose_distinct_indices(remaining.len(), needed, rng) {
            selected.push(remaining[idx].clone());
        }
    }

    Ok(selected)
}

/// Picks `m` distinct indices out of `0..n` uniformly at random.
///
/// Each round draws whichever side is smaller, the indices to keep or the
/// indices to drop, by bounded rejection sampling. Whatever a round settles is
/// removed from the candidates and the loop continues on the rest.
fn choose_distinct_indices<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..n).collect();
    let mut chosen = Vec::with_capacity(m);
    let mut needed = m.min(n);

    while needed > 0 {
        if needed == candidates.len() {
            chosen.append(&mut candidates);
            break;
        }

        let keep = 2 * needed <= candidates.len();
        let target = if keep {
            needed
        } else {
            candidates.len() - needed
        };

        let mut drawn: FxHashSet<usize> = FxHashSet::default();
        for _ in 0..2 * target {
            if drawn.len() == target {
                break;
            }
            drawn.insert(rng.random_range(0..candidates.len()));
        }

        // Positions are resolved in ascending order so the outcome depends only
        // on the RNG stream, never on hash-set iteration order.
        let (picked, rest): (Vec<(usize, usize)>, Vec<(usize, usize)>) = candidates
            .iter()
            .copied()
            .enumerate()
            .partition(|(pos, _)| drawn.contains(pos));
        let picked: Vec<usize> = picked.into_iter().map(|(_, idx)| idx).collect();
        let rest: Vec<usize> = rest.into_iter().map(|(_, idx)| idx).collect();

        if keep {
            needed -= picked.len();
            chosen.extend(picked);
            candidates = rest;
        } else if picked.len() == target {
            chosen.extend(rest);
            break;
        } else {
            candidates = rest;
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_by_size_edges() {
        let data: Vec<u32> = (0..100).collect();
        assert_eq!(sample_by_size(&data, 100, 1), data);
        assert_eq!(sample_by_size(&data, 500, 1), data);
        assert!(sample_by_size(&data, 0, 1).is_empty());

        let empty: Vec<u32> = Vec::new();
        assert!(sample_by_size(&empty, 10, 1).is_empty());
    }

    #[test]
    fn test_sample_by_size_is_seeded() {
        let data: Vec<u32> = (0..1000).collect();
        let a = sample_by_size(&data, 100, 9);
        let b = sample_by_size(&data, 100, 9);
        assert_eq!(a, b);
        assert!(a.iter().all(|x| data.contains(x)));
    }

    #[test]
    fn test_sample_distinct_exact_count() {
        let data: Vec<u32> = (0..50).collect();
        let mut rng = SmallRng::seed_from_u64(3);
        for k in [1, 10, 25, 49, 50] {
            let sample = sample_distinct(&data, k, &mut rng).unwrap();
            let unique: FxHashSet<_> = sample.iter().collect();
            assert_eq!(sample.len(), k);
            assert_eq!(unique.len(), k);
        }
    }

    #[test]
    fn test_sample_distinct_with_heavy_duplication() {
        // 3 distinct values among 300 elements, mostly zeros
        let mut data = vec![0u32; 298];
        data.push(1);
        data.push(2);
        let mut rng = SmallRng::seed_from_u64(17);
        let mut sample = sample_distinct(&data, 3, &mut rng).unwrap();
        sample.sort();
        assert_eq!(sample, vec![0, 1, 2]);
    }

    #[test]
    fn test_sample_distinct_insufficient() {
        let data = vec![4u32, 4, 5, 5, 5];
        let mut rng = SmallRng::seed_from_u64(1);
        let err = sample_distinct(&data, 3, &mut rng).unwrap_err();
        assert_eq!(
            err,
            ClusteringError::InsufficientDistinct {
                requested: 3,
                available: 2
            }
        );

        let empty: Vec<u32> = Vec::new();
        assert!(sample_distinct(&empty, 1, &mut rng).is_err());
        assert!(sample_distinct(&empty, 0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_choose_distinct_indices() {
        let mut rng = SmallRng::seed_from_u64(23);
        for (n, m) in [(10, 0), (10, 3), (10, 7), (10, 10), (1000, 999)] {
            let mut picked = choose_distinct_indices(n, m, &mut rng);
            picked.sort();
            picked.dedup();
            assert_eq!(picked.len(), m);
            assert!(picked.iter().all(|&i| i < n));
        }
    }
}
