//! Parametric densities over non-negative distances.
//!
//! The model selector describes each cluster by the distribution of its
//! members' distances to the medoid. Two gamma-family candidates are fit by
//! moment matching and the one closest to the observed sample (two-sample
//! Kolmogorov-Smirnov) is kept.

use log::{trace, warn};
use ndarray::ArrayView1;
use rand::Rng;
use rand_distr::{Distribution, Gamma};
use statrs::distribution::{Continuous, Exp as ExpDensity, Gamma as GammaDensity};

use super::goodness_of_fit::ks_two_sample;

/// Density reported at zero by a cluster whose members all coincide.
pub const DEGENERATE_DENSITY: f64 = 1.0e10;

/// Smallest reference sample drawn from a candidate for the KS comparison.
pub const MIN_REFERENCE_SAMPLE: usize = 200;

/// Free parameters charged for either gamma candidate.
const GAMMA_FREE_PARAMS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceDensity {
    /// All mass at zero distance.
    Degenerate,
    /// Gamma with `shape >= 1`; `shape == 1` is the exponential.
    Gamma { shape: f64, scale: f64 },
}

impl DistanceDensity {
    /// Density at `x`. Zero for negative input.
    pub fn pdf(&self, x: f64) -> f64 {
        match *self {
            DistanceDensity::Degenerate => {
                if x == 0.0 {
                    DEGENERATE_DENSITY
                } else {
                    0.0
                }
            }
            DistanceDensity::Gamma { shape, scale } => {
                if x < 0.0 {
                    return 0.0;
                }
                // statrs parameterises both by rate
                let rate = 1.0 / scale;
                let pdf = if shape == 1.0 {
                    ExpDensity::new(rate).ok().map(|d| d.pdf(x))
                } else {
                    // rate^shape overflows for tight clusters; stay in log space
                    GammaDensity::new(shape, rate).ok().map(|d| d.ln_pdf(x).exp())
                };
                pdf.unwrap_or(0.0)
            }
        }
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Option<Vec<f64>> {
        match *self {
            DistanceDensity::Degenerate => Some(vec![0.0; n]),
            DistanceDensity::Gamma { shape, scale } => {
                let gamma = Gamma::new(shape, scale).ok()?;
                Some((0..n).map(|_| gamma.sample(rng)).collect())
            }
        }
    }
}

/// A fitted density together with what the fit costs in parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityFit {
    pub density: DistanceDensity,
    pub free_params: usize,
    /// KS distance between the observed sample and the chosen candidate.
    pub ks_statistic: f64,
}

impl DensityFit {
    pub fn pdf(&self, x: f64) -> f64 {
        self.density.pdf(x)
    }
}

/// Fits a density to a sample of non-negative distances.
///
/// An all-zero (or empty) sample gets the degenerate density with no free
/// parameters. Otherwise a gamma fit on the strictly positive distances (shape
/// clamped to at least 1) competes with an exponential fit on every distance,
/// and the candidate with the smaller two-sample KS statistic wins. Reference
/// samples are drawn from `rng`, so equal seeds give equal fits.
pub fn fit_distance_density<R: Rng + ?Sized>(distances: &[f64], rng: &mut R) -> DensityFit {
    if distances.iter().all(|&d| d == 0.0) {
        return DensityFit {
            density: DistanceDensity::Degenerate,
            free_params: 0,
            ks_statistic: 0.0,
        };
    }

    let positive: Vec<f64> = distances.iter().copied().filter(|&d| d > 0.0).collect();
    let (positive_mean, positive_var) = mean_and_variance(&positive);
    let shape = if positive_var > 0.0 {
        (positive_mean * positive_mean / positive_var).max(1.0)
    } else {
        1.0
    };
    let gamma = DistanceDensity::Gamma {
        shape,
        scale: positive_mean / shape,
    };

    let (mean, _) = mean_and_variance(distances);
    let exponential = DistanceDensity::Gamma {
        shape: 1.0,
        scale: mean,
    };

    let reference_size = distances.len().max(MIN_REFERENCE_SAMPLE);
    let mut best: Option<DensityFit> = None;
    for candidate in [gamma, exponential] {
        let Some(reference) = candidate.sample(reference_size, rng) else {
            warn!("Skipping density candidate {:?}: invalid parameters", candidate);
            continue;
        };
        let ks_statistic = ks_two_sample(distances, &reference);
        trace!("Density candidate {:?} has KS statistic {:.4}", candidate, ks_statistic);
        if best.map_or(true, |b| ks_statistic < b.ks_statistic) {
            best = Some(DensityFit {
                density: candidate,
                free_params: GAMMA_FREE_PARAMS,
                ks_statistic,
            });
        }
    }

    best.unwrap_or(DensityFit {
        density: exponential,
        free_params: GAMMA_FREE_PARAMS,
        ks_statistic: 1.0,
    })
}

/// Mean and population variance; `(0, 0)` for an empty slice.
fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let values = ArrayView1::from(values);
    match values.mean() {
        Some(mean) => (mean, values.var(0.0)),
        None => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rand_distr::Exp;
    use statrs::function::gamma::ln_gamma;

    #[test]
    fn test_degenerate_fit() {
        let mut rng = SmallRng::seed_from_u64(7);
        let fit = fit_distance_density(&[0.0; 10], &mut rng);
        assert_eq!(fit.density, DistanceDensity::Degenerate);
        assert_eq!(fit.free_params, 0);
        assert_eq!(fit.pdf(0.0), DEGENERATE_DENSITY);
        assert_eq!(fit.pdf(0.5), 0.0);
    }

    #[test]
    fn test_exponential_pdf() {
        let density = DistanceDensity::Gamma {
            shape: 1.0,
            scale: 2.0,
        };
        assert!((density.pdf(0.0) - 0.5).abs() < 1e-12);
        assert!((density.pdf(2.0) - 0.5 * (-1.0f64).exp()).abs() < 1e-12);
        assert_eq!(density.pdf(-1.0), 0.0);
    }

    #[test]
    fn test_gamma_pdf() {
        // shape 2, scale 1: x e^{-x}
        let density = DistanceDensity::Gamma {
            shape: 2.0,
            scale: 1.0,
        };
        assert_eq!(density.pdf(0.0), 0.0);
        assert!((density.pdf(1.5) - 1.5 * (-1.5f64).exp()).abs() < 1e-10);

        let (shape, scale, x): (f64, f64, f64) = (4.5, 0.8, 2.7);
        let density = DistanceDensity::Gamma { shape, scale };
        let expected =
            ((shape - 1.0) * x.ln() - x / scale - ln_gamma(shape) - shape * scale.ln()).exp();
        assert!((density.pdf(x) - expected).abs() < 1e-10);

        // Tight clusters give large shapes and rates
        let peaked = DistanceDensity::Gamma {
            shape: 150.0,
            scale: 0.001,
        };
        assert!(peaked.pdf(0.15).is_finite());
        assert!(peaked.pdf(0.15) > 1.0);
        assert_eq!(peaked.pdf(0.0), 0.0);
    }

    #[test]
    fn test_mean_and_variance() {
        assert_eq!(mean_and_variance(&[]), (0.0, 0.0));
        let (mean, var) = mean_and_variance(&[1.0, 2.0, 3.0, 6.0]);
        assert!((mean - 3.0).abs() < 1e-12);
        assert!((var - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_fit_prefers_gamma_for_peaked_sample() {
        let mut rng = SmallRng::seed_from_u64(11);
        let gamma = Gamma::new(9.0, 0.5).unwrap();
        let sample: Vec<f64> = (0..500).map(|_| gamma.sample(&mut rng)).collect();

        let fit = fit_distance_density(&sample, &mut rng);
        match fit.density {
            DistanceDensity::Gamma { shape, scale } => {
                assert!(shape > 5.0, "shape {} should be near 9", shape);
                assert!((shape * scale - 4.5).abs() < 0.5);
            }
            DistanceDensity::Degenerate => panic!("unexpected degenerate fit"),
        }
        assert_eq!(fit.free_params, 2);
        assert!(fit.ks_statistic < 0.15);
    }

    #[test]
    fn test_fit_exponential_sample() {
        let mut rng = SmallRng::seed_from_u64(3);
        let exp = Exp::new(0.25).unwrap();
        let sample: Vec<f64> = (0..500).map(|_| exp.sample(&mut rng)).collect();

        let fit = fit_distance_density(&sample, &mut rng);
        match fit.density {
            DistanceDensity::Gamma { shape, scale } => {
                assert!(shape < 1.5, "shape {} should be near 1", shape);
                assert!((shape * scale - 4.0).abs() < 1.0);
            }
            DistanceDensity::Degenerate => panic!("unexpected degenerate fit"),
        }
    }

    #[test]
    fn test_fit_is_reproducible() {
        let sample = vec![0.0, 0.3, 0.7, 1.1, 1.4, 2.0, 2.2, 3.9];
        let a = fit_distance_density(&sample, &mut SmallRng::seed_from_u64(5));
        let b = fit_distance_density(&sample, &mut SmallRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
