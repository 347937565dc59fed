//! Normally-distributed samples via the polar Box-Muller transform.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// A normal distribution with a given mean and standard deviation.
///
/// Used for quantity values in lab-test rows, where the embedded lookup
/// supplies the observed mean and standard deviation per test code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    mean: f64,
    std_dev: f64,
}

impl Normal {
    /// Panics when `std_dev` is negative or `mean` is NaN; parameters come
    /// from packaged lookup tables, so a bad value is a data-packaging bug.
    pub fn new(mean: f64, std_dev: f64) -> Self {
        assert!(
            std_dev >= 0.0,
            "standard deviation must be non-negative, got {std_dev}"
        );
        assert!(!mean.is_nan(), "mean must not be NaN");
        Normal { mean, std_dev }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Draws one sample using the polar Marsaglia variant of the Box-Muller
    /// transform: pick a point uniformly in the square [-1,1]x[-1,1], reject
    /// it unless it falls strictly inside the unit circle (and is not the
    /// origin), then scale. The rejection loop is unbounded; acceptance
    /// probability is pi/4 per iteration.
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> f64 {
        loop {
            let v1 = 2.0 * rng.gen::<f64>() - 1.0;
            let v2 = 2.0 * rng.gen::<f64>() - 1.0;
            let r = v1 * v1 + v2 * v2;
            if r >= 1.0 || r == 0.0 {
                continue;
            }
            let fac = (-2.0 * r.ln() / r).sqrt();
            return self.mean + self.std_dev * v1 * fac;
        }
    }
}

/// Random number between -1 and 1 with a normal distribution (more values
/// near 0 than near the edges). Standard deviation 0.3; the roughly 5 in
/// 10,000 samples outside the range are clamped to -1 or 1.
pub fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    Normal::new(0.0, 0.3).sample(rng).clamp(-1.0, 1.0)
}

/// Random number between `lower` and `upper` with a gaussian distribution
/// around the middle, rounded to `digits` decimal places.
pub fn gaussian_between(rng: &mut ChaCha8Rng, lower: f64, upper: f64, digits: u32) -> f64 {
    assert!(
        lower <= upper,
        "lower boundary {lower} must not exceed upper boundary {upper}"
    );
    let zero_to_one = (gaussian(rng) + 1.0) / 2.0;
    let value = zero_to_one * (upper - lower) + lower;
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

/// Integer form of [`gaussian_between`].
pub fn gaussian_int_between(rng: &mut ChaCha8Rng, lower: f64, upper: f64) -> i64 {
    gaussian_between(rng, lower, upper, 2) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng::make_rng;

    #[test]
    fn samples_centre_on_the_mean() {
        let mut rng = make_rng(42, "normal");
        let dist = Normal::new(10.0, 2.0);

        let n = 2000;
        let mean: f64 = (0..n).map(|_| dist.sample(&mut rng)).sum::<f64>() / n as f64;
        // standard error of the mean is 2/sqrt(2000) ~ 0.045
        assert!((mean - 10.0).abs() < 0.5, "sample mean was {mean}");
    }

    #[test]
    fn zero_std_dev_is_constant() {
        let mut rng = make_rng(42, "normal");
        let dist = Normal::new(3.5, 0.0);
        for _ in 0..20 {
            assert_eq!(dist.sample(&mut rng), 3.5);
        }
    }

    #[test]
    fn gaussian_stays_in_unit_interval() {
        let mut rng = make_rng(42, "normal");
        for _ in 0..5000 {
            let g = gaussian(&mut rng);
            assert!((-1.0..=1.0).contains(&g));
        }
    }

    #[test]
    fn gaussian_between_respects_bounds_and_rounding() {
        let mut rng = make_rng(42, "normal");
        for _ in 0..1000 {
            let v = gaussian_between(&mut rng, 50.0, 100.0, 2);
            assert!((50.0..=100.0).contains(&v), "out of range: {v}");
            assert_eq!((v * 100.0).round() / 100.0, v);
        }
    }

    #[test]
    fn gaussian_int_between_respects_bounds() {
        let mut rng = make_rng(42, "normal");
        for _ in 0..1000 {
            let v = gaussian_int_between(&mut rng, 50.0, 50000.0);
            assert!((50..=50000).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    #[should_panic(expected = "standard deviation")]
    fn negative_std_dev_panics() {
        Normal::new(0.0, -1.0);
    }
}
