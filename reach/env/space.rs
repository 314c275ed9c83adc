use rand::{distributions::Uniform, Rng};

/// Continuous space bounded per element by `low` and `high`.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSpace {
    pub low: Vec<f32>,
    pub high: Vec<f32>,
    shape: Vec<usize>,
}

impl BoxSpace {
    /// # Panics
    ///
    /// Panics if `low` and `high` differ in length.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        assert_eq!(low.len(), high.len(), "low and high must have same length");
        let shape = vec![low.len()];
        Self { low, high, shape }
    }

    /// Box with the same bounds on every element.
    pub fn uniform(shape: &[usize], low: f32, high: f32) -> Self {
        let len = shape.iter().product();
        Self {
            low: vec![low; len],
            high: vec![high; len],
            shape: shape.to_vec(),
        }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.low.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// `true` when `value` has the right length and every element lies in its
    /// closed interval. NaN is never contained.
    #[must_use]
    pub fn contains(&self, value: &[f32]) -> bool {
        value.len() == self.len()
            && value
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (low, high))| (*low..=*high).contains(v))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(&low, &high)| {
                if low < high {
                    rng.sample(Uniform::new_inclusive(low, high))
                } else {
                    low
                }
            })
            .collect()
    }

    /// Elementwise midpoint of the bounds.
    #[must_use]
    pub fn midpoint(&self) -> Vec<f32> {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(low, high)| low + (high - low) / 2.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn samples_stay_inside() {
        let space = BoxSpace::uniform(&[3], -1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let sample = space.sample(&mut rng);
            assert_eq!(sample.len(), 3);
            assert!(space.contains(&sample));
        }
    }

    #[test]
    fn contains_checks_bounds_and_length() {
        let space = BoxSpace::uniform(&[3], 0.0, 10.0);

        assert!(space.contains(&[0.0, 5.0, 10.0]));
        assert!(!space.contains(&[0.0, 10.5, 1.0]));
        assert!(!space.contains(&[0.0, f32::NAN, 1.0]));
        assert!(!space.contains(&[1.0, 1.0]));
    }

    #[test]
    #[should_panic(expected = "low and high must have same length")]
    fn mismatched_bounds_panic() {
        let _ = BoxSpace::new(vec![0.0], vec![1.0, 2.0]);
    }

    #[test]
    fn degenerate_interval_samples_its_bound() {
        let space = BoxSpace::new(vec![2.0, -1.0], vec![2.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(7);
        let sample = space.sample(&mut rng);
        assert!((sample[0] - 2.0).abs() < f32::EPSILON);
        assert_eq!(space.midpoint(), vec![2.0, 0.0]);
    }
}
