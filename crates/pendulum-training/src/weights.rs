//! Weight vector operations for the genetic algorithm.
//!
//! These are the building blocks used by [`genetic`](crate::genetic):
//!
//! - **Initialization**: [`random`] draws every weight from a uniform distribution
//! - **Crossover**: [`splice`] performs single-point crossover at the midpoint
//! - **Mutation**: [`mutate_one`] perturbs exactly one randomly chosen weight
//! - **Projection**: [`dot`] is the linear policy's response to an observation
//!
//! # Single-Point Crossover
//!
//! The crossover point is `len / 2`. For the 3-component pendulum observation
//! the child takes weight 0 from the first parent and weights 1 and 2 from the
//! second parent.

use rand::Rng;
use rand_distr::{Distribution as _, Uniform};

/// A real-valued linear policy, one weight per observation component.
pub type WeightVector = Vec<f32>;

/// Creates a weight vector by applying a function to each index.
///
/// ```
/// use pendulum_training::weights;
///
/// let weights = weights::from_fn(|i| i as f32 * 0.5, 3);
/// assert_eq!(weights, vec![0.0, 0.5, 1.0]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> WeightVector
where
    F: FnMut(usize) -> f32,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Generates a weight vector with every component sampled from `distr`.
pub fn random<R>(rng: &mut R, distr: &Uniform<f32>, len: usize) -> WeightVector
where
    R: Rng + ?Sized,
{
    from_fn(|_| distr.sample(rng), len)
}

/// Index at which [`splice`] switches from the first parent to the second.
#[must_use]
pub fn crossover_point(len: usize) -> usize {
    len / 2
}

/// Single-point crossover of two parents.
///
/// Components `[0, len / 2)` come from `p1`, components `[len / 2, len)` from `p2`.
///
/// # Panics
///
/// Panics if the parents have different lengths.
///
/// ```
/// use pendulum_training::weights;
///
/// let child = weights::splice(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0]);
/// assert_eq!(child, vec![1.0, 2.0, 7.0, 8.0]);
/// ```
#[must_use]
pub fn splice(p1: &[f32], p2: &[f32]) -> WeightVector {
    assert_eq!(p1.len(), p2.len());
    let point = crossover_point(p1.len());
    p1[..point].iter().chain(&p2[point..]).copied().collect()
}

/// Adds a delta sampled from `delta` to one randomly chosen component.
///
/// Returns the index of the perturbed component, or `None` for an empty vector.
pub fn mutate_one<R>(weights: &mut [f32], delta: &Uniform<f32>, rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
{
    if weights.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..weights.len());
    weights[idx] += delta.sample(rng);
    Some(idx)
}

/// Dot product of two equally long vectors.
///
/// # Panics
///
/// Panics if the vectors have different lengths.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, w)| x * w).sum()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let distr = Uniform::new_inclusive(-2.0, 2.0).unwrap();
        for _ in 0..100 {
            let w = random(&mut rng, &distr, 3);
            assert_eq!(w.len(), 3);
            assert!(w.iter().all(|x| (-2.0..=2.0).contains(x)));
        }
    }

    #[test]
    fn test_splice_odd_length() {
        let child = splice(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(child, vec![1.0, 5.0, 6.0]);
    }

    #[test]
    fn test_splice_single_component_takes_second_parent() {
        assert_eq!(splice(&[1.0], &[2.0]), vec![2.0]);
    }

    #[test]
    fn test_mutate_one_changes_only_reported_index() {
        let mut rng = Pcg32::seed_from_u64(2);
        let delta = Uniform::new_inclusive(-1.0, 1.0).unwrap();
        for _ in 0..100 {
            let original = vec![0.5, -0.5, 1.5];
            let mut mutated = original.clone();
            let idx = mutate_one(&mut mutated, &delta, &mut rng).unwrap();
            for (i, (a, b)) in original.iter().zip(&mutated).enumerate() {
                if i == idx {
                    assert!((a - b).abs() <= 1.0);
                } else {
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_mutate_one_empty() {
        let mut rng = Pcg32::seed_from_u64(3);
        let delta = Uniform::new_inclusive(-1.0, 1.0).unwrap();
        assert_eq!(mutate_one(&mut [], &delta, &mut rng), None);
    }

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[0.5, -1.0, 2.0]), 4.5);
    }
}
