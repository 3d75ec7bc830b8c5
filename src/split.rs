//! Random train/validation partitioning

use rand::seq::SliceRandom;
use rand::Rng;

use crate::record::LabeledExample;
use crate::{Error, Result};

/// Disjoint training and validation partitions of one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    /// Examples to fit on
    pub train: Vec<LabeledExample>,
    /// Held-out examples
    pub validation: Vec<LabeledExample>,
}

/// Training and validation sizes of a split of `len` examples
///
/// # Errors
///
/// Returns `InvalidConfig` unless `0 < train_fraction < 1`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn partition_sizes(len: usize, train_fraction: f64) -> Result<(usize, usize)> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(Error::InvalidConfig(format!(
            "train_fraction must be in (0, 1), got {train_fraction}"
        )));
    }

    let train_len = ((len as f64) * train_fraction).round() as usize;
    let train_len = train_len.min(len);
    Ok((train_len, len - train_len))
}

/// Shuffle `examples` and cut them at `round(len × train_fraction)`.
///
/// Every example lands in exactly one partition. The partition contents
/// depend on `rng`, so callers wanting independent splits must pass
/// independently seeded generators.
///
/// # Errors
///
/// Returns `InvalidConfig` unless `0 < train_fraction < 1`.
pub fn random_split<R: Rng + ?Sized>(
    examples: &[LabeledExample],
    train_fraction: f64,
    rng: &mut R,
) -> Result<Split> {
    let (train_len, _) = partition_sizes(examples.len(), train_fraction)?;

    let mut order: Vec<usize> = (0..examples.len()).collect();
    order.shuffle(rng);

    let (train_idx, validation_idx) = order.split_at(train_len);

    Ok(Split {
        train: train_idx.iter().map(|&i| examples[i].clone()).collect(),
        validation: validation_idx.iter().map(|&i| examples[i].clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn examples(n: usize) -> Vec<LabeledExample> {
        (0..n)
            .map(|i| LabeledExample::new(i % 2, vec![i as f64]))
            .collect()
    }

    #[test]
    fn test_sizes() {
        let split = random_split(&examples(1000), 0.8, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(split.train.len(), 800);
        assert_eq!(split.validation.len(), 200);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let data = examples(57);
        let split = random_split(&data, 0.8, &mut StdRng::seed_from_u64(1)).unwrap();
        let mut seen: Vec<f64> = split
            .train
            .iter()
            .chain(&split.validation)
            .map(|e| e.features()[0])
            .collect();
        seen.sort_by(f64::total_cmp);
        let expected: Vec<f64> = (0..57).map(|i| i as f64).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_different_seeds_differ() {
        let data = examples(100);
        let a = random_split(&data, 0.8, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = random_split(&data, 0.8, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_ne!(a.train, b.train);
        assert_eq!(a.train.len() + a.validation.len(), 100);
        assert_eq!(b.train.len() + b.validation.len(), 100);
    }

    #[test]
    fn test_same_seed_reproduces() {
        let data = examples(100);
        let a = random_split(&data, 0.8, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = random_split(&data, 0.8, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let data = examples(10);
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(random_split(&data, fraction, &mut StdRng::seed_from_u64(0)).is_err());
        }
    }

    #[test]
    fn test_partition_sizes() {
        assert_eq!(partition_sizes(100, 0.8).unwrap(), (80, 20));
        assert_eq!(partition_sizes(2, 0.8).unwrap(), (2, 0));
        assert_eq!(partition_sizes(3, 0.1).unwrap(), (0, 3));
        assert_eq!(partition_sizes(0, 0.5).unwrap(), (0, 0));
        assert!(partition_sizes(10, 1.0).is_err());
    }

    #[test]
    fn test_empty_input() {
        let split = random_split(&[], 0.8, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(split.train.is_empty());
        assert!(split.validation.is_empty());
    }
}
