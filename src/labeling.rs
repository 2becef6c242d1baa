use rayon::prelude::*;

use crate::error::{CcError, Result};
use crate::factorize::Code;

/// A snapshot assigning a label to every node code.
///
/// Labels are themselves node codes, and never exceed the code of the node
/// carrying them. A round produces a fresh `Labeling`; existing snapshots are
/// never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeling {
    labels: Vec<Code>,
}

impl Labeling {
    /// Round 0: every node is labelled with its own code.
    pub fn initial(n: usize) -> Self {
        Self {
            labels: (0..n).map(|c| c as Code).collect(),
        }
    }

    pub(crate) fn from_vec(labels: Vec<Code>) -> Self {
        Self { labels }
    }

    /// Number of labelled nodes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, code: Code) -> Code {
        self.labels[code as usize]
    }

    pub fn as_slice(&self) -> &[Code] {
        &self.labels
    }

    /// Number of distinct labels in use.
    pub fn num_components(&self) -> usize {
        let mut seen = vec![false; self.labels.len()];
        let mut count = 0;
        for &l in &self.labels {
            if !seen[l as usize] {
                seen[l as usize] = true;
                count += 1;
            }
        }
        count
    }

    /// Counts nodes whose label differs between `self` and `next`.
    ///
    /// Both snapshots must label the same node set; anything else means the
    /// propagation step lost or invented nodes.
    pub fn count_changes(&self, next: &Labeling) -> Result<usize> {
        if self.len() != next.len() {
            return Err(CcError::integrity(format!(
                "labeling size changed between rounds: {} -> {}",
                self.len(),
                next.len()
            )));
        }
        Ok(self
            .labels
            .par_iter()
            .zip(next.labels.par_iter())
            .filter(|(a, b)| a != b)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn initial_labels_are_codes() {
        let l = Labeling::initial(4);
        assert_eq!(&[0, 1, 2, 3], l.as_slice());
        assert_eq!(4, l.num_components());
    }

    #[test]
    pub fn counts_changed_nodes() -> anyhow::Result<()> {
        let a = Labeling::from_vec(vec![0, 1, 2, 3]);
        let b = Labeling::from_vec(vec![0, 0, 1, 3]);
        assert_eq!(2, a.count_changes(&b)?);
        assert_eq!(0, b.count_changes(&b)?);
        assert_eq!(3, b.num_components());
        Ok(())
    }

    #[test]
    pub fn size_mismatch_is_an_integrity_violation() {
        let a = Labeling::initial(3);
        let b = Labeling::initial(2);
        match a.count_changes(&b) {
            Err(CcError::IntegrityViolation(_)) => {}
            other => panic!("expected integrity violation, got {:?}", other),
        }
    }
}
