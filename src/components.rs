use std::collections::BTreeMap;

use ahash::AHashMap;
use itertools::Itertools;
use tracing::debug;

use crate::base::{IdType, NodeId, Universe};
use crate::error::{CcError, Result};
use crate::factorize::Factorizer;
use crate::labeling::Labeling;
use crate::prepare::check_universe_type;

/// Component label as exposed to callers. Only equality between labels is
/// meaningful.
pub type Label = u64;

/// The final node → component relation, keyed by the caller's identifiers.
///
/// Rows are ordered by internal code, followed by any nodes added from a
/// universe in universe order.
#[derive(Debug, Clone)]
pub struct Components<T> {
    ids: Vec<T>,
    labels: Vec<Label>,
    index: AHashMap<T, usize>,
    id_type: Option<IdType>,
}

impl<T: NodeId> Components<T> {
    /// Decodes an integer labeling back to the identifiers it was built from.
    pub fn restore(
        factorizer: Factorizer<T>,
        labeling: &Labeling,
        id_type: Option<IdType>,
    ) -> Result<Self> {
        if factorizer.len() != labeling.len() {
            return Err(CcError::integrity(format!(
                "labeling covers {} nodes but {} identifiers were encoded",
                labeling.len(),
                factorizer.len()
            )));
        }
        let ids = factorizer.into_ids();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let labels = labeling.as_slice().iter().map(|&l| l as Label).collect();
        Ok(Self {
            ids,
            labels,
            index,
            id_type,
        })
    }

    /// Adds every universe node that has no label yet, each with a fresh
    /// label above all labels in use. Labelled nodes keep their label, so
    /// applying the same universe twice changes nothing.
    pub fn with_universe(mut self, universe: &Universe<T>) -> Result<Self> {
        let id_type = check_universe_type(self.id_type, universe)?;
        let first_free = self.labels.iter().max().map_or(0, |&m| m + 1);
        let missing = universe
            .distinct()
            .filter(|id| !self.index.contains_key(*id))
            .cloned()
            .collect_vec();
        debug!(
            missing = missing.len(),
            first_free, "labelling nodes absent from edges"
        );
        for (rank, id) in missing.into_iter().enumerate() {
            self.index.insert(id.clone(), self.ids.len());
            self.ids.push(id);
            self.labels.push(first_free + rank as Label);
        }
        self.id_type = id_type;
        Ok(self)
    }

    /// Number of labelled nodes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id_type(&self) -> Option<IdType> {
        self.id_type
    }

    pub fn label_of(&self, id: &T) -> Option<Label> {
        self.index.get(id).map(|&i| self.labels[i])
    }

    pub fn same_component(&self, a: &T, b: &T) -> bool {
        match (self.label_of(a), self.label_of(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, Label)> + '_ {
        self.ids.iter().zip(self.labels.iter().copied())
    }

    /// Number of distinct labels.
    pub fn num_components(&self) -> usize {
        self.labels.iter().unique().count()
    }

    /// Members of each component, keyed by label.
    pub fn groups(&self) -> BTreeMap<Label, Vec<&T>> {
        let mut groups: BTreeMap<Label, Vec<&T>> = BTreeMap::new();
        for (id, label) in self.iter() {
            groups.entry(label).or_default().push(id);
        }
        groups
    }

    /// The partition as sorted member lists, independent of label values.
    pub fn partition(&self) -> Vec<Vec<T>> {
        self.groups()
            .into_values()
            .map(|members| members.into_iter().cloned().sorted().collect_vec())
            .sorted()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{EdgeTable, RecordId};

    fn restored(edges: &[(&'static str, &'static str)], labels: Vec<u32>) -> Components<&'static str> {
        let edges: EdgeTable<&str> = edges.iter().copied().collect();
        let (f, _) = Factorizer::encode(&edges).unwrap();
        Components::restore(f, &Labeling::from_vec(labels), Some(IdType::String)).unwrap()
    }

    #[test]
    pub fn restore_joins_codes_to_ids() {
        let c = restored(&[("a", "b"), ("c", "d")], vec![0, 0, 2, 2]);
        assert_eq!(Some(0), c.label_of(&"b"));
        assert_eq!(Some(2), c.label_of(&"d"));
        assert!(c.same_component(&"c", &"d"));
        assert!(!c.same_component(&"a", &"d"));
        assert_eq!(2, c.num_components());
    }

    #[test]
    pub fn restore_rejects_size_mismatch() {
        let edges: EdgeTable<&str> = vec![("a", "b")].into_iter().collect();
        let (f, _) = Factorizer::encode(&edges).unwrap();
        let err = Components::restore(f, &Labeling::initial(3), None).unwrap_err();
        assert!(matches!(err, CcError::IntegrityViolation(_)));
    }

    #[test]
    pub fn missing_nodes_get_fresh_disjoint_labels() -> anyhow::Result<()> {
        let c = restored(&[("a", "b"), ("c", "d")], vec![0, 0, 2, 2]);
        let universe: Universe<&str> = ["w", "a", "v", "w"].into_iter().collect();
        let c = c.with_universe(&universe)?;
        assert_eq!(6, c.len());
        assert_eq!(Some(3), c.label_of(&"w"));
        assert_eq!(Some(4), c.label_of(&"v"));
        assert_eq!(Some(0), c.label_of(&"a"));
        Ok(())
    }

    #[test]
    pub fn augmentation_is_idempotent() -> anyhow::Result<()> {
        let universe: Universe<&str> = ["x", "a", "y"].into_iter().collect();
        let once = restored(&[("a", "b")], vec![0, 0]).with_universe(&universe)?;
        let twice = once.clone().with_universe(&universe)?;
        assert_eq!(once.iter().collect_vec(), twice.iter().collect_vec());
        Ok(())
    }

    #[test]
    pub fn universe_without_edges_starts_at_zero() -> anyhow::Result<()> {
        let c = restored(&[], vec![]);
        let universe: Universe<&str> = ["p", "q"].into_iter().collect();
        let c = c.with_universe(&universe)?;
        assert_eq!(Some(0), c.label_of(&"p"));
        assert_eq!(Some(1), c.label_of(&"q"));
        Ok(())
    }

    #[test]
    pub fn universe_of_other_type_is_rejected() {
        let edges: EdgeTable<RecordId> = vec![(RecordId::Int(1), RecordId::Int(2))]
            .into_iter()
            .collect();
        let (f, _) = Factorizer::encode(&edges).unwrap();
        let c = Components::restore(f, &Labeling::from_vec(vec![0, 0]), edges.id_type().unwrap())
            .unwrap();
        let universe: Universe<RecordId> = vec!["w".into()].into_iter().collect();
        assert!(c.with_universe(&universe).unwrap_err().is_invalid_input());
    }

    #[test]
    pub fn partition_ignores_label_values() {
        let c = restored(&[("b", "a"), ("d", "c")], vec![0, 0, 2, 2]);
        assert_eq!(vec![vec!["a", "b"], vec!["c", "d"]], c.partition());
    }
}
