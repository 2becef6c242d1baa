use rayon::prelude::*;
use tracing::debug;

use crate::base::{EdgeTable, IdType, NodeId, Universe};
use crate::error::{CcError, Result};
use crate::factorize::{Code, Factorizer};
use crate::labeling::Labeling;

/// The match graph over dense codes: an edge arena with self-edges removed
/// and every pair stored once as `(min, max)`.
///
/// Nodes only seen in self-edges or duplicate rows are still counted in `n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchGraph {
    n: usize,
    edges: Vec<(Code, Code)>,
}

impl MatchGraph {
    pub fn from_coded_edges(n: usize, mut edges: Vec<(Code, Code)>) -> Self {
        edges.retain(|(l, r)| l != r);
        edges.par_iter_mut().for_each(|e| {
            if e.0 > e.1 {
                *e = (e.1, e.0);
            }
        });
        edges.par_sort_unstable();
        edges.dedup();
        Self { n, edges }
    }

    /// Returns the number of nodes in the graph.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns the number of distinct non-loop edges in the graph.
    pub fn m(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(Code, Code)] {
        &self.edges
    }

    /// The round-0 labeling: `label(n) = code(n)`.
    pub fn initial_labels(&self) -> Labeling {
        Labeling::initial(self.n)
    }
}

/// Validated, encoded input of one computation.
#[derive(Debug)]
pub struct Prepared<T> {
    pub factorizer: Factorizer<T>,
    pub graph: MatchGraph,
    pub id_type: Option<IdType>,
}

/// Validates the edge relation (and the universe, if given) and builds the
/// coded match graph. Nothing is propagated if this fails.
pub fn prepare<T: NodeId>(
    edges: &EdgeTable<T>,
    universe: Option<&Universe<T>>,
) -> Result<Prepared<T>> {
    let id_type = edges.validate()?;
    if let Some(universe) = universe {
        check_universe_type(id_type, universe)?;
    }
    let (factorizer, coded) = Factorizer::encode(edges)?;
    let graph = MatchGraph::from_coded_edges(factorizer.len(), coded);
    debug!(
        n = graph.n(),
        m = graph.m(),
        rows = edges.len(),
        "prepared match graph"
    );
    Ok(Prepared {
        factorizer,
        graph,
        id_type,
    })
}

/// A universe is compatible when it is uniformly typed and agrees with the
/// edges' identifier type (an empty side agrees with anything).
pub(crate) fn check_universe_type<T: NodeId>(
    edge_type: Option<IdType>,
    universe: &Universe<T>,
) -> Result<Option<IdType>> {
    let universe_type = universe.id_type()?;
    match (edge_type, universe_type) {
        (Some(e), Some(u)) if e != u => Err(CcError::invalid(format!(
            "universe identifiers are {} but edge identifiers are {}",
            u, e
        ))),
        (e, u) => Ok(e.or(u)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::RecordId;

    #[test]
    pub fn graph_drops_loops_and_duplicates() {
        let g = MatchGraph::from_coded_edges(4, vec![(1, 0), (0, 1), (2, 2), (3, 1), (0, 1)]);
        assert_eq!(4, g.n());
        assert_eq!(&[(0, 1), (1, 3)], g.edges());
    }

    #[test]
    pub fn self_edge_only_nodes_stay_in_universe() -> anyhow::Result<()> {
        let edges: EdgeTable<&str> = vec![("a", "a"), ("b", "c")].into_iter().collect();
        let p = prepare(&edges, None)?;
        assert_eq!(3, p.graph.n());
        assert_eq!(1, p.graph.m());
        assert_eq!(3, p.graph.initial_labels().len());
        Ok(())
    }

    #[test]
    pub fn incompatible_universe_is_rejected_up_front() {
        let edges: EdgeTable<RecordId> = vec![("a".into(), "b".into())].into_iter().collect();
        let universe: Universe<RecordId> = vec![RecordId::Int(5)].into_iter().collect();
        let err = prepare(&edges, Some(&universe)).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
