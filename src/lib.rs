//! Connected-components labelling for record linkage.
//!
//! Given pairwise "same entity" edges between record identifiers, this crate
//! partitions every referenced record (plus an optional declared universe)
//! into components by iterative minimum-label propagation over dense integer
//! codes.
//!
//! ```
//! use linkcluster::{connected_components, CcConfig, EdgeTable};
//!
//! let edges: EdgeTable<&str> = vec![
//!     ("a", "x"), ("b", "x"), ("b", "y"), ("c", "y"), ("c", "z"), ("g", "h"),
//! ]
//! .into_iter()
//! .collect();
//! let out = connected_components(&edges, None, &CcConfig::default()).unwrap();
//! assert!(out.components.same_component(&"a", &"z"));
//! assert!(!out.components.same_component(&"a", &"g"));
//! ```
pub mod base;
pub mod components;
pub mod config;
pub mod error;
pub mod factorize;
pub mod generators;
pub mod io;
pub mod labeling;
pub mod prepare;
pub mod propagate;
pub mod summary;
mod union_find;
pub mod utils;

pub use base::*;
pub use components::{Components, Label};
pub use config::{parse_strategy, CcConfig, Strategy};
pub use error::{CcError, Result};
pub use propagate::{Propagation, PropagationState, Propagator, RoundStats};

use tracing::info;

/// Result of [`connected_components`]: the labelled nodes plus how the
/// propagation ended.
#[derive(Debug, Clone)]
pub struct CcOutcome<T> {
    pub components: Components<T>,
    pub state: PropagationState,
    pub rounds: usize,
    pub history: Vec<RoundStats>,
    /// Distinct non-loop edges the propagation ran over.
    pub num_edges: usize,
}

impl<T> CcOutcome<T> {
    pub fn converged(&self) -> bool {
        self.state == PropagationState::Converged
    }
}

/// Computes the connected components of the graph described by `edges`.
///
/// Every endpoint receives a label; two nodes share one iff a path of edges
/// joins them. Nodes of `universe` that no edge mentions get labels of their
/// own. Reaching `config.max_iter` is not an error: the outcome carries
/// [`PropagationState::MaxIterReached`] and the partial labels.
pub fn connected_components<T: NodeId>(
    edges: &EdgeTable<T>,
    universe: Option<&Universe<T>>,
    config: &CcConfig,
) -> Result<CcOutcome<T>> {
    connected_components_with(edges, universe, config, |_| {})
}

/// [`connected_components`], reporting each finished round to `on_round`.
pub fn connected_components_with<T, F>(
    edges: &EdgeTable<T>,
    universe: Option<&Universe<T>>,
    config: &CcConfig,
    on_round: F,
) -> Result<CcOutcome<T>>
where
    T: NodeId,
    F: FnMut(&RoundStats),
{
    let prepared = prepare::prepare(edges, universe)?;
    let num_edges = prepared.graph.m();
    let propagation = Propagator::new(&prepared.graph, config).run_with(on_round)?;
    let mut components = Components::restore(
        prepared.factorizer,
        &propagation.labeling,
        prepared.id_type,
    )?;
    if let Some(universe) = universe {
        components = components.with_universe(universe)?;
    }
    info!(
        nodes = components.len(),
        rounds = propagation.rounds,
        state = %propagation.state,
        "connected components labelled"
    );
    Ok(CcOutcome {
        components,
        state: propagation.state,
        rounds: propagation.rounds,
        history: propagation.history,
        num_edges,
    })
}
