use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{CcConfig, Strategy};
use crate::error::{CcError, Result};
use crate::factorize::Code;
use crate::labeling::Labeling;
use crate::prepare::MatchGraph;
use crate::union_find;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PropagationState {
    Propagating,
    Converged,
    /// The round limit cut the run short. The labeling is a valid partial
    /// result: every shared label still implies connectivity.
    MaxIterReached,
}

/// Observability record for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub round: usize,
    pub relabeled: usize,
}

/// Final state of a propagation run.
#[derive(Debug, Clone)]
pub struct Propagation {
    pub labeling: Labeling,
    pub state: PropagationState,
    /// Rounds executed, including the one that observed the fixpoint.
    pub rounds: usize,
    pub history: Vec<RoundStats>,
}

impl Propagation {
    pub fn converged(&self) -> bool {
        self.state == PropagationState::Converged
    }
}

/// The iterative labelling state machine over one [`MatchGraph`].
pub struct Propagator<'g> {
    graph: &'g MatchGraph,
    strategy: Strategy,
    max_iter: Option<usize>,
    labels: Labeling,
    state: PropagationState,
    history: Vec<RoundStats>,
}

impl<'g> Propagator<'g> {
    pub fn new(graph: &'g MatchGraph, config: &CcConfig) -> Self {
        if config.strategy == Strategy::UnionFind && config.max_iter.is_some() {
            debug!("max_iter has no effect on union-find labelling");
        }
        Self {
            graph,
            strategy: config.strategy,
            max_iter: config.max_iter,
            labels: graph.initial_labels(),
            state: PropagationState::Propagating,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> PropagationState {
        self.state
    }

    pub fn labels(&self) -> &Labeling {
        &self.labels
    }

    pub fn rounds(&self) -> usize {
        self.history.len()
    }

    /// Runs one round, unless the machine has already stopped.
    pub fn step(&mut self) -> Result<PropagationState> {
        if self.state != PropagationState::Propagating {
            return Ok(self.state);
        }
        if self.strategy != Strategy::UnionFind && self.limit_reached() {
            self.state = PropagationState::MaxIterReached;
            return Ok(self.state);
        }
        let round = self.rounds() + 1;
        let next = match self.strategy {
            Strategy::Hop => propagate_round(self.graph, &self.labels, false)?,
            Strategy::Shortcut => propagate_round(self.graph, &self.labels, true)?,
            Strategy::UnionFind => union_find::label_components(self.graph),
        };
        let relabeled = self.labels.count_changes(&next)?;
        self.history.push(RoundStats { round, relabeled });
        if relabeled == 0 {
            debug!(round, "labels converged");
            self.state = PropagationState::Converged;
            return Ok(self.state);
        }
        info!(round, relabeled, "Round {}: Updated {} labels", round, relabeled);
        self.labels = next;
        if self.strategy == Strategy::UnionFind {
            self.state = PropagationState::Converged;
        } else if self.limit_reached() {
            warn!(
                round,
                "stopping at the round limit before convergence; labels are partial"
            );
            self.state = PropagationState::MaxIterReached;
        }
        Ok(self.state)
    }

    pub fn run(self) -> Result<Propagation> {
        self.run_with(|_| {})
    }

    /// Runs to completion, reporting every finished round to `on_round`.
    pub fn run_with<F>(mut self, mut on_round: F) -> Result<Propagation>
    where
        F: FnMut(&RoundStats),
    {
        let mut reported = 0;
        while self.step()? == PropagationState::Propagating {
            for stats in &self.history[reported..] {
                on_round(stats);
            }
            reported = self.history.len();
        }
        for stats in &self.history[reported..] {
            on_round(stats);
        }
        Ok(Propagation {
            rounds: self.history.len(),
            labeling: self.labels,
            state: self.state,
            history: self.history,
        })
    }

    fn limit_reached(&self) -> bool {
        self.max_iter.map_or(false, |m| self.rounds() >= m)
    }
}

/// One propagation round, producing a fresh labeling.
///
/// With `shortcut`, each label is first replaced by the label of the node
/// whose code it is; then the labels on either side of every edge are merged
/// to their minimum.
pub fn propagate_round(graph: &MatchGraph, labels: &Labeling, shortcut: bool) -> Result<Labeling> {
    let n = graph.n();
    if labels.len() != n {
        return Err(CcError::integrity(format!(
            "labeling covers {} nodes but the graph has {}",
            labels.len(),
            n
        )));
    }
    let current = if shortcut {
        jump(labels)
    } else {
        labels.clone()
    };
    let pairs = equivalences(graph, &current);
    let update = update_map(n, &pairs);
    let next: Vec<Code> = current
        .as_slice()
        .par_iter()
        .map(|&l| update[l as usize])
        .collect();
    if next.len() != n {
        return Err(CcError::integrity(format!(
            "round produced {} labels for {} nodes",
            next.len(),
            n
        )));
    }
    Ok(Labeling::from_vec(next))
}

fn jump(labels: &Labeling) -> Labeling {
    let l = labels.as_slice();
    Labeling::from_vec(l.par_iter().map(|&c| l[c as usize]).collect())
}

/// Distinct `(smaller, larger)` label pairs found across edges.
fn equivalences(graph: &MatchGraph, labels: &Labeling) -> Vec<(Code, Code)> {
    let mut pairs: Vec<(Code, Code)> = graph
        .edges()
        .par_iter()
        .filter_map(|&(u, v)| {
            let (a, b) = (labels.get(u), labels.get(v));
            match a.cmp(&b) {
                std::cmp::Ordering::Less => Some((a, b)),
                std::cmp::Ordering::Greater => Some((b, a)),
                std::cmp::Ordering::Equal => None,
            }
        })
        .collect();
    pairs.par_sort_unstable();
    pairs.dedup();
    pairs
}

/// Maps each old label to the smallest representative it is paired with.
/// Labels without a pair map to themselves.
fn update_map(n: usize, pairs: &[(Code, Code)]) -> Vec<Code> {
    let mut update: Vec<Code> = (0..n).map(|c| c as Code).collect();
    for &(lo, hi) in pairs {
        let slot = &mut update[hi as usize];
        if lo < *slot {
            *slot = lo;
        }
    }
    update
}
