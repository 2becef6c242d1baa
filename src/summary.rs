use std::path::Path;

use comfy_table::Table;
use serde::{Deserialize, Serialize};

use crate::base::NodeId;
use crate::error::Result;
use crate::propagate::{PropagationState, RoundStats};
use crate::CcOutcome;

/// What a labelling run did, for logs and the CLI report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
    pub largest_component: usize,
    pub singletons: usize,
    pub rounds: usize,
    pub state: PropagationState,
    pub history: Vec<RoundStats>,
}

impl RunSummary {
    pub fn from_outcome<T: NodeId>(outcome: &CcOutcome<T>) -> Self {
        let groups = outcome.components.groups();
        Self {
            nodes: outcome.components.len(),
            edges: outcome.num_edges,
            components: groups.len(),
            largest_component: groups.values().map(|g| g.len()).max().unwrap_or(0),
            singletons: groups.values().filter(|g| g.len() == 1).count(),
            rounds: outcome.rounds,
            state: outcome.state,
            history: outcome.history.clone(),
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["metric", "value"]);
        table.add_row(vec!["nodes".to_string(), self.nodes.to_string()]);
        table.add_row(vec!["edges".to_string(), self.edges.to_string()]);
        table.add_row(vec!["components".to_string(), self.components.to_string()]);
        table.add_row(vec![
            "largest component".to_string(),
            self.largest_component.to_string(),
        ]);
        table.add_row(vec!["singletons".to_string(), self.singletons.to_string()]);
        table.add_row(vec!["rounds".to_string(), self.rounds.to_string()]);
        table.add_row(vec!["state".to_string(), self.state.to_string()]);
        table
    }

    pub fn write_json<P: AsRef<Path>>(&self, p: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(p, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connected_components, CcConfig, EdgeTable, Universe};

    #[test]
    pub fn summarizes_components() -> anyhow::Result<()> {
        let edges: EdgeTable<&str> = vec![("a", "b"), ("b", "c"), ("d", "e")].into_iter().collect();
        let universe: Universe<&str> = ["w"].into_iter().collect();
        let out = connected_components(&edges, Some(&universe), &CcConfig::default())?;
        let s = RunSummary::from_outcome(&out);
        assert_eq!(6, s.nodes);
        assert_eq!(3, s.edges);
        assert_eq!(3, s.components);
        assert_eq!(3, s.largest_component);
        assert_eq!(1, s.singletons);
        assert_eq!(PropagationState::Converged, s.state);
        assert_eq!(s.rounds, s.history.len());
        let rendered = s.to_table().to_string();
        assert!(rendered.contains("converged"));
        Ok(())
    }
}
