use std::path::Path;

use nom::{
    branch::alt, bytes::complete::tag_no_case, combinator::all_consuming, IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::error::{CcError, Result};

/// How a propagation round is carried out.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    /// Each round merges labels exactly one equivalence hop apart.
    Hop,
    /// Like `Hop`, but every label first jumps to the label of the node it
    /// names. Rounds grow logarithmically with component diameter.
    Shortcut,
    /// Disjoint-set union in one pass; no rounds, `max_iter` is ignored.
    UnionFind,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Shortcut
    }
}

pub fn token<'a>(i: &'a str) -> impl Fn(&'a str) -> IResult<&'a str, &'a str> {
    tag_no_case(i)
}

pub fn parse_strategy(s: &str) -> std::result::Result<Strategy, String> {
    let mut ps = all_consuming(alt((
        alt((token("union-find"), token("union_find"), token("uf")))
            .map(|_| Strategy::UnionFind),
        token("shortcut").map(|_| Strategy::Shortcut),
        token("hop").map(|_| Strategy::Hop),
    )));
    let (_, strategy) = ps(s.trim()).map_err(|_| {
        format!(
            "Could not parse strategy `{}`, expected one of hop, shortcut, union-find",
            s
        )
    })?;
    Ok(strategy)
}

/// Parameters of one connected-components computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcConfig {
    /// Round limit; `None` runs until the fixpoint. `Some(0)` runs no round
    /// and returns every node as its own component.
    pub max_iter: Option<usize>,
    pub strategy: Strategy,
}

impl CcConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| CcError::invalid(format!("config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_parse_strategy() {
        assert_eq!(Ok(Strategy::Hop), parse_strategy("hop"));
        assert_eq!(Ok(Strategy::Shortcut), parse_strategy("Shortcut"));
        assert_eq!(Ok(Strategy::UnionFind), parse_strategy("union-find"));
        assert_eq!(Ok(Strategy::UnionFind), parse_strategy("uf"));
        assert!(parse_strategy("hopscotch").is_err());
        assert!(parse_strategy("").is_err());
    }

    #[test]
    pub fn strategy_display_round_trips_through_parser() {
        for s in [Strategy::Hop, Strategy::Shortcut, Strategy::UnionFind] {
            assert_eq!(Ok(s), parse_strategy(&s.to_string()));
        }
    }

    #[test]
    pub fn config_deserializes_with_defaults() -> anyhow::Result<()> {
        let c: CcConfig = serde_json::from_str(r#"{"max_iter": 3}"#)?;
        assert_eq!(CcConfig::default().with_max_iter(3), c);
        let c: CcConfig = serde_json::from_str(r#"{"strategy": "union-find"}"#)?;
        assert_eq!(Strategy::UnionFind, c.strategy);
        assert_eq!(None, c.max_iter);
        Ok(())
    }
}
