use ahash::AHashMap;
use tracing::debug;

use crate::base::{EdgeTable, NodeId};
use crate::error::{CcError, Result};

/// Dense integer code of a node, in `[0, n)`.
pub type Code = u32;

/// Bidirectional mapping between external identifiers and dense internal codes.
///
/// Codes are handed out in first-occurrence order, so encoding the same input
/// twice yields the same mapping. The mapping belongs to a single computation
/// and is consumed when the labels are restored.
#[derive(Debug, Clone)]
pub struct Factorizer<T> {
    forward: AHashMap<T, Code>,
    rev: Vec<T>,
}

impl<T: NodeId> Default for Factorizer<T> {
    fn default() -> Self {
        Self {
            forward: AHashMap::default(),
            rev: Vec::new(),
        }
    }
}

impl<T: NodeId> Factorizer<T> {
    /// Returns the code for `id`, allocating the next one if it is new.
    pub fn request(&mut self, id: &T) -> Result<Code> {
        if let Some(&code) = self.forward.get(id) {
            return Ok(code);
        }
        let code = Code::try_from(self.rev.len()).map_err(|_| {
            CcError::invalid(format!(
                "more than {} distinct identifiers do not fit the code space",
                Code::MAX
            ))
        })?;
        self.forward.insert(id.clone(), code);
        self.rev.push(id.clone());
        Ok(code)
    }

    /// Encodes every endpoint of `edges`, returning the mapping and the edges
    /// rewritten as code pairs (row order preserved).
    pub fn encode(edges: &EdgeTable<T>) -> Result<(Self, Vec<(Code, Code)>)> {
        let mut f = Self::default();
        let mut coded = Vec::with_capacity(edges.len());
        for (l, r) in edges.iter() {
            let l = f.request(l)?;
            let r = f.request(r)?;
            coded.push((l, r));
        }
        debug!(
            distinct = f.len(),
            rows = edges.len(),
            "factorized edge endpoints"
        );
        Ok((f, coded))
    }

    /// Given an external id, retrieve the code
    pub fn retrieve(&self, id: &T) -> Option<Code> {
        self.forward.get(id).copied()
    }

    /// Given a code, retrieve the external id
    pub fn rev(&self, code: Code) -> Option<&T> {
        self.rev.get(code as usize)
    }

    pub fn contains(&self, id: &T) -> bool {
        self.forward.contains_key(id)
    }

    /// Number of distinct identifiers seen.
    pub fn len(&self) -> usize {
        self.rev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rev.is_empty()
    }

    /// Consumes the mapping, yielding identifiers in code order.
    pub fn into_ids(self) -> Vec<T> {
        self.rev
    }
}
