use std::{fmt, fmt::Debug, hash::Hash, iter::FromIterator};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{CcError, Result};

/// Runtime type of a node identifier. Endpoints of one edge relation, and the
/// universe declared next to it, must all agree on it.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum IdType {
    String,
    Int,
}

/// A trait for record identifiers that can act as nodes of the match graph.
///
/// Anything comparable and hashable works; the [`IdType`] tag exists so that
/// dynamically typed identifiers (see [`RecordId`]) can be checked for
/// consistency before any work happens.
pub trait NodeId: Clone + Eq + Hash + Ord + Debug + Send + Sync {
    fn id_type(&self) -> IdType;
}

impl NodeId for String {
    fn id_type(&self) -> IdType {
        IdType::String
    }
}

impl<'a> NodeId for &'a str {
    fn id_type(&self) -> IdType {
        IdType::String
    }
}

macro_rules! int_node_id {
    ($($t:ty),*) => {
        $(impl NodeId for $t {
            fn id_type(&self) -> IdType {
                IdType::Int
            }
        })*
    };
}

int_node_id!(i32, i64, u32, u64, usize);

/// A dynamically typed record id, as read from files where the column type is
/// only known at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl NodeId for RecordId {
    fn id_type(&self) -> IdType {
        match self {
            RecordId::Int(_) => IdType::Int,
            RecordId::Str(_) => IdType::String,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(i: i64) -> Self {
        RecordId::Int(i)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Str(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Str(s)
    }
}

/// Checks that every identifier carries the same [`IdType`], returning it
/// (or `None` for an empty sequence).
pub(crate) fn uniform_id_type<'a, T, I>(ids: I, what: &str) -> Result<Option<IdType>>
where
    T: NodeId + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen: Option<IdType> = None;
    for id in ids {
        let t = id.id_type();
        match seen {
            None => seen = Some(t),
            Some(s) if s != t => {
                return Err(CcError::invalid(format!(
                    "{} mixes identifier types: found {} after {} (at {:?})",
                    what, t, s, id
                )))
            }
            _ => {}
        }
    }
    Ok(seen)
}

/// The edge relation: two endpoint columns of equal length, row `i` being the
/// unordered pair `(left[i], right[i])`.
///
/// Construction through [`Self::from_columns()`] rejects nulls; the
/// [`FromIterator`] impl takes already non-null pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTable<T> {
    left: Vec<T>,
    right: Vec<T>,
}

impl<T> Default for EdgeTable<T> {
    fn default() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
        }
    }
}

impl<T: NodeId> EdgeTable<T> {
    /// Builds an edge table from nullable endpoint columns.
    pub fn from_columns(left: Vec<Option<T>>, right: Vec<Option<T>>) -> Result<Self> {
        check_column_lengths(left.len(), right.len())?;
        let left = non_null_column(left, "left endpoint")?;
        let right = non_null_column(right, "right endpoint")?;
        Ok(Self { left, right })
    }

    pub fn push(&mut self, left: T, right: T) {
        self.left.push(left);
        self.right.push(right);
    }

    /// Number of edge rows, duplicates and self-edges included.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &T)> + '_ {
        self.left.iter().zip(self.right.iter())
    }

    /// Every endpoint, row by row, left before right.
    pub fn endpoints(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().flat_map(|(l, r)| [l, r])
    }

    /// Checks a table that did not come through [`Self::from_columns()`]
    /// (e.g. one deserialized from a packed file): the endpoint columns must
    /// have equal length and one identifier type, which is returned.
    pub fn validate(&self) -> Result<Option<IdType>> {
        check_column_lengths(self.left.len(), self.right.len())?;
        self.id_type()
    }

    /// The identifier type shared by all endpoints, `None` for an empty table.
    pub fn id_type(&self) -> Result<Option<IdType>> {
        let left = uniform_id_type(&self.left, "left endpoint column")?;
        let right = uniform_id_type(&self.right, "right endpoint column")?;
        match (left, right) {
            (Some(l), Some(r)) if l != r => Err(CcError::invalid(format!(
                "endpoint columns have different identifier types: {} vs {}",
                l, r
            ))),
            (l, r) => Ok(l.or(r)),
        }
    }
}

impl<T> FromIterator<(T, T)> for EdgeTable<T> {
    fn from_iter<I: IntoIterator<Item = (T, T)>>(iter: I) -> Self {
        let (left, right) = iter.into_iter().unzip();
        Self { left, right }
    }
}

/// The declared set of nodes that must appear in the output, possibly a
/// superset of the nodes referenced by edges. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe<T> {
    ids: Vec<T>,
}

impl<T: NodeId> Universe<T> {
    pub fn from_column(ids: Vec<Option<T>>) -> Result<Self> {
        Ok(Self {
            ids: non_null_column(ids, "universe")?,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.ids.iter()
    }

    /// Distinct identifiers in first-occurrence order.
    pub fn distinct(&self) -> impl Iterator<Item = &T> + '_ {
        self.ids.iter().unique()
    }

    pub fn id_type(&self) -> Result<Option<IdType>> {
        uniform_id_type(&self.ids, "universe")
    }
}

impl<T> FromIterator<T> for Universe<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

fn check_column_lengths(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(CcError::invalid(format!(
            "endpoint columns differ in length: {} left vs {} right",
            left, right
        )));
    }
    Ok(())
}

fn non_null_column<T>(column: Vec<Option<T>>, what: &str) -> Result<Vec<T>> {
    let len = column.len();
    let ids: Vec<T> = column.into_iter().flatten().collect();
    if ids.len() != len {
        return Err(CcError::invalid(format!(
            "{} column contains {} null identifier(s)",
            what,
            len - ids.len()
        )));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn edge_table_rejects_nulls() {
        let err = EdgeTable::from_columns(vec![Some(1i64), None], vec![Some(2), Some(3)])
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    pub fn edge_table_rejects_ragged_columns() {
        let err = EdgeTable::from_columns(vec![Some(1i64)], vec![Some(2), Some(3)]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    pub fn validate_rejects_ragged_deserialized_table() -> anyhow::Result<()> {
        let ragged: EdgeTable<String> =
            serde_json::from_str(r#"{"left": ["a", "b", "q"], "right": ["b"]}"#)?;
        assert!(ragged.validate().unwrap_err().is_invalid_input());
        let fine: EdgeTable<String> = serde_json::from_str(r#"{"left": ["a"], "right": ["b"]}"#)?;
        assert_eq!(Some(IdType::String), fine.validate()?);
        Ok(())
    }

    #[test]
    pub fn edge_table_reports_shared_type() -> anyhow::Result<()> {
        let edges: EdgeTable<RecordId> = vec![("a".into(), "b".into())].into_iter().collect();
        assert_eq!(Some(IdType::String), edges.id_type()?);
        let empty = EdgeTable::<RecordId>::default();
        assert_eq!(None, empty.id_type()?);
        Ok(())
    }

    #[test]
    pub fn mixed_record_ids_are_rejected() {
        let edges: EdgeTable<RecordId> = vec![(RecordId::Int(1), RecordId::Int(2)), ("x".into(), "y".into())]
            .into_iter()
            .collect();
        assert!(edges.id_type().unwrap_err().is_invalid_input());
        let crossed: EdgeTable<RecordId> = vec![(RecordId::Int(1), "y".into())].into_iter().collect();
        assert!(crossed.id_type().unwrap_err().is_invalid_input());
    }

    #[test]
    pub fn universe_distinct_keeps_first_occurrence() {
        let u: Universe<&str> = ["w", "a", "w", "b"].into_iter().collect();
        assert_eq!(vec![&"w", &"a", &"b"], u.distinct().collect_vec());
    }

    #[test]
    pub fn id_type_displays_lowercase() {
        assert_eq!("string", IdType::String.to_string());
        assert_eq!(IdType::Int, "int".parse::<IdType>().unwrap());
    }
}
