use std::{
    fmt::Display,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::Serialize;
use tracing::debug;

use crate::base::{EdgeTable, IdType, NodeId, RecordId, Universe};
use crate::components::{Components, Label};
use crate::error::{CcError, Result};
use crate::utils;

pub const DEFAULT_LEFT_COLUMN: &str = "record_id_l";
pub const DEFAULT_RIGHT_COLUMN: &str = "record_id_r";
pub const DEFAULT_NODE_COLUMN: &str = "record_id";

/// Names of the endpoint columns in an edge file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeColumns {
    pub left: String,
    pub right: String,
}

impl Default for EdgeColumns {
    fn default() -> Self {
        Self {
            left: DEFAULT_LEFT_COLUMN.to_string(),
            right: DEFAULT_RIGHT_COLUMN.to_string(),
        }
    }
}

/// Parses one cell; an empty cell is a null identifier.
pub fn parse_id(raw: &str, id_type: IdType) -> Result<Option<RecordId>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match id_type {
        IdType::String => Ok(Some(RecordId::Str(raw.to_string()))),
        IdType::Int => raw
            .parse::<i64>()
            .map(|i| Some(RecordId::Int(i)))
            .map_err(|_| CcError::invalid(format!("`{}` is not an integer identifier", raw))),
    }
}

fn column_index(headers: &csv::StringRecord, name: &str, what: &str) -> Result<usize> {
    headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
        CcError::invalid(format!(
            "{} must contain the column `{}`, but it contains {:?}",
            what,
            name,
            headers.iter().collect::<Vec<_>>()
        ))
    })
}

pub fn read_edges_csv<R: Read>(
    reader: R,
    columns: &EdgeColumns,
    id_type: IdType,
) -> Result<EdgeTable<RecordId>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let li = column_index(&headers, &columns.left, "edges")?;
    let ri = column_index(&headers, &columns.right, "edges")?;
    let mut left = Vec::new();
    let mut right = Vec::new();
    for record in rdr.records() {
        let record = record?;
        left.push(parse_id(record.get(li).unwrap_or_default(), id_type)?);
        right.push(parse_id(record.get(ri).unwrap_or_default(), id_type)?);
    }
    EdgeTable::from_columns(left, right)
}

/// Reads an edge relation, either a CSV file or a packed `.bincode.lz4` one.
pub fn read_edges<P: AsRef<Path>>(
    path: P,
    columns: &EdgeColumns,
    id_type: IdType,
) -> Result<EdgeTable<RecordId>> {
    if utils::is_packed(&path) {
        debug!("loading edges from bincode.lz4");
        let edges: EdgeTable<RecordId> = utils::read_compressed_bincode(path)?;
        match edges.validate()? {
            Some(found) if found != id_type => Err(CcError::invalid(format!(
                "packed edges hold {} identifiers but {} was requested",
                found, id_type
            ))),
            _ => Ok(edges),
        }
    } else {
        debug!("loading edges from csv");
        read_edges_csv(BufReader::new(File::open(path)?), columns, id_type)
    }
}

/// Reads a universe column. A single-column file is accepted whatever its
/// header says.
pub fn read_universe_csv<R: Read>(
    reader: R,
    column: &str,
    id_type: IdType,
) -> Result<Universe<RecordId>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let idx = match column_index(&headers, column, "nodes") {
        Ok(idx) => idx,
        Err(_) if headers.len() == 1 => 0,
        Err(e) => return Err(e),
    };
    let mut ids = Vec::new();
    for record in rdr.records() {
        let record = record?;
        ids.push(parse_id(record.get(idx).unwrap_or_default(), id_type)?);
    }
    Universe::from_column(ids)
}

pub fn read_universe<P: AsRef<Path>>(
    path: P,
    column: &str,
    id_type: IdType,
) -> Result<Universe<RecordId>> {
    read_universe_csv(BufReader::new(File::open(path)?), column, id_type)
}

#[derive(Serialize)]
struct ComponentRow {
    record_id: String,
    component: Label,
}

pub fn write_components<W, T>(writer: W, components: &Components<T>) -> Result<()>
where
    W: Write,
    T: NodeId + Display,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for (id, component) in components.iter() {
        wtr.serialize(ComponentRow {
            record_id: id.to_string(),
            component,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_components_file<P, T>(path: P, components: &Components<T>) -> Result<()>
where
    P: AsRef<Path>,
    T: NodeId + Display,
{
    let writer = BufWriter::new(File::create(path)?);
    write_components(writer, components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn reads_default_edge_columns() -> anyhow::Result<()> {
        let data = "record_id_l,record_id_r,weight\na,x,1\nb,x,2\n";
        let edges = read_edges_csv(data.as_bytes(), &EdgeColumns::default(), IdType::String)?;
        assert_eq!(2, edges.len());
        assert_eq!(Some(IdType::String), edges.id_type()?);
        Ok(())
    }

    #[test]
    pub fn missing_column_is_invalid_input() {
        let data = "left,right\na,b\n";
        let err =
            read_edges_csv(data.as_bytes(), &EdgeColumns::default(), IdType::String).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    pub fn empty_cell_is_a_null_identifier() {
        let data = "record_id_l,record_id_r\na,\n";
        let err =
            read_edges_csv(data.as_bytes(), &EdgeColumns::default(), IdType::String).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    pub fn int_ids_must_parse() -> anyhow::Result<()> {
        let data = "src,dst\n1,2\n";
        let columns = EdgeColumns {
            left: "src".into(),
            right: "dst".into(),
        };
        let edges = read_edges_csv(data.as_bytes(), &columns, IdType::Int)?;
        assert_eq!(Some(IdType::Int), edges.id_type()?);
        let bad = "src,dst\n1,two\n";
        assert!(read_edges_csv(bad.as_bytes(), &columns, IdType::Int)
            .unwrap_err()
            .is_invalid_input());
        Ok(())
    }

    #[derive(Serialize)]
    struct RaggedColumns {
        left: Vec<RecordId>,
        right: Vec<RecordId>,
    }

    #[test]
    pub fn packed_edges_with_ragged_columns_are_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("edges.bincode.lz4");
        let ragged = RaggedColumns {
            left: vec!["a".into(), "b".into(), "q".into()],
            right: vec!["b".into()],
        };
        utils::write_compressed_bincode(&path, &ragged)?;
        let err = read_edges(&path, &EdgeColumns::default(), IdType::String).unwrap_err();
        assert!(err.is_invalid_input());
        Ok(())
    }

    #[test]
    pub fn packed_edges_must_match_requested_id_type() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("edges.bincode.lz4");
        let edges: EdgeTable<RecordId> = vec![("a".into(), "b".into())].into_iter().collect();
        utils::write_compressed_bincode(&path, &edges)?;
        assert_eq!(1, read_edges(&path, &EdgeColumns::default(), IdType::String)?.len());
        let err = read_edges(&path, &EdgeColumns::default(), IdType::Int).unwrap_err();
        assert!(err.is_invalid_input());
        Ok(())
    }

    #[test]
    pub fn single_column_universe_ignores_header_name() -> anyhow::Result<()> {
        let data = "id\nw\nv\n";
        let u = read_universe_csv(data.as_bytes(), DEFAULT_NODE_COLUMN, IdType::String)?;
        assert_eq!(2, u.len());
        let wide = "id,name\nw,x\n";
        assert!(read_universe_csv(wide.as_bytes(), DEFAULT_NODE_COLUMN, IdType::String)
            .unwrap_err()
            .is_invalid_input());
        Ok(())
    }

    #[test]
    pub fn writes_record_id_and_component() -> anyhow::Result<()> {
        let edges: EdgeTable<RecordId> = vec![("a".into(), "b".into())].into_iter().collect();
        let out = crate::connected_components(&edges, None, &Default::default())?;
        let mut buf = Vec::new();
        write_components(&mut buf, &out.components)?;
        assert_eq!("record_id,component\na,0\nb,0\n", String::from_utf8(buf)?);
        Ok(())
    }
}
