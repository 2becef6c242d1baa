use std::path::Path;

use lz4::EncoderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub fn write_compressed_bincode<S, P>(path: P, data: &S) -> Result<()>
where
    S: Serialize,
    P: AsRef<Path>,
{
    let mut file = std::fs::File::create(path)?;
    let mut encoder = EncoderBuilder::new().level(4).build(&mut file)?;
    bincode::serialize_into(&mut encoder, data)?;
    let (_, res) = encoder.finish();
    res?;
    Ok(())
}

pub fn read_compressed_bincode<S, P>(path: P) -> Result<S>
where
    S: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let mut file = std::fs::File::open(path)?;
    let mut decoder = lz4::Decoder::new(&mut file)?;
    let data = bincode::deserialize_from(&mut decoder)?;
    Ok(data)
}

/// Does the path name a packed (`.lz4`) file?
pub fn is_packed<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().map_or(false, |ext| ext == "lz4")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{EdgeTable, RecordId};

    #[test]
    fn packed_edges_survive_compression() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("edges.bincode.lz4");
        let edges: EdgeTable<RecordId> = vec![("a".into(), RecordId::from("b")), ("b".into(), "c".into())]
            .into_iter()
            .collect();
        write_compressed_bincode(&path, &edges)?;
        let back: EdgeTable<RecordId> = read_compressed_bincode(&path)?;
        assert_eq!(edges, back);
        assert!(is_packed(&path));
        assert!(!is_packed(dir.path().join("edges.csv")));
        Ok(())
    }
}
