//! On-disk distance bundle: the named arrays `I`, `J`, `P`.
//!
//! This is the handoff to the embedding step, and it reads back identically
//! whether the graph was just computed or loaded from an earlier run.
//! Encoding is bincode behind a short magic/version header so a stray file is
//! rejected instead of misread.

use crate::edges::EdgeList;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const MAGIC: [u8; 8] = *b"PGRAPHv1";
const VERSION: u32 = 1;

/// File extension used by [`crate::pipeline`] for bundles.
pub const BUNDLE_EXTENSION: &str = "bundle";

#[derive(Serialize, Deserialize)]
struct BundleFile {
    magic: [u8; 8],
    version: u32,
    #[serde(rename = "I")]
    i: Vec<u64>,
    #[serde(rename = "J")]
    j: Vec<u64>,
    #[serde(rename = "P")]
    p: Vec<f64>,
}

fn bincode_error(path: &Path, err: bincode::Error) -> Error {
    match *err {
        bincode::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            Error::Decode(format!("{} is truncated", path.display()))
        }
        bincode::ErrorKind::Io(io) => Error::io(path, io),
        other => Error::Decode(other.to_string()),
    }
}

/// Write `edges` to `path`, replacing any existing file.
pub fn save_bundle(path: &Path, edges: &EdgeList) -> Result<()> {
    let file = BundleFile {
        magic: MAGIC,
        version: VERSION,
        i: edges.i.iter().map(|&v| v as u64).collect(),
        j: edges.j.iter().map(|&v| v as u64).collect(),
        p: edges.p.clone(),
    };

    let mut writer = BufWriter::new(File::create(path).map_err(|e| Error::io(path, e))?);
    bincode::serialize_into(&mut writer, &file).map_err(|e| bincode_error(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))?;

    log::info!("saved {} edges to {}", edges.len(), path.display());
    Ok(())
}

/// Read a bundle written by [`save_bundle`].
pub fn load_bundle(path: &Path) -> Result<EdgeList> {
    let reader = BufReader::new(File::open(path).map_err(|e| Error::io(path, e))?);
    let file: BundleFile = bincode::deserialize_from(reader).map_err(|e| bincode_error(path, e))?;

    if file.magic != MAGIC {
        return Err(Error::Decode(format!(
            "{} is not a distance bundle",
            path.display()
        )));
    }
    if file.version != VERSION {
        return Err(Error::Decode(format!(
            "unsupported bundle version {} (expected {VERSION})",
            file.version
        )));
    }

    let to_index = |v: u64| {
        usize::try_from(v).map_err(|_| Error::Decode(format!("index {v} does not fit in usize")))
    };
    let i = file.i.into_iter().map(to_index).collect::<Result<Vec<_>>>()?;
    let j = file.j.into_iter().map(to_index).collect::<Result<Vec<_>>>()?;
    let edges = EdgeList::new(i, j, file.p)?;

    log::info!("loaded {} edges from {}", edges.len(), path.display());
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_preserves_arrays() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.bundle");
        let edges = EdgeList::new(vec![0, 2, 1], vec![1, 0, 2], vec![0.25, 1e-12, 0.75]).unwrap();

        save_bundle(&path, &edges).unwrap();
        let loaded = load_bundle(&path).unwrap();
        assert_eq!(loaded, edges);
    }

    #[test]
    fn empty_bundle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bundle");
        save_bundle(&path, &EdgeList::default()).unwrap();
        assert!(load_bundle(&path).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.bundle");
        std::fs::write(&path, b"definitely not a bundle, just some text").unwrap();
        let err = load_bundle(&path).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_bundle(&dir.path().join("nope.bundle")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
