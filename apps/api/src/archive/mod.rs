//! Archive packager: turns scanned markers into a downloadable ZIP.

#[cfg(test)]
pub mod reader;
pub mod structures;
pub mod writer;

use std::collections::HashMap;

use thiserror::Error;

use crate::markers::path_guard::check_path;
use crate::markers::Marker;

pub use writer::ZipWriter;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error while writing archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive exceeds 4 GiB (ZIP64 is not supported)")]
    TooLarge,

    #[error("Archive exceeds 65535 entries (ZIP64 is not supported)")]
    TooManyEntries,

    #[error("Entry name is {0} bytes; the maximum is 65535")]
    NameTooLong(usize),

    #[error("Refusing unsafe entry name '{name}': {reason}")]
    UnsafeName { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    Stored,
    #[default]
    Deflate,
}

/// Packs markers into a ZIP buffer, one entry per distinct filename.
///
/// A repeated filename keeps the position of its first occurrence and the content
/// of its last one.
pub fn pack_markers(markers: &[Marker], compression: Compression) -> Result<Vec<u8>, ArchiveError> {
    let mut order: Vec<(&str, &str)> = Vec::with_capacity(markers.len());
    let mut index: HashMap<&str, usize> = HashMap::new();

    for marker in markers {
        let name = marker.filename.as_str();
        check_path(name).map_err(|reason| ArchiveError::UnsafeName {
            name: name.to_string(),
            reason: reason.to_string(),
        })?;

        match index.get(name) {
            Some(&i) => order[i].1 = marker.content.as_str(),
            None => {
                index.insert(name, order.len());
                order.push((name, marker.content.as_str()));
            }
        }
    }

    let mut writer = ZipWriter::new(compression);
    for (name, content) in &order {
        writer.add_file(name, content.as_bytes())?;
    }

    let bytes = writer.finish()?;
    tracing::info!(
        entries = order.len(),
        bytes = bytes.len(),
        "packed markers into zip"
    );
    Ok(bytes)
}
