//! In-memory ZIP writer.
//!
//! Entries are appended as `local header + data`; `finish` writes the central
//! directory and the end-of-central-directory record. Archives that would need
//! ZIP64 (more than 65 535 entries or offsets past 4 GiB) are rejected.

use std::io::Write;

use chrono::NaiveDateTime;
use flate2::write::DeflateEncoder;
use tracing::debug;

use super::structures::{
    CentralDirectoryHeader, CompressionMethod, DosDateTime, EndOfCentralDirectory, EntryHeader,
    LocalFileHeader,
};
use super::{ArchiveError, Compression};

struct WrittenEntry {
    header: EntryHeader,
    lfh_offset: u32,
}

pub struct ZipWriter {
    buf: Vec<u8>,
    entries: Vec<WrittenEntry>,
    compression: Compression,
    modified: DosDateTime,
}

impl ZipWriter {
    pub fn new(compression: Compression) -> Self {
        Self::with_timestamp(compression, chrono::Local::now().naive_local())
    }

    pub fn with_timestamp(compression: Compression, modified: NaiveDateTime) -> Self {
        Self {
            buf: Vec::new(),
            entries: Vec::new(),
            compression,
            modified: DosDateTime::from_naive(modified),
        }
    }

    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<(), ArchiveError> {
        if name.len() > u16::MAX as usize {
            return Err(ArchiveError::NameTooLong(name.len()));
        }
        if self.entries.len() >= u16::MAX as usize {
            return Err(ArchiveError::TooManyEntries);
        }
        let uncompressed_size = to_u32(data.len())?;
        let lfh_offset = to_u32(self.buf.len())?;

        let mut crc = flate2::Crc::new();
        crc.update(data);

        let (method, payload) = self.encode(data)?;

        let header = EntryHeader {
            file_name: name.to_string(),
            method,
            modified: self.modified,
            crc32: crc.sum(),
            compressed_size: to_u32(payload.len())?,
            uncompressed_size,
        };

        LocalFileHeader(&header).write_to(&mut self.buf)?;
        self.buf.extend_from_slice(&payload);

        debug!(
            name,
            method = ?header.method,
            size = header.uncompressed_size,
            compressed = header.compressed_size,
            "added zip entry"
        );

        self.entries.push(WrittenEntry { header, lfh_offset });
        Ok(())
    }

    /// Deflates `data` unless compression is off or would not shrink it.
    fn encode(&self, data: &[u8]) -> Result<(CompressionMethod, Vec<u8>), ArchiveError> {
        if self.compression == Compression::Stored || data.is_empty() {
            return Ok((CompressionMethod::Stored, data.to_vec()));
        }

        let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        let deflated = encoder.finish()?;

        if deflated.len() < data.len() {
            Ok((CompressionMethod::Deflate, deflated))
        } else {
            Ok((CompressionMethod::Stored, data.to_vec()))
        }
    }

    pub fn finish(mut self) -> Result<Vec<u8>, ArchiveError> {
        let cd_offset = to_u32(self.buf.len())?;

        for entry in &self.entries {
            CentralDirectoryHeader {
                entry: &entry.header,
                lfh_offset: entry.lfh_offset,
            }
            .write_to(&mut self.buf)?;
        }

        let cd_size = to_u32(self.buf.len() - cd_offset as usize)?;

        EndOfCentralDirectory {
            total_entries: self.entries.len() as u16,
            cd_size,
            cd_offset,
        }
        .write_to(&mut self.buf)?;

        Ok(self.buf)
    }
}

fn to_u32(n: usize) -> Result<u32, ArchiveError> {
    u32::try_from(n).map_err(|_| ArchiveError::TooLarge)
}
