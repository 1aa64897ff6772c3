//! Minimal reader for archives produced by [`ZipWriter`](super::ZipWriter).
//!
//! Reads from the end: EOCD (no comment) -> central directory -> local header
//! and data for each entry. CRCs are verified after decoding.

use std::io::{Cursor, Read};

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;

use super::structures::{CentralDirectoryHeader, EndOfCentralDirectory, LocalFileHeader};

#[derive(Debug, Clone)]
pub struct ReadEntry {
    pub name: String,
    pub method: u16,
    pub data: Vec<u8>,
}

pub fn read_archive(bytes: &[u8]) -> Result<Vec<ReadEntry>> {
    if bytes.len() < EndOfCentralDirectory::SIZE {
        bail!("archive shorter than EOCD record");
    }
    let eocd_offset = bytes.len() - EndOfCentralDirectory::SIZE;
    let mut cursor = Cursor::new(&bytes[eocd_offset..]);
    if cursor.read_u32::<LittleEndian>()? != EndOfCentralDirectory::SIGNATURE {
        bail!("missing EOCD signature");
    }
    cursor.set_position(10);
    let total_entries = cursor.read_u16::<LittleEndian>()?;
    let _cd_size = cursor.read_u32::<LittleEndian>()?;
    let cd_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut cd = Cursor::new(bytes);
    cd.set_position(cd_offset);

    let mut entries = Vec::with_capacity(total_entries as usize);
    for _ in 0..total_entries {
        if cd.read_u32::<LittleEndian>()? != CentralDirectoryHeader::SIGNATURE {
            bail!("bad central directory signature");
        }
        let start = cd.position() - 4;
        cd.set_position(start + 10);
        let method = cd.read_u16::<LittleEndian>()?;
        cd.set_position(start + 16);
        let crc32 = cd.read_u32::<LittleEndian>()?;
        let compressed_size = cd.read_u32::<LittleEndian>()? as usize;
        let uncompressed_size = cd.read_u32::<LittleEndian>()? as usize;
        let name_len = cd.read_u16::<LittleEndian>()? as usize;
        let extra_len = cd.read_u16::<LittleEndian>()? as u64;
        let comment_len = cd.read_u16::<LittleEndian>()? as u64;
        cd.set_position(start + 42);
        let lfh_offset = cd.read_u32::<LittleEndian>()? as usize;

        let mut name = vec![0u8; name_len];
        cd.read_exact(&mut name)?;
        cd.set_position(cd.position() + extra_len + comment_len);
        let name = String::from_utf8(name).context("entry name is not UTF-8")?;

        let data = read_entry_data(bytes, lfh_offset, compressed_size, method)?;
        if data.len() != uncompressed_size {
            bail!("uncompressed size mismatch");
        }
        let mut crc = flate2::Crc::new();
        crc.update(&data);
        if crc.sum() != crc32 {
            bail!("CRC mismatch");
        }

        entries.push(ReadEntry { name, method, data });
    }

    Ok(entries)
}

fn read_entry_data(
    bytes: &[u8],
    lfh_offset: usize,
    compressed_size: usize,
    method: u16,
) -> Result<Vec<u8>> {
    let mut lfh = Cursor::new(bytes);
    lfh.set_position(lfh_offset as u64);
    if lfh.read_u32::<LittleEndian>()? != LocalFileHeader::SIGNATURE {
        bail!("bad local header signature");
    }
    lfh.set_position(lfh_offset as u64 + 26);
    let name_len = lfh.read_u16::<LittleEndian>()? as usize;
    let extra_len = lfh.read_u16::<LittleEndian>()? as usize;

    let data_start = lfh_offset + LocalFileHeader::SIZE + name_len + extra_len;
    let raw = bytes
        .get(data_start..data_start + compressed_size)
        .context("entry data out of bounds")?;

    match method {
        0 => Ok(raw.to_vec()),
        8 => {
            let mut out = Vec::new();
            DeflateDecoder::new(raw).read_to_end(&mut out)?;
            Ok(out)
        }
        other => bail!("unsupported compression method {other}"),
    }
}
