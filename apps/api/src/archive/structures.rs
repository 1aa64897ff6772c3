use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Version 2.0: DEFLATE and directory entries, no ZIP64.
pub const VERSION_NEEDED: u16 = 20;
/// Made by Unix (high byte 3), PKZIP version 2.0.
pub const VERSION_MADE_BY: u16 = (3 << 8) | VERSION_NEEDED;
/// General purpose bit 11: file name is UTF-8.
pub const FLAG_UTF8: u16 = 1 << 11;
/// Regular file, mode 0644, stored in the high half of the external attributes.
pub const UNIX_FILE_ATTRS: u32 = 0o100644 << 16;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
}

impl CompressionMethod {
    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
        }
    }
}

/// MS-DOS packed time and date, the only timestamp format of the base ZIP headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    pub fn from_naive(ts: NaiveDateTime) -> Self {
        // DOS dates start at 1980 and hold 7 bits of year.
        let year = ts.year().clamp(1980, 2107) as u16;
        let time =
            ((ts.hour() as u16) << 11) | ((ts.minute() as u16) << 5) | (ts.second() as u16 / 2);
        let date = ((year - 1980) << 9) | ((ts.month() as u16) << 5) | ts.day() as u16;
        Self { time, date }
    }
}

/// Fields shared by the local header and the central directory record of one entry.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    pub file_name: String,
    pub method: CompressionMethod,
    pub modified: DosDateTime,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

/// Local File Header (LFH) - 30 bytes plus the name
pub struct LocalFileHeader<'a>(pub &'a EntryHeader);

impl LocalFileHeader<'_> {
    pub const SIGNATURE: u32 = 0x0403_4b50;
    pub const SIZE: usize = 30;

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let h = self.0;
        w.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        w.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        w.write_u16::<LittleEndian>(FLAG_UTF8)?;
        w.write_u16::<LittleEndian>(h.method.as_u16())?;
        w.write_u16::<LittleEndian>(h.modified.time)?;
        w.write_u16::<LittleEndian>(h.modified.date)?;
        w.write_u32::<LittleEndian>(h.crc32)?;
        w.write_u32::<LittleEndian>(h.compressed_size)?;
        w.write_u32::<LittleEndian>(h.uncompressed_size)?;
        w.write_u16::<LittleEndian>(h.file_name.len() as u16)?;
        w.write_u16::<LittleEndian>(0)?; // extra field length
        w.write_all(h.file_name.as_bytes())
    }
}

/// Central Directory File Header (CDFH) - 46 bytes plus the name
pub struct CentralDirectoryHeader<'a> {
    pub entry: &'a EntryHeader,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader<'_> {
    pub const SIGNATURE: u32 = 0x0201_4b50;
    pub const SIZE: usize = 46;

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let h = self.entry;
        w.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        w.write_u16::<LittleEndian>(VERSION_MADE_BY)?;
        w.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        w.write_u16::<LittleEndian>(FLAG_UTF8)?;
        w.write_u16::<LittleEndian>(h.method.as_u16())?;
        w.write_u16::<LittleEndian>(h.modified.time)?;
        w.write_u16::<LittleEndian>(h.modified.date)?;
        w.write_u32::<LittleEndian>(h.crc32)?;
        w.write_u32::<LittleEndian>(h.compressed_size)?;
        w.write_u32::<LittleEndian>(h.uncompressed_size)?;
        w.write_u16::<LittleEndian>(h.file_name.len() as u16)?;
        w.write_u16::<LittleEndian>(0)?; // extra field length
        w.write_u16::<LittleEndian>(0)?; // comment length
        w.write_u16::<LittleEndian>(0)?; // disk number start
        w.write_u16::<LittleEndian>(0)?; // internal attributes
        w.write_u32::<LittleEndian>(UNIX_FILE_ATTRS)?;
        w.write_u32::<LittleEndian>(self.lfh_offset)?;
        w.write_all(h.file_name.as_bytes())
    }
}

/// End of Central Directory (EOCD) - 22 bytes, no comment
pub struct EndOfCentralDirectory {
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x0605_4b50;
    pub const SIZE: usize = 22;

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        w.write_u16::<LittleEndian>(0)?; // this disk
        w.write_u16::<LittleEndian>(0)?; // disk with central directory
        w.write_u16::<LittleEndian>(self.total_entries)?;
        w.write_u16::<LittleEndian>(self.total_entries)?;
        w.write_u32::<LittleEndian>(self.cd_size)?;
        w.write_u32::<LittleEndian>(self.cd_offset)?;
        w.write_u16::<LittleEndian>(0) // comment length
    }
}
