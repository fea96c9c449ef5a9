//! # Zip Archive Writer
//!
//! Just enough of the zip format to package a batch of cards: deflated (or
//! stored, when deflate doesn't help) entries, a central directory, and the
//! end record. No zip64, no encryption, no extra fields.
//!
//! Every entry carries the same fixed timestamp, so the same cards always
//! produce byte-identical archives.
//!
//! ```text
//! [local header][name][data] ...   one per entry
//! [central header][name] ...       one per entry
//! [end of central directory]
//! ```

use std::io;

use miniz_oxide::deflate::compress_to_vec;

use crate::error::Result;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;

const VERSION: u16 = 20;
/// General purpose flag bit 11: names are UTF-8.
const FLAG_UTF8: u16 = 0x0800;
const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;
/// 00:00:00 in DOS time.
const DOS_TIME: u16 = 0;
/// 1980-01-01 in DOS date: (year - 1980) << 9 | month << 5 | day.
const DOS_DATE: u16 = (1 << 5) | 1;
const DEFLATE_LEVEL: u8 = 6;

struct CentralEntry {
    name: String,
    method: u16,
    crc: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    offset: u32,
}

/// Builds a zip archive in memory.
#[derive(Default)]
pub struct ZipWriter {
    buf: Vec<u8>,
    entries: Vec<CentralEntry>,
}

fn too_large(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{what} exceeds the 4 GiB zip limit"),
    )
}

fn to_u32(n: usize, what: &str) -> Result<u32> {
    Ok(u32::try_from(n).map_err(|_| too_large(what))?)
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

impl ZipWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a file. Entries keep the order they were added in.
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let crc = crc32fast::hash(data);
        let deflated = compress_to_vec(data, DEFLATE_LEVEL);
        let (method, payload) = if deflated.len() < data.len() {
            (METHOD_DEFLATED, deflated.as_slice())
        } else {
            (METHOD_STORED, data)
        };

        let entry = CentralEntry {
            name: name.to_string(),
            method,
            crc,
            compressed_size: to_u32(payload.len(), "entry")?,
            uncompressed_size: to_u32(data.len(), "entry")?,
            offset: to_u32(self.buf.len(), "archive")?,
        };
        let name_len = u16::try_from(name.len()).map_err(|_| too_large("entry name"))?;

        let buf = &mut self.buf;
        put_u32(buf, LOCAL_HEADER_SIG);
        put_u16(buf, VERSION);
        put_u16(buf, FLAG_UTF8);
        put_u16(buf, entry.method);
        put_u16(buf, DOS_TIME);
        put_u16(buf, DOS_DATE);
        put_u32(buf, entry.crc);
        put_u32(buf, entry.compressed_size);
        put_u32(buf, entry.uncompressed_size);
        put_u16(buf, name_len);
        put_u16(buf, 0); // extra field length
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(payload);

        log::debug!(
            "zip entry {} ({} -> {} bytes)",
            name,
            entry.uncompressed_size,
            entry.compressed_size
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let ZipWriter { mut buf, entries } = self;
        let cd_offset = to_u32(buf.len(), "archive")?;

        for entry in &entries {
            put_u32(&mut buf, CENTRAL_HEADER_SIG);
            put_u16(&mut buf, VERSION); // version made by
            put_u16(&mut buf, VERSION); // version needed
            put_u16(&mut buf, FLAG_UTF8);
            put_u16(&mut buf, entry.method);
            put_u16(&mut buf, DOS_TIME);
            put_u16(&mut buf, DOS_DATE);
            put_u32(&mut buf, entry.crc);
            put_u32(&mut buf, entry.compressed_size);
            put_u32(&mut buf, entry.uncompressed_size);
            put_u16(&mut buf, entry.name.len() as u16);
            put_u16(&mut buf, 0); // extra field length
            put_u16(&mut buf, 0); // comment length
            put_u16(&mut buf, 0); // disk number start
            put_u16(&mut buf, 0); // internal attributes
            put_u32(&mut buf, 0); // external attributes
            put_u32(&mut buf, entry.offset);
            buf.extend_from_slice(entry.name.as_bytes());
        }

        let cd_size = to_u32(buf.len(), "archive")? - cd_offset;
        let count = u16::try_from(entries.len()).map_err(|_| too_large("entry count"))?;

        put_u32(&mut buf, END_OF_CENTRAL_DIR_SIG);
        put_u16(&mut buf, 0); // this disk
        put_u16(&mut buf, 0); // disk with central directory
        put_u16(&mut buf, count);
        put_u16(&mut buf, count);
        put_u32(&mut buf, cd_size);
        put_u32(&mut buf, cd_offset);
        put_u16(&mut buf, 0); // comment length
        Ok(buf)
    }
}
