//! SSTable footer read/write helpers.
//!
//! The footer is a flat 8-byte little-endian integer: the byte offset `F`
//! where the data region ends and the filter bitset begins. There is no
//! magic number and no version tag — the on-disk layout has exactly one
//! shape.
//!
//! ```text
//! [data region][filter bitset: BLOOM_BYTES][footer: F as i64 LE]
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result as IoResult, Seek, SeekFrom, Write};

/// Size of the footer in bytes.
pub const FOOTER_BYTES: u64 = 8;

/// Writes the footer (`data_len` as an `i64 LE`) to `w`.
pub fn write_footer<W: Write>(w: &mut W, data_len: u64) -> IoResult<()> {
    w.write_i64::<LittleEndian>(data_len as i64)
}

/// Reads the footer from `r`, returning the filter offset `F`.
///
/// Seeks to the end of `r` to locate the footer, then leaves the cursor
/// immediately after it (i.e. at EOF).
pub fn read_footer<R: Read + Seek>(r: &mut R) -> IoResult<u64> {
    r.seek(SeekFrom::End(-(FOOTER_BYTES as i64)))?;
    let offset = r.read_i64::<LittleEndian>()?;
    Ok(offset as u64)
}
