///! # Bloom Filter
///!
///! A space-efficient probabilistic data structure for set membership testing.
///!
///! A bloom filter can tell you with certainty that a key is **not** in the set
///! (no false negatives), but may occasionally report that a key **is** in the
///! set when it isn't (false positives).
///!
///! ## Usage in this engine
///!
///! Each SSTable embeds a bloom filter built from its keys, stored as a raw,
///! fixed-size bitset immediately before the footer. During point lookups the
///! engine checks the bloom filter first -- if it says "not present", the
///! SSTable is skipped entirely without scanning its data region.
///!
///! ## Example
///!
///! ```rust,no_run
///! use bloom::BloomFilter;
///!
///! let mut bf = BloomFilter::new(1024);
///! bf.add(b"hello");
///! assert!(bf.may_contain(b"hello"));
///! ```
use std::io::{self, Read, Write};

/// The FNV-1a 32-bit offset basis.
const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
/// The FNV 32-bit prime, also used to derive the filter's second and third hashes.
const FNV_PRIME: u32 = 16_777_619;

/// A fixed-size bitset bloom filter with three hash functions derived from a
/// single FNV-1a hash.
///
/// Unlike a general-purpose bloom filter sized for an expected item count and
/// false-positive rate, this filter has a fixed byte size (`BLOOM_BYTES`,
/// configured by the caller) so that its on-disk representation is always
/// exactly that many bytes, with no header. The writer and reader of a given
/// SSTable must agree on this size out of band.
pub struct BloomFilter {
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Creates a new, empty bloom filter backed by `num_bytes` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `num_bytes` is 0.
    pub fn new(num_bytes: usize) -> Self {
        assert!(num_bytes > 0, "num_bytes must be > 0");
        Self {
            bits: vec![0u8; num_bytes],
        }
    }

    /// Wraps an existing bitset (used when reading a filter block off disk).
    pub fn from_bytes(bits: Vec<u8>) -> Self {
        Self { bits }
    }

    /// Returns the fixed size of this filter in bytes.
    #[must_use]
    pub fn num_bytes(&self) -> usize {
        self.bits.len()
    }

    /// Adds a key to the filter, setting all three of its bits.
    pub fn add(&mut self, key: &[u8]) {
        for h in hashes(key) {
            self.set_bit(h);
        }
    }

    /// Returns `true` if the key **might** be in the set, `false` if it is
    /// **definitely not**.
    #[must_use]
    pub fn may_contain(&self, key: &[u8]) -> bool {
        hashes(key).into_iter().all(|h| self.get_bit(h))
    }

    /// Writes the raw bitset to `w`. This is exactly `num_bytes()` bytes with
    /// no length prefix or header.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.bits)
    }

    /// Reads exactly `num_bytes` raw bitset bytes from `r`.
    pub fn read_from<R: Read>(r: &mut R, num_bytes: usize) -> io::Result<Self> {
        let mut bits = vec![0u8; num_bytes];
        r.read_exact(&mut bits)?;
        Ok(Self { bits })
    }

    fn bit_location(&self, h: u32) -> (usize, u8) {
        let byte_idx = (h / 8) as usize % self.bits.len();
        let bit_idx = (h % 8) as u8;
        (byte_idx, bit_idx)
    }

    fn set_bit(&mut self, h: u32) {
        let (byte_idx, bit_idx) = self.bit_location(h);
        self.bits[byte_idx] |= 1 << bit_idx;
    }

    fn get_bit(&self, h: u32) -> bool {
        let (byte_idx, bit_idx) = self.bit_location(h);
        (self.bits[byte_idx] >> bit_idx) & 1 == 1
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter")
            .field("bytes", &self.bits.len())
            .finish()
    }
}

/// Computes the three hashes the filter uses for a key: a primary FNV-1a hash
/// and two further hashes derived by repeated multiplication with the FNV
/// prime, per the engine's fixed hash-derivation scheme.
fn hashes(key: &[u8]) -> [u32; 3] {
    let h1 = fnv1a_32(key);
    let h2 = h1.wrapping_mul(FNV_PRIME);
    let h3 = h2.wrapping_mul(FNV_PRIME);
    [h1, h2, h3]
}

/// FNV-1a 32-bit hash.
fn fnv1a_32(data: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
