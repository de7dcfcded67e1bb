//! CRC-32 (IEEE 802.3) accumulator used to fingerprint a sent program.
//!
//! A thin alias over `crc32fast`'s streaming hasher so callers reach for
//! [`Crc32`] rather than depending on the backing crate directly.

pub type Crc32 = crc32fast::Hasher;
