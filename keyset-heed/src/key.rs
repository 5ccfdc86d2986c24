//! Row keys: `namespace 0x00 partition id`, both numbers big endian so that
//! every row of one partition is a contiguous, id-ordered key range.

use byteorder::{BigEndian, ByteOrder};
use keyset::Id;

/// Key prefix shared by every row of `partition` in `namespace`.
pub fn make_prefix(namespace: &[u8], partition: Id) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(namespace.len() + 1 + 8);
    let mut buf = [0u8; 8];

    prefix.extend_from_slice(namespace);
    prefix.push(0);

    BigEndian::write_u64(&mut buf, partition);
    prefix.extend_from_slice(&buf);

    prefix
}

pub fn make_row_key(namespace: &[u8], partition: Id, id: Id) -> Vec<u8> {
    let mut key = make_prefix(namespace, partition);
    let mut buf = [0u8; 8];

    BigEndian::write_u64(&mut buf, id);
    key.extend_from_slice(&buf);

    key
}

/// Parses a row key into `(partition, id)`.
pub fn parse_row_key(key: &[u8]) -> Option<(Id, Id)> {
    if key.len() < 17 {
        return None;
    }
    let partition = BigEndian::read_u64(&key[key.len() - 16..key.len() - 8]);
    let id = BigEndian::read_u64(&key[key.len() - 8..]);
    Some((partition, id))
}
