//! System keys of the table catalog.

use tablekv_common::types::Key;
use tablekv_common::{DESC_ID_GENERATOR, DESC_METADATA_PREFIX, NAME_METADATA_PREFIX};
use tablekv_encoding::encode_uvarint;

/// Returns the prefix of every name key in `namespace_id`.
pub fn name_prefix(namespace_id: u32) -> Key {
    let mut buf = NAME_METADATA_PREFIX.to_vec();
    encode_uvarint(&mut buf, u64::from(namespace_id));
    Key::from_vec(buf)
}

/// Returns the key mapping table `name` in `namespace_id` to its
/// descriptor key. The name is lower-cased.
pub fn name_key(namespace_id: u32, name: &str) -> Key {
    let mut buf = name_prefix(namespace_id).as_bytes().to_vec();
    buf.extend_from_slice(name.to_lowercase().as_bytes());
    Key::from_vec(buf)
}

/// Returns the key holding the descriptor with `id`.
pub fn desc_key(id: u32) -> Key {
    let mut buf = DESC_METADATA_PREFIX.to_vec();
    encode_uvarint(&mut buf, u64::from(id));
    Key::from_vec(buf)
}

/// Returns the key of the descriptor ID counter.
pub fn desc_id_generator() -> Key {
    Key::from_bytes(DESC_ID_GENERATOR)
}
