//! System-wide constants and limits.

/// Maximum key size in bytes (16 KB).
pub const MAX_KEY_SIZE: usize = 16 * 1024;

/// Maximum value size in bytes (1 MB).
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

/// First byte of every system key. Table row keys start with the
/// escaped-bytes encoding of a non-empty table name, so they never begin
/// with this byte.
pub const SYSTEM_PREFIX: u8 = 0x00;

/// Prefix of the keys mapping a table name to its descriptor key.
pub const NAME_METADATA_PREFIX: &[u8] = b"\x00name-";

/// Prefix of the keys holding serialized table descriptors.
pub const DESC_METADATA_PREFIX: &[u8] = b"\x00desc-";

/// Counter used to allocate table descriptor IDs.
pub const DESC_ID_GENERATOR: &[u8] = b"\x00desc-idgen";

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE_ID: u32 = 0;
