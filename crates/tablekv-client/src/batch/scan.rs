//! Reconstruction of records from a scan over column keys.

use std::collections::HashSet;

use tablekv_common::types::KeyValue;

use crate::error::ClientResult;
use crate::model::Model;
use crate::record::Record;

/// Groups the sorted column pairs of a scan into records.
///
/// Consecutive pairs share a record while their keys start with the same
/// primary key. Primary key fields are decoded for every pair, so a record
/// whose columns are all filtered out is still returned with its identity
/// set. If any pair fails to decode, no records are returned.
pub(crate) fn reconstruct<R: Record>(
    model: &Model<R>,
    pairs: &[KeyValue],
    filter: Option<&HashSet<String>>,
) -> ClientResult<Vec<R>> {
    let mut records = Vec::new();
    if pairs.is_empty() {
        return Ok(records);
    }

    let mut current: Option<&[u8]> = None;
    let mut record = R::default();

    for pair in pairs {
        let key = pair.key.as_bytes();
        if let Some(primary_key) = current {
            if !key.starts_with(primary_key) {
                records.push(std::mem::take(&mut record));
            }
        }

        let column = model.decode_primary_key(key, &mut record)?;
        current = Some(&key[..key.len() - column.len()]);

        let column = String::from_utf8_lossy(column);
        if let Some(filter) = filter {
            if !filter.contains(&*column) {
                continue;
            }
        }
        model
            .field(&column)?
            .set_value(&mut record, pair.value.as_ref())?;
    }

    records.push(record);
    Ok(records)
}
