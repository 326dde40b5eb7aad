//! Record resolution and field projection
//!
//! A terminal trie reference is re-based onto the data region, which starts
//! right after the node array:
//!
//! ```text
//! offset = (reference - node_count) + node_count * 8
//! ```
//!
//! At that offset sits a big-endian `u16` length and the record bytes. A
//! record is a tab-separated list of columns: one block of `fields.len()`
//! columns per language, in column-block order.

use crate::error::{IpdbError, Result};
use crate::meta::NODE_SIZE;

/// Column separator inside a record
pub const FIELD_SEPARATOR: char = '\t';

/// Byte offset into the body for a terminal reference.
///
/// `node` must be greater than `node_count`. Returns `None` if the offset
/// does not fit in `usize`.
pub fn data_offset(node: u32, node_count: u32) -> Option<usize> {
    debug_assert!(node > node_count);
    let rebased = usize::try_from(node.checked_sub(node_count)?).ok()?;
    (node_count as usize)
        .checked_mul(NODE_SIZE)?
        .checked_add(rebased)
}

/// Extract the record for terminal reference `node` as an owned string.
///
/// The returned string never borrows from `body`.
///
/// # Errors
///
/// Returns [`IpdbError::InvalidFile`] if the length prefix or the record
/// runs past the end of the body.
pub fn resolve(body: &[u8], node: u32, node_count: u32) -> Result<String> {
    let off = data_offset(node, node_count).ok_or_else(|| {
        IpdbError::invalid_file(format!(
            "record reference {} overflows the address space",
            node
        ))
    })?;

    let prefix = body
        .get(off..)
        .and_then(|rest| rest.get(..2))
        .ok_or_else(|| {
            IpdbError::invalid_file(format!(
                "record offset {} out of range (body is {} bytes)",
                off,
                body.len()
            ))
        })?;
    let size = u16::from_be_bytes([prefix[0], prefix[1]]) as usize;

    let start = off + 2;
    let bytes = body
        .get(start..)
        .and_then(|rest| rest.get(..size)).ok_or_else(|| {
        IpdbError::invalid_file(format!(
            "record of {} bytes at offset {} overruns body of {} bytes",
            size,
            start,
            body.len()
        ))
    })?;

    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Select one language's columns from a record.
///
/// `language_index` is the column block, `field_len` the number of columns
/// per block. Returns exactly `field_len` owned values.
///
/// # Errors
///
/// Returns [`IpdbError::InvalidFile`] if the record has fewer columns than
/// the block requires.
pub fn project(record: &str, language_index: usize, field_len: usize) -> Result<Vec<String>> {
    let columns: Vec<&str> = record.split(FIELD_SEPARATOR).collect();

    let (start, end) = language_index
        .checked_mul(field_len)
        .and_then(|start| Some((start, start.checked_add(field_len)?)))
        .ok_or_else(|| IpdbError::invalid_file("language index out of range"))?;
    if end > columns.len() {
        return Err(IpdbError::invalid_file(format!(
            "record has {} columns, language block needs {}..{}",
            columns.len(),
            start,
            end
        )));
    }

    Ok(columns[start..end].iter().map(|s| s.to_string()).collect())
}
