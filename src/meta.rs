//! IPDB header parsing
//!
//! An IPDB file starts with a big-endian `u32` length followed by that many
//! bytes of JSON metadata. Everything after the metadata is the body: the
//! node array immediately followed by the data region.
//!
//! ```text
//! offset 0            : u32 metaLen
//! offset 4            : metaLen bytes of JSON
//! offset 4+metaLen    : node_count * 8 bytes (node array)
//! offset 4+metaLen+8N : data region
//! ```

use crate::error::{IpdbError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Size of the length prefix in front of the JSON metadata
pub const META_LEN_SIZE: usize = 4;

/// Bytes per trie node: two big-endian `u32` child references
pub const NODE_SIZE: usize = 8;

/// `ip_version` flag for databases carrying IPv4 data
pub const IPV4_FLAG: u16 = 0x01;

/// `ip_version` flag for databases carrying IPv6 data
pub const IPV6_FLAG: u16 = 0x02;

/// Database metadata stored as JSON at the start of the file
///
/// Keys missing from the JSON default to zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Build timestamp (Unix seconds)
    pub build: i64,
    /// Bit flags: [`IPV4_FLAG`], [`IPV6_FLAG`]
    pub ip_version: u16,
    /// Language name -> column block index
    pub languages: HashMap<String, usize>,
    /// Number of nodes in the trie
    pub node_count: i64,
    /// Size of the node array plus data region, as recorded by the builder
    pub total_size: i64,
    /// Column names, one block of these per language
    pub fields: Vec<String>,
}

impl Meta {
    /// Whether the builder flagged this database as carrying IPv4 data.
    pub fn supports_ipv4(&self) -> bool {
        self.ip_version & IPV4_FLAG != 0
    }

    /// Whether the builder flagged this database as carrying IPv6 data.
    pub fn supports_ipv6(&self) -> bool {
        self.ip_version & IPV6_FLAG != 0
    }

    /// Column block index for `language`, if declared.
    pub fn language_index(&self, language: &str) -> Option<usize> {
        self.languages.get(language).copied()
    }

    /// Declared language names, sorted.
    pub fn language_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.languages.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Parsed header: metadata plus the location of the body
#[derive(Debug, Clone)]
pub struct Header {
    /// Decoded metadata
    pub meta: Meta,
    /// `meta.node_count`, validated to fit a 4-byte child reference
    pub node_count: u32,
    /// Offset of the node array from the start of the file
    pub body_offset: usize,
}

impl Header {
    /// Parse and validate the header of an IPDB file.
    ///
    /// # Errors
    ///
    /// - [`IpdbError::InvalidFile`] if the length prefix or body is truncated,
    ///   `node_count` is not positive, or `fields` is empty
    /// - [`IpdbError::InvalidMetadata`] if the JSON does not decode
    pub fn from_file(data: &[u8]) -> Result<Self> {
        let prefix: [u8; META_LEN_SIZE] = data
            .get(..META_LEN_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| IpdbError::invalid_file("missing metadata length"))?;
        let meta_len = u32::from_be_bytes(prefix) as usize;

        let body_offset = META_LEN_SIZE
            .checked_add(meta_len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                IpdbError::invalid_file(format!(
                    "metadata length {} exceeds file size {}",
                    meta_len,
                    data.len()
                ))
            })?;

        let meta: Meta = serde_json::from_slice(&data[META_LEN_SIZE..body_offset])
            .map_err(IpdbError::InvalidMetadata)?;

        if meta.node_count <= 0 {
            return Err(IpdbError::invalid_file(format!(
                "node count must be positive, got {}",
                meta.node_count
            )));
        }
        if meta.fields.is_empty() {
            return Err(IpdbError::invalid_file("no fields declared"));
        }
        let node_count = u32::try_from(meta.node_count).map_err(|_| {
            IpdbError::invalid_file(format!("node count {} out of range", meta.node_count))
        })?;

        let body_len = data.len() - body_offset;
        let tree_size = (node_count as usize).saturating_mul(NODE_SIZE);
        if body_len < tree_size {
            return Err(IpdbError::invalid_file(format!(
                "node array needs {} bytes, body has {}",
                tree_size, body_len
            )));
        }

        Ok(Header {
            meta,
            node_count,
            body_offset,
        })
    }
}
