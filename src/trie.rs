//! IPDB Search Tree Traversal
//!
//! The trie is a flat array of 8-byte nodes. Each node holds two big-endian
//! `u32` child references, one for address bit 0 and one for bit 1. A
//! reference is interpreted relative to the node count:
//! - `< node_count`: another node (continue traversal)
//! - `== node_count`: empty (no record for this prefix)
//! - `> node_count`: terminal, points into the data region
//!
//! IPv4 and IPv6 share one trie. IPv4 addresses live under the
//! IPv4-mapped prefix `::ffff:0:0/96`, so the node reached after walking
//! those 96 bits is computed once per dataset and IPv4 lookups start there.

use crate::error::{IpdbError, Result};
use crate::meta::NODE_SIZE;

/// Length of the `::ffff:0:0/96` prefix in bits
pub const IPV4_MAPPED_PREFIX_BITS: usize = 96;

/// Leading zero bits of the IPv4-mapped prefix; the remaining 16 are ones
const IPV4_MAPPED_ZERO_BITS: usize = 80;

/// Binary trie over a node array
#[derive(Debug, Clone, Copy)]
pub struct SearchTree<'a> {
    body: &'a [u8],
    node_count: u32,
}

impl<'a> SearchTree<'a> {
    /// Create a search tree over `body`, which starts with the node array.
    ///
    /// # Errors
    ///
    /// Returns [`IpdbError::InvalidFile`] if `body` cannot hold
    /// `node_count` nodes.
    pub fn new(body: &'a [u8], node_count: u32) -> Result<Self> {
        let tree_size = (node_count as usize).saturating_mul(NODE_SIZE);
        if body.len() < tree_size {
            return Err(IpdbError::invalid_file(format!(
                "node array needs {} bytes, body has {}",
                tree_size,
                body.len()
            )));
        }
        Ok(Self { body, node_count })
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    /// Read the child reference of `node` for address bit `bit`.
    ///
    /// `node` must be an internal node (`< node_count`).
    pub fn read_node(&self, node: u32, bit: u8) -> u32 {
        debug_assert!(node < self.node_count);
        let off = node as usize * NODE_SIZE + (bit as usize & 1) * 4;
        let b = &self.body[off..off + 4];
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }

    /// Find the node where the IPv4 address space begins.
    ///
    /// Walks 80 zero bits followed by 16 one bits, stopping early once the
    /// reference is no longer an internal node.
    pub fn ipv4_start_node(&self) -> u32 {
        let mut node = 0u32;
        for i in 0..IPV4_MAPPED_PREFIX_BITS {
            if node >= self.node_count {
                break;
            }
            let bit = if i >= IPV4_MAPPED_ZERO_BITS { 1 } else { 0 };
            node = self.read_node(node, bit);
        }
        node
    }

    /// Walk the address bits and return the terminal reference.
    ///
    /// `addr` is the address in network byte order: 4 bytes for IPv4 (the
    /// walk starts at `v4offset`) or 16 bytes for IPv6 (the walk starts at
    /// the root). The walk stops as soon as a terminal reference is reached,
    /// so one leaf can cover a whole prefix.
    ///
    /// # Errors
    ///
    /// Returns [`IpdbError::NotFound`] if the walk ends on an internal node
    /// or on the empty reference.
    pub fn search(&self, addr: &[u8], v4offset: u32) -> Result<u32> {
        let bit_count = addr.len() * 8;
        let mut node = if bit_count == 32 { v4offset } else { 0 };

        for i in 0..bit_count {
            if node >= self.node_count {
                break;
            }
            let bit = (addr[i >> 3] >> (7 - (i & 7))) & 1;
            node = self.read_node(node, bit);
        }

        if node <= self.node_count {
            return Err(IpdbError::NotFound);
        }
        Ok(node)
    }
}
