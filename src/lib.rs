//! ipdb - Memory-Mapped IPDB Reader
//!
//! Reads `.ipdb` IP geolocation databases: a JSON header, a binary trie
//! shared by IPv4 and IPv6, and a region of tab-separated records holding
//! one block of columns per language. Files are memory-mapped, lookups are
//! lock-free, and a live reader can be pointed at a new file without
//! interrupting concurrent lookups.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ipdb::Reader;
//!
//! let reader = Reader::open("ipipfree.ipdb")?;
//! println!("fields: {:?}", reader.fields()?);
//!
//! match reader.find("8.8.8.8", "CN") {
//!     Ok(values) => println!("8.8.8.8 -> {:?}", values),
//!     Err(e) if e.is_not_found() => println!("8.8.8.8 not in database"),
//!     Err(e) => return Err(e),
//! }
//!
//! // Swap in a newer file; lookups keep working throughout
//! reader.reload("ipipfree-new.ipdb")?;
//! # Ok::<(), ipdb::IpdbError>(())
//! ```
//!
//! # File Format
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  u32 metaLen (big-endian)            │
//! │  metaLen bytes of JSON metadata      │
//! ├──────────────────────────────────────┤
//! │  node_count * 8 bytes node array     │
//! ├──────────────────────────────────────┤
//! │  [u16 size][size bytes] records ...  │
//! └──────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types for ipdb operations
pub mod error;
/// Geolocation facade over the reader
pub mod geoip;
/// JSON header parsing
pub mod meta;
pub mod mmap;
/// Thread-safe reader with hot reload
pub mod reader;
pub mod record;
pub mod trie;

// Re-exports for Rust consumers

pub use crate::error::{IpdbError, Result};
pub use crate::geoip::{GeoIp, GeoResult};
pub use crate::meta::Meta;
pub use crate::reader::Reader;

/// Version of the ipdb library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
