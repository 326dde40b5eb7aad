//! IPDB Reader
//!
//! [`Reader`] is the public handle for lookups. It holds the current dataset
//! (mapping, metadata and precomputed IPv4 start node) as an immutable
//! snapshot behind an atomic pointer:
//!
//! - lookups load the snapshot without locking, copy their result out of the
//!   mapping and release it;
//! - [`Reader::reload`] opens and validates the replacement file with no
//!   lock held, then swaps the pointer in one step under a lock that only
//!   reload and close take;
//! - a snapshot is unmapped when its last user drops it, which is always
//!   after the swap that retired it.
//!
//! A failed reload leaves the live snapshot untouched.
//!
//! # Example
//!
//! ```no_run
//! use ipdb::Reader;
//!
//! let reader = Reader::open("city.ipdb")?;
//! let fields = reader.fields()?;
//! let values = reader.find("114.114.114.114", "CN")?;
//! for (name, value) in fields.iter().zip(&values) {
//!     println!("{}: {}", name, value);
//! }
//!
//! reader.reload("city-new.ipdb")?;
//! reader.close()?;
//! # Ok::<(), ipdb::IpdbError>(())
//! ```

use crate::error::{IpdbError, Result};
use crate::meta::{Header, Meta};
use crate::mmap::MmapFile;
use crate::record;
use crate::trie::SearchTree;
use arc_swap::ArcSwapOption;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// One fully validated database, never mutated after load
struct Dataset {
    map: MmapFile,
    meta: Meta,
    node_count: u32,
    body_offset: usize,
    field_len: usize,
    v4offset: u32,
    source: Option<PathBuf>,
    /// Number of reloads that preceded this dataset
    generation: u64,
}

/// Parse an address the way lookups accept it.
///
/// IPv6 text may carry a non-empty `%zone` suffix, which is ignored; the
/// zone never selects a different record.
fn parse_ip(ip: &str) -> Result<IpAddr> {
    let invalid = || IpdbError::InvalidIp(ip.to_string());
    match ip.split_once('%') {
        Some((addr, zone)) if addr.contains(':') && !zone.is_empty() => addr
            .parse::<Ipv6Addr>()
            .map(IpAddr::V6)
            .map_err(|_| invalid()),
        Some(_) => Err(invalid()),
        None => ip.parse().map_err(|_| invalid()),
    }
}

impl Dataset {
    fn open(path: &Path) -> Result<Self> {
        let map = MmapFile::open(path)?;
        Self::load(map, Some(path.to_path_buf()))
    }

    /// Parse the header, check the node array and compute the IPv4 start
    /// node. `map` is released if any step fails.
    fn load(map: MmapFile, source: Option<PathBuf>) -> Result<Self> {
        let header = Header::from_file(map.as_slice())?;
        let body = &map.as_slice()[header.body_offset..];
        let v4offset = SearchTree::new(body, header.node_count)?.ipv4_start_node();

        debug!(
            "loaded ipdb {:?}: {} nodes, {} fields, languages {:?}, v4offset {}",
            source,
            header.node_count,
            header.meta.fields.len(),
            header.meta.language_names(),
            v4offset
        );

        Ok(Dataset {
            field_len: header.meta.fields.len(),
            node_count: header.node_count,
            body_offset: header.body_offset,
            meta: header.meta,
            v4offset,
            map,
            source,
            generation: 0,
        })
    }

    fn body(&self) -> &[u8] {
        &self.map.as_slice()[self.body_offset..]
    }

    fn language_index(&self, language: &str) -> Result<usize> {
        self.meta
            .language_index(language)
            .ok_or_else(|| IpdbError::NoLanguage(language.to_string()))
    }

    fn find(&self, ip: &str, language: &str) -> Result<Vec<String>> {
        let language_index = self.language_index(language)?;
        let addr = parse_ip(ip)?;
        self.project(addr, language_index)
    }

    fn project(&self, addr: IpAddr, language_index: usize) -> Result<Vec<String>> {
        let tree = SearchTree::new(self.body(), self.node_count)?;
        let node = match addr {
            IpAddr::V4(v4) => tree.search(&v4.octets(), self.v4offset)?,
            IpAddr::V6(v6) => tree.search(&v6.octets(), self.v4offset)?,
        };
        let raw = record::resolve(self.body(), node, self.node_count)?;
        record::project(&raw, language_index, self.field_len)
    }
}

impl Drop for Dataset {
    fn drop(&mut self) {
        debug!("releasing ipdb {:?}", self.source);
        self.map.close();
    }
}

/// Thread-safe IPDB reader with hot reload
///
/// `Reader` is `Send + Sync`; share it behind an `Arc` and call
/// [`find`](Reader::find) from any number of threads while another thread
/// calls [`reload`](Reader::reload).
pub struct Reader {
    /// `None` once closed
    current: ArcSwapOption<Dataset>,
    /// Generation of the last installed dataset, kept after close
    generation: AtomicU64,
    /// Serializes reload and close; lookups never take it
    swap_lock: Mutex<()>,
}

impl Reader {
    /// Open and memory-map an IPDB file.
    ///
    /// # Errors
    ///
    /// Returns the first failure: [`IpdbError::Io`] if the file cannot be
    /// mapped, [`IpdbError::InvalidFile`] for a malformed layout, or
    /// [`IpdbError::InvalidMetadata`] if the JSON header does not decode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dataset = Dataset::open(path.as_ref())?;
        Ok(Self::with_dataset(dataset))
    }

    /// Create a reader over an in-memory database.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let dataset = Dataset::load(MmapFile::from_bytes(data), None)?;
        Ok(Self::with_dataset(dataset))
    }

    fn with_dataset(dataset: Dataset) -> Self {
        Reader {
            current: ArcSwapOption::from_pointee(dataset),
            generation: AtomicU64::new(0),
            swap_lock: Mutex::new(()),
        }
    }

    fn lock_swap(&self) -> MutexGuard<'_, ()> {
        self.swap_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` against the live dataset.
    fn with_current<T>(&self, f: impl FnOnce(&Dataset) -> Result<T>) -> Result<T> {
        let guard = self.current.load();
        match &*guard {
            Some(dataset) => f(dataset),
            None => Err(IpdbError::Closed),
        }
    }

    /// Look up `ip` and return the columns for `language`.
    ///
    /// The result has one value per entry of [`fields`](Reader::fields) and
    /// is owned by the caller.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`IpdbError::Closed`] after [`close`](Reader::close)
    /// - [`IpdbError::NoLanguage`] if `language` is not declared (even when
    ///   `ip` is also malformed)
    /// - [`IpdbError::InvalidIp`] if `ip` is not an IPv4 or IPv6 address
    /// - [`IpdbError::NotFound`] if the address has no record
    /// - [`IpdbError::InvalidFile`] if the record is out of range or has
    ///   fewer columns than declared
    pub fn find(&self, ip: &str, language: &str) -> Result<Vec<String>> {
        self.with_current(|dataset| dataset.find(ip, language))
    }

    /// Like [`find`](Reader::find) for an already parsed address.
    pub fn find_addr(&self, addr: IpAddr, language: &str) -> Result<Vec<String>> {
        self.with_current(|dataset| {
            let language_index = dataset.language_index(language)?;
            dataset.project(addr, language_index)
        })
    }

    /// Look up `ip` and return a field name to value map.
    pub fn find_map(&self, ip: &str, language: &str) -> Result<HashMap<String, String>> {
        self.find_with(ip, language, |meta, values| {
            meta.fields.iter().cloned().zip(values).collect()
        })
    }

    /// Look up `ip` and pass the values to `f` along with the metadata of
    /// the dataset that produced them, so a concurrent reload cannot pair
    /// values with another file's field list.
    pub fn find_with<T>(
        &self,
        ip: &str,
        language: &str,
        f: impl FnOnce(&Meta, Vec<String>) -> T,
    ) -> Result<T> {
        self.with_current(|dataset| {
            let values = dataset.find(ip, language)?;
            Ok(f(&dataset.meta, values))
        })
    }

    /// Field names, in the order [`find`](Reader::find) returns values.
    pub fn fields(&self) -> Result<Vec<String>> {
        self.with_current(|dataset| Ok(dataset.meta.fields.clone()))
    }

    /// Declared language names, sorted.
    pub fn languages(&self) -> Result<Vec<String>> {
        self.with_current(|dataset| Ok(dataset.meta.language_names()))
    }

    /// A copy of the current metadata.
    pub fn meta(&self) -> Result<Meta> {
        self.with_current(|dataset| Ok(dataset.meta.clone()))
    }

    /// Number of successful reloads since open.
    ///
    /// Read from the live dataset, so it always describes the snapshot a
    /// lookup made at the same moment would see. After close it keeps the
    /// value of the last dataset.
    pub fn generation(&self) -> u64 {
        match &*self.current.load() {
            Some(dataset) => dataset.generation,
            None => self.generation.load(Ordering::Acquire),
        }
    }

    /// Replace the dataset with the file at `path`.
    ///
    /// The new file is mapped and validated before anything is swapped;
    /// lookups keep running against the old dataset meanwhile. On error the
    /// current dataset stays in place.
    ///
    /// # Errors
    ///
    /// Any error [`open`](Reader::open) can return, or [`IpdbError::Closed`]
    /// if the reader was closed.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match Dataset::open(path) {
            Ok(dataset) => self.install(dataset),
            Err(e) => {
                warn!("ipdb reload of {} failed: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Replace the dataset with an in-memory database.
    pub fn reload_from_bytes(&self, data: Vec<u8>) -> Result<()> {
        let dataset = Dataset::load(MmapFile::from_bytes(data), None)?;
        self.install(dataset)
    }

    fn install(&self, mut dataset: Dataset) -> Result<()> {
        let _swap = self.lock_swap();
        let previous = match self.current.load_full() {
            Some(previous) => previous,
            None => return Err(IpdbError::Closed),
        };

        dataset.generation = previous.generation + 1;
        let generation = dataset.generation;
        let source = dataset.source.clone();
        self.current.store(Some(Arc::new(dataset)));
        self.generation.store(generation, Ordering::Release);

        info!("ipdb reloaded from {:?} (generation {})", source, generation);
        // `previous` is unmapped here unless a lookup still holds it.
        Ok(())
    }

    /// Release the dataset. Later calls fail with [`IpdbError::Closed`].
    ///
    /// Closing twice is not an error.
    pub fn close(&self) -> Result<()> {
        let _swap = self.lock_swap();
        if let Some(previous) = self.current.swap(None) {
            debug!("closing ipdb {:?}", previous.source);
        }
        Ok(())
    }

    /// Whether [`close`](Reader::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.current.load().is_none()
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.current.load();
        let mut s = f.debug_struct("Reader");
        match &*guard {
            Some(dataset) => s
                .field("source", &dataset.source)
                .field("node_count", &dataset.node_count)
                .field("fields", &dataset.meta.fields)
                .field("mapped", &dataset.map.is_mapped()),
            None => s.field("closed", &true),
        };
        s.field("generation", &self.generation()).finish()
    }
}
