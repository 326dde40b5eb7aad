//! Memory-mapped file support for IPDB files.
//!
//! [`MmapFile`] owns the bytes of a database file. On Unix targets the file is
//! mapped read-only and shared through `memmap2`, so every process reading the
//! same database shares physical pages through the page cache. Other targets
//! fall back to reading the whole file into a heap buffer. The choice is made
//! at build time; both variants expose the same API.
//!
//! # Safety
//!
//! A mapping reflects later writes to the underlying file. Databases are
//! expected to be replaced by rename, never rewritten in place, and lookups
//! copy their results out of the mapping before returning.
//!
//! # Example
//!
//! ```no_run
//! use ipdb::mmap::MmapFile;
//!
//! let mut map = MmapFile::open("city.ipdb")?;
//! println!("Size: {} bytes", map.len());
//! map.close();
//! # Ok::<(), ipdb::IpdbError>(())
//! ```

use crate::error::{IpdbError, Result};
#[cfg(unix)]
use memmap2::{Mmap, MmapOptions};
use std::fmt;
#[cfg(unix)]
use std::fs::File;
use std::path::Path;

/// Storage for database bytes - either memory-mapped or owned
enum Storage {
    #[cfg(unix)]
    Mapped(Mmap),
    Owned(Vec<u8>),
    Released,
}

/// The bytes of an opened database file.
///
/// The mapping is released by [`MmapFile::close`] or when the value is
/// dropped, whichever comes first.
pub struct MmapFile {
    storage: Storage,
}

impl MmapFile {
    /// Map a database file read-only.
    ///
    /// The file descriptor is closed as soon as the mapping exists; the
    /// mapping keeps the pages valid.
    ///
    /// # Errors
    ///
    /// Returns [`IpdbError::Io`] if the file cannot be opened, stat'ed or
    /// mapped, and [`IpdbError::InvalidFile`] for a zero-length file.
    #[cfg(unix)]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        if size == 0 {
            return Err(IpdbError::invalid_file("file is empty"));
        }
        let len = usize::try_from(size)
            .map_err(|_| IpdbError::invalid_file(format!("file too large to map: {} bytes", size)))?;

        // SAFETY: the mapping is read-only and the length matches the file
        // size observed above.
        let mmap = unsafe { MmapOptions::new().len(len).map(&file)? };

        Ok(MmapFile {
            storage: Storage::Mapped(mmap),
        })
    }

    /// Read a database file into memory (targets without `mmap`).
    ///
    /// # Errors
    ///
    /// Returns [`IpdbError::Io`] if the file cannot be read, and
    /// [`IpdbError::InvalidFile`] for a zero-length file.
    #[cfg(not(unix))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        if data.is_empty() {
            return Err(IpdbError::invalid_file("file is empty"));
        }
        Ok(MmapFile {
            storage: Storage::Owned(data),
        })
    }

    /// Wrap an owned buffer, e.g. a database received over the wire or built
    /// in a test.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        MmapFile {
            storage: Storage::Owned(data),
        }
    }

    /// The full contents, or an empty slice once closed.
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            #[cfg(unix)]
            Storage::Mapped(m) => &m[..],
            Storage::Owned(v) => v.as_slice(),
            Storage::Released => &[],
        }
    }

    /// Size of the contents in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether there are no bytes (always true after [`close`](Self::close)).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the bytes come from a live memory mapping.
    pub fn is_mapped(&self) -> bool {
        match self.storage {
            #[cfg(unix)]
            Storage::Mapped(_) => true,
            _ => false,
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    /// Unmap (or drop) the bytes. Safe to call more than once.
    pub fn close(&mut self) {
        // Dropping the old storage performs the munmap.
        self.storage = Storage::Released;
    }
}

impl fmt::Debug for MmapFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmapFile")
            .field("size", &self.len())
            .field("mapped", &self.is_mapped())
            .field("closed", &self.is_closed())
            .finish()
    }
}
