//! Storage driver seam for the sample commands.
//!
//! On hardware this is the SD-card driver. [`MemoryStorage`] keeps files in
//! a map so commands can be exercised on a host.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use simcli_core::{Result, SimCliError};

/// Block storage as seen by commands: mount, then one open file at a time.
pub trait Storage {
    fn mount(&mut self) -> Result<()>;

    fn is_mounted(&self) -> bool;

    /// Open `name` for writing, expecting `size` bytes.
    ///
    /// An existing file is only replaced when `overwrite` is set.
    fn open(&mut self, name: &str, overwrite: bool, size: usize) -> Result<()>;

    /// Append to the open file, returning the number of bytes stored.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    fn close(&mut self) -> Result<()>;
}

/// Storage shared between a command and the context it acquires.
pub type SharedStorage = Rc<RefCell<dyn Storage>>;

/// In-memory storage driver.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: BTreeMap<String, Vec<u8>>,
    open: Option<String>,
    mounted: bool,
    fail_mount: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose mount always fails, as with no card inserted.
    pub fn without_card() -> Self {
        Self {
            fail_mount: true,
            ..Self::default()
        }
    }

    /// Contents of a stored file.
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Name of the file currently open for writing.
    pub fn open_file(&self) -> Option<&str> {
        self.open.as_deref()
    }
}

impl Storage for MemoryStorage {
    fn mount(&mut self) -> Result<()> {
        if self.fail_mount {
            return Err(SimCliError::Command("no card detected".into()));
        }
        self.mounted = true;
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn open(&mut self, name: &str, overwrite: bool, size: usize) -> Result<()> {
        if let Some(current) = &self.open {
            return Err(SimCliError::Command(format!("file already open: {current}")));
        }
        if self.files.contains_key(name) && !overwrite {
            return Err(SimCliError::Command(format!("file exists: {name}")));
        }
        self.files.insert(name.to_string(), Vec::with_capacity(size));
        self.open = Some(name.to_string());
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let name = self
            .open
            .as_ref()
            .ok_or_else(|| SimCliError::Command("no file open".into()))?;
        let file = self
            .files
            .get_mut(name)
            .ok_or_else(|| SimCliError::Command(format!("file vanished: {name}")))?;
        file.extend_from_slice(data);
        Ok(data.len())
    }

    fn close(&mut self) -> Result<()> {
        self.open
            .take()
            .map(|_| ())
            .ok_or_else(|| SimCliError::Command("no file open".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_succeeds_by_default() {
        let mut s = MemoryStorage::new();
        assert!(!s.is_mounted());
        s.mount().unwrap();
        assert!(s.is_mounted());
    }

    #[test]
    fn mount_fails_without_card() {
        let mut s = MemoryStorage::without_card();
        assert!(s.mount().is_err());
        assert!(!s.is_mounted());
    }

    #[test]
    fn open_write_close() {
        let mut s = MemoryStorage::new();
        s.open("a.txt", false, 4).unwrap();
        assert_eq!(s.open_file(), Some("a.txt"));
        assert_eq!(s.write(b"ab").unwrap(), 2);
        assert_eq!(s.write(b"cd").unwrap(), 2);
        s.close().unwrap();
        assert_eq!(s.file("a.txt"), Some(&b"abcd"[..]));
        assert!(s.open_file().is_none());
    }

    #[test]
    fn existing_file_needs_overwrite() {
        let mut s = MemoryStorage::new();
        s.open("a", false, 0).unwrap();
        s.write(b"old").unwrap();
        s.close().unwrap();
        assert!(s.open("a", false, 0).is_err());
        s.open("a", true, 0).unwrap();
        s.close().unwrap();
        assert_eq!(s.file("a"), Some(&b""[..]));
    }

    #[test]
    fn single_open_file() {
        let mut s = MemoryStorage::new();
        s.open("a", false, 0).unwrap();
        assert!(s.open("b", false, 0).is_err());
    }

    #[test]
    fn write_and_close_need_open_file() {
        let mut s = MemoryStorage::new();
        assert!(s.write(b"x").is_err());
        assert!(s.close().is_err());
    }
}
