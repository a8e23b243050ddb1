//! Directory-backed storage device
//!
//! Each device is a root directory; files live at `root/volume/path`.

use crate::device::{DeviceRead, StorageDevice};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Storage device rooted at a local directory
#[derive(Debug, Clone)]
pub struct FileDevice {
    root: PathBuf,
}

impl FileDevice {
    /// Open a device rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = ?root, "Opened file device");
        Ok(Self { root })
    }

    /// Root directory of this device
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `volume/path` under the root, rejecting anything that escapes it
    fn resolve(&self, volume: &str, path: &str) -> io::Result<PathBuf> {
        let mut full = self.root.clone();
        for part in [volume, path] {
            if part.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "empty volume or path",
                ));
            }
            for component in Path::new(part).components() {
                match component {
                    Component::Normal(c) => full.push(c),
                    Component::CurDir => {}
                    _ => {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("path escapes device root: {}", part),
                        ))
                    }
                }
            }
        }
        Ok(full)
    }
}

impl StorageDevice for FileDevice {
    fn read_file(
        &self,
        volume: &str,
        path: &str,
        offset: u64,
        buf: &mut [u8],
    ) -> io::Result<DeviceRead> {
        let full = self.resolve(volume, path)?;
        let mut file = File::open(&full)?;
        file.seek(SeekFrom::Start(offset))?;

        // Fill as much of buf as the file allows
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(DeviceRead::from_fill(filled, buf.len()))
    }

    fn append_file(&self, volume: &str, path: &str, data: &[u8]) -> io::Result<()> {
        let full = self.resolve(volume, path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&full)?;
        file.write_all(data)
    }

    fn delete_file(&self, volume: &str, path: &str) -> io::Result<()> {
        let full = self.resolve(volume, path)?;
        match fs::remove_file(&full) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
