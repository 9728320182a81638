//! Filesystem implementation of the domain's file probe

use runcrate_domain::{FileProbe, FileStat};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Probes files with `std::fs::metadata`
///
/// Only regular files report a size; directories, missing paths and
/// unreadable entries are all reported as absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl FsProbe {
    /// Create a probe
    pub fn new() -> Self {
        Self
    }
}

impl FileProbe for FsProbe {
    fn probe(&self, path: &Path) -> Option<FileStat> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Some(FileStat { size: meta.len() }),
            Ok(_) => {
                debug!("{} is not a regular file", path.display());
                None
            }
            Err(e) => {
                debug!("Cannot stat {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "hello").unwrap();
        assert_eq!(FsProbe::new().probe(&path), Some(FileStat { size: 5 }));
    }

    #[test]
    fn test_probe_missing_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FsProbe::new().probe(&dir.path().join("absent.txt")), None);
        assert_eq!(FsProbe::new().probe(dir.path()), None);
    }
}
