//! Filesystem queries: existence and modification time.

use std::time::SystemTime;

/// MTime info gathered for a file.  This also models "file is absent".
/// It's not using an Option<> just because it makes the code using it easier
/// to follow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MTime {
    Missing,
    Stamp(SystemTime),
}

impl MTime {
    pub fn exists(&self) -> bool {
        matches!(self, MTime::Stamp(_))
    }
}

pub trait FileSystem {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>>;
    /// stat() an on-disk path, producing its MTime.
    /// A path that does not exist is MTime::Missing, not an error.
    fn stat(&self, path: &str) -> std::io::Result<MTime>;

    fn exists(&self, path: &str) -> std::io::Result<bool> {
        Ok(self.stat(path)?.exists())
    }
}

#[derive(Default)]
pub struct RealFileSystem {}

impl RealFileSystem {
    pub fn new() -> Self {
        RealFileSystem {}
    }
}

impl FileSystem for RealFileSystem {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn stat(&self, path: &str) -> std::io::Result<MTime> {
        // A file can vanish between metadata() and modified(); both report
        // NotFound, which we fold into Missing.
        let mtime = std::fs::metadata(path).and_then(|meta| meta.modified());
        Ok(match mtime {
            Ok(mtime) => MTime::Stamp(mtime),
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    MTime::Missing
                } else {
                    return Err(err);
                }
            }
        })
    }
}
