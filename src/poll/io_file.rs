// Storage of the ballots in a local JSON file.

use std::path::{Path, PathBuf};

use crate::poll::{
    io_common::{decode_snapshot, encode_snapshot},
    *,
};

pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> FileBackend {
        FileBackend { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn ensure_data_dir(&self) -> StoreResult<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                debug!("ensure_data_dir: creating {}", dir.display());
                fs::create_dir_all(dir).context(CreatingDataDirSnafu {
                    path: dir.display().to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl BallotBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn load(&self) -> StoreResult<Vec<Ballot>> {
        self.ensure_data_dir()?;
        if !self.path.exists() {
            debug!("load: {} does not exist yet", self.path_str());
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).context(ReadingFileSnafu {
            path: self.path_str(),
        })?;
        decode_snapshot(&contents)
    }

    fn save(&self, ballots: &[Ballot]) -> StoreResult<()> {
        self.ensure_data_dir()?;
        let contents = encode_snapshot(ballots)?;
        atomic_write(&self.path, contents.as_bytes())
    }
}

/// Writes next to the target, then renames over it. If anything fails, the
/// target keeps its previous contents.
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, data).context(WritingFileSnafu {
        path: tmp.display().to_string(),
    })?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).context(WritingFileSnafu {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
