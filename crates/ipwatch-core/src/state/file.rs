// # File State Store
//
// File-based implementation of StateStore.
//
// ## File Format
//
// A single line of plain UTF-8 text holding the last IP pushed to the
// provider, e.g. `203.0.113.7`. Surrounding whitespace is ignored on read.
//
// ## Crash Safety
//
// Writes go to a sibling file named `<state-file>.tmp` which is then renamed
// over the state file, so a reader sees either the old value or the new one.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::state_store::StateStore;

/// Plain-text file holding the last known IP
///
/// # Example
///
/// ```rust,no_run
/// use ipwatch_core::state::FileStateStore;
/// use ipwatch_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("./last-ip.txt");
///
///     store.save("1.2.3.4".parse()?).await?;
///     assert_eq!(store.last_ip().await?, Some("1.2.3.4".parse()?));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path`; the file need not exist yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path used for atomic writes, always distinct from the state file
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    async fn ensure_parent_dir(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && fs::metadata(parent).await.is_err()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn last_ip(&self) -> Result<Option<Ipv4Addr>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("State file does not exist: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::persistence(format!(
                    "Failed to read state file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        match content.parse::<Ipv4Addr>() {
            Ok(ip) => Ok(Some(ip)),
            Err(e) => {
                tracing::warn!(
                    "State file {} holds {:?}, not an IPv4 address ({}). Treating as empty.",
                    self.path.display(),
                    content,
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, ip: Ipv4Addr) -> Result<(), Error> {
        self.ensure_parent_dir().await?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(ip.to_string().as_bytes())
                .await
                .map_err(|e| {
                    Error::persistence(format!(
                        "Failed to write to temp file {}: {}",
                        temp_path.display(),
                        e
                    ))
                })?;

            file.sync_all().await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }
}
