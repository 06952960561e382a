//! Filesystem implementation of the `ImageStore` port.
//!
//! Images live flat in one upload directory opened as a `cap_std` [`Dir`],
//! so every read and write is confined to that directory. File I/O runs on
//! the blocking thread pool.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageFormat, StoredImageName};

/// Stores product images in a local directory.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
    path: PathBuf,
}

impl FsImageStore {
    /// Open `path`, creating it when missing.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self {
            root: Arc::new(root),
            path: path.to_path_buf(),
        })
    }

    /// Directory images are written to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(err: impl std::fmt::Display) -> ImageStoreError {
    ImageStoreError::io(err.to_string())
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(
        &self,
        format: ImageFormat,
        bytes: Vec<u8>,
    ) -> Result<StoredImageName, ImageStoreError> {
        let name = StoredImageName::generate(format);
        let file = name.to_string();
        let root = Arc::clone(&self.root);
        let size = bytes.len();
        tokio::task::spawn_blocking(move || root.write(&file, bytes))
            .await
            .map_err(io_error)?
            .map_err(io_error)?;
        debug!(image = %name, size, "stored product image");
        Ok(name)
    }

    async fn load(&self, name: &StoredImageName) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let file = name.to_string();
        let root = Arc::clone(&self.root);
        let read = tokio::task::spawn_blocking(move || root.read(&file))
            .await
            .map_err(io_error)?;
        match read {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn saved_images_load_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsImageStore::open(dir.path().join("products")).expect("open store");

        let name = store
            .save(ImageFormat::Png, b"\x89PNG fake".to_vec())
            .await
            .expect("save");

        assert!(name.to_string().starts_with("product-"));
        assert!(name.to_string().ends_with(".png"));
        let loaded = store.load(&name).await.expect("load");
        assert_eq!(loaded.as_deref(), Some(&b"\x89PNG fake"[..]));
        assert!(store.path().join(name.to_string()).exists());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_images_load_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsImageStore::open(dir.path()).expect("open store");

        let missing = StoredImageName::generate(ImageFormat::Jpeg);

        assert_eq!(store.load(&missing).await.expect("load"), None);
    }
}
