use crate::error::AttachmentError;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// The two image stores. Each maps to a flat directory under the storage root
/// and to the static route alias it is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageCategory {
    Driver,
    Team,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 2] = [ImageCategory::Driver, ImageCategory::Team];

    pub fn directory(self) -> &'static str {
        match self {
            ImageCategory::Driver => "DriverImages",
            ImageCategory::Team => "TeamImages",
        }
    }

    pub fn route_alias(self) -> &'static str {
        match self {
            ImageCategory::Driver => "driverimages",
            ImageCategory::Team => "teamimages",
        }
    }
}

/// A file received with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    /// Opens the store at `root`, creating the category directories if they
    /// are missing. Safe to call on an existing root.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AttachmentError> {
        let store = Self { root: root.into() };
        for category in ImageCategory::ALL {
            let path = store.category_dir(category);
            tokio::fs::create_dir_all(&path)
                .await
                .map_err(|source| AttachmentError::CreateDir { path, source })?;
        }
        tracing::info!(root = %store.root.display(), "Image storage ready.");
        Ok(store)
    }

    pub fn category_dir(&self, category: ImageCategory) -> PathBuf {
        self.root.join(category.directory())
    }

    pub fn path_of(&self, category: ImageCategory, reference: &str) -> PathBuf {
        self.category_dir(category).join(reference)
    }

    /// Writes `upload` into the category directory and returns its reference.
    ///
    /// Returns `Ok(None)` when there is no upload or it is empty. Every stored
    /// upload gets a fresh token, so an earlier file is never reused or
    /// overwritten.
    pub async fn store(
        &self,
        category: ImageCategory,
        upload: Option<&Upload>,
    ) -> Result<Option<String>, AttachmentError> {
        let Some(upload) = upload.filter(|u| !u.is_empty()) else {
            return Ok(None);
        };

        let reference = format!("{}_{}", Uuid::new_v4(), base_file_name(&upload.file_name));
        let path = self.path_of(category, &reference);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| AttachmentError::Write { path: path.clone(), source })?;
        file.write_all(&upload.bytes)
            .await
            .map_err(|source| AttachmentError::Write { path: path.clone(), source })?;
        file.flush()
            .await
            .map_err(|source| AttachmentError::Write { path: path.clone(), source })?;

        tracing::debug!(path = %path.display(), bytes = upload.bytes.len(), "Image stored.");
        Ok(Some(reference))
    }
}

/// The final component of a client-supplied filename, with either separator.
fn base_file_name(raw: &str) -> &str {
    match raw.rsplit(['/', '\\']).next().map(str::trim) {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => "image",
    }
}

/// Scheme and host of the current request, used to build absolute image URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicOrigin {
    pub scheme: String,
    pub host: String,
}

impl PublicOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// The reference is percent-encoded as a single path segment, so names
    /// with spaces, `#` or `?` still resolve to the stored file.
    pub fn url_for(&self, category: ImageCategory, reference: &str) -> String {
        format!(
            "{}://{}/{}/{}",
            self.scheme,
            self.host,
            category.route_alias(),
            urlencoding::encode(reference)
        )
    }

    /// Turns a stored reference into an absolute URL; absent or empty
    /// references stay absent.
    pub fn rehydrate(&self, category: ImageCategory, reference: Option<String>) -> Option<String> {
        reference
            .filter(|r| !r.is_empty())
            .map(|r| self.url_for(category, &r))
    }
}
