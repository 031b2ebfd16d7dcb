use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Url;
use tracing::{debug, error};

use crate::api::{Backend, BackendError};
use crate::cache::now_millis;

use super::table::execute;
use super::FetchResult;

/// Largest file accepted by `StorageService::upload_file`: 5 MiB.
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Bucket holding project, blog and certificate images.
pub const IMAGES_BUCKET: &str = "images";

/// Bucket holding documents such as the resume.
pub const DOCUMENTS_BUCKET: &str = "documents";

const IMAGE_TYPES: [&str; 5] = ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

/// A file ready to be uploaded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Upload path has no file name")?;
        let content_type = content_type_for(&name).to_string();
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    /// Text after the last `.` of the file name, or the whole name if it has none.
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

pub fn is_valid_image(file: &UploadFile) -> bool {
    IMAGE_TYPES.contains(&file.content_type.as_str())
}

pub fn is_valid_pdf(file: &UploadFile) -> bool {
    file.content_type == "application/pdf"
}

/// Store `file` at `path` in `bucket` and resolve its public URL.
pub(crate) async fn upload_to(
    backend: &dyn Backend,
    bucket: &str,
    path: &str,
    file: &UploadFile,
) -> FetchResult<String> {
    execute(bucket, "upload", async {
        let stored = backend
            .upload(bucket, path, file.bytes.clone(), &file.content_type)
            .await?;
        debug!(bucket, path = %stored, bytes = file.size(), "Uploaded file");
        Ok(backend.public_url(bucket, &stored))
    })
    .await
}

/// Upload an image for a record as `<folder>/<record id>-<millis>.<ext>`.
pub(crate) async fn upload_record_image(
    backend: &dyn Backend,
    folder: &str,
    record_id: &str,
    file: &UploadFile,
) -> FetchResult<String> {
    let path = format!("{}/{}-{}.{}", folder, record_id, now_millis(), file.extension());
    upload_to(backend, IMAGES_BUCKET, &path, file).await
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Object path inside `bucket` for a public URL of that bucket.
fn object_path(file_url: &str, bucket: &str) -> Result<String, BackendError> {
    let url = Url::parse(file_url)
        .map_err(|e| BackendError::Rejected(format!("Invalid file URL: {}", e)))?;
    let marker = format!("/{}/", bucket);
    url.path()
        .split_once(&marker)
        .map(|(_, path)| path.to_string())
        .filter(|path| !path.is_empty())
        .ok_or_else(|| BackendError::Rejected("Invalid file URL".to_string()))
}

/// General-purpose uploads into any bucket.
#[derive(Clone)]
pub struct StorageService {
    backend: Arc<dyn Backend>,
}

impl StorageService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Upload under a unique `<millis>-<random>.<ext>` name, optionally inside
    /// `folder`, returning the public URL.
    pub async fn upload_file(
        &self,
        file: &UploadFile,
        bucket: &str,
        folder: Option<&str>,
    ) -> FetchResult<String> {
        if file.size() > MAX_FILE_SIZE {
            error!(name = %file.name, bytes = file.size(), "Upload rejected: file too large");
            return FetchResult::error_message("File size must be less than 5MB");
        }

        let file_name = format!("{}-{}.{}", now_millis(), random_suffix(), file.extension());
        let path = match folder.filter(|f| !f.is_empty()) {
            Some(folder) => format!("{}/{}", folder, file_name),
            None => file_name,
        };
        upload_to(self.backend.as_ref(), bucket, &path, file).await
    }

    /// Delete the object behind a public URL. An empty URL is a no-op.
    pub async fn delete_file(&self, file_url: &str, bucket: &str) -> FetchResult<()> {
        if file_url.is_empty() {
            return FetchResult::Data(());
        }
        execute(bucket, "delete_file", async {
            let path = object_path(file_url, bucket)?;
            self.backend.remove(bucket, &[path]).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;

    fn png(bytes: usize) -> UploadFile {
        UploadFile::new("cover.png", "image/png", vec![0u8; bytes])
    }

    #[test]
    fn test_file_type_checks() {
        assert!(is_valid_image(&png(1)));
        assert!(!is_valid_pdf(&png(1)));
        let pdf = UploadFile::new("cv.pdf", "application/pdf", vec![]);
        assert!(is_valid_pdf(&pdf));
        assert!(!is_valid_image(&pdf));
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("notes"), "application/octet-stream");
    }

    #[test]
    fn test_object_path_extraction() {
        let url = "https://abc.supabase.co/storage/v1/object/public/images/projects/1-2.png";
        assert_eq!(object_path(url, "images").unwrap(), "projects/1-2.png");
        assert!(object_path(url, "documents").is_err());
        assert!(object_path("not a url", "images").is_err());
    }

    #[tokio::test]
    async fn test_upload_file_names_and_url() {
        let backend = Arc::new(MemoryBackend::new());
        let service = StorageService::new(backend.clone());

        let url = service
            .upload_file(&png(10), IMAGES_BUCKET, Some("blogs"))
            .await
            .into_data()
            .unwrap();
        let prefix = "memory://storage/v1/object/public/images/blogs/";
        assert!(url.starts_with(prefix));
        assert!(url.ends_with(".png"));

        let name = &url[prefix.len()..];
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), "abcdefg.png".len());

        assert!(backend.object(IMAGES_BUCKET, &format!("blogs/{}", name)).is_some());
    }

    #[tokio::test]
    async fn test_upload_file_rejects_large_files() {
        let backend = Arc::new(MemoryBackend::new());
        let service = StorageService::new(backend);
        let result = service
            .upload_file(&png(MAX_FILE_SIZE + 1), IMAGES_BUCKET, None)
            .await;
        assert_eq!(result.error(), Some("File size must be less than 5MB"));
    }

    #[tokio::test]
    async fn test_delete_file_by_public_url() {
        let backend = Arc::new(MemoryBackend::new());
        let service = StorageService::new(backend.clone());
        let url = service
            .upload_file(&png(4), IMAGES_BUCKET, Some("certifications"))
            .await
            .into_data()
            .unwrap();

        // memory:// URLs parse with a host, so the path split works the same way
        assert!(service.delete_file(&url, IMAGES_BUCKET).await.is_ok());
        let listed = backend.list(IMAGES_BUCKET, "certifications", 10).await.unwrap();
        assert!(listed.is_empty());

        assert!(service.delete_file("", IMAGES_BUCKET).await.is_ok());
    }
}
