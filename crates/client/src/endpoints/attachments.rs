//! Image uploads.

use reqwest::multipart::{Form, Part};
use sellhub_shared::{ApiError, Attachment, AttachmentsResponse, MAX_IMAGE_BYTES};

use crate::api_client::{with_credential, ApiClient};

/// Multipart field the backend reads uploaded files from.
const FILES_FIELD: &str = "files";

/// An image ready to be sent as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload from a URI or path and its contents.
    ///
    /// The name is the last `/` segment of `uri`. Its extension picks the
    /// MIME type; without one the image is sent as `image/jpeg` and `.jpg`
    /// is appended so the backend recognizes it.
    pub fn from_bytes(uri: &str, bytes: Vec<u8>) -> Self {
        let (file_name, mime) = describe(uri);
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Io(format!("{}: {e}", path.display())))?;
        let uri = path.to_string_lossy().replace('\\', "/");
        Ok(Self::from_bytes(&uri, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn into_part(self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| ApiError::Other(format!("invalid image type: {e}")))
    }
}

fn describe(uri: &str) -> (String, String) {
    let mut name = uri.rsplit('/').next().unwrap_or(uri).to_string();
    match extension(&name) {
        Some(ext) => {
            let mime = format!("image/{ext}");
            (name, mime)
        }
        None => {
            name.push_str(".jpg");
            (name, "image/jpeg".to_string())
        }
    }
}

/// Trailing `.ext` made of word characters.
fn extension(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    (!ext.is_empty() && ext.chars().all(is_word)).then_some(ext)
}

impl ApiClient {
    /// Upload images, one `files` part each. Images over 5 MiB are rejected
    /// before anything is sent.
    pub async fn upload_images(
        &self,
        images: Vec<ImageUpload>,
        access_token: &str,
    ) -> Result<Vec<Attachment>, ApiError> {
        if let Some(image) = images.iter().find(|image| image.size() > MAX_IMAGE_BYTES) {
            return Err(ApiError::ImageTooLarge { size: image.size() });
        }

        let mut form = Form::new();
        for image in images {
            form = form.part(FILES_FIELD, image.into_part()?);
        }

        let rb = with_credential(self.post("/attachments"), access_token).multipart(form);
        let resp: AttachmentsResponse = self.dispatch_json(rb).await?;
        Ok(resp.attachments)
    }
}
