use std::path::Path;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use image::ImageFormat;
use launchpad_protocol::Attachment;
use launchpad_protocol::ImageMimeType;
use tokio::io::AsyncReadExt;

use crate::error::AttachmentError;

/// Where the contents of an incoming file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file offered to the composer by the file picker or a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: String,
    /// Content type as declared by the source (browser, extension, ...).
    pub mime_type: String,
    pub source: FileSource,
}

impl IncomingFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// Build from a local path, declaring the content type from its extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which the
    /// allow-list rejects.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_for_path(&path)
            .map(ImageMimeType::as_str)
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            name,
            mime_type,
            source: FileSource::Path(path),
        }
    }

    pub fn declared_mime(&self) -> Option<ImageMimeType> {
        ImageMimeType::from_mime(&self.mime_type)
    }
}

fn mime_for_path(path: &Path) -> Option<ImageMimeType> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageMimeType::from_extension)
}

/// Read, check and encode one accepted file.
pub(crate) async fn decode_file(
    file: IncomingFile,
    mime_type: ImageMimeType,
    max_bytes: u64,
) -> Result<Attachment, AttachmentError> {
    let IncomingFile { name, source, .. } = file;
    let bytes = match source {
        FileSource::Bytes(bytes) => bytes,
        FileSource::Path(path) => read_capped(&name, &path, max_bytes).await?,
    };

    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(AttachmentError::TooLarge {
            name,
            size,
            limit: max_bytes,
        });
    }

    let sniffed = image::guess_format(&bytes).ok().and_then(mime_for_format);
    if sniffed != Some(mime_type) {
        tracing::debug!(
            file = %name,
            declared = %mime_type,
            sniffed = ?sniffed,
            "image signature does not match declared type"
        );
        return Err(AttachmentError::Decode {
            name,
            expected: mime_type,
        });
    }

    let data = BASE64_STANDARD.encode(&bytes);
    Ok(Attachment::new(mime_type, data, name))
}

/// Read at most `max_bytes + 1` bytes, refusing up front when the file
/// already reports a larger size.
async fn read_capped(
    name: &str,
    path: &Path,
    max_bytes: u64,
) -> Result<Vec<u8>, AttachmentError> {
    let read_error = |source: std::io::Error| AttachmentError::Read {
        name: name.to_string(),
        source,
    };
    let file = tokio::fs::File::open(path).await.map_err(read_error)?;
    let size = file.metadata().await.map_err(read_error)?.len();
    if size > max_bytes {
        return Err(AttachmentError::TooLarge {
            name: name.to_string(),
            size,
            limit: max_bytes,
        });
    }

    let mut bytes = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
    file.take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .await
        .map_err(read_error)?;
    Ok(bytes)
}

fn mime_for_format(format: ImageFormat) -> Option<ImageMimeType> {
    match format {
        ImageFormat::Png => Some(ImageMimeType::Png),
        ImageFormat::Jpeg => Some(ImageMimeType::Jpeg),
        ImageFormat::WebP => Some(ImageMimeType::Webp),
        ImageFormat::Gif => Some(ImageMimeType::Gif),
        _ => None,
    }
}
