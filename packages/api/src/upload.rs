//! Image validation shared by every upload path.
//!
//! Validation is local and runs before any byte leaves the client: a file that
//! fails here never reaches storage.

use chrono::Utc;

use crate::error::UploadError;

/// Default size limit for image uploads: 10 MiB.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// A file picked in the browser, read fully into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Accept only `image/*` content no larger than `max_bytes`.
pub fn validate_image(file: &ImageFile, max_bytes: u64) -> Result<(), UploadError> {
    if !file.content_type.trim().to_ascii_lowercase().starts_with("image/") {
        let got = if file.content_type.trim().is_empty() {
            "unknown type".to_string()
        } else {
            file.content_type.clone()
        };
        return Err(UploadError::InvalidType(got));
    }
    if file.size() > max_bytes {
        return Err(UploadError::TooLarge {
            size: file.size(),
            limit: max_bytes,
        });
    }
    Ok(())
}

/// Extension for the stored object: from the file name, else the content subtype.
pub fn extension_for(file: &ImageFile) -> String {
    let from_name = file
        .name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    let ext = match from_name {
        Some(ext) => ext,
        None => file
            .content_type
            .split_once('/')
            .map(|(_, subtype)| subtype.split(['+', ';']).next().unwrap_or(subtype))
            .unwrap_or("bin"),
    };
    match ext.to_ascii_lowercase().as_str() {
        "jpeg" => "jpg".to_string(),
        other => other.to_string(),
    }
}

/// `{owner}-{millis}.{ext}`: the object name for an entity image.
pub(crate) fn entity_object_path(owner_id: &str, file: &ImageFile) -> String {
    format!(
        "{owner_id}-{}.{}",
        Utc::now().timestamp_millis(),
        extension_for(file)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_images() {
        let file = ImageFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert_eq!(
            validate_image(&file, MAX_IMAGE_BYTES),
            Err(UploadError::InvalidType("text/plain".to_string()))
        );
    }

    #[test]
    fn test_rejects_oversized_images() {
        let file = ImageFile::new("big.png", "image/png", vec![0; 11 * 1024 * 1024]);
        assert!(matches!(
            validate_image(&file, MAX_IMAGE_BYTES),
            Err(UploadError::TooLarge { limit: MAX_IMAGE_BYTES, .. })
        ));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let file = ImageFile::new("edge.png", "image/png", vec![0; 1024]);
        assert_eq!(validate_image(&file, 1024), Ok(()));
    }

    #[test]
    fn test_extension_for() {
        let png = ImageFile::new("Belt.PNG", "image/png", Vec::new());
        assert_eq!(extension_for(&png), "png");

        let pasted = ImageFile::new("image", "image/jpeg", Vec::new());
        assert_eq!(extension_for(&pasted), "jpg");

        let svg = ImageFile::new("", "image/svg+xml", Vec::new());
        assert_eq!(extension_for(&svg), "svg");
    }

    #[test]
    fn test_entity_object_path() {
        let file = ImageFile::new("coach.webp", "image/webp", Vec::new());
        let path = entity_object_path("c1", &file);
        assert!(path.starts_with("c1-"));
        assert!(path.ends_with(".webp"));
    }
}
