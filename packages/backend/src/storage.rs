//! Object storage buckets with public URL issuance.

use std::future::Future;

use crate::error::RemoteError;

/// Blob storage organised in named buckets.
pub trait Storage {
    /// Store `bytes` at `path` inside `bucket`. Fails if the path is taken.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    /// The publicly resolvable URL of an object. Does not check that it exists.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove objects. Missing paths are ignored.
    fn remove(
        &self,
        bucket: &str,
        paths: &[String],
    ) -> impl Future<Output = Result<(), RemoteError>>;
}

/// Recover the in-bucket path of an object from its public URL.
///
/// Returns `None` for URLs that do not point into `bucket`.
pub fn path_from_public_url<'a>(url: &'a str, bucket: &str) -> Option<&'a str> {
    let marker = format!("/{bucket}/");
    let start = url.find(&marker)? + marker.len();
    let path = url[start..].split(['?', '#']).next()?;
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_public_url() {
        let url = "https://x.supabase.co/storage/v1/object/public/gallery/photos/17-abc.png";
        assert_eq!(path_from_public_url(url, "gallery"), Some("photos/17-abc.png"));
        assert_eq!(
            path_from_public_url("https://x/public/gallery/a.png?width=200", "gallery"),
            Some("a.png")
        );
        assert_eq!(path_from_public_url(url, "coaches"), None);
        assert_eq!(path_from_public_url("https://x/public/gallery/", "gallery"), None);
    }
}
