//! Storage endpoints.

use super::{send, SupabaseClient};
use crate::error::RemoteError;
use crate::storage::Storage;

impl Storage for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), RemoteError> {
        tracing::debug!("upload {} bytes to {}/{}", bytes.len(), bucket, path);
        let request = self
            .http
            .post(self.endpoint(&format!("storage/v1/object/{bucket}/{path}")))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes);
        let request = self.authorize(request).await;
        send(request).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&format!("storage/v1/object/public/{bucket}/{path}"))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), RemoteError> {
        tracing::debug!("remove {:?} from {}", paths, bucket);
        let request = self
            .http
            .delete(self.endpoint(&format!("storage/v1/object/{bucket}")))
            .json(&serde_json::json!({ "prefixes": paths }));
        let request = self.authorize(request).await;
        send(request).await?;
        Ok(())
    }
}
