//! PostgREST endpoints.

use serde_json::Value;

use super::{send, SupabaseClient};
use crate::error::RemoteError;
use crate::query::{Database, Query};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

impl SupabaseClient {
    fn table_url(&self, table: &str) -> String {
        self.endpoint(&format!("rest/v1/{table}"))
    }
}

impl Database for SupabaseClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!("select {} {:?}", table, query);
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(&query.to_params());
        let request = self.authorize(request).await;
        Ok(send(request).await?.json().await?)
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, RemoteError> {
        tracing::debug!("count {} {:?}", table, query);
        let request = self
            .http
            .head(self.table_url(table))
            .query(&[("select", "*")])
            .query(&query.to_params())
            .header("Prefer", "count=exact");
        let request = self.authorize(request).await;
        let response = send(request).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| RemoteError::decode(format!("missing row count for {table}")))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
        tracing::debug!("insert into {}", table);
        let request = self
            .http
            .post(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row);
        let request = self.authorize(request).await;
        let rows: Vec<Value> = send(request).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::decode(format!("insert into {table} returned no row")))
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!("update {} {:?}", table, query);
        let request = self
            .http
            .patch(self.table_url(table))
            .query(&query.to_params())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        let request = self.authorize(request).await;
        Ok(send(request).await?.json().await?)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!("delete from {} {:?}", table, query);
        let request = self
            .http
            .delete(self.table_url(table))
            .query(&query.to_params())
            .header("Prefer", RETURN_REPRESENTATION);
        let request = self.authorize(request).await;
        Ok(send(request).await?.json().await?)
    }
}
