//! # Table queries and the [`Database`] trait
//!
//! A [`Query`] is a small, backend-neutral description of which rows a call
//! targets: equality and lower-bound filters, one ordering column and an optional
//! row limit. The Supabase client renders it as PostgREST query parameters
//! ([`Query::to_params`]); the memory backend evaluates it directly
//! ([`Query::apply`]).
//!
//! Rows cross this boundary as `serde_json::Value` objects. Typing them is the job
//! of the adapters in the `api` crate.

use std::cmp::Ordering;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::RemoteError;

/// A single row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
}

/// Sort order for a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Row selection: filters are ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the most common target: one row by primary key.
    pub fn by_id(id: &str) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters
            .push(Filter::Gte(column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Whether a row satisfies every filter.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq(column, expected) => {
                let actual = row.get(column).unwrap_or(&Value::Null);
                compare(actual, expected) == Some(Ordering::Equal)
            }
            Filter::Gte(column, bound) => {
                let actual = row.get(column).unwrap_or(&Value::Null);
                matches!(
                    compare(actual, bound),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }
        })
    }

    /// Filter, sort and truncate `rows` the way the remote service would.
    pub fn apply<'a>(
        &self,
        rows: impl IntoIterator<Item = &'a Map<String, Value>>,
    ) -> Vec<Map<String, Value>> {
        let mut selected: Vec<Map<String, Value>> = rows
            .into_iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect();

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let a = a.get(&order.column).unwrap_or(&Value::Null);
                let b = b.get(&order.column).unwrap_or(&Value::Null);
                let ord = compare(a, b).unwrap_or(Ordering::Equal);
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }

    /// Render as PostgREST query parameters (`col=eq.v`, `order=col.desc`, `limit=n`).
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|filter| match filter {
                Filter::Eq(column, Value::Null) => (column.clone(), "is.null".to_string()),
                Filter::Eq(column, value) => (column.clone(), format!("eq.{}", render(value))),
                Filter::Gte(column, value) => (column.clone(), format!("gte.{}", render(value))),
            })
            .collect();

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compare two JSON scalars. Timestamps compare chronologically, numbers
/// numerically, everything else by its natural order. `None` means incomparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            match (
                a.parse::<DateTime<Utc>>(),
                b.parse::<DateTime<Utc>>(),
            ) {
                (Ok(a), Ok(b)) => Some(a.cmp(&b)),
                _ => Some(a.cmp(b)),
            }
        }
        // Nulls sort last, like the remote default for ascending order.
        (Value::Null, _) => Some(Ordering::Greater),
        (_, Value::Null) => Some(Ordering::Less),
        _ => None,
    }
}

/// Row-level access to the hosted relational store.
pub trait Database {
    /// Rows of `table` matching `query`.
    fn select(
        &self,
        table: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>>;

    /// Exact number of rows of `table` matching `query`.
    fn count(&self, table: &str, query: &Query) -> impl Future<Output = Result<u64, RemoteError>>;

    /// Insert one row; returns it as stored (with id and timestamps).
    fn insert(&self, table: &str, row: Value) -> impl Future<Output = Result<Value, RemoteError>>;

    /// Apply `patch` to every matching row; returns the updated rows.
    fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>>;

    /// Delete every matching row; returns the deleted rows.
    fn delete(
        &self,
        table: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>>;
}
