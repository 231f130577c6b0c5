//! # Backend crate - client seam for the hosted backend-as-a-service
//!
//! Everything the academy site needs from its hosted backend goes through the three
//! traits defined here, so the same adapters and session logic run against the real
//! Supabase project in the browser and against an in-process store in tests.
//!
//! | Trait | Module | Covers |
//! |-------|--------|--------|
//! | [`AuthApi`] | [`auth`] | password sign-up/sign-in, sign-out, session lookup, change notifications, password reset, user updates |
//! | [`Database`] | [`query`] | `select`/`count`/`insert`/`update`/`delete` against named tables with filter and order predicates |
//! | [`Storage`] | [`storage`] | blob upload, public URL issuance, removal |
//!
//! Implementations:
//!
//! - [`SupabaseClient`] talks HTTP (`reqwest`) to GoTrue, PostgREST and Storage.
//! - [`MemoryBackend`] keeps users, rows and blobs in memory.
//!
//! Every method reports expected remote failures as a [`RemoteError`] value.

pub mod auth;
pub mod error;
pub mod query;
pub mod storage;

mod memory;
pub use memory::MemoryBackend;

mod supabase;
pub use supabase::{SupabaseClient, SupabaseSettings};

pub use auth::{
    parse_link_fragment, AuthApi, AuthChange, AuthEvent, LinkTokens, Session, SignUpOptions, User,
    UserAttributes,
};
pub use error::RemoteError;
pub use query::{Database, Filter, Order, Query};
pub use storage::Storage;

/// A complete backend: auth, tables and storage behind one cheaply clonable handle.
pub trait Backend: AuthApi + Database + Storage + Clone + 'static {}

impl<T> Backend for T where T: AuthApi + Database + Storage + Clone + 'static {}
