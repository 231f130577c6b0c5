//! # API crate - the academy site's client core
//!
//! Everything the views need that is not rendering: who is signed in, whether they may
//! administer the site, and typed access to the academy's data. Nothing here depends
//! on Dioxus, so the whole crate is tested against [`backend::MemoryBackend`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`session`] | [`SessionManager`]: auth state, sign-in/up/out, admin role resolution |
//! | [`guard`] | pure route guard decision over an [`AuthState`] |
//! | [`adapters`] | one typed adapter per table (coaches, events, students, ...) |
//! | [`models`] | records, insert and update shapes |
//! | [`upload`] | image validation and object naming |
//! | [`config`] | [`AcademyConfig`] from TOML or the environment |
//! | [`error`] | [`AuthError`], [`DataError`], [`UploadError`], [`ConfigError`] |
//!
//! ## Entry point
//!
//! [`Academy`] bundles a backend, the configuration and one session manager. The web
//! app builds a single `Academy<SupabaseClient>` at startup and hands it to the UI as
//! context; views ask it for adapters (`academy.coaches()`, `academy.events()`, ...).

pub mod adapters;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod session;
pub mod upload;

pub use adapters::{
    CoachAdapter, DashboardAdapter, EventAdapter, GalleryAdapter, MessageAdapter, ProfileAdapter,
    RoleAdapter, StudentAdapter,
};
pub use config::AcademyConfig;
pub use error::{AuthError, ConfigError, DataError, UploadError};
pub use guard::{Access, Redirect};
pub use session::{AuthState, SessionManager};
pub use upload::{ImageFile, MAX_IMAGE_BYTES};

use backend::{Backend, SupabaseClient};

/// Backend, configuration and session manager, cheap to clone.
#[derive(Clone)]
pub struct Academy<B> {
    backend: B,
    config: AcademyConfig,
    session: SessionManager<B>,
}

impl<B: Backend> Academy<B> {
    pub fn new(backend: B, config: AcademyConfig) -> Self {
        let session = SessionManager::new(backend.clone())
            .with_redirect_url(config.auth.redirect_url.clone())
            .with_admin_role(config.auth.admin_role);
        Self {
            backend,
            config,
            session,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &AcademyConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager<B> {
        &self.session
    }

    fn max_image_bytes(&self) -> u64 {
        self.config.uploads.max_image_bytes
    }

    pub fn coaches(&self) -> CoachAdapter<B> {
        CoachAdapter::new(self.backend.clone(), self.max_image_bytes())
    }

    pub fn events(&self) -> EventAdapter<B> {
        EventAdapter::new(self.backend.clone(), self.max_image_bytes())
    }

    pub fn students(&self) -> StudentAdapter<B> {
        StudentAdapter::new(self.backend.clone())
    }

    pub fn messages(&self) -> MessageAdapter<B> {
        MessageAdapter::new(self.backend.clone())
    }

    pub fn profiles(&self) -> ProfileAdapter<B> {
        ProfileAdapter::new(self.backend.clone())
    }

    pub fn gallery(&self) -> GalleryAdapter<B> {
        GalleryAdapter::new(self.backend.clone(), self.max_image_bytes())
    }

    pub fn roles(&self) -> RoleAdapter<B> {
        RoleAdapter::new(self.backend.clone())
    }

    pub fn dashboard(&self) -> DashboardAdapter<B> {
        DashboardAdapter::new(self.backend.clone())
    }
}

impl Academy<SupabaseClient> {
    /// Connect to the configured Supabase project.
    pub fn connect(config: AcademyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = SupabaseClient::new(config.supabase_settings());
        Ok(Self::new(client, config))
    }
}
