//! # Site configuration
//!
//! Loaded once at startup. Three sources, all producing the same
//! [`AcademyConfig`]:
//!
//! - a TOML document ([`AcademyConfig::from_toml`]), e.g. `academy.toml`:
//!
//! ```toml
//! [supabase]
//! url = "https://abcd.supabase.co"
//! anon_key = "public-anon-key"
//!
//! [auth]
//! redirect_url = "http://localhost:8080/"
//!
//! [uploads]
//! max_image_bytes = 10485760
//! ```
//!
//! - the process environment, after loading `.env` ([`AcademyConfig::from_env`], native only);
//! - the environment captured at compile time ([`AcademyConfig::from_build_env`]),
//!   which is how the wasm build gets its endpoint.
//!
//! Every section derives `Default`, so a missing section falls back to the
//! production defaults; only the Supabase endpoint has no usable default and is
//! checked by [`AcademyConfig::validate`].

use backend::SupabaseSettings;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Role;
use crate::upload::MAX_IMAGE_BYTES;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademyConfig {
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Backend endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

/// Auth behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Where verification and password reset emails send the user back to.
    #[serde(default)]
    pub redirect_url: Option<String>,
    /// Role required by the admin console.
    #[serde(default = "default_admin_role")]
    pub admin_role: Role,
}

fn default_admin_role() -> Role {
    Role::Admin
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            redirect_url: None,
            admin_role: default_admin_role(),
        }
    }
}

/// Upload limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_max_image_bytes() -> u64 {
    MAX_IMAGE_BYTES
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl AcademyConfig {
    /// Create a config pointing at a backend.
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            supabase: SupabaseConfig {
                url: url.to_string(),
                anon_key: anon_key.to_string(),
            },
            ..Self::default()
        }
    }

    /// Builder method to set the email redirect URL.
    pub fn with_redirect_url(mut self, url: &str) -> Self {
        self.auth.redirect_url = Some(url.to_string());
        self
    }

    /// Builder method to set the image size limit.
    pub fn with_max_image_bytes(mut self, bytes: u64) -> Self {
        self.uploads.max_image_bytes = bytes;
        self
    }

    /// Parse from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional
    /// `AUTH_REDIRECT_URL` / `MAX_IMAGE_BYTES` from the environment.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// The same variables as [`from_env`](Self::from_env), captured at compile time.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| {
            let value = match name {
                "SUPABASE_URL" => option_env!("SUPABASE_URL"),
                "SUPABASE_ANON_KEY" => option_env!("SUPABASE_ANON_KEY"),
                "AUTH_REDIRECT_URL" => option_env!("AUTH_REDIRECT_URL"),
                "MAX_IMAGE_BYTES" => option_env!("MAX_IMAGE_BYTES"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = var("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let anon_key =
            var("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let mut config = Self::new(&url, &anon_key);
        if let Some(redirect) = var("AUTH_REDIRECT_URL").filter(|v| !v.trim().is_empty()) {
            config = config.with_redirect_url(redirect.trim());
        }
        if let Some(bytes) = var("MAX_IMAGE_BYTES") {
            let bytes = bytes
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("MAX_IMAGE_BYTES"))?;
            config = config.with_max_image_bytes(bytes);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the backend endpoint is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.supabase.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing("supabase.url"));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        if self.supabase.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("supabase.anon_key"));
        }
        if self.uploads.max_image_bytes == 0 {
            return Err(ConfigError::Invalid("uploads.max_image_bytes"));
        }
        Ok(())
    }

    /// Settings for the HTTP client.
    pub fn supabase_settings(&self) -> SupabaseSettings {
        SupabaseSettings {
            url: self.supabase.url.trim().to_string(),
            anon_key: self.supabase.anon_key.trim().to_string(),
        }
    }
}
