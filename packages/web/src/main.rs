use api::{Academy, AcademyConfig, ConfigError};
use dioxus::prelude::*;

use ui::{AppBackend, AuthProvider, ToastHost, Toasts};
use views::admin::{
    AdminCoaches, AdminDashboard, AdminEvents, AdminGallery, AdminLayout, AdminMessages,
    AdminStudents, AdminUsers,
};
use views::{
    About, AccessDenied, Account, Auth, Classes, Coaches, Events, Gallery, Home, Join, NotFound, SiteLayout,
};

mod format;
mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(SiteLayout)]
        #[route("/")]
        Home {},
        #[route("/about")]
        About {},
        #[route("/classes/:kind")]
        Classes { kind: String },
        #[route("/coaches")]
        Coaches {},
        #[route("/gallery")]
        Gallery {},
        #[route("/events")]
        Events {},
        #[route("/join")]
        Join {},
        #[route("/auth")]
        Auth {},
        #[route("/account")]
        Account {},
        #[route("/access-denied")]
        AccessDenied {},
    #[end_layout]
    #[nest("/admin")]
        #[layout(AdminLayout)]
            #[route("/")]
            AdminDashboard {},
            #[route("/coaches")]
            AdminCoaches {},
            #[route("/events")]
            AdminEvents {},
            #[route("/students")]
            AdminStudents {},
            #[route("/messages")]
            AdminMessages {},
            #[route("/gallery")]
            AdminGallery {},
            #[route("/users")]
            AdminUsers {},
        #[end_layout]
    #[end_nest]
    #[layout(SiteLayout)]
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::logger::init(tracing::Level::INFO).expect("failed to initialize logger");

    match load_academy() {
        Ok(academy) => {
            tracing::info!("using backend at {}", academy.config().supabase.url);
            LaunchBuilder::new().with_context(academy).launch(App);
        }
        Err(e) => {
            tracing::error!("configuration error: {}", e);
            LaunchBuilder::new()
                .with_context(StartupError(e.to_string()))
                .launch(Misconfigured);
        }
    }
}

fn load_academy() -> Result<Academy<AppBackend>, ConfigError> {
    let mut config = AcademyConfig::from_build_env()?;
    if config.auth.redirect_url.is_none() {
        config.auth.redirect_url = site_origin().map(|origin| format!("{origin}/account"));
    }
    Academy::connect(config)
}

#[cfg(target_arch = "wasm32")]
fn site_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn site_origin() -> Option<String> {
    None
}

#[derive(Clone)]
struct StartupError(String);

#[component]
fn App() -> Element {
    use_context_provider(|| Signal::new(Toasts::default()));

    rsx! {
        document::Stylesheet { href: MAIN_CSS }
        AuthProvider {
            Router::<Route> {}
        }
        ToastHost {}
    }
}

#[component]
fn Misconfigured() -> Element {
    let StartupError(message) = use_context::<StartupError>();

    rsx! {
        document::Stylesheet { href: MAIN_CSS }
        div {
            class: "page narrow",
            h1 { "Site unavailable" }
            p { "The site is not configured correctly: {message}" }
        }
    }
}
