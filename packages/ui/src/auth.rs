//! Authentication context and hooks for the UI.

use api::{Academy, AuthState};
use backend::SupabaseClient;
use dioxus::prelude::*;

/// The backend the running site talks to.
pub type AppBackend = SupabaseClient;

/// The academy context installed at launch.
pub fn use_academy() -> Academy<AppBackend> {
    use_context::<Academy<AppBackend>>()
}

/// Get the current authentication state.
/// Returns a signal that updates when the user signs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Provider component that runs the session manager and mirrors its state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let academy = use_academy();
    let mut auth_state = use_signal(|| academy.session().snapshot());

    use_hook(move || {
        let session = academy.session().clone();
        let mut changes = session.subscribe();

        let runner = session.clone();
        let link = take_link_fragment();
        spawn(async move {
            runner.run_with_link(link).await;
            tracing::warn!("session manager stopped");
        });

        spawn(async move {
            while changes.changed().await.is_ok() {
                let state = changes.borrow_and_update().clone();
                auth_state.set(state);
            }
        });
    });

    use_context_provider(|| auth_state);

    rsx! {
        {children}
    }
}

/// The URL fragment of an email link (`#access_token=...` or `#error=...`) the page
/// was opened with, removed from the address bar so a reload does not replay it.
#[cfg(target_arch = "wasm32")]
fn take_link_fragment() -> Option<String> {
    let window = web_sys::window()?;
    let location = window.location();
    let hash = location.hash().ok()?;
    if !(hash.contains("access_token=") || hash.contains("error=")) {
        return None;
    }

    let path = format!(
        "{}{}",
        location.pathname().unwrap_or_default(),
        location.search().unwrap_or_default()
    );
    let cleared = window.history().and_then(|history| {
        history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path))
    });
    if cleared.is_err() {
        tracing::warn!("could not clear the email link from the address bar");
    }
    Some(hash)
}

#[cfg(not(target_arch = "wasm32"))]
fn take_link_fragment() -> Option<String> {
    None
}

/// Button to sign the current user out.
#[component]
pub fn SignOutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
    on_signed_out: Option<EventHandler<()>>,
) -> Element {
    let academy = use_academy();

    let onclick = move |_| {
        let session = academy.session().clone();
        async move {
            session.sign_out().await;
            if let Some(handler) = on_signed_out {
                handler.call(());
            }
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
