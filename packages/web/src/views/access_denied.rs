use dioxus::prelude::*;
use ui::SignOutButton;

use crate::Route;

/// Shown to signed-in users without the admin role.
#[component]
pub fn AccessDenied() -> Element {
    let nav = use_navigator();

    rsx! {
        section {
            class: "page narrow",
            h1 { "Access denied" }
            p { "Your account does not have permission to open the admin console." }
            div {
                class: "hero-actions",
                Link { class: "button", to: Route::Home {}, "Back to the site" }
                SignOutButton {
                    label: "Sign in with another account",
                    class: "button",
                    on_signed_out: move |_| {
                        nav.replace(Route::Auth {});
                    },
                }
            }
        }
    }
}
