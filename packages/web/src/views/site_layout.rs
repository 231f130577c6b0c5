//! Public page chrome: top navigation, page outlet and footer.

use api::models::ClassKind;
use dioxus::prelude::*;
use ui::{use_auth, Navbar, SignOutButton};

use crate::Route;

#[component]
pub fn SiteLayout() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let state = auth();

    rsx! {
        header {
            class: "site-header",
            Link { class: "brand", to: Route::Home {}, "Academy" }
            Navbar {
                class: "site-nav",
                Link { to: Route::Home {}, "Home" }
                Link { to: Route::About {}, "About" }
                div {
                    class: "nav-group",
                    span { class: "nav-group-label", "Classes" }
                    div {
                        class: "nav-group-items",
                        for kind in ClassKind::ALL {
                            Link {
                                key: "{kind}",
                                to: Route::Classes { kind: kind.to_string() },
                                {class_title(kind)}
                            }
                        }
                    }
                }
                Link { to: Route::Coaches {}, "Coaches" }
                Link { to: Route::Events {}, "Events" }
                Link { to: Route::Gallery {}, "Gallery" }
                Link { class: "nav-cta", to: Route::Join {}, "Join" }
                if state.is_admin {
                    Link { to: Route::AdminDashboard {}, "Admin" }
                }
                if state.is_authenticated() {
                    Link { to: Route::Account {}, "Account" }
                    SignOutButton {
                        class: "link-button",
                        on_signed_out: move |_| {
                            nav.replace(Route::Home {});
                        },
                    }
                } else if !state.initializing {
                    Link { to: Route::Auth {}, "Sign in" }
                }
            }
        }

        main {
            class: "site-main",
            Outlet::<Route> {}
        }

        footer {
            class: "site-footer",
            p { "Training for every age and level." }
            nav {
                Link { to: Route::Join {}, "Register for a class" }
                Link { to: Route::Home {}, "Contact us" }
            }
        }
    }
}

pub fn class_title(kind: ClassKind) -> &'static str {
    match kind {
        ClassKind::Kids => "Kids classes",
        ClassKind::Adults => "Adult classes",
        ClassKind::Private => "Private lessons",
    }
}
