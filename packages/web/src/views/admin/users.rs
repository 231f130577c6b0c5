//! Accounts and their roles. Admins are made here rather than at sign-up.

use api::models::{Profile, Role, UserRole};
use api::DataError;
use dioxus::prelude::*;
use ui::{push_toast, use_academy, use_auth, use_toasts, LoadingPlaceholder, ToastLevel};

use crate::format;

#[component]
pub fn AdminUsers() -> Element {
    let academy = use_academy();
    let auth = use_auth();
    let mut toasts = use_toasts();
    let admin_role = academy.config().auth.admin_role;
    let mut accounts = use_resource({
        let academy = academy.clone();
        move || {
            let academy = academy.clone();
            async move {
                let profiles = academy.profiles().get_all().await?;
                let roles = academy.roles().list().await?;
                Ok::<_, DataError>((profiles, roles))
            }
        }
    });

    let toggle = move |user_id: String, grant: bool| {
        let academy = academy.clone();
        async move {
            let roles = academy.roles();
            let result = if grant {
                roles.grant(&user_id, admin_role).await.map(|_| "Admin role granted")
            } else {
                roles.revoke(&user_id, admin_role).await.map(|_| "Admin role revoked")
            };
            match result {
                Ok(message) => {
                    push_toast(&mut toasts, ToastLevel::Success, message, None);
                    accounts.restart();
                }
                Err(e) => push_toast(&mut toasts, ToastLevel::Error, "Could not change role", Some(e.to_string())),
            }
        }
    };

    let me = auth().user.map(|u| u.id);

    rsx! {
        h1 { "Users" }
        match &*accounts.read() {
            None => rsx! { LoadingPlaceholder {} },
            Some(Err(e)) => rsx! { p { class: "form-error", "Could not load users: {e}" } },
            Some(Ok((profiles, roles))) => rsx! {
                table {
                    class: "admin-table",
                    thead { tr { th { "Name" } th { "Email" } th { "Joined" } th { "Role" } th { "" } } }
                    tbody {
                        for profile in profiles.iter().cloned() {
                            UserRow {
                                key: "{profile.id}",
                                is_admin: holds(roles, &profile.user_id, admin_role),
                                is_self: me.as_deref() == Some(profile.user_id.as_str()),
                                profile,
                                ontoggle: {
                                    let toggle = toggle.clone();
                                    move |(user_id, grant): (String, bool)| toggle(user_id, grant)
                                },
                            }
                        }
                    }
                }
            },
        }
    }
}

fn holds(roles: &[UserRole], user_id: &str, role: Role) -> bool {
    roles.iter().any(|r| r.user_id == user_id && r.role == role)
}

#[component]
fn UserRow(profile: Profile, is_admin: bool, is_self: bool, ontoggle: EventHandler<(String, bool)>) -> Element {
    let user_id = profile.user_id.clone();

    rsx! {
        tr {
            td { {profile.display_name().to_string()} }
            td { {profile.email.clone().unwrap_or_default()} }
            td { {format::date(&profile.created_at)} }
            td { if is_admin { "admin" } else { "user" } }
            td {
                class: "row-actions",
                if is_self {
                    span { class: "muted", "You" }
                } else if is_admin {
                    button {
                        class: "button",
                        onclick: move |_| ontoggle.call((user_id.clone(), false)),
                        "Revoke admin"
                    }
                } else {
                    button {
                        class: "button",
                        onclick: move |_| ontoggle.call((user_id.clone(), true)),
                        "Make admin"
                    }
                }
            }
        }
    }
}
