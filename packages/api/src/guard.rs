//! Route guard decision.
//!
//! [`evaluate`] is pure: the admin layout calls it on every render with the current
//! [`AuthState`] and acts on the answer. While anything is still loading the answer
//! is always [`Access::Loading`], so a half-resolved state can never redirect.

use crate::models::Role;
use crate::session::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// Not signed in.
    SignIn,
    /// Signed in without the required role.
    AccessDenied,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::SignIn => "/auth",
            Redirect::AccessDenied => "/access-denied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Loading,
    Redirect(Redirect),
    Granted,
}

/// Decide what a route requiring `required` (or just a signed-in user) should do.
pub fn evaluate(state: &AuthState, required: Option<Role>) -> Access {
    if state.is_loading() {
        return Access::Loading;
    }
    if !state.is_authenticated() {
        return Access::Redirect(Redirect::SignIn);
    }
    // `is_admin` is resolved against the configured admin role, whichever it is.
    match required {
        Some(_) if !state.is_admin => Access::Redirect(Redirect::AccessDenied),
        _ => Access::Granted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::User;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: Some("u1@example.com".to_string()),
            user_metadata: serde_json::json!({}),
            created_at: None,
        }
    }

    fn state(user: Option<User>, is_admin: bool, initializing: bool, role_loading: bool) -> AuthState {
        AuthState {
            user,
            session: None,
            is_admin,
            initializing,
            role_loading,
            ..AuthState::default()
        }
    }

    #[test]
    fn test_loading_wins() {
        for s in [
            AuthState::default(),
            state(Some(user()), true, true, false),
            state(Some(user()), false, false, true),
            state(None, false, true, false),
        ] {
            assert_eq!(evaluate(&s, Some(Role::Admin)), Access::Loading);
            assert_eq!(evaluate(&s, None), Access::Loading);
        }
    }

    #[test]
    fn test_settled_decisions() {
        let anonymous = state(None, false, false, false);
        let member = state(Some(user()), false, false, false);
        let admin = state(Some(user()), true, false, false);

        assert_eq!(evaluate(&anonymous, Some(Role::Admin)), Access::Redirect(Redirect::SignIn));
        assert_eq!(evaluate(&anonymous, None), Access::Redirect(Redirect::SignIn));
        assert_eq!(evaluate(&member, Some(Role::Admin)), Access::Redirect(Redirect::AccessDenied));
        assert_eq!(evaluate(&member, None), Access::Granted);
        assert_eq!(evaluate(&member, Some(Role::User)), Access::Redirect(Redirect::AccessDenied));
        assert_eq!(evaluate(&admin, Some(Role::Admin)), Access::Granted);
    }

    #[test]
    fn test_required_role_needs_resolved_grant() {
        // With `admin_role = "user"` a signed-in user without a role row is still refused.
        let member = state(Some(user()), false, false, false);
        for role in [Role::Admin, Role::User] {
            assert_eq!(evaluate(&member, Some(role)), Access::Redirect(Redirect::AccessDenied));
        }
        let granted = state(Some(user()), true, false, false);
        assert_eq!(evaluate(&granted, Some(Role::User)), Access::Granted);
    }

    #[test]
    fn test_idempotent() {
        let member = state(Some(user()), false, false, false);
        let first = evaluate(&member, Some(Role::Admin));
        assert_eq!(evaluate(&member, Some(Role::Admin)), first);
        assert_eq!(Redirect::AccessDenied.path(), "/access-denied");
    }
}
