//! Active view and role-based menu selection.

use crate::api::Role;
use crate::session::AuthState;

/// Screen the composition root is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Dashboard,
    Admin,
}

impl View {
    /// Landing view after authenticating with `role`.
    pub fn home_for(role: Role) -> Self {
        if role == Role::Admin {
            View::Admin
        } else {
            View::Dashboard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    /// CLI invocation that opens this entry
    pub command: &'static str,
}

const USER_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Dashboard",
        command: "forgeguard images list",
    },
    NavItem {
        label: "Upload & Analyze",
        command: "forgeguard images upload <FILE> --analyze",
    },
    NavItem {
        label: "File Manager",
        command: "forgeguard images show <ID>",
    },
    NavItem {
        label: "Analysis Viewer",
        command: "forgeguard analyze show <ID>",
    },
];

const ADMIN_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Admin Dashboard",
        command: "forgeguard admin dashboard",
    },
    NavItem {
        label: "Manage Users",
        command: "forgeguard admin users",
    },
    NavItem {
        label: "User Images",
        command: "forgeguard admin user-images <USER_ID>",
    },
];

/// Which menu to render. Only the admin role changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSet {
    User,
    Admin,
}

impl NavigationSet {
    pub fn for_session(state: &AuthState) -> Self {
        if state.is_admin() {
            NavigationSet::Admin
        } else {
            NavigationSet::User
        }
    }

    pub fn items(self) -> &'static [NavItem] {
        match self {
            NavigationSet::User => USER_ITEMS,
            NavigationSet::Admin => ADMIN_ITEMS,
        }
    }
}
