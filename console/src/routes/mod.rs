//! Role-based navigation tables.
//!
//! One static table per role drives both the sidebar menu and the route
//! guards, so the two can never disagree about where a role is allowed to
//! go. Paths outside a role's own section bounce the user back to their
//! section home.

use crate::auth::models::Role;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// A navigable menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: &'static str,
}

const ADMIN_MENU: &[MenuItem] = &[
    MenuItem {
        label: "Dashboard",
        path: "/admin",
    },
    MenuItem {
        label: "User Management",
        path: "/admin/user-management",
    },
    MenuItem {
        label: "Player Management",
        path: "/admin/player-management",
    },
    MenuItem {
        label: "Leaderboard",
        path: "/admin/leaderboard",
    },
];

const STAFF_MENU: &[MenuItem] = &[
    MenuItem {
        label: "Dashboard",
        path: "/staff",
    },
    MenuItem {
        label: "Player Management",
        path: "/staff/player-management",
    },
];

const PLAYER_MENU: &[MenuItem] = &[
    MenuItem {
        label: "Dashboard",
        path: "/player",
    },
    MenuItem {
        label: "Leaderboard",
        path: "/player/leaderboard",
    },
];

/// The section a signed-in user lands on after login or restore.
pub fn home_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Staff => "/staff",
        Role::Player => "/player",
    }
}

/// Sidebar entries for a role.
pub fn menu_for(role: Role) -> &'static [MenuItem] {
    match role {
        Role::Admin => ADMIN_MENU,
        Role::Staff => STAFF_MENU,
        Role::Player => PLAYER_MENU,
    }
}

/// Whether `path` falls inside the section `role` may navigate.
pub fn path_allowed(role: Role, path: &str) -> bool {
    let home = home_path(role);
    path == home || path.strip_prefix(home).is_some_and(|rest| rest.starts_with('/'))
}

/// Something that can point the UI at a new location.
///
/// Injected into the auth context so session restore can land the user on
/// their section without the context knowing what a "screen" is.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
