//! Sidebar navigation entries, filtered by the session's role.

use crate::access::Route;
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem {
        label: "Dashboard",
        route: Route::Dashboard,
    },
    NavItem {
        label: "Analytics",
        route: Route::Analytics,
    },
    NavItem {
        label: "Messaging",
        route: Route::Messaging,
    },
    NavItem {
        label: "Users",
        route: Route::Users,
    },
    NavItem {
        label: "Settings",
        route: Route::Settings,
    },
];

/// Entries whose route the session may enter, in sidebar order.
pub fn visible_items(session: &SessionState) -> Vec<NavItem> {
    NAV_ITEMS
        .into_iter()
        .filter(|item| {
            item.route
                .required_role()
                .map_or(true, |role| session.has_permission(role))
        })
        .collect()
}
