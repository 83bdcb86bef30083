//! Route table and the guard deciding whether a session may enter a route.

use std::fmt;

use swiftdash_shared::Role;

use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Register,
    Unauthorized,
    Dashboard,
    Messaging,
    Analytics,
    Users,
    Settings,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Landing,
        Route::Login,
        Route::Register,
        Route::Unauthorized,
        Route::Dashboard,
        Route::Messaging,
        Route::Analytics,
        Route::Users,
        Route::Settings,
        Route::NotFound,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Unauthorized => "/unauthorized",
            Route::Dashboard => "/dashboard",
            Route::Messaging => "/dashboard/messaging",
            Route::Analytics => "/dashboard/analytics",
            Route::Users => "/dashboard/users",
            Route::Settings => "/dashboard/settings",
            Route::NotFound => "/404",
        }
    }

    /// Resolve a path; a trailing slash is ignored and anything unknown is
    /// [`Route::NotFound`].
    pub fn from_path(path: &str) -> Route {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Route::ALL
            .into_iter()
            .find(|r| r.path() == trimmed)
            .unwrap_or(Route::NotFound)
    }

    /// `None` for public routes.
    pub fn required_role(self) -> Option<Role> {
        match self {
            Route::Landing
            | Route::Login
            | Route::Register
            | Route::Unauthorized
            | Route::NotFound => None,
            Route::Dashboard | Route::Messaging | Route::Analytics | Route::Settings => {
                Some(Role::User)
            }
            Route::Users => Some(Role::Admin),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// A sign-in is in flight; render a placeholder.
    Loading,
    /// Send to the login route, remembering where the user was headed.
    RedirectToLogin { from: Route },
    Unauthorized,
    Allow,
}

pub fn authorize(route: Route, session: &SessionState) -> RouteDecision {
    let Some(required) = route.required_role() else {
        return RouteDecision::Allow;
    };
    if session.is_loading {
        return RouteDecision::Loading;
    }
    if !session.is_authenticated() {
        return RouteDecision::RedirectToLogin { from: route };
    }
    if !session.has_permission(required) {
        return RouteDecision::Unauthorized;
    }
    RouteDecision::Allow
}
