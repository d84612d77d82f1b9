use crate::api::ApiClient;
use crate::session::SessionState;
use crate::store::TokenStore;

/// The navigable surfaces of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Invoice,
    Login,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Invoice => "/invoice",
            Route::Login => "/login",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Owner of navigation side effects.
///
/// The API client reports forced logouts through this seam instead of
/// navigating on its own; guards hand their redirect decisions to it too.
pub trait Navigator: Send + Sync {
    /// Move to `to`. `from` carries the originally requested path when the
    /// move is a guard redirect, so the target can be restored after login.
    fn redirect(&self, to: Route, from: Option<String>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Proceed,
    Redirect { from: Option<String>, to: Route },
}

/// Gate one navigation.
///
/// Always initializes the session first and always completes: a failed
/// verification leaves the session anonymous rather than blocking. Rules,
/// in order: protected target while anonymous redirects to login with the
/// original path attached; the login page while authenticated redirects to
/// the dashboard; anything else proceeds.
pub async fn guard(
    session: &SessionState,
    api: &ApiClient,
    tokens: &TokenStore,
    target: Route,
) -> RouteDecision {
    session.initialize(api, tokens).await;

    let authenticated = session.is_authenticated().await;

    if target.requires_auth() && !authenticated {
        return RouteDecision::Redirect {
            from: Some(target.path().to_string()),
            to: Route::Login,
        };
    }

    if target == Route::Login && authenticated {
        return RouteDecision::Redirect {
            from: None,
            to: Route::Dashboard,
        };
    }

    RouteDecision::Proceed
}
