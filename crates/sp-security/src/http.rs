//! Route matching, redirect and logout URL collaborators.

use std::collections::HashMap;

use crate::error::SecurityResult;
use crate::request::RequestContext;
use crate::token::SessionToken;

/// Decides whether a request targets a route.
pub trait RouteMatcher {
    /// Returns true if `request` targets `route`, a route name or an absolute path.
    fn path_matches(&self, request: &RequestContext, route: &str) -> bool;
}

/// Turns a redirect target into the `Location` of a 302 response.
pub trait RedirectBuilder {
    /// Resolves `target` against `request`.
    fn create_redirect_url(&self, request: &RequestContext, target: &str) -> String;
}

/// Generates the CSRF-protected logout URL for the current principal.
pub trait LogoutUrlGenerator {
    /// Returns the logout path, including its CSRF parameter when logout is
    /// CSRF-protected. Fails when there is no authenticated principal.
    fn logout_path(&self, principal: Option<&SessionToken>) -> SecurityResult<String>;
}

impl<T: RouteMatcher + ?Sized> RouteMatcher for &T {
    fn path_matches(&self, request: &RequestContext, route: &str) -> bool {
        (**self).path_matches(request, route)
    }
}

impl<T: RedirectBuilder + ?Sized> RedirectBuilder for &T {
    fn create_redirect_url(&self, request: &RequestContext, target: &str) -> String {
        (**self).create_redirect_url(request, target)
    }
}

impl<T: LogoutUrlGenerator + ?Sized> LogoutUrlGenerator for &T {
    fn logout_path(&self, principal: Option<&SessionToken>) -> SecurityResult<String> {
        (**self).logout_path(principal)
    }
}

/// Named routes plus the redirect rules of the security layer.
#[derive(Debug, Clone, Default)]
pub struct HttpUtils {
    routes: HashMap<String, String>,
}

impl HttpUtils {
    /// Creates an instance with no named routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named route.
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(name.into(), path.into());
        self
    }

    /// Returns the path of a named route.
    #[must_use]
    pub fn route_path(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }
}

impl RouteMatcher for HttpUtils {
    fn path_matches(&self, request: &RequestContext, route: &str) -> bool {
        let expected = if route.starts_with('/') {
            route
        } else {
            match self.route_path(route) {
                Some(path) => path,
                None => return false,
            }
        };
        let actual = urlencoding::decode(request.path_info())
            .map_or_else(|_| request.path_info().to_string(), |p| p.into_owned());
        actual == expected
    }
}

impl RedirectBuilder for HttpUtils {
    /// Absolute URLs pass through; absolute paths are resolved against the
    /// request's scheme and host; route names resolve to their path first.
    fn create_redirect_url(&self, request: &RequestContext, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            return target.to_string();
        }
        let path = if target.starts_with('/') {
            target
        } else {
            self.route_path(target).unwrap_or(target)
        };
        format!("{}{}", request.scheme_and_http_host(), path)
    }
}
