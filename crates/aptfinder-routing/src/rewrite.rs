//! Request path rewrite

pub const LOGIN_PAGE: &str = "/login.html";

const INDEX_PAGE: &str = "/index.html";
const PAGE_EXTENSION: &str = ".html";

/// Outcome of rewriting one request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResolution {
    /// Site root, served by the login page
    Login(String),
    /// Extensionless page, served by its `.html` file
    Page(String),
    /// Served as requested
    Unchanged(String),
}

impl RouteResolution {
    /// The path the host should serve
    pub fn path(&self) -> &str {
        match self {
            RouteResolution::Login(path)
            | RouteResolution::Page(path)
            | RouteResolution::Unchanged(path) => path,
        }
    }

    pub fn into_path(self) -> String {
        match self {
            RouteResolution::Login(path)
            | RouteResolution::Page(path)
            | RouteResolution::Unchanged(path) => path,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        !matches!(self, RouteResolution::Unchanged(_))
    }
}

#[derive(Debug, Clone)]
pub struct EdgeRouter {
    login_page: String,
}

impl EdgeRouter {
    pub fn new() -> Self {
        Self {
            login_page: LOGIN_PAGE.to_string(),
        }
    }

    pub fn with_login_page(login_page: impl Into<String>) -> Self {
        Self {
            login_page: login_page.into(),
        }
    }

    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    pub fn resolve(&self, path: &str) -> RouteResolution {
        // Only directory-like and extensionless paths are candidates
        if !path.ends_with('/') && path.contains('.') {
            return RouteResolution::Unchanged(path.to_string());
        }

        let resolution = if path.is_empty() || path == "/" {
            RouteResolution::Login(self.login_page.clone())
        } else if path == INDEX_PAGE || path.ends_with(PAGE_EXTENSION) {
            RouteResolution::Unchanged(path.to_string())
        } else {
            // `/listings/` becomes `/listings/.html`; the host has no index lookup
            RouteResolution::Page(format!("{}{}", path, PAGE_EXTENSION))
        };

        if resolution.is_rewritten() {
            tracing::debug!(from = path, to = resolution.path(), "Rewrote request path");
        }

        resolution
    }
}

impl Default for EdgeRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite a path with the default login page
pub fn rewrite_path(path: &str) -> String {
    EdgeRouter::new().resolve(path).into_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_goes_to_login() {
        assert_eq!(rewrite_path("/"), "/login.html");
        assert_eq!(rewrite_path(""), "/login.html");

        match EdgeRouter::new().resolve("/") {
            RouteResolution::Login(path) => assert_eq!(path, "/login.html"),
            other => panic!("Expected Login, got {:?}", other),
        }
    }

    #[test]
    fn test_index_passes_through() {
        assert_eq!(rewrite_path("/index.html"), "/index.html");
        assert!(!EdgeRouter::new().resolve("/index.html").is_rewritten());
    }

    #[test]
    fn test_extensionless_gets_html() {
        assert_eq!(rewrite_path("/dashboard"), "/dashboard.html");
        assert_eq!(rewrite_path("/a/b"), "/a/b.html");
        assert_eq!(rewrite_path("/listings/"), "/listings/.html");

        match EdgeRouter::new().resolve("/dashboard") {
            RouteResolution::Page(path) => assert_eq!(path, "/dashboard.html"),
            other => panic!("Expected Page, got {:?}", other),
        }
    }

    #[test]
    fn test_files_unchanged() {
        assert_eq!(rewrite_path("/style.css"), "/style.css");
        assert_eq!(rewrite_path("/script.js"), "/script.js");
        assert_eq!(rewrite_path("/login.html"), "/login.html");
        assert_eq!(rewrite_path("/images/a.b/c.png"), "/images/a.b/c.png");
    }

    #[test]
    fn test_dotted_directory() {
        // Ends in '/', so it is a candidate even though it contains a dot
        assert_eq!(rewrite_path("/v1.2/"), "/v1.2/.html");
    }

    #[test]
    fn test_custom_login_page() {
        let router = EdgeRouter::with_login_page("/signin.html");
        assert_eq!(router.login_page(), "/signin.html");
        assert_eq!(router.resolve("").path(), "/signin.html");
        assert_eq!(router.resolve("/about").path(), "/about.html");
    }
}
