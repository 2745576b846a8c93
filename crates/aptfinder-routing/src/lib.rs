//! Aptfinder Edge Routing
//!
//! Rewrites inbound request paths before the static host resolves them:
//! 1. `/` or empty → the login page
//! 2. `/index.html` → unchanged (the page checks its own session)
//! 3. Extensionless paths or paths ending in `/` → `.html` appended
//! 4. Anything else → unchanged

mod rewrite;

pub use rewrite::{rewrite_path, EdgeRouter, RouteResolution, LOGIN_PAGE};
