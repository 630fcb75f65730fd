//! Request extractors for authentication and authorization.
//!
//! - [`auth::AuthUser`] -- the caller identified by a Bearer token.
//!   `Option<AuthUser>` accepts anonymous callers but still rejects a bad token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.

pub mod auth;
pub mod rbac;
