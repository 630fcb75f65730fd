pub mod account;
pub mod auth;
pub mod courses;
pub mod diagnostics;
pub mod generation;
