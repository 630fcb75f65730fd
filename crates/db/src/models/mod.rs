//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity matching the table plus the
//! create DTO used by its repository.

pub mod generated_course;
pub mod session;
pub mod user;
