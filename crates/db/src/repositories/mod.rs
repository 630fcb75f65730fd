//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod generated_course_repo;
pub mod session_repo;
pub mod user_repo;

pub use generated_course_repo::GeneratedCourseRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
