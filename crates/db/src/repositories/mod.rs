//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod directory_repo;
pub mod membership_repo;
pub mod reference_repo;
pub mod role_assignment_repo;
pub mod user_project_repo;
pub mod user_repo;

pub use directory_repo::DirectoryRepo;
pub use membership_repo::MembershipRepo;
pub use reference_repo::ReferenceRepo;
pub use role_assignment_repo::RoleAssignmentRepo;
pub use user_project_repo::UserProjectRepo;
pub use user_repo::UserRepo;
