/// Database models for FieldOps
///
/// This module contains the persistent entities and their storage
/// operations.
///
/// # Models
///
/// - `role`: named permission bundles shared by many users
/// - `user`: accounts plus their 1:1 auth credential record
/// - `task`: tasks owned by users, with a monotonic performed transition

pub mod role;
pub mod task;
pub mod user;
