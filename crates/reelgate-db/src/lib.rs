//! Reelgate database layer
//!
//! SQLite repositories for uploads and the admin credential.

pub mod db;

pub use db::admin::{AdminCredential, AdminRepository};
pub use db::uploads::UploadRepository;
