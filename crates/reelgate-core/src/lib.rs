//! Reelgate core library
//!
//! Domain models, error types, configuration, and upload validation shared
//! by the database layer and the HTTP service.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{MediaType, NewUpload, Upload, UploadResponse, UploadStatus};
pub use validation::{sanitize_filename, UploadValidator};
