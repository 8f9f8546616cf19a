#![forbid(unsafe_code)]

pub mod auth_service;
pub mod catalog;
pub mod error;
pub mod progress_service;
pub mod session_loop;
pub mod session_service;

pub use quiz_core::Clock;

pub use auth_service::{
    AuthBackend, AuthService, HttpAuthBackend, InMemoryAuthBackend, UserProfile,
};
pub use catalog::{builtin_bank, parse_catalog};
pub use error::{AuthError, CatalogError};
pub use progress_service::ProgressService;
pub use session_loop::{CountdownOutcome, drive_countdown};
pub use session_service::{SessionOptions, SessionService, TestSession};
