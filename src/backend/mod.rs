//! Typed clients for the external task backend.
//!
//! The backend owns persistence, password hashing, and token verification;
//! these wrappers only shape requests and surface responses.

mod auth;
mod client;

pub use auth::{AuthClient, AuthUser, Credentials, TokenResponse};
pub use client::{DeleteDetail, NewTask, Task, TaskPatch, TaskStoreClient};
