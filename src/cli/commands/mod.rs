//! Command implementations.

mod account;
mod chat;
mod config;
mod serve;

pub use account::{run_signin, run_signup};
pub use chat::run_chat;
pub use config::run_config;
pub use serve::run_serve;
