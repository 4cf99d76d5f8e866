//! pocketbook: a personal finance and hobby tracker backed by a hosted data store.
//!
//! The interesting part for most callers is `date_entry`, which turns what a user types into a
//! date box into a display string and a canonical `YYYY-MM-DD` value, and `form`, which builds
//! and submits transactions with it.

pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod date_entry;
mod error;
pub mod form;
pub mod model;
pub mod timer;
mod utils;


pub use api::Mode;
pub use config::{Config, ENV_ANON_KEY, ENV_BACKEND_URL};
pub use error::{Error, ErrorType, Result};
