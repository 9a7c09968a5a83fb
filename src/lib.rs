//! Paper Router: Browsing History for Multi-Column Readers
//!
//! Keeps the navigation state of a paper-style WordPress reader: an append-only
//! history of contexts, each a set of columns of items, some of which expand
//! into more columns or items once their backing list page has been fetched.
//! The crate never performs I/O itself; fetch results are fed in as commands
//! and every view is derived from the current store state on read.

pub mod cli;
pub mod command;
pub mod config;
pub mod connection;
pub mod entity;
pub mod error;
pub mod list;
pub mod logging;
pub mod router;
pub mod types;

pub use command::Command;
pub use connection::Connection;
pub use error::{PaperError, RouterError, StoreError};
