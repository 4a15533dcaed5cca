//! runq-server
//!
//! HTTP front end for runq-core: submission form, result pages and the JSON
//! status API.

pub mod config;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod router;
pub mod state;
