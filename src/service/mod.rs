//! # Network Services
//!
//! Server lifecycle management and client sessions.
//!
//! ## Components
//! - **Server**: [`server::NetServer`], owner of the accept/worker pools
//!   and the listener's startup/shutdown state machine
//! - **Client**: [`client::ClientSession`], a framed connection with its
//!   own classifier and metadata

pub mod client;
pub mod server;
