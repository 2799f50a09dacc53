//! ASCII Video Server Library
//!
//! This library contains the HTTP surface: client classification, request
//! parsing, routing and the accept loop. The command-line binary is in main.rs.

pub mod classifier;
pub mod http;
pub mod router;
pub mod server;

// Re-export commonly used types
pub use classifier::is_terminal_client;
pub use http::{Request, Response};
pub use router::{route, Action, AppState};
pub use server::Server;
