//! The local TCP control plane: a tiny line-oriented JSON protocol for
//! starting, stopping, and polling the status of a drip-feed transfer.

pub mod protocol;
mod server;

pub use protocol::{ParseError, Request, Response, parse_request};
pub use server::ControlServer;
