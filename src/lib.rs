//! Drip-feed gateway between a host computer and a Matsuura MX3 CNC
//! controller's RS-232 line: paces G-code out over serial under hardware
//! flow control, and exposes a small local TCP/JSON control protocol to
//! start, stop, and poll the status of a transfer.

pub mod config;
pub mod control;
pub mod crc;
pub mod daemon;
pub mod error;
pub mod program;
mod sender;
pub mod serial_port;

pub use config::Config;
pub use daemon::Daemon;
pub use program::Program;
pub use serial_port::SerialPort;
