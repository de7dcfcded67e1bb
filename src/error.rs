//! Error types for the drip-feed daemon.
//!
//! Mirrors the hand-rolled enum + manual `Display`/`From` style used
//! throughout this crate's serial layer rather than pulling in a derive
//! macro for what are, in practice, small and stable error sets.

/// Returned by [`crate::serial_port::SerialPort::open`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OpenFailed {
	pub reason: String,
	/// True if the OS reported the device as already in use by another process.
	pub busy: bool,
}

impl std::fmt::Display for OpenFailed {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		if self.busy {
			write!(f, "device busy: {}", self.reason)
		} else {
			write!(f, "{}", self.reason)
		}
	}
}

impl std::error::Error for OpenFailed {}

/// Errors from reading configuration out of the environment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConfigError {
	InvalidTcpPort { raw: String },
}

impl std::fmt::Display for ConfigError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::InvalidTcpPort { raw } => write!(f, "SERIAL_TCP_PORT {:?} is not a valid TCP port", raw),
		}
	}
}

impl std::error::Error for ConfigError {}
