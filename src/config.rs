//! Environment-derived configuration, with an optional `.env` file
//! pre-populating anything not already set in the real environment.

use std::path::PathBuf;

use crate::error::ConfigError;

const DEFAULT_SERIAL_PORT_NAME: &str = "/dev/ttyUSB0";
const DEFAULT_TCP_PORT: u16 = 1111;
const DEFAULT_UPLOAD_PATH: &str = "/home/pi/matsuura_uploader/uploads";

pub struct Config {
	pub serial_port_name: String,
	pub tcp_port: u16,
	pub upload_path: PathBuf,
}

impl Config {
	/// `dotenv::dotenv()` only fills in variables the environment doesn't
	/// already have, so a missing `.env` file is silently fine and a real
	/// env var always wins.
	pub fn load() -> Result<Self, ConfigError> {
		let _ = dotenv::dotenv();

		let serial_port_name = std::env::var("SERIAL_PORT_NAME").unwrap_or_else(|_| DEFAULT_SERIAL_PORT_NAME.to_string());

		let tcp_port = match std::env::var("SERIAL_TCP_PORT") {
			Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidTcpPort { raw })?,
			Err(_) => DEFAULT_TCP_PORT,
		};

		let upload_path = std::env::var("UPLOAD_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_PATH));

		Ok(Self { serial_port_name, tcp_port, upload_path })
	}
}

#[cfg(test)]
mod tests {
	use assert2::assert;

	use super::*;

	#[test]
	fn rejects_non_numeric_port() {
		let err = ConfigError::InvalidTcpPort { raw: "abc".to_string() };
		assert!(format!("{}", err).contains("abc"));
	}
}
