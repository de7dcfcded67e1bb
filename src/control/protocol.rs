//! The line-oriented JSON request/response protocol spoken over the
//! control socket.
//!
//! Requests are parsed into a [`serde_json::Value`] first rather than
//! deriving `Deserialize` directly onto [`Request`], because the exact
//! wording of a malformed request's error message depends on *which*
//! field is missing, not just that the shape didn't match.

use serde::Serialize;

/// A decoded control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
	Start { file: String },
	Stop,
	Status,
}

/// Why a raw line could not be turned into a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	InvalidJson,
	MissingCmd,
	MissingFile,
	UnknownCommand(String),
}

impl ParseError {
	/// The exact string sent back to the client in `message`.
	pub fn message(&self) -> String {
		match self {
			Self::InvalidJson => "Invalid json data in request".to_string(),
			Self::MissingCmd => "Missing 'cmd' label in request".to_string(),
			Self::MissingFile => "Missing 'file' label in start request.".to_string(),
			Self::UnknownCommand(_) => "Unknown command".to_string(),
		}
	}
}

pub fn parse_request(raw: &str) -> Result<Request, ParseError> {
	let value: serde_json::Value = serde_json::from_str(raw).map_err(|_| ParseError::InvalidJson)?;

	let cmd = value.get("cmd").and_then(serde_json::Value::as_str).ok_or(ParseError::MissingCmd)?;

	match cmd {
		"start" => {
			let file = value.get("file").and_then(serde_json::Value::as_str).ok_or(ParseError::MissingFile)?;
			Ok(Request::Start { file: file.to_string() })
		},
		"stop" => Ok(Request::Stop),
		"status" => Ok(Request::Status),
		other => Err(ParseError::UnknownCommand(other.to_string())),
	}
}

/// A control response: `error` is `0` on success, `1` on failure.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
	pub error: u8,
	pub message: String,
}

impl Response {
	pub fn ok(message: impl Into<String>) -> Self {
		Self { error: 0, message: message.into() }
	}

	pub fn err(message: impl Into<String>) -> Self {
		Self { error: 1, message: message.into() }
	}

	pub fn to_json(&self) -> String {
		serde_json::to_string(self).expect("Response fields always serialize")
	}
}
