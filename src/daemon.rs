//! The daemon core: owns the serial port and the current [`Program`], and
//! runs the single event loop that fairly multiplexes control-socket
//! readiness against the sender engine's pacing deadline.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::control::{ControlServer, Request, Response, parse_request};
use crate::program::Program;
use crate::serial_port::SerialPort;

/// Floor and ceiling on how long a single `poll` call is allowed to block,
/// so the control socket stays responsive even while idle and a pending
/// write deadline is never missed by more than a tick.
const MIN_POLL: Duration = Duration::from_millis(20);
const MAX_POLL: Duration = Duration::from_secs(1);

pub struct Daemon<S: SerialPort> {
	pub(crate) port: S,
	pub(crate) program: Option<Program>,
	/// One-shot terminal status ("Sent: ..." / "Stopped: ...") that survives
	/// past the `Program` it describes, for exactly the next status query.
	pub(crate) sticky_status: Option<String>,
	pub(crate) next_write_deadline: Instant,
	upload_path: PathBuf,
}

impl<S: SerialPort> Daemon<S> {
	pub fn new(port: S, upload_path: PathBuf) -> Self {
		Self { port, program: None, sticky_status: None, next_write_deadline: Instant::now(), upload_path }
	}

	pub fn port_name(&self) -> &str {
		self.port.name()
	}

	/// Handle one already-parsed request and produce the response to send
	/// back. Exposed so tests can drive the daemon without a real socket.
	pub fn dispatch(&mut self, raw: &str) -> Response {
		match parse_request(raw) {
			Ok(Request::Start { file }) => self.handle_start(&file),
			Ok(Request::Stop) => self.handle_stop(),
			Ok(Request::Status) => self.handle_status(),
			Err(e) => Response::err(e.message()),
		}
	}

	/// Ensure the port is open, drop an in-flight program if the port was
	/// lost, and run a sender tick if its deadline has passed. Exposed so
	/// tests can step the pacing logic with synthetic instants.
	pub fn tick(&mut self, now: Instant) {
		if !self.port.is_open() {
			match self.port.open() {
				Ok(()) => log::info!("serial port {} open", self.port.name()),
				Err(e) => log::debug!("serial port {} unavailable: {}", self.port.name(), e),
			}
		}

		if !self.port.is_open() {
			if let Some(program) = self.program.take() {
				log::warn!("lost serial port mid-transfer of {}, aborting", program.name());
			}
			return;
		}

		if now >= self.next_write_deadline {
			self.sender_tick(now);
		}
	}

	/// How long the event loop should wait for control-socket activity
	/// before the next sender tick is due.
	pub fn wait_timeout(&self, now: Instant) -> Duration {
		if self.program.is_some() {
			self.next_write_deadline.saturating_duration_since(now).clamp(MIN_POLL, MAX_POLL)
		} else {
			MAX_POLL
		}
	}

	pub fn is_sending(&self) -> bool {
		self.program.is_some()
	}

	fn handle_start(&mut self, file: &str) -> Response {
		if let Some(program) = &self.program {
			return Response::err(format!("Already Busy Sending {}", program.name()));
		}
		if !self.port.is_open() {
			return Response::err("Can't send, serial port problem. Check cable.");
		}

		let path = self.upload_path.join(file);
		match Program::load(file.to_string(), &path) {
			Ok(program) => {
				self.sticky_status = None;
				let status = program.status();
				self.program = Some(program);
				Response::ok(status)
			},
			Err(_) => Response::err(format!("Cannot open '{}'", file)),
		}
	}

	fn handle_stop(&mut self) -> Response {
		match self.program.take() {
			Some(program) => {
				let status = format!("Stopped: {}", program.name());
				self.sticky_status = Some(status.clone());
				self.port.drain();
				Response::ok(status)
			},
			None => {
				self.sticky_status = None;
				Response::err("Already stopped")
			},
		}
	}

	fn handle_status(&self) -> Response {
		if !self.port.is_open() {
			return Response::ok(format!("Cannot open serial port: {}", self.port.name()));
		}
		if let Some(program) = &self.program {
			return Response::ok(program.status());
		}
		if let Some(sticky) = &self.sticky_status {
			return Response::ok(sticky.clone());
		}
		Response::ok("Idle")
	}

	/// Run the event loop until `shutdown` is set, then close the serial port
	/// and return. `shutdown` is checked once per iteration.
	pub fn run(&mut self, control: &mut ControlServer, shutdown: &AtomicBool) -> std::io::Result<()> {
		while !shutdown.load(Ordering::Relaxed) {
			self.tick(Instant::now());

			let timeout = self.wait_timeout(Instant::now());
			let ready = control.poll(timeout)?;
			for (token, request) in ready {
				let response = self.dispatch(&request);
				control.reply(token, &response)?;
			}
		}
		self.port.close();
		Ok(())
	}
}
