//! [`SerialPort`] implementation backed by the `serialport` crate.

use std::time::Duration;

use serialport::SerialPort as _;

use crate::error::OpenFailed;

/// A real RS-232 device, opened and configured for the Matsuura MX3.
pub struct SystemSerialPort {
	name: String,
	inner: Option<Box<dyn serialport::SerialPort>>,
}

impl SystemSerialPort {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), inner: None }
	}

	/// Close the port and record why, for the caller's logging.
	fn fail(&mut self, reason: impl std::fmt::Display) {
		log::warn!("serial port {}: {}, closing", self.name, reason);
		self.inner = None;
	}
}

impl super::SerialPort for SystemSerialPort {
	fn open(&mut self) -> Result<(), OpenFailed> {
		if self.inner.is_some() {
			return Ok(());
		}

		let port = serialport::new(&self.name, 9600)
			.data_bits(serialport::DataBits::Eight)
			.parity(serialport::Parity::None)
			.stop_bits(serialport::StopBits::One)
			.flow_control(serialport::FlowControl::Hardware)
			.timeout(Duration::from_millis(0))
			.open();

		match port {
			Ok(port) => {
				self.inner = Some(port);
				Ok(())
			},
			Err(e) => {
				// serialport has no portable "device busy" ErrorKind; the OS
				// reports it as a plain I/O error whose message differs per
				// platform, so this is a best-effort substring match.
				let busy = e.to_string().to_ascii_lowercase().contains("busy")
					|| e.to_string().to_ascii_lowercase().contains("in use");
				Err(OpenFailed { reason: e.to_string(), busy })
			},
		}
	}

	fn is_open(&self) -> bool {
		self.inner.is_some()
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn cts(&mut self) -> bool {
		let Some(port) = self.inner.as_mut() else { return false };
		match port.read_clear_to_send() {
			Ok(level) => level,
			Err(e) => {
				self.fail(e);
				false
			},
		}
	}

	fn set_rts(&mut self, state: bool) {
		let Some(port) = self.inner.as_mut() else { return };
		if let Err(e) = port.write_request_to_send(state) {
			self.fail(e);
		}
	}

	fn read_all(&mut self) -> Vec<u8> {
		let Some(port) = self.inner.as_mut() else { return Vec::new() };
		let available = match port.bytes_to_read() {
			Ok(n) => n as usize,
			Err(e) => {
				self.fail(e);
				return Vec::new();
			},
		};
		if available == 0 {
			return Vec::new();
		}
		let mut buffer = vec![0u8; available];
		match std::io::Read::read(port.as_mut(), &mut buffer) {
			Ok(n) => {
				buffer.truncate(n);
				buffer
			},
			Err(e) => {
				self.fail(e);
				Vec::new()
			},
		}
	}

	fn write(&mut self, bytes: &[u8]) -> Option<usize> {
		let port = self.inner.as_mut()?;
		match std::io::Write::write(port.as_mut(), bytes) {
			Ok(n) => Some(n),
			Err(e) => {
				self.fail(e);
				None
			},
		}
	}

	fn out_waiting(&mut self) -> usize {
		let Some(port) = self.inner.as_mut() else { return 0 };
		match port.bytes_to_write() {
			Ok(n) => n as usize,
			Err(e) => {
				self.fail(e);
				0
			},
		}
	}

	fn drain(&mut self) {
		self.close();
		// Best effort: if this fails the next daemon tick retries the open.
		let _ = super::SerialPort::open(self);
	}

	fn close(&mut self) {
		self.inner = None;
	}
}
