//! The sender engine: one tick of reading CTS, and, if the line is clear
//! and the kernel TX queue is empty, releasing the next chunk of the
//! current program.

use std::time::{Duration, Instant};

use crate::daemon::Daemon;
use crate::serial_port::SerialPort;

/// Largest slice of a normalized line handed to the OS in one write.
const CHUNK_MAX: usize = 50;
/// RS-232 line rate. 8N1 spends 10 bit-times per byte.
const BAUD: f64 = 9600.0;

impl<S: SerialPort> Daemon<S> {
	/// Called once per daemon core iteration once `next_write_deadline` has
	/// passed. Reading CTS first doubles as the port health check even when
	/// there is nothing to transmit yet.
	pub(crate) fn sender_tick(&mut self, now: Instant) {
		let cts = self.port.cts();

		let Some(program) = self.program.as_mut() else { return };

		if program.eof() {
			self.sticky_status = Some(program.status());
			self.program = None;
			return;
		}

		if !cts || self.port.out_waiting() != 0 {
			return;
		}

		let Some(chunk) = program.read_line(CHUNK_MAX) else { return };
		let bytes = chunk.into_bytes();
		if bytes.is_empty() {
			return;
		}

		if let Some(written) = self.port.write(&bytes) {
			if written > 0 {
				let seconds = (written - 1) as f64 / (BAUD / 10.0);
				self.next_write_deadline = now + Duration::from_secs_f64(seconds);
			}
		}
	}
}
