use std::sync::{Arc, Mutex};

use mx3drip::error::OpenFailed;
use mx3drip::serial_port::SerialPort;

struct Shared {
	open: bool,
	cts: bool,
	out_waiting: usize,
	max_write_len: Option<usize>,
	fail_open: bool,
	fail_cts: bool,
	fail_write: bool,
	writes: Vec<Vec<u8>>,
}

impl Shared {
	fn new() -> Self {
		Self { open: true, cts: true, out_waiting: 0, max_write_len: None, fail_open: false, fail_cts: false, fail_write: false, writes: Vec::new() }
	}
}

/// A deterministic, scriptable stand-in for a real RS-232 line. The port
/// itself is handed to a `Daemon` by value; a cloned [`FakeSerialPortHandle`]
/// lets the test keep toggling CTS and injecting failures afterward,
/// mirroring how a real cable unplug happens mid-transfer.
pub struct FakeSerialPort {
	name: String,
	shared: Arc<Mutex<Shared>>,
}

impl FakeSerialPort {
	pub fn new(name: &str) -> Self {
		Self { name: name.to_string(), shared: Arc::new(Mutex::new(Shared::new())) }
	}

	pub fn handle(&self) -> FakeSerialPortHandle {
		FakeSerialPortHandle(self.shared.clone())
	}
}

#[derive(Clone)]
pub struct FakeSerialPortHandle(Arc<Mutex<Shared>>);

impl FakeSerialPortHandle {
	pub fn set_cts(&self, value: bool) {
		self.0.lock().unwrap().cts = value;
	}

	pub fn set_fail_cts(&self, value: bool) {
		self.0.lock().unwrap().fail_cts = value;
	}

	/// Simulate the device itself being gone, so a reopen attempt after a
	/// close also fails (an unplugged adapter, as opposed to a single
	/// transient I/O error on an otherwise-present device).
	pub fn set_fail_open(&self, value: bool) {
		self.0.lock().unwrap().fail_open = value;
	}

	pub fn set_fail_write(&self, value: bool) {
		self.0.lock().unwrap().fail_write = value;
	}

	pub fn set_max_write_len(&self, value: Option<usize>) {
		self.0.lock().unwrap().max_write_len = value;
	}

	pub fn all_written(&self) -> Vec<u8> {
		self.0.lock().unwrap().writes.concat()
	}

	pub fn write_count(&self) -> usize {
		self.0.lock().unwrap().writes.len()
	}

	pub fn is_open(&self) -> bool {
		self.0.lock().unwrap().open
	}
}

impl SerialPort for FakeSerialPort {
	fn open(&mut self) -> Result<(), OpenFailed> {
		let mut shared = self.shared.lock().unwrap();
		if shared.fail_open {
			return Err(OpenFailed { reason: "fake open failure".to_string(), busy: false });
		}
		shared.open = true;
		Ok(())
	}

	fn is_open(&self) -> bool {
		self.shared.lock().unwrap().open
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn cts(&mut self) -> bool {
		let mut shared = self.shared.lock().unwrap();
		if shared.fail_cts {
			shared.open = false;
			return false;
		}
		shared.cts
	}

	fn set_rts(&mut self, _state: bool) {}

	fn read_all(&mut self) -> Vec<u8> {
		Vec::new()
	}

	fn write(&mut self, bytes: &[u8]) -> Option<usize> {
		let mut shared = self.shared.lock().unwrap();
		if !shared.open {
			return None;
		}
		if shared.fail_write {
			shared.open = false;
			return None;
		}
		let n = shared.max_write_len.map_or(bytes.len(), |cap| cap.min(bytes.len()));
		let chunk = bytes[..n].to_vec();
		shared.writes.push(chunk);
		Some(n)
	}

	fn out_waiting(&mut self) -> usize {
		self.shared.lock().unwrap().out_waiting
	}

	fn drain(&mut self) {
		let mut shared = self.shared.lock().unwrap();
		shared.writes.clear();
		shared.out_waiting = 0;
	}

	fn close(&mut self) {
		self.shared.lock().unwrap().open = false;
	}
}
