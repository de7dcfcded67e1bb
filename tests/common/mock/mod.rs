mod fake_serial_port;

pub use fake_serial_port::{FakeSerialPort, FakeSerialPortHandle};
