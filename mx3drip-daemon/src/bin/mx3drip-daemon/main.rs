use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mx3drip::control::ControlServer;
use mx3drip::serial_port::system::SystemSerialPort;
use mx3drip::{Config, Daemon};

mod logging;

fn main() {
	logging::init();

	let Config { serial_port_name, tcp_port, upload_path } = match Config::load() {
		Ok(config) => config,
		Err(e) => {
			log::error!("{}", e);
			std::process::exit(1);
		},
	};

	let port = SystemSerialPort::new(serial_port_name);
	let mut daemon = Daemon::new(port, upload_path);

	let mut control = match ControlServer::bind(tcp_port) {
		Ok(control) => control,
		Err(e) => {
			log::error!("failed to bind control socket on port {}: {}", tcp_port, e);
			std::process::exit(1);
		},
	};

	let shutdown = Arc::new(AtomicBool::new(false));
	let handler_flag = shutdown.clone();
	if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
		log::warn!("failed to install SIGINT handler: {}", e);
	}

	log::info!("drip-feeding {} on TCP port {}", daemon.port_name(), tcp_port);

	if let Err(e) = daemon.run(&mut control, &shutdown) {
		log::error!("daemon core loop failed: {}", e);
		std::process::exit(1);
	}

	log::info!("shutting down");
}
