//! Non-blocking TCP control listener built on `mio`.
//!
//! One [`mio::Poll`] instance multiplexes the listening socket and every
//! accepted connection; [`ControlServer::poll`] is meant to be called once
//! per daemon core iteration with the remaining time until the sender
//! engine's next write deadline.

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use socket2::{Domain, Protocol, Socket, Type};

use super::protocol::Response;

const LISTENER: Token = Token(0);

struct Connection {
	stream: mio::net::TcpStream,
}

pub struct ControlServer {
	poll: Poll,
	events: Events,
	listener: TcpListener,
	connections: HashMap<Token, Connection>,
	next_token: usize,
}

impl ControlServer {
	/// Bind `0.0.0.0:port` with `SO_REUSEADDR` and a backlog of one, matching
	/// the original single-client-at-a-time control socket.
	pub fn bind(port: u16) -> io::Result<Self> {
		let addr: SocketAddr = ([0, 0, 0, 0], port).into();

		let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
		socket.set_reuse_address(true)?;
		socket.bind(&addr.into())?;
		socket.listen(1)?;
		socket.set_nonblocking(true)?;

		let mut listener = TcpListener::from_std(socket.into());
		let poll = Poll::new()?;
		poll.registry().register(&mut listener, LISTENER, Interest::READABLE)?;

		Ok(Self { poll, events: Events::with_capacity(128), listener, connections: HashMap::new(), next_token: 1 })
	}

	/// The address actually bound, useful when `bind` was given port 0.
	pub fn local_addr(&self) -> io::Result<SocketAddr> {
		self.listener.local_addr()
	}

	/// Wait up to `timeout` for activity, accept any pending connections,
	/// and return one decoded request line per connection that had one ready.
	pub fn poll(&mut self, timeout: Duration) -> io::Result<Vec<(Token, String)>> {
		match self.poll.poll(&mut self.events, Some(timeout)) {
			Ok(()) => {},
			Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Vec::new()),
			Err(e) => return Err(e),
		}

		let ready: Vec<Token> = self.events.iter().map(|event| event.token()).collect();
		let mut requests = Vec::new();
		for token in ready {
			if token == LISTENER {
				self.accept_all()?;
				continue;
			}
			if let Some(line) = self.read_request(token) {
				requests.push((token, line));
			}
		}
		Ok(requests)
	}

	pub fn reply(&mut self, token: Token, response: &Response) -> io::Result<()> {
		let Some(conn) = self.connections.get_mut(&token) else { return Ok(()) };
		let result = conn.stream.write_all(response.to_json().as_bytes());
		if result.is_err() {
			self.close(token);
			return Ok(());
		}
		result
	}

	fn accept_all(&mut self) -> io::Result<()> {
		loop {
			match self.listener.accept() {
				Ok((mut stream, _addr)) => {
					let token = Token(self.next_token);
					self.next_token += 1;
					self.poll.registry().register(&mut stream, token, Interest::READABLE)?;
					self.connections.insert(token, Connection { stream });
				},
				Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
				Err(e) => return Err(e),
			}
		}
	}

	/// On a closed connection or bytes that don't decode as UTF-8 (the
	/// protocol has no binary mode), the connection is dropped with no
	/// reply, matching the original's recv loop.
	fn read_request(&mut self, token: Token) -> Option<String> {
		let conn = self.connections.get_mut(&token)?;
		let mut buffer = [0u8; 4096];
		match conn.stream.read(&mut buffer) {
			Ok(0) => {
				self.close(token);
				None
			},
			Ok(n) => match std::str::from_utf8(&buffer[..n]) {
				Ok(text) => Some(text.trim_end().to_string()),
				Err(_) => {
					self.close(token);
					None
				},
			},
			Err(e) if e.kind() == io::ErrorKind::WouldBlock => None,
			Err(_) => {
				self.close(token);
				None
			},
		}
	}

	fn close(&mut self, token: Token) {
		if let Some(mut conn) = self.connections.remove(&token) {
			let _ = self.poll.registry().deregister(&mut conn.stream);
		}
	}
}
