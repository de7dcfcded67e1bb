//! Loads and normalizes a G-code file into the line sequence the sender
//! engine drip-feeds to the Matsuura.

use std::fs;
use std::io;
use std::path::Path;

use crate::crc::Crc32;

/// One fully loaded, normalized G-code transmission.
pub struct Program {
	name: String,
	/// `emitted[0]` is always the leader-skip pad (`"\r\n"`); the remaining
	/// entries are the normalized content lines followed by the lone `"%"`
	/// sentinel. This is the exact order bytes are released to the sender.
	emitted: Vec<String>,
	/// Index into `emitted` of the next whole line to dequeue.
	next_line: usize,
	/// Unsent suffix of the most recently dequeued line, after a size-capped read.
	residue: String,
	crc: Crc32,
}

impl Program {
	/// Read `path` once and normalize it per the G-code drip-feed rules.
	/// `name` is the base name reported in status strings.
	pub fn load(name: impl Into<String>, path: &Path) -> io::Result<Self> {
		let raw = fs::read_to_string(path)?;
		Ok(Self::from_str(name, &raw))
	}

	fn from_str(name: impl Into<String>, raw: &str) -> Self {
		let mut accepted: Vec<String> = Vec::new();
		let mut consumed_leading_percent = false;

		for raw_line in raw.lines() {
			let mut line = raw_line.trim_end().to_ascii_uppercase();

			if accepted.is_empty() {
				if line.is_empty() {
					continue; // skip all blank lines at the top of the file
				}
				if !consumed_leading_percent && line.starts_with('%') {
					// A leading '%' is a start-of-code marker, not data; drop
					// the one line and keep scanning for real content.
					consumed_leading_percent = true;
					continue;
				}
			}

			if line.is_empty() {
				continue; // blank lines after the leading region are discarded too
			}

			if line.starts_with('%') {
				break; // end-of-code marker: stop reading, ignore the rest of the file
			}

			while line.len() < 3 {
				line.push(' ');
			}
			line.push_str("\r\n");
			accepted.push(line);
		}

		accepted.push("%".to_string());

		let mut emitted = Vec::with_capacity(accepted.len() + 1);
		emitted.push("\r\n".to_string());
		emitted.extend(accepted);

		Self {
			name: name.into(),
			emitted,
			next_line: 0,
			residue: String::new(),
			crc: Crc32::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Number of content lines, excluding the synthetic leading pad.
	pub fn total_lines(&self) -> usize {
		self.emitted.len() - 1
	}

	/// Number of whole content lines fully released to the sender so far.
	pub fn lines_sent(&self) -> usize {
		self.next_line.saturating_sub(1)
	}

	pub fn percent_sent(&self) -> u32 {
		(self.lines_sent() as u64 * 100 / self.total_lines() as u64) as u32
	}

	pub fn eof(&self) -> bool {
		self.next_line >= self.emitted.len() && self.residue.is_empty()
	}

	/// CRC-32 over every byte released to the sender so far.
	pub fn crc32(&self) -> u32 {
		self.crc.clone().finalize()
	}

	/// Dequeue up to `max_size` bytes (0 = unlimited) of the next unsent
	/// data, updating the running CRC over exactly what is returned.
	pub fn read_line(&mut self, max_size: usize) -> Option<String> {
		if self.eof() {
			return None;
		}

		let source = if !self.residue.is_empty() {
			std::mem::take(&mut self.residue)
		} else {
			let line = self.emitted[self.next_line].clone();
			self.next_line += 1;
			line
		};

		let result = if max_size > 0 && source.len() > max_size {
			let (head, tail) = source.split_at(max_size);
			self.residue = tail.to_string();
			head.to_string()
		} else {
			self.residue.clear();
			source
		};

		self.crc.update(result.as_bytes());
		Some(result)
	}

	/// `"Sending <name>, Line <sent>/<total> <pct>%"` while in flight, or
	/// `"Sent: <name>, <total> lines, 100%, crc: <8-hex>"` once the last
	/// line has been released. The UI polls this, matching case-insensitively
	/// on "Sending" to know when to poll faster.
	pub fn status(&self) -> String {
		if self.eof() {
			format!("Sent: {}, {} lines, 100%, crc: {:08X}", self.name, self.total_lines(), self.crc32())
		} else {
			format!("Sending {}, Line {}/{} {}%", self.name, self.lines_sent(), self.total_lines(), self.percent_sent())
		}
	}
}
