pub mod mock;

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

/// A scratch upload directory with `name` written into it, for tests that
/// drive a [`mx3drip::Daemon`] through a `start` request.
pub fn upload_fixture(name: &str, contents: &str) -> (TempDir, PathBuf) {
	let dir = tempfile::tempdir().expect("create temp upload dir");
	let path = dir.path().join(name);
	let mut file = std::fs::File::create(&path).expect("create fixture file");
	file.write_all(contents.as_bytes()).expect("write fixture file");
	let upload_path = dir.path().to_path_buf();
	(dir, upload_path)
}
