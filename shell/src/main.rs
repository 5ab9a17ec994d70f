use std::ffi::CStr;
use std::io;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use nix::unistd;
use tracing::debug;

use pipesh::builtin::Flow;
use pipesh::config::{self, Options};
use pipesh::error::ShellError;
use pipesh::sig;

fn user_name() -> String {
	match unistd::User::from_uid(unistd::getuid()) {
		Ok(Some(user)) => user.name,
		_ => "?".to_string(),
	}
}

fn local_time() -> String {
	let mut buf = [0 as libc::c_char; 16];
	unsafe {
		let now = libc::time(std::ptr::null_mut());
		let mut tm: libc::tm = std::mem::zeroed();
		if libc::localtime_r(&now, &mut tm).is_null() {
			return String::new();
		}
		let n = libc::strftime(buf.as_mut_ptr(), buf.len(), b"%H:%M:%S\0".as_ptr() as *const libc::c_char, &tm);
		if n == 0 {
			return String::new();
		}
		CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
	}
}

fn report(e: &ShellError) {
	if let ShellError::Syntax(ref detail) = *e {
		debug!(%detail, "rejected line");
	}
	let _ = writeln!(io::stderr(), "ERROR: {}", e);
}

fn main() -> ExitCode {
	let options = Options::parse();
	config::init_logging();
	if let Err(e) = sig::install_reaper() {
		let _ = writeln!(io::stderr(), "ERROR: sigaction: {}", e);
		return ExitCode::FAILURE;
	}

	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let mut stdin_locked = stdin.lock();
	let user = user_name();
	if options.show_context() {
		let _ = writeln!(stdout, "login by {}, at {}", user, local_time());
	}
	loop {
		if options.show_context() {
			let _ = write!(stdout, "{}$ ", user);
			let _ = stdout.flush();
		}
		let mut line: Vec<u8> = vec![];
		match stdin_locked.read_until(b'\n', &mut line) {
			Ok(0) => { break; },
			Ok(_) => {},
			Err(e) => {
				report(&ShellError::Io(e));
				break;
			},
		}
		match pipesh::run_line(&line) {
			Ok(Flow::Continue) => {},
			Ok(Flow::Exit) => { break; },
			Err(e) => report(&e),
		}
	}
	ExitCode::SUCCESS
}
