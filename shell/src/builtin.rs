use std::env;
use std::path::PathBuf;

use nix::unistd;
use tracing::debug;

use crate::error::BuiltinError;
use crate::types::{BuiltinKind, Token, TokenKind};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow { Continue, Exit }

fn home_dir() -> Result<PathBuf, BuiltinError> {
	if let Some(home) = env::var_os("HOME") {
		return Ok(PathBuf::from(home));
	}
	match unistd::User::from_uid(unistd::getuid()) {
		Ok(Some(user)) => Ok(user.dir),
		_ => Err(BuiltinError::NoHome),
	}
}

pub fn builtin_cd(args: &[&str]) -> Result<Flow, BuiltinError> {
	let target = match args {
		[] => home_dir()?,
		[dir] => PathBuf::from(*dir),
		_ => { return Err(BuiltinError::Usage); },
	};
	debug!(target = %target.display(), "cd");
	unistd::chdir(target.as_path()).map_err(BuiltinError::Chdir)?;
	Ok(Flow::Continue)
}

pub fn builtin_exit(_: &[&str]) -> Result<Flow, BuiltinError> {
	Ok(Flow::Exit)
}

pub fn match_builtin(kind: BuiltinKind) -> fn(&[&str]) -> Result<Flow, BuiltinError> {
	match kind {
		BuiltinKind::Cd => builtin_cd,
		BuiltinKind::Exit => builtin_exit,
	}
}

pub fn dispatch(kind: BuiltinKind, tokens: &[Token]) -> Result<Flow, BuiltinError> {
	let args: Vec<&str> = tokens.iter()
		.filter(|t| t.kind != TokenKind::Builtin(kind))
		.map(|t| t.text.as_str())
		.collect();
	match_builtin(kind)(&args)
}
