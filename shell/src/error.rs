use std::{ffi, io};

use nix::errno::Errno;
use thiserror::Error;

use crate::types::Operator;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SyntaxError {
	#[error("unterminated quote at byte {0}")]
	UnterminatedQuote(usize),
	#[error("missing command before '{0}'")]
	MissingCommand(Operator),
	#[error("'{0}' at end of line")]
	DanglingOperator(Operator),
	#[error("'{0}' followed by '{1}'")]
	OperatorAfterOperator(Operator, Operator),
	#[error("'&' must be the last token")]
	MisplacedBackground,
	#[error("input redirection outside the first command")]
	MisplacedInput,
	#[error("output redirection before a pipe")]
	MisplacedOutput,
	#[error("unexpected token '{0}'")]
	UnexpectedToken(String),
	#[error("more than one builtin on a line")]
	TooManyBuiltins,
	#[error("builtin inside a pipeline")]
	BuiltinInPipeline,
	#[error("builtin must start the line")]
	BuiltinNotAtStart,
}

#[derive(Debug, Error)]
pub enum BuiltinError {
	#[error("usage: cd <dir>")]
	Usage,
	#[error("cd: no home directory")]
	NoHome,
	#[error("cd: {0}")]
	Chdir(nix::Error),
}

#[derive(Debug, Error)]
pub enum LaunchError {
	#[error("{path}: {source}")]
	Redirect { path: String, source: io::Error },
	#[error("pipe: {0}")]
	Pipe(nix::Error),
	#[error("signal mask: {0}")]
	SignalMask(nix::Error),
	#[error("nul byte in argument: {0}")]
	Nul(#[from] ffi::NulError),
}

#[derive(Debug, Error)]
pub enum ExecError {
	#[error("dup2: {0}")]
	Dup(nix::Error),
	#[error("exec: {name}: {source}")]
	Exec { name: String, source: nix::Error },
}

impl ExecError {
	pub fn exit_code(&self) -> i32 {
		match *self {
			ExecError::Exec { source: Errno::ENOENT, .. } => 127,
			_ => 126,
		}
	}
}

#[derive(Debug, Error)]
pub enum ShellError {
	#[error("invalid input")]
	Syntax(#[from] SyntaxError),
	#[error(transparent)]
	Builtin(#[from] BuiltinError),
	#[error(transparent)]
	Launch(#[from] LaunchError),
	#[error("IO error: {0}")]
	Io(#[from] io::Error),
}

pub type ParseResult<T> = Result<T, SyntaxError>;
