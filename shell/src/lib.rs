pub mod builtin;
pub mod config;
pub mod context;
pub mod error;
pub mod eval;
pub mod job;
pub mod lexer;
pub mod parser;
pub mod sig;
pub mod types;

use tracing::debug;

use builtin::Flow;
use context::LineContext;
use error::ShellError;

pub fn run_line(line: &[u8]) -> Result<Flow, ShellError> {
	let mut ctx = LineContext::new();
	let tokens = lexer::tokenize(line, &mut ctx)?;
	if tokens.is_empty() {
		return Ok(Flow::Continue);
	}
	if let Some(kind) = ctx.validate_builtins()? {
		debug!(?kind, "builtin");
		return Ok(builtin::dispatch(kind, &tokens)?);
	}
	let pipeline = parser::parse(&tokens)?;
	eval::eval(&pipeline)?;
	Ok(Flow::Continue)
}
