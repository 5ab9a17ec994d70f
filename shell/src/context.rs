use crate::error::{ParseResult, SyntaxError};
use crate::types::BuiltinKind;

const NUM_BUILTINS: usize = 2;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LineContext {
	pub num_stages: usize,
	builtin_stages: [Option<usize>; NUM_BUILTINS],
	num_builtins: usize,
}

impl Default for LineContext {
	fn default() -> LineContext {
		LineContext::new()
	}
}

impl LineContext {
	pub fn new() -> LineContext {
		LineContext { num_stages: 1, builtin_stages: [None; NUM_BUILTINS], num_builtins: 0 }
	}

	pub fn note_pipe(&mut self) {
		self.num_stages += 1;
	}

	pub fn note_builtin(&mut self, kind: BuiltinKind) {
		self.builtin_stages[kind.index()] = Some(self.num_stages - 1);
		self.num_builtins += 1;
	}

	pub fn num_builtins(&self) -> usize {
		self.num_builtins
	}

	pub fn builtin_stage(&self, kind: BuiltinKind) -> Option<usize> {
		self.builtin_stages[kind.index()]
	}

	// a builtin at stage 1 is already rejected by the pipeline check
	pub fn validate_builtins(&self) -> ParseResult<Option<BuiltinKind>> {
		if self.num_builtins > 1 {
			return Err(SyntaxError::TooManyBuiltins);
		}
		if self.num_builtins == 1 && self.num_stages > 1 {
			return Err(SyntaxError::BuiltinInPipeline);
		}
		let mut found = None;
		for &kind in &[BuiltinKind::Exit, BuiltinKind::Cd] {
			if let Some(stage) = self.builtin_stage(kind) {
				if stage > 1 {
					return Err(SyntaxError::BuiltinNotAtStart);
				}
				found = Some(kind);
			}
		}
		Ok(found)
	}
}
