use crate::context::LineContext;
use crate::error::{ParseResult, SyntaxError};
use crate::types::*;

struct Lexer<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Lexer<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n' | b'\r')
	}

	fn is_letter(c: u8) -> bool {
		Operator::from_byte(c).is_none() && c != b'"' && !Lexer::is_whitespace(c)
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Lexer::is_whitespace);
	}

	fn read_word(&mut self) -> &'a [u8] {
		let orig = self.i;
		self.proceed_while(Lexer::is_letter);
		&self.line[orig .. self.i]
	}

	fn read_quoted(&mut self) -> ParseResult<&'a [u8]> {
		let open = self.i;
		self.i += 1;
		let orig = self.i;
		self.proceed_while(|c| c != b'"');
		if self.i >= self.line.len() {
			return Err(SyntaxError::UnterminatedQuote(open));
		}
		let content = &self.line[orig .. self.i];
		self.i += 1;
		Ok(content)
	}

	fn next_token(&mut self, ctx: &mut LineContext) -> ParseResult<Option<Token>> {
		loop {
			self.skip_whitespaces();
			let pos = self.i;
			let c = match self.line.get(self.i) {
				Some(&c) => c,
				None => { return Ok(None); },
			};
			if let Some(op) = Operator::from_byte(c) {
				self.i += 1;
				if op == Operator::Pipe {
					ctx.note_pipe();
				}
				let text = op.as_str().to_string();
				return Ok(Some(Token { text: text, pos: pos, kind: TokenKind::Operator(op) }));
			}
			if c == b'"' {
				let content = self.read_quoted()?;
				// "" produces no token
				if content.is_empty() {
					continue;
				}
				let text = String::from_utf8_lossy(content).into_owned();
				return Ok(Some(Token { text: text, pos: pos, kind: TokenKind::Word }));
			}
			let word = self.read_word();
			let kind = match BuiltinKind::from_word(word) {
				Some(builtin) => {
					ctx.note_builtin(builtin);
					TokenKind::Builtin(builtin)
				},
				None => TokenKind::Word,
			};
			let text = String::from_utf8_lossy(word).into_owned();
			return Ok(Some(Token { text: text, pos: pos, kind: kind }));
		}
	}
}

pub fn tokenize(line: &[u8], ctx: &mut LineContext) -> ParseResult<Vec<Token>> {
	let mut lexer = Lexer { line: line, i: 0 };
	let mut tokens = vec![];
	while let Some(token) = lexer.next_token(ctx)? {
		tokens.push(token);
	}
	Ok(tokens)
}
