use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator { Pipe, Input, Output, Background }

impl Operator {
	pub fn from_byte(c: u8) -> Option<Operator> {
		match c {
			b'|' => Some(Operator::Pipe),
			b'<' => Some(Operator::Input),
			b'>' => Some(Operator::Output),
			b'&' => Some(Operator::Background),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Operator::Pipe => "|",
			Operator::Input => "<",
			Operator::Output => ">",
			Operator::Background => "&",
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BuiltinKind { Exit, Cd }

impl BuiltinKind {
	pub fn from_word(word: &[u8]) -> Option<BuiltinKind> {
		match word {
			b"exit" => Some(BuiltinKind::Exit),
			b"cd" => Some(BuiltinKind::Cd),
			_ => None,
		}
	}

	pub fn index(self) -> usize {
		match self {
			BuiltinKind::Exit => 0,
			BuiltinKind::Cd => 1,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
	Word,
	Operator(Operator),
	Builtin(BuiltinKind),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
	pub text: String,
	pub pos: usize,
	pub kind: TokenKind,
}

impl Token {
	pub fn operator(&self) -> Option<Operator> {
		match self.kind {
			TokenKind::Operator(op) => Some(op),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Command {
	pub argv: Vec<String>,
	pub input_source: Option<String>,
	pub output_destination: Option<String>,
	pub background: bool,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pipeline {
	pub commands: Vec<Command>,
	pub is_background: bool,
}

impl Pipeline {
	pub fn single(command: Command) -> Pipeline {
		let is_background = command.background;
		Pipeline { commands: vec![command], is_background: is_background }
	}
}
