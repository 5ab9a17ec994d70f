use tracing::debug;

use crate::error::{ParseResult, SyntaxError};
use crate::types::*;

fn argv_of(tokens: &[Token]) -> Vec<String> {
	tokens.iter().map(|t| t.text.clone()).collect()
}

fn operand_of(tokens: &[Token], idx: usize) -> ParseResult<&Token> {
	let op = tokens[idx].operator().unwrap_or(Operator::Pipe);
	match tokens.get(idx + 1) {
		None => Err(SyntaxError::DanglingOperator(op)),
		Some(next) => match next.operator() {
			Some(next_op) => Err(SyntaxError::OperatorAfterOperator(op, next_op)),
			None => Ok(next),
		},
	}
}

pub fn parse_single_command(tokens: &[Token]) -> ParseResult<Command> {
	let mut command = Command::default();
	let mut argv: Option<Vec<String>> = None;
	let mut idx = 0;
	while idx < tokens.len() {
		let op = match tokens[idx].operator() {
			Some(op) => op,
			None => { idx += 1; continue; },
		};
		if argv.is_none() {
			argv = Some(argv_of(&tokens[.. idx]));
		}
		match op {
			Operator::Input => {
				command.input_source = Some(operand_of(tokens, idx)?.text.clone());
				idx += 1;
			},
			Operator::Output => {
				command.output_destination = Some(operand_of(tokens, idx)?.text.clone());
				idx += 1;
			},
			Operator::Background => {
				if idx + 1 != tokens.len() {
					return Err(SyntaxError::MisplacedBackground);
				}
				command.background = true;
			},
			Operator::Pipe => { return Err(SyntaxError::UnexpectedToken(tokens[idx].text.clone())); },
		}
		idx += 1;
	}
	command.argv = argv.unwrap_or_else(|| argv_of(tokens));
	if command.argv.is_empty() {
		let op = tokens.first().and_then(|t| t.operator()).unwrap_or(Operator::Background);
		return Err(SyntaxError::MissingCommand(op));
	}
	Ok(command)
}

pub fn parse_pipeline(tokens: &[Token]) -> ParseResult<Pipeline> {
	let mut commands: Vec<Command> = vec![];
	let mut is_background = false;

	// The first stage ends at `|`, `<` or `&`; it may never redirect output.
	let mut idx = 0;
	let terminator = loop {
		match tokens.get(idx).map(|t| t.operator()) {
			None => { return Err(SyntaxError::UnexpectedToken(String::new())); },
			Some(None) => { idx += 1; },
			Some(Some(Operator::Output)) => { return Err(SyntaxError::MisplacedOutput); },
			Some(Some(op)) => { break op; },
		}
	};
	if idx == 0 {
		return Err(SyntaxError::MissingCommand(terminator));
	}
	let mut first = Command { argv: argv_of(&tokens[.. idx]), ..Command::default() };
	match terminator {
		Operator::Input => {
			first.input_source = Some(operand_of(tokens, idx)?.text.clone());
			idx += 2;
			match tokens.get(idx).map(|t| t.operator()) {
				Some(Some(Operator::Pipe)) => {},
				Some(Some(Operator::Input)) => { return Err(SyntaxError::MisplacedInput); },
				Some(Some(Operator::Output)) => { return Err(SyntaxError::MisplacedOutput); },
				Some(Some(Operator::Background)) => { return Err(SyntaxError::MisplacedBackground); },
				Some(None) => { return Err(SyntaxError::UnexpectedToken(tokens[idx].text.clone())); },
				None => { return Err(SyntaxError::DanglingOperator(Operator::Input)); },
			}
		},
		Operator::Background => { return Err(SyntaxError::MisplacedBackground); },
		_ => {},
	}
	operand_of(tokens, idx)?;
	commands.push(first);
	idx += 1;

	let mut start: Option<usize> = None;
	let mut closed = false;
	while idx < tokens.len() {
		let token = &tokens[idx];
		let op = match token.operator() {
			Some(op) => op,
			None => {
				if closed {
					return Err(SyntaxError::UnexpectedToken(token.text.clone()));
				}
				if start.is_none() {
					start = Some(idx);
				}
				idx += 1;
				continue;
			},
		};
		match op {
			Operator::Pipe => {
				let s = start.ok_or(SyntaxError::MissingCommand(op))?;
				operand_of(tokens, idx)?;
				commands.push(Command { argv: argv_of(&tokens[s .. idx]), ..Command::default() });
				start = None;
			},
			Operator::Input => { return Err(SyntaxError::MisplacedInput); },
			Operator::Output => {
				let s = start.ok_or(SyntaxError::MissingCommand(op))?;
				let target = operand_of(tokens, idx)?;
				if tokens[idx + 1 ..].iter().any(|t| t.operator() == Some(Operator::Pipe)) {
					return Err(SyntaxError::MisplacedOutput);
				}
				commands.push(Command {
					argv: argv_of(&tokens[s .. idx]),
					output_destination: Some(target.text.clone()),
					..Command::default()
				});
				start = None;
				closed = true;
				idx += 1;
			},
			Operator::Background => {
				if idx + 1 != tokens.len() {
					return Err(SyntaxError::MisplacedBackground);
				}
				if let Some(s) = start.take() {
					commands.push(Command { argv: argv_of(&tokens[s .. idx]), ..Command::default() });
				}
				is_background = true;
			},
		}
		idx += 1;
	}
	if let Some(s) = start {
		commands.push(Command { argv: argv_of(&tokens[s ..]), ..Command::default() });
	}
	if is_background {
		for command in &mut commands {
			command.background = true;
		}
	}
	debug!(stages = commands.len(), background = is_background, "parsed pipeline");
	Ok(Pipeline { commands: commands, is_background: is_background })
}

pub fn parse(tokens: &[Token]) -> ParseResult<Pipeline> {
	if tokens.iter().any(|t| t.operator() == Some(Operator::Pipe)) {
		parse_pipeline(tokens)
	} else {
		parse_single_command(tokens).map(Pipeline::single)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::LineContext;
	use crate::lexer::tokenize;

	fn tokens(line: &str) -> Vec<Token> {
		let mut ctx = LineContext::new();
		tokenize(line.as_bytes(), &mut ctx).unwrap()
	}

	fn argv(words: &[&str]) -> Vec<String> {
		words.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn plain_command_keeps_every_token() {
		let command = parse_single_command(&tokens("ls -l /tmp")).unwrap();
		assert_eq!(command, Command { argv: argv(&["ls", "-l", "/tmp"]), ..Command::default() });
	}

	#[test]
	fn single_command_redirections() {
		let command = parse_single_command(&tokens("sort -r < in.txt > out.txt")).unwrap();
		assert_eq!(command.argv, argv(&["sort", "-r"]));
		assert_eq!(command.input_source.as_deref(), Some("in.txt"));
		assert_eq!(command.output_destination.as_deref(), Some("out.txt"));
		assert!(!command.background);
	}

	#[test]
	fn background_single_command() {
		let pipeline = parse(&tokens("sleep 5 &")).unwrap();
		assert!(pipeline.is_background);
		assert_eq!(pipeline.commands.len(), 1);
		assert_eq!(pipeline.commands[0].argv, argv(&["sleep", "5"]));
	}

	#[test]
	fn single_command_syntax_errors() {
		assert_eq!(parse_single_command(&tokens("cat <")), Err(SyntaxError::DanglingOperator(Operator::Input)));
		assert_eq!(parse_single_command(&tokens("cat > < x")),
			Err(SyntaxError::OperatorAfterOperator(Operator::Output, Operator::Input)));
		assert_eq!(parse_single_command(&tokens("sleep & 5")), Err(SyntaxError::MisplacedBackground));
		assert_eq!(parse_single_command(&tokens("> out")), Err(SyntaxError::MissingCommand(Operator::Output)));
	}

	#[test]
	fn pipeline_with_output_on_last_stage() {
		let pipeline = parse(&tokens("ls -l | grep foo > out.txt")).unwrap();
		assert!(!pipeline.is_background);
		assert_eq!(pipeline.commands, vec![
			Command { argv: argv(&["ls", "-l"]), ..Command::default() },
			Command { argv: argv(&["grep", "foo"]), output_destination: Some("out.txt".to_string()), ..Command::default() },
		]);
	}

	#[test]
	fn pipeline_with_input_on_first_stage() {
		let pipeline = parse(&tokens("cat < in.txt | wc -l")).unwrap();
		assert_eq!(pipeline.commands, vec![
			Command { argv: argv(&["cat"]), input_source: Some("in.txt".to_string()), ..Command::default() },
			Command { argv: argv(&["wc", "-l"]), ..Command::default() },
		]);
	}

	#[test]
	fn three_stage_background_pipeline() {
		let pipeline = parse(&tokens("a 1 | b 2 | c 3 &")).unwrap();
		assert!(pipeline.is_background);
		let argvs: Vec<_> = pipeline.commands.iter().map(|c| c.argv.clone()).collect();
		assert_eq!(argvs, vec![argv(&["a", "1"]), argv(&["b", "2"]), argv(&["c", "3"])]);
		assert!(pipeline.commands.iter().all(|c| c.background));
	}

	#[test]
	fn output_before_pipe_is_rejected() {
		assert_eq!(parse(&tokens("cmd1 | cmd2 > out | cmd3")), Err(SyntaxError::MisplacedOutput));
		assert_eq!(parse(&tokens("cmd1 > out | cmd2")), Err(SyntaxError::MisplacedOutput));
	}

	#[test]
	fn input_outside_first_stage_is_rejected() {
		assert_eq!(parse(&tokens("cmd1 | cmd2 < in")), Err(SyntaxError::MisplacedInput));
		assert_eq!(parse(&tokens("cmd1 < in < in2 | cmd2")), Err(SyntaxError::MisplacedInput));
	}

	#[test]
	fn malformed_pipes_are_rejected() {
		assert_eq!(parse(&tokens("| wc")), Err(SyntaxError::MissingCommand(Operator::Pipe)));
		assert_eq!(parse(&tokens("ls |")), Err(SyntaxError::DanglingOperator(Operator::Pipe)));
		assert_eq!(parse(&tokens("ls | | wc")),
			Err(SyntaxError::OperatorAfterOperator(Operator::Pipe, Operator::Pipe)));
		assert_eq!(parse(&tokens("ls | wc | &")),
			Err(SyntaxError::OperatorAfterOperator(Operator::Pipe, Operator::Background)));
		assert_eq!(parse(&tokens("ls & | wc")), Err(SyntaxError::MisplacedBackground));
		assert_eq!(parse(&tokens("ls | wc & x")), Err(SyntaxError::MisplacedBackground));
	}

	#[test]
	fn nothing_but_background_may_follow_output_file() {
		assert_eq!(parse(&tokens("ls | wc > out extra")), Err(SyntaxError::UnexpectedToken("extra".to_string())));
		let pipeline = parse(&tokens("ls | wc > out &")).unwrap();
		assert!(pipeline.is_background);
		assert_eq!(pipeline.commands[1].output_destination.as_deref(), Some("out"));
	}

	#[test]
	fn first_stage_input_must_be_followed_by_pipe() {
		assert_eq!(parse(&tokens("cat < in junk | wc")), Err(SyntaxError::UnexpectedToken("junk".to_string())));
	}

	#[test]
	fn reparsing_yields_independent_pipelines() {
		let line = "ls -l | grep foo > out.txt";
		let first = parse(&tokens(line)).unwrap();
		let second = parse(&tokens(line)).unwrap();
		assert_eq!(first, second);
	}
}
