use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::io;

use nix::fcntl::OFlag;
use nix::unistd::{self, ForkResult};
use tracing::{debug, warn};

use crate::error::{ExecError, LaunchError};
use crate::job::Job;
use crate::sig::{self, SigchldBlock};
use crate::types::{Command, Pipeline};

// pipe i connects stage i to stage i+1
#[derive(Debug)]
pub struct PipeSet {
	pipes: Vec<(OwnedFd, OwnedFd)>,
}

impl PipeSet {
	pub fn new(stages: usize) -> Result<PipeSet, LaunchError> {
		let count = stages.saturating_sub(1);
		let mut pipes = Vec::with_capacity(count);
		for _ in 0 .. count {
			pipes.push(unistd::pipe2(OFlag::O_CLOEXEC).map_err(LaunchError::Pipe)?);
		}
		Ok(PipeSet { pipes: pipes })
	}

	pub fn len(&self) -> usize {
		self.pipes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pipes.is_empty()
	}

	fn read_end(&self, i: usize) -> RawFd {
		self.pipes[i].0.as_raw_fd()
	}

	fn write_end(&self, i: usize) -> RawFd {
		self.pipes[i].1.as_raw_fd()
	}

	pub fn close_all(&mut self) {
		self.pipes.clear();
	}
}

#[derive(Debug, Default)]
struct Redirections {
	input: Option<File>,
	output: Option<File>,
}

fn open_redirect(path: &str, options: &OpenOptions) -> Result<File, LaunchError> {
	options.open(path).map_err(|e| LaunchError::Redirect { path: path.to_string(), source: e })
}

impl Redirections {
	fn open(pipeline: &Pipeline) -> Result<Redirections, LaunchError> {
		let mut redirections = Redirections::default();
		if let Some(path) = pipeline.commands.first().and_then(|c| c.input_source.as_ref()) {
			redirections.input = Some(open_redirect(path, OpenOptions::new().read(true))?);
		}
		if let Some(path) = pipeline.commands.last().and_then(|c| c.output_destination.as_ref()) {
			let mut options = OpenOptions::new();
			options.write(true).create(true).truncate(true);
			redirections.output = Some(open_redirect(path, &options)?);
		}
		Ok(redirections)
	}
}

fn to_argv(command: &Command) -> Result<Vec<CString>, LaunchError> {
	let argv: Result<Vec<CString>, _> = command.argv.iter().map(|s| CString::new(s.as_bytes())).collect();
	Ok(argv?)
}

fn stage_fds(i: usize, stages: usize, pipes: &PipeSet, redirections: &Redirections) -> (Option<RawFd>, Option<RawFd>) {
	let stdin = if i == 0 {
		redirections.input.as_ref().map(|f| f.as_raw_fd())
	} else {
		Some(pipes.read_end(i - 1))
	};
	let stdout = if i + 1 == stages {
		redirections.output.as_ref().map(|f| f.as_raw_fd())
	} else {
		Some(pipes.write_end(i))
	};
	(stdin, stdout)
}

fn do_exec_stage(argv: &[CString], stdin: Option<RawFd>, stdout: Option<RawFd>,
                 pipes: &mut PipeSet, redirections: &mut Redirections) -> Result<(), ExecError> {
	if let Some(fd) = stdin {
		unistd::dup2(fd, libc::STDIN_FILENO).map_err(ExecError::Dup)?;
	}
	if let Some(fd) = stdout {
		unistd::dup2(fd, libc::STDOUT_FILENO).map_err(ExecError::Dup)?;
	}
	pipes.close_all();
	redirections.input.take();
	redirections.output.take();
	let name = &argv[0];
	match unistd::execvp(name, argv) {
		Ok(never) => match never {},
		Err(e) => Err(ExecError::Exec { name: name.to_string_lossy().into_owned(), source: e }),
	}
}

fn exec_stage(argv: &[CString], stdin: Option<RawFd>, stdout: Option<RawFd>, block: &SigchldBlock,
              pipes: &mut PipeSet, redirections: &mut Redirections) -> ! {
	let _ = sig::reset_in_child(block);
	let code = match do_exec_stage(argv, stdin, stdout, pipes, redirections) {
		Ok(()) => 0,
		Err(e) => {
			let _ = writeln!(io::stderr(), "ERROR: {}", e);
			e.exit_code()
		},
	};
	unsafe { libc::_exit(code) }
}

pub fn spawn_pipeline(pipeline: &Pipeline) -> Result<(Job, SigchldBlock), LaunchError> {
	let stages = pipeline.commands.len();
	let argvs = pipeline.commands.iter().map(to_argv).collect::<Result<Vec<_>, _>>()?;
	let block = SigchldBlock::new().map_err(LaunchError::SignalMask)?;
	// pipes first: a failed pipe2 must not leave the `>` target truncated
	let mut pipes = PipeSet::new(stages)?;
	let mut redirections = Redirections::open(pipeline)?;
	debug!(stages = stages, pipes = pipes.len(), "spawning pipeline");

	let mut job = Job::new(stages, pipeline.is_background);
	for (i, argv) in argvs.iter().enumerate() {
		let (stdin, stdout) = stage_fds(i, stages, &pipes, &redirections);
		match unsafe { unistd::fork() } {
			Ok(ForkResult::Parent { child }) => {
				debug!(stage = i, pid = child.as_raw(), "forked");
				job.push(Some(child));
			},
			Ok(ForkResult::Child) => {
				exec_stage(argv, stdin, stdout, &block, &mut pipes, &mut redirections);
			},
			Err(e) => {
				let _ = writeln!(io::stderr(), "ERROR: fork: {}", e);
				warn!(stage = i, error = %e, "fork failed");
				job.push(None);
			},
		}
	}
	pipes.close_all();
	Ok((job, block))
}

pub enum EvalResult {
	Done(Option<i32>),
	Running(Job),
}

pub fn eval(pipeline: &Pipeline) -> Result<EvalResult, LaunchError> {
	assert!(!pipeline.commands.is_empty());
	let (mut job, block) = spawn_pipeline(pipeline)?;
	if pipeline.is_background {
		drop(block);
		return Ok(EvalResult::Running(job));
	}
	job.wait();
	drop(block);
	Ok(EvalResult::Done(job.last_code()))
}
