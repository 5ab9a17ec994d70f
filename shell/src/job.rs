use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::debug;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum State { Active, Stopped, Terminated }

pub trait WaitStatusExt {
	fn state(self) -> State;
	fn code(self) -> Option<i32>;
}

impl WaitStatusExt for WaitStatus {
	fn state(self) -> State {
		match self {
			WaitStatus::Exited(..) => State::Terminated,
			WaitStatus::Signaled(..) => State::Terminated,
			WaitStatus::Stopped(..) => State::Stopped,
			#[cfg(any(target_os = "linux", target_os = "android"))]
			WaitStatus::PtraceEvent(..) | WaitStatus::PtraceSyscall(..) => State::Stopped,
			WaitStatus::Continued(..) => State::Active,
			WaitStatus::StillAlive => State::Active,
		}
	}

	fn code(self) -> Option<i32> {
		match self {
			WaitStatus::Exited(_, code) => Some(code),
			WaitStatus::Signaled(_, sig, _) => Some(128 + sig as i32),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Option<Pid>,
	pub status: WaitStatus,
}

#[derive(Debug, Default)]
pub struct Job {
	pub processes: Vec<Process>,
	pub is_background: bool,
}

impl Job {
	pub fn new(size_hint: usize, is_background: bool) -> Job {
		Job { processes: Vec::with_capacity(size_hint), is_background: is_background }
	}

	pub fn push(&mut self, pid: Option<Pid>) {
		self.processes.push(Process { pid: pid, status: WaitStatus::StillAlive });
	}

	pub fn started(&self) -> usize {
		self.processes.iter().filter(|pr| pr.pid.is_some()).count()
	}

	// stop and continue reports do not end the wait
	pub fn wait(&mut self) {
		for pr in self.processes.iter_mut() {
			let pid = match pr.pid {
				Some(pid) => pid,
				None => { continue; },
			};
			while pr.status.state() != State::Terminated {
				match waitpid(pid, Some(WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED)) {
					Ok(status) => {
						debug!(pid = pid.as_raw(), ?status, "wait");
						pr.status = status;
					},
					Err(Errno::EINTR) => {},
					Err(e) => {
						debug!(pid = pid.as_raw(), error = %e, "wait gave up");
						break;
					},
				}
			}
		}
	}

	pub fn last_code(&self) -> Option<i32> {
		self.processes.iter().rev().filter_map(|pr| pr.status.code()).next()
	}
}
