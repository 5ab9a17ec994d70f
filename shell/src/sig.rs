use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

// runs in signal context: non-blocking waitpid only, errno restored
extern "C" fn reap_children(_: libc::c_int) {
	let saved = Errno::last_raw();
	loop {
		match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
			Ok(WaitStatus::StillAlive) | Err(_) => { break; },
			Ok(_) => {},
		}
	}
	Errno::set_raw(saved);
}

pub fn install_reaper() -> nix::Result<()> {
	let action = SigAction::new(
		SigHandler::Handler(reap_children),
		SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
		SigSet::empty(),
	);
	unsafe { signal::sigaction(Signal::SIGCHLD, &action) }?;
	Ok(())
}

// SIGCHLD stays blocked while alive, so the reaper cannot take a child we wait on
#[derive(Debug)]
pub struct SigchldBlock {
	previous: SigSet,
}

impl SigchldBlock {
	pub fn new() -> nix::Result<SigchldBlock> {
		let mut set = SigSet::empty();
		set.add(Signal::SIGCHLD);
		let mut previous = SigSet::empty();
		signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut previous))?;
		Ok(SigchldBlock { previous: previous })
	}

	pub fn restore(&self) -> nix::Result<()> {
		signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None)
	}
}

pub fn reset_in_child(block: &SigchldBlock) -> nix::Result<()> {
	block.restore()?;
	unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) }?;
	Ok(())
}

impl Drop for SigchldBlock {
	fn drop(&mut self) {
		let _ = self.restore();
	}
}
