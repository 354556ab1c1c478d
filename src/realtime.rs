//! Keep the scheduler out of timing sensitive windows.
//!
//! The entry signature, unlock and program sequences must not be stretched
//! arbitrarily; on a preemptive host the best we can do is run with a realtime
//! policy and without page faults.

use std::io;
use std::mem;

use libc::{
	MCL_CURRENT,
	MCL_FUTURE,
	SCHED_FIFO,
	c_int,
	mlockall,
	munlockall,
	sched_get_priority_max,
	sched_getparam,
	sched_getscheduler,
	sched_param,
	sched_setscheduler,
};

pub struct RealtimeGuard {
	policy: c_int,
	param: sched_param,
}

impl RealtimeGuard {
	/// Lock all memory and switch the process to `SCHED_FIFO` with maximum
	/// priority. Needs CAP_SYS_NICE and CAP_IPC_LOCK (or root).
	pub fn acquire() -> io::Result<Self> {
		let policy = unsafe { sched_getscheduler(0) };
		if -1 == policy {
			return Err(io::Error::last_os_error());
		}
		let mut param: sched_param = unsafe { mem::zeroed() };
		if 0 != unsafe { sched_getparam(0, &mut param) } {
			return Err(io::Error::last_os_error());
		}

		if 0 != unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) } {
			return Err(io::Error::last_os_error());
		}

		let mut fifo: sched_param = unsafe { mem::zeroed() };
		fifo.sched_priority = unsafe { sched_get_priority_max(SCHED_FIFO) };
		if 0 != unsafe { sched_setscheduler(0, SCHED_FIFO, &fifo) } {
			let e = io::Error::last_os_error();
			unsafe { munlockall() };
			return Err(e);
		}

		debug!("Running with SCHED_FIFO priority {}", fifo.sched_priority);
		Ok(RealtimeGuard {
			policy,
			param,
		})
	}
}

impl Drop for RealtimeGuard {
	fn drop(&mut self) {
		unsafe {
			if 0 != sched_setscheduler(0, self.policy, &self.param) {
				warn!("Couldn't restore scheduling policy: {}", io::Error::last_os_error());
			}
			munlockall();
		}
	}
}
