use std::thread;
use std::time::{
	Duration,
	Instant,
};

/// Minimum hold time for each half of a clock cycle.
pub const CLOCK_EDGE: Duration = Duration::from_micros(1);

// below this we spin instead of asking the scheduler
const SPIN_LIMIT: Duration = Duration::from_micros(500);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Wait for (at least) `duration`.
///
/// Short waits spin on the monotonic clock; a sleeping thread would overshoot
/// a microsecond hold time by orders of magnitude.
pub fn busy_wait(duration: Duration) {
	if duration >= SPIN_LIMIT {
		reliable_sleep(duration);
		return;
	}
	let start = Instant::now();
	while start.elapsed() < duration {
		std::hint::spin_loop();
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Line {
	/// PGC
	Clock,
	/// PGD
	Data,
	/// nMCLR, active low
	Reset,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	Output,
}

pub trait Hardware {
	fn set_direction(&mut self, line: Line, direction: Direction);
	fn set_level(&mut self, line: Line, high: bool);
	fn read_level(&mut self, line: Line) -> bool;

	// delay for (at least) `duration`
	fn delay(&mut self, duration: Duration) {
		busy_wait(duration);
	}
}

impl<H: Hardware + ?Sized> Hardware for &mut H {
	fn set_direction(&mut self, line: Line, direction: Direction) {
		(**self).set_direction(line, direction)
	}

	fn set_level(&mut self, line: Line, high: bool) {
		(**self).set_level(line, high)
	}

	fn read_level(&mut self, line: Line) -> bool {
		(**self).read_level(line)
	}

	fn delay(&mut self, duration: Duration) {
		(**self).delay(duration)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn busy_wait_never_returns_early() {
		for &d in [Duration::from_micros(1), Duration::from_micros(50), Duration::from_millis(1)].iter() {
			let start = Instant::now();
			busy_wait(d);
			assert!(start.elapsed() >= d, "waited less than {:?}", d);
		}
	}
}
