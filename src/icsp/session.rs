use std::time::Duration;

use super::{
	CLOCK_EDGE,
	Direction,
	Line,
	LowLevel,
};

/// "MCHQ", sent MSB first while reset is held
pub const ENTRY_KEY: u32 = 0x4d43_4851;

// P6: reset hold before entry
const RESET_HOLD: Duration = Duration::from_millis(1);
// must stay below P21 (500us) or the target does a full reset
const SHORT_RELEASE: Duration = Duration::from_micros(250);
// P18: reset held before the key
const KEY_SETUP: Duration = Duration::from_millis(1);
// P7 (50ms) + 5 * P1 (500us)
const EXECUTIVE_STARTUP: Duration = Duration::from_millis(55);
const FLUSH_CLOCKS: usize = 5;
const EXIT_HOLD: Duration = Duration::from_millis(1);

/// Entry and exit of low voltage programming mode. These only move the
/// lines; keeping track of the session is up to the caller.
pub trait Handshake: LowLevel {
	/// Take over the lines with the target running.
	fn claim_lines(&mut self) {
		self.set_direction(Line::Data, Direction::Input);
		self.set_level(Line::Clock, false);
		self.set_direction(Line::Clock, Direction::Output);
		self.set_reset(false);
	}

	/// Send the entry signature; afterwards the target runs the
	/// Programming Executive.
	fn enter_programming(&mut self) {
		self.claim_lines();

		self.set_reset(true);
		self.wait(RESET_HOLD);
		self.set_reset(false);
		self.wait(SHORT_RELEASE);
		self.set_reset(true);
		self.wait(KEY_SETUP);

		self.send_word((ENTRY_KEY >> 16) as u16);
		self.send_word(ENTRY_KEY as u16);
		self.wait(CLOCK_EDGE); // P19
		self.set_reset(false);

		self.wait(EXECUTIVE_STARTUP);
		self.clock_pulses(FLUSH_CLOCKS);
	}

	/// Reset the target, release PGC/PGD and let it run again.
	fn exit_programming(&mut self) {
		self.set_reset(true);
		self.wait(EXIT_HOLD);
		self.set_direction(Line::Data, Direction::Input);
		self.set_direction(Line::Clock, Direction::Input);
		self.set_reset(false);
	}
}

impl<H: LowLevel + ?Sized> Handshake for H {
}
