use std::time::Duration;

use super::{
	CLOCK_EDGE,
	Direction,
	Hardware,
	Line,
};

/// Transaction kind announced before each transfer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ControlCode {
	/// SIX: execute the following 24-bit instruction
	Execute,
	/// REGOUT: clock out the VISI register
	RegisterOut,
}

impl ControlCode {
	pub fn bits(self) -> u8 {
		match self {
			ControlCode::Execute => 0b0000,
			ControlCode::RegisterOut => 0b0001,
		}
	}
}

trait InternalLowLevel: Hardware {
	// put `data` on PGD while PGC is low, then raise PGC; the target latches
	// on the rising edge
	fn clock_out(&mut self, data: bool) {
		self.set_level(Line::Data, data);
		self.delay(CLOCK_EDGE); // setup
		self.set_level(Line::Clock, true);
		self.delay(CLOCK_EDGE); // hold
		self.set_level(Line::Clock, false);
	}
}

impl<H: Hardware + ?Sized> InternalLowLevel for H {
}

pub trait LowLevel: Hardware {
	/// Hold (`true`) or release the target's reset line.
	///
	/// The level is set before the line turns into an output, so a backend
	/// has to drive the last level it was given when switching direction.
	fn set_reset(&mut self, asserted: bool) {
		// nMCLR is active low
		self.set_level(Line::Reset, !asserted);
		self.set_direction(Line::Reset, Direction::Output);
	}

	/// Full clock cycles without touching PGD.
	fn clock_pulses(&mut self, count: usize) {
		for _ in 0..count {
			self.set_level(Line::Clock, true);
			self.delay(CLOCK_EDGE);
			self.set_level(Line::Clock, false);
			self.delay(CLOCK_EDGE);
		}
	}

	/// 4-bit control code, lowest bit first.
	fn send_control_code(&mut self, code: ControlCode) {
		let mut bits = code.bits();
		self.set_direction(Line::Data, Direction::Output);
		for _ in 0..4 {
			self.clock_out(0 != bits & 0x1);
			bits >>= 1;
		}
		self.delay(CLOCK_EDGE);
	}

	/// 16-bit word, highest bit first.
	fn send_word(&mut self, word: u16) {
		self.set_direction(Line::Data, Direction::Output);
		for bit in (0..16).rev() {
			self.clock_out(0 != word & (1u16 << bit));
		}
	}

	/// 24-bit instruction, lowest bit first.
	///
	/// This is the opposite order of `send_word`; both are mandated by the
	/// protocol.
	fn send_instruction(&mut self, instruction: u32) {
		self.set_direction(Line::Data, Direction::Output);
		for bit in 0..24 {
			self.clock_out(0 != instruction & (1u32 << bit));
		}
		self.delay(CLOCK_EDGE);
	}

	/// Receive a 16-bit word, highest bit first (same order as `send_word`).
	///
	/// PGD is sampled while PGC is high. The reference firmware for this part
	/// shifts the other way (first bit into bit 0); if a target reads back
	/// swapped, flip this loop.
	fn receive_word(&mut self) -> u16 {
		self.set_direction(Line::Data, Direction::Input);
		let mut result = 0u16;
		for _ in 0..16 {
			self.set_level(Line::Clock, true);
			self.delay(CLOCK_EDGE);
			result <<= 1;
			if self.read_level(Line::Data) {
				result |= 1;
			}
			self.set_level(Line::Clock, false);
			self.delay(CLOCK_EDGE);
		}
		result
	}

	fn wait(&mut self, duration: Duration) {
		self.delay(duration);
	}
}

impl<H: Hardware + ?Sized> LowLevel for H {
}
