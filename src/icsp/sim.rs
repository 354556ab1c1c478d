//! Simulated lines for tests: records what the target would see and keeps a
//! virtual clock instead of waiting.

use std::collections::VecDeque;
use std::time::Duration;

use super::{
	ControlCode,
	Direction,
	Hardware,
	Line,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	/// rising PGC edge while PGD is an output
	Bit(bool),
	/// rising PGC edge while PGD is an input
	Pulse,
	/// nMCLR changed; `true` means held in reset
	Reset(bool),
}

pub struct SimHardware {
	pub events: Vec<Event>,
	pub elapsed: Duration,
	levels: [bool; 3],
	directions: [Direction; 3],
	input: VecDeque<bool>,
}

fn index(line: Line) -> usize {
	match line {
		Line::Clock => 0,
		Line::Data => 1,
		Line::Reset => 2,
	}
}

impl SimHardware {
	pub fn new() -> Self {
		SimHardware {
			events: Vec::new(),
			elapsed: Duration::from_secs(0),
			levels: [false, false, true],
			directions: [Direction::Input; 3],
			input: VecDeque::new(),
		}
	}

	pub fn level(&self, line: Line) -> bool {
		self.levels[index(line)]
	}

	pub fn direction(&self, line: Line) -> Direction {
		self.directions[index(line)]
	}

	/// bits the target latched, in order
	pub fn bits(&self) -> Vec<bool> {
		self.events.iter().filter_map(|e| match *e {
			Event::Bit(b) => Some(b),
			_ => None,
		}).collect()
	}

	/// next 16 sampled PGD values, highest bit first
	pub fn queue_word(&mut self, word: u16) {
		for bit in (0..16).rev() {
			self.input.push_back(0 != word & (1 << bit));
		}
	}

	pub fn clear(&mut self) {
		self.events.clear();
		self.elapsed = Duration::from_secs(0);
	}
}

impl Hardware for SimHardware {
	fn set_direction(&mut self, line: Line, direction: Direction) {
		self.directions[index(line)] = direction;
	}

	fn set_level(&mut self, line: Line, high: bool) {
		let previous = self.levels[index(line)];
		self.levels[index(line)] = high;
		match line {
			Line::Clock if high && !previous => {
				let event = match self.direction(Line::Data) {
					Direction::Output => Event::Bit(self.level(Line::Data)),
					Direction::Input => Event::Pulse,
				};
				self.events.push(event);
			},
			Line::Reset if high != previous => {
				self.events.push(Event::Reset(!high));
			},
			_ => (),
		}
	}

	fn read_level(&mut self, line: Line) -> bool {
		match line {
			Line::Data => self.input.pop_front().unwrap_or(false),
			_ => self.level(line),
		}
	}

	fn delay(&mut self, duration: Duration) {
		self.elapsed += duration;
	}
}

fn take_lsb_first(bits: &[bool]) -> u32 {
	bits.iter().rev().fold(0u32, |acc, &b| acc << 1 | b as u32)
}

/// Split a stream of latched bits into SIX transactions.
///
/// Panics if a control code other than SIX shows up or the stream doesn't
/// end on a transaction boundary.
pub fn decode_six(bits: &[bool]) -> Vec<u32> {
	assert_eq!(0, bits.len() % 28, "{} bits are not a whole number of SIX transactions", bits.len());
	bits.chunks(28).map(|chunk| {
		let code = take_lsb_first(&chunk[..4]);
		assert_eq!(code, ControlCode::Execute.bits() as u32, "unexpected control code");
		take_lsb_first(&chunk[4..])
	}).collect()
}

/// Bits latched between two event positions.
pub fn bits_between(events: &[Event]) -> Vec<bool> {
	events.iter().filter_map(|e| match *e {
		Event::Bit(b) => Some(b),
		_ => None,
	}).collect()
}
