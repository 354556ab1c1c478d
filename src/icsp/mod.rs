//! In-Circuit Serial Programming for dsPIC33EP devices, bit-banged over
//! three lines.
//!
//! - PGC: serial clock, always driven by us
//! - PGD: serial data, driven by us except while clocking out a register
//! - nMCLR: reset, active low
//!
//! Every transaction starts with a 4-bit control code (sent LSB first):
//! - 0b0000: SIX, followed by a 24-bit instruction (LSB first) the target
//!   executes
//! - 0b0001: REGOUT, followed by 8 idle clocks and the 16-bit content of the
//!   VISI register clocked out by the target
//!
//! Entering programming mode needs a 32-bit key ("MCHQ") sent as two 16-bit
//! words MSB first while reset is held.
//!
//! Data is latched by the target on the rising clock edge; every half clock
//! cycle is held for at least `CLOCK_EDGE` (P1A/P1B are 200ns).

mod hardware;
mod instruction;
mod low_level;
mod sequences;
mod session;

#[cfg(test)]
pub(crate) mod sim;

pub use self::hardware::{
	CLOCK_EDGE,
	Direction,
	Hardware,
	Line,
	busy_wait,
};

pub use self::instruction::{
	Encoder,
	Instruction,
	Register,
	Sfr,
};

pub use self::low_level::{
	ControlCode,
	LowLevel,
};

pub use self::sequences::{
	Commands,
	EXECUTIVE_ENTRY,
};

pub use self::session::{
	ENTRY_KEY,
	Handshake,
};
