use std::fmt;

use super::{
	ControlCode,
	LowLevel,
};

/// Working register W0..W15
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Register(u8);

impl Register {
	pub const W0: Register = Register(0);
	pub const W1: Register = Register(1);
	pub const W2: Register = Register(2);
	pub const W3: Register = Register(3);
	pub const W4: Register = Register(4);
	pub const W6: Register = Register(6);
	pub const W7: Register = Register(7);
	pub const W10: Register = Register(10);
	pub const W12: Register = Register(12);

	pub fn new(index: u8) -> Self {
		assert!(index < 16, "no such working register W{}", index);
		Register(index)
	}

	pub fn index(self) -> u32 {
		u32::from(self.0)
	}
}

/// Special function register in near data space (even address)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Sfr(pub u16);

impl Sfr {
	pub const TBLPAG: Sfr = Sfr(0x0054);
	pub const NVMCON: Sfr = Sfr(0x0728);
	pub const NVMADR: Sfr = Sfr(0x072a);
	pub const NVMADRU: Sfr = Sfr(0x072c);
	pub const NVMKEY: Sfr = Sfr(0x072e);
	/// register the target copies to PGD on REGOUT
	pub const VISI: Sfr = Sfr(0x0f88);
}

/// 24-bit dsPIC33E instruction word.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instruction(u32);

impl Instruction {
	pub const NOP: Instruction = Instruction(0x00_0000);
	/// `BSET NVMCON, #WR`: start the flash operation configured in NVMCON
	pub const BSET_NVMCON_WR: Instruction = Instruction(0xa8_e729);
	/// `TBLWTL [W6++], [W7]`
	pub const TBLWTL_W6_INC_TO_W7: Instruction = Instruction(0xbb_0bb6);
	/// `TBLWTH.B [W6++], [W7++]`
	pub const TBLWTH_B_W6_INC_TO_W7_INC: Instruction = Instruction(0xbb_dbb6);
	/// `TBLWTH.B [W6++], [++W7]`
	pub const TBLWTH_B_W6_INC_TO_W7_PREINC: Instruction = Instruction(0xbb_ebb6);
	/// `TBLWTL [W6++], [W7++]`
	pub const TBLWTL_W6_INC_TO_W7_INC: Instruction = Instruction(0xbb_1bb6);
	/// `TBLRDL [W6], [W7]`: low program word at TBLPAG:W6 into the register W7 points to
	pub const TBLRDL_W6_TO_W7: Instruction = Instruction(0xba_0b96);

	/// Raw encoding, truncated to 24 bits.
	pub fn from_raw(word: u32) -> Self {
		Instruction(word & 0xff_ffff)
	}

	pub fn value(self) -> u32 {
		self.0
	}

	/// `GOTO address` (first word only; the upper address bits stay zero)
	pub fn goto(address: u16) -> Self {
		Instruction(0x04_0000 | u32::from(address & 0xfffe))
	}

	/// `MOV #literal, Wn`
	pub fn mov_literal(literal: u16, register: Register) -> Self {
		Instruction(0x20_0000 | u32::from(literal) << 4 | register.index())
	}

	/// `MOV Wn, sfr`
	pub fn mov_to_sfr(register: Register, sfr: Sfr) -> Self {
		Instruction(0x88_0000 | u32::from(sfr.0 >> 1) << 4 | register.index())
	}

	/// `CLR Wn`
	pub fn clr(register: Register) -> Self {
		Instruction(0xeb_0000 | register.index() << 7)
	}

	/// Operand staging as done by the address load sequence: the literal is
	/// added to the `MOV #0, Wn` opcode *before* shifting, and the result is
	/// truncated to 24 bits.
	///
	/// This is not `mov_literal(literal, register)`; the numeric effect is
	/// kept exactly and has yet to be checked against the datasheet.
	pub fn mov_literal_sum_shifted(literal: u32, register: Register) -> Self {
		Self::from_raw((0x20_0000 + register.index()).wrapping_add(literal) << 4)
	}
}

impl fmt::Debug for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Instruction(0x{:06x})", self.0)
	}
}

impl fmt::Display for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:06x}", self.0)
	}
}

/// Executes instruction words on the target (SIX transactions).
pub trait Encoder: LowLevel {
	fn execute(&mut self, instruction: Instruction) {
		trace!("SIX {}", instruction);
		self.send_control_code(ControlCode::Execute);
		self.send_instruction(instruction.value());
	}

	fn execute_all(&mut self, instructions: &[Instruction]) {
		for &instruction in instructions {
			self.execute(instruction);
		}
	}

	fn nops(&mut self, count: usize) {
		for _ in 0..count {
			self.execute(Instruction::NOP);
		}
	}
}

impl<H: LowLevel + ?Sized> Encoder for H {
}
