use std::time::Duration;

use super::{
	ControlCode,
	Encoder,
	Instruction,
	Register,
	Sfr,
};

/// Entry point of the Programming Executive.
pub const EXECUTIVE_ENTRY: u16 = 0x0200;

/// Page of the write latches in table address space.
const LATCH_PAGE: u16 = 0x00fa;

/// NVMCON: erase the whole user flash
const NVMCON_BULK_ERASE: u16 = 0x400e;
/// NVMCON: program two instruction words per latch cycle
const NVMCON_PROGRAM_DOUBLE_WORD: u16 = 0x4001;

/// Register both latch page and programming mode are moved to during address
/// load. It doesn't match TBLPAG or NVMCON; verify against the datasheet.
const ADDRESS_LOAD_TARGET: Sfr = Sfr(0x0760);

/// Fixed instruction scripts. Each one runs to completion; none of them
/// checks for success.
pub trait Commands: Encoder {
	/// Leave the reset vector and jump into the Programming Executive.
	fn exit_reset_vector(&mut self) {
		self.nops(3);
		self.execute(Instruction::goto(EXECUTIVE_ENTRY));
		self.nops(3);
	}

	/// Write the unlock key to NVMKEY and start the operation configured in
	/// NVMCON.
	fn unlock_and_write(&mut self) {
		self.execute_all(&[
			Instruction::mov_literal(0x55, Register::W1),
			Instruction::mov_to_sfr(Register::W1, Sfr::NVMKEY),
			Instruction::mov_literal(0xaa, Register::W1),
			Instruction::mov_to_sfr(Register::W1, Sfr::NVMKEY),
			Instruction::BSET_NVMCON_WR,
		]);
		self.nops(3);
	}

	/// Erase all user flash, then wait `settle` (no polling).
	fn bulk_erase(&mut self, settle: Duration) {
		self.exit_reset_vector();
		self.execute_all(&[
			Instruction::mov_literal(NVMCON_BULK_ERASE, Register::W10),
			Instruction::mov_to_sfr(Register::W10, Sfr::NVMCON),
		]);
		self.nops(2);
		self.unlock_and_write();
		self.wait(settle);
	}

	/// Point NVMADR/NVMADRU at `address` (24 bits) and select double word
	/// programming.
	fn address_load(&mut self, address: u32) {
		let address = address & 0xff_ffff;
		let high = (address >> 16) & 0xff;
		let low = address & 0xffff;

		self.exit_reset_vector();

		// latch page
		self.execute_all(&[
			Instruction::mov_literal(LATCH_PAGE, Register::W12),
			Instruction::mov_to_sfr(Register::W10, ADDRESS_LOAD_TARGET),
		]);

		// destination
		self.execute_all(&[
			Instruction::mov_literal_sum_shifted(low, Register::W3),
			Instruction::mov_literal_sum_shifted(high, Register::W4),
			Instruction::mov_to_sfr(Register::W3, Sfr::NVMADR),
			Instruction::mov_to_sfr(Register::W4, Sfr::NVMADRU),
		]);

		// programming mode
		self.execute(Instruction::mov_literal(NVMCON_PROGRAM_DOUBLE_WORD, Register::W10));
		self.nops(1);
		self.execute(Instruction::mov_to_sfr(Register::W10, ADDRESS_LOAD_TARGET));
		self.nops(2);
	}

	/// Load `words` into the write latches and program them, then wait
	/// `settle`.
	///
	/// Words come in groups of four (two instruction words: low word, upper
	/// byte, low word, upper byte); a trailing incomplete group is not sent.
	fn row_write(&mut self, words: &[u16], settle: Duration) {
		// W7: first latch
		self.execute(Instruction::clr(Register::W7));
		self.nops(1);

		for group in words.chunks_exact(4) {
			let (lsw0, msb0, lsw1, msb1) = (group[0], group[1], group[2], group[3]);
			self.execute_all(&[
				Instruction::mov_literal(lsw0, Register::W0),
				Instruction::mov_literal((msb1 & 0xff) << 8 | (msb0 & 0xff), Register::W1),
				Instruction::mov_literal(lsw1, Register::W2),
				Instruction::clr(Register::W6),
			]);
			self.nops(1);
			for &write in [
				Instruction::TBLWTL_W6_INC_TO_W7,
				Instruction::TBLWTH_B_W6_INC_TO_W7_INC,
				Instruction::TBLWTH_B_W6_INC_TO_W7_PREINC,
				Instruction::TBLWTL_W6_INC_TO_W7_INC,
			].iter() {
				self.execute(write);
				self.nops(2);
			}
		}

		self.unlock_and_write();
		self.wait(settle);
	}

	/// Read the low program word at `address` (24 bits) through VISI.
	fn read_word(&mut self, address: u32) -> u16 {
		let address = address & 0xff_ffff;

		self.exit_reset_vector();
		self.execute_all(&[
			Instruction::mov_literal((address >> 16) as u16, Register::W0),
			Instruction::mov_literal(Sfr::VISI.0, Register::W7),
			Instruction::mov_to_sfr(Register::W0, Sfr::TBLPAG),
			Instruction::mov_literal(address as u16, Register::W6),
			Instruction::NOP,
			Instruction::TBLRDL_W6_TO_W7,
		]);
		// flush the pipeline
		self.nops(5);

		self.send_control_code(ControlCode::RegisterOut);
		self.clock_pulses(8);
		self.receive_word()
	}
}

impl<H: Encoder + ?Sized> Commands for H {
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::icsp::sim::{
		Event,
		SimHardware,
		decode_six,
	};

	const EXIT_RESET_VECTOR: [u32; 7] = [0, 0, 0, 0x04_0200, 0, 0, 0];
	const UNLOCK_AND_WRITE: [u32; 8] = [0x20_0551, 0x88_3971, 0x20_0aa1, 0x88_3971, 0xa8_e729, 0, 0, 0];

	fn concat(parts: &[&[u32]]) -> Vec<u32> {
		parts.iter().flat_map(|p| p.iter().cloned()).collect()
	}

	#[test]
	fn exit_reset_vector() {
		let mut hw = SimHardware::new();
		hw.exit_reset_vector();
		assert_eq!(decode_six(&hw.bits()), EXIT_RESET_VECTOR.to_vec());
	}

	#[test]
	fn unlock_and_write() {
		let mut hw = SimHardware::new();
		hw.unlock_and_write();
		assert_eq!(decode_six(&hw.bits()), UNLOCK_AND_WRITE.to_vec());
	}

	#[test]
	fn bulk_erase_waits_fixed_time() {
		let mut hw = SimHardware::new();
		hw.bulk_erase(Duration::from_millis(30));
		assert_eq!(decode_six(&hw.bits()), concat(&[
			&EXIT_RESET_VECTOR,
			&[0x24_00ea, 0x88_394a, 0, 0],
			&UNLOCK_AND_WRITE,
		]));
		assert!(hw.elapsed >= Duration::from_millis(30));
	}

	#[test]
	fn address_load() {
		let mut hw = SimHardware::new();
		hw.address_load(0x01_0100);
		assert_eq!(decode_six(&hw.bits()), concat(&[
			&EXIT_RESET_VECTOR,
			&[0x20_0fac, 0x88_3b0a],
			&[0x00_1030, 0x00_0050, 0x88_3953, 0x88_3964],
			&[0x24_001a, 0, 0x88_3b0a, 0, 0],
		]));
	}

	#[test]
	fn row_write_packs_groups() {
		let mut hw = SimHardware::new();
		let words = [0x1111, 0x00a2, 0x3333, 0x00b4, 0x5555, 0x0066, 0x7777, 0x0088];
		hw.row_write(&words, Duration::from_millis(1));
		let group = |lsw0: u32, msb: u32, lsw1: u32| vec![
			0x20_0000 | lsw0 << 4,
			0x20_0001 | msb << 4,
			0x20_0002 | lsw1 << 4,
			0xeb_0300, 0,
			0xbb_0bb6, 0, 0,
			0xbb_dbb6, 0, 0,
			0xbb_ebb6, 0, 0,
			0xbb_1bb6, 0, 0,
		];
		assert_eq!(decode_six(&hw.bits()), concat(&[
			&[0xeb_0380, 0],
			&group(0x1111, 0xb4a2, 0x3333),
			&group(0x5555, 0x8866, 0x7777),
			&UNLOCK_AND_WRITE,
		]));
		assert!(hw.elapsed >= Duration::from_millis(1));
	}

	#[test]
	fn row_write_instruction_count() {
		let mut hw = SimHardware::new();
		hw.row_write(&[0xffff; 64], Duration::from_millis(1));
		// 2 setup + 16 groups of 17 + unlock
		assert_eq!(decode_six(&hw.bits()).len(), 2 + 16 * 17 + 8);
	}

	#[test]
	fn read_word() {
		let mut hw = SimHardware::new();
		hw.queue_word(0xbeef);
		assert_eq!(hw.read_word(0xff_0002), 0xbeef);

		let pulses = hw.events.iter().filter(|e| **e == Event::Pulse).count();
		assert_eq!(pulses, 16);

		let bits = hw.bits();
		// 18 SIX transactions, REGOUT, 8 idle clocks
		assert_eq!(bits.len(), 18 * 28 + 4 + 8);
		assert_eq!(decode_six(&bits[..18 * 28]), concat(&[
			&EXIT_RESET_VECTOR,
			&[0x20_0ff0, 0x20_f887, 0x88_02a0, 0x20_0026, 0, 0xba_0b96],
			&[0, 0, 0, 0, 0],
		]));
		assert_eq!(&bits[18 * 28..18 * 28 + 4], &[true, false, false, false]);
	}
}
