use std::fmt;
use std::time::Duration;

/// Target parameters (DS70005256A for the dsPIC33EP128GS706).
///
/// Addresses are program memory addresses as used by table reads; the
/// configuration region is compared against row addresses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Device {
	pub name: &'static str,
	pub flash_size_kib: u32,
	/// words per row
	pub row_size: usize,
	pub config_address: u32,
	pub config_offsets: &'static [u32],
	pub device_id_address: u32,
	pub revision_id_address: u32,
	pub unique_id_address: u32,
	pub unique_id_words: u32,
	pub write_time: Duration,
	pub bulk_erase_time: Duration,
}

pub const DSPIC33EP128GS706: Device = Device {
	name: "dsPIC33EP128GS706",
	flash_size_kib: 128,
	row_size: 64,
	config_address: 0x01_5780,
	config_offsets: &[0, 16, 24, 28, 32],
	device_id_address: 0xff_0000,
	revision_id_address: 0xff_0002,
	unique_id_address: 0x80_0f00,
	unique_id_words: 6,
	write_time: Duration::from_millis(1),
	bulk_erase_time: Duration::from_millis(30),
};

impl Device {
	/// Rows at or above the configuration words need their own sequence and
	/// are not row programmed.
	pub fn is_config_row(&self, row_address: u32) -> bool {
		row_address >= self.config_address
	}

	pub fn config_word_addresses(&self) -> impl Iterator<Item = u32> + '_ {
		let base = self.config_address;
		self.config_offsets.iter().map(move |offset| base + offset)
	}

	pub fn unique_id_addresses(&self) -> impl Iterator<Item = u32> {
		let base = self.unique_id_address;
		(0..self.unique_id_words).map(move |i| base + 2 * i)
	}
}

/// Identification and configuration read from the target.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DeviceInfo {
	pub device_id: u16,
	pub revision_id: u16,
	pub flash_size_kib: u32,
	pub config: Vec<u16>,
	pub unique_id: Vec<u16>,
}

fn write_words(f: &mut fmt::Formatter, words: &[u16]) -> fmt::Result {
	for (i, w) in words.iter().enumerate() {
		if i > 0 {
			write!(f, " ")?;
		}
		write!(f, "{:04X}", w)?;
	}
	Ok(())
}

impl fmt::Display for DeviceInfo {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "Dev ID: {:04X}", self.device_id)?;
		writeln!(f, "Rev ID: {:04X}", self.revision_id)?;
		writeln!(f, "Flash : {}KB", self.flash_size_kib)?;
		write!(f, "Configuration: ")?;
		write_words(f, &self.config)?;
		writeln!(f)?;
		write!(f, "UID: ")?;
		write_words(f, &self.unique_id)
	}
}
