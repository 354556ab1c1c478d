//! Low voltage programming session for dsPIC33EP targets.
//!
//! A `Programmer` owns the lines, the row being assembled and the session
//! state. Image data goes in through `write` in non-decreasing address order
//! and `finalize` ends the image. Nothing is verified; correct operation
//! depends on the fixed delays of the command sequences.

mod device;
mod rows;

pub use self::device::{
	DSPIC33EP128GS706,
	Device,
	DeviceInfo,
};

pub use self::rows::{
	BLANK,
	RowAssembler,
};

use crate::icsp::{
	Commands,
	Handshake,
	Hardware,
};

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
struct Session {
	active: bool,
	erased: bool,
}

fn enter<H: Hardware>(hardware: &mut H, session: &mut Session) {
	if session.active {
		return;
	}
	info!("Entering programming mode");
	hardware.enter_programming();
	*session = Session {
		active: true,
		erased: false,
	};
}

fn commit_row<H: Hardware>(hardware: &mut H, device: &Device, session: &mut Session, row_address: u32, words: &[u16]) {
	enter(hardware, session);
	if !session.erased {
		info!("Bulk erase");
		hardware.bulk_erase(device.bulk_erase_time);
		session.erased = true;
	}

	hardware.address_load(row_address << 1);
	if device.is_config_row(row_address) {
		warn!("Row @{:06x} is in the configuration region, not programmed", row_address);
		return;
	}
	debug!("Programming row @{:06x}", row_address);
	hardware.row_write(words, device.write_time);
}

pub struct Programmer<H: Hardware> {
	hardware: H,
	device: Device,
	rows: RowAssembler,
	session: Session,
}

impl<H: Hardware> Programmer<H> {
	pub fn new(hardware: H, device: Device) -> Self {
		Programmer {
			hardware,
			rows: RowAssembler::new(device.row_size),
			device,
			session: Session::default(),
		}
	}

	pub fn device(&self) -> &Device {
		&self.device
	}

	pub fn is_active(&self) -> bool {
		self.session.active
	}

	/// Enter programming mode; does nothing if already in it.
	pub fn enter(&mut self) {
		enter(&mut self.hardware, &mut self.session);
	}

	/// Leave programming mode (always runs the exit handshake).
	///
	/// Data still buffered stays buffered; use `finalize` to program it.
	pub fn exit(&mut self) {
		self.hardware.exit_programming();
		self.session = Session::default();
		info!("Released target");
	}

	/// Erase all user flash now. The next row commit in this session won't
	/// erase again.
	pub fn bulk_erase(&mut self) {
		self.enter();
		info!("Bulk erase");
		self.hardware.bulk_erase(self.device.bulk_erase_time);
		self.session.erased = true;
	}

	/// Add image bytes at byte `address`.
	///
	/// The first non-blank row of a session enters programming mode if needed
	/// and erases the device before it is programmed.
	pub fn write(&mut self, address: u32, data: &[u8]) {
		let Programmer { hardware, device, rows, session } = self;
		rows.write(address, data, |row_address, words| {
			commit_row(hardware, device, session, row_address, words)
		});
	}

	/// Program the last (partial) row and release the target.
	pub fn finalize(&mut self) {
		{
			let Programmer { hardware, device, rows, session } = self;
			rows.flush(|row_address, words| {
				commit_row(hardware, device, session, row_address, words)
			});
			rows.reset();
		}
		self.exit();
	}

	/// Read one program memory word; enters programming mode if needed.
	pub fn read_word(&mut self, address: u32) -> u16 {
		self.enter();
		let word = self.hardware.read_word(address);
		trace!("Read @{:06x}: {:04x}", address, word);
		word
	}

	/// Read identification, configuration and unique ID words.
	///
	/// Leaves programming mode again unless it was active before.
	pub fn read_info(&mut self) -> DeviceInfo {
		let was_active = self.is_active();
		let device = self.device;

		let info = DeviceInfo {
			device_id: self.read_word(device.device_id_address),
			revision_id: self.read_word(device.revision_id_address),
			flash_size_kib: device.flash_size_kib,
			config: device.config_word_addresses().map(|a| self.read_word(a)).collect(),
			unique_id: device.unique_id_addresses().map(|a| self.read_word(a)).collect(),
		};

		if !was_active {
			self.exit();
		}
		info
	}
}

impl<H: Hardware> Drop for Programmer<H> {
	fn drop(&mut self) {
		if !self.rows.is_blank() {
			warn!("Dropping unfinished image data");
		}
		if self.session.active {
			warn!("Still in programming mode, releasing target");
			self.exit();
		}
	}
}
