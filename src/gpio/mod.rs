//! Linux sysfs GPIO lines as ICSP hardware.

mod sysfs;

use std::path::Path;

use crate::icsp::{
	Direction,
	Hardware,
	Line,
};

use self::sysfs::GpioLine;

pub const DEFAULT_ROOT: &str = "/sys/class/gpio";

/// GPIO numbers of the ICSP lines.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pins {
	pub clock: u32,
	pub data: u32,
	pub reset: u32,
}

impl Default for Pins {
	fn default() -> Self {
		Pins {
			clock: 2,
			data: 3,
			reset: 4,
		}
	}
}

/// The ICSP lines as exported sysfs GPIOs.
pub struct SysfsHardware {
	clock: GpioLine,
	data: GpioLine,
	reset: GpioLine,
}

impl SysfsHardware {
	fn line(&mut self, line: Line) -> &mut GpioLine {
		match line {
			Line::Clock => &mut self.clock,
			Line::Data => &mut self.data,
			Line::Reset => &mut self.reset,
		}
	}
}

impl Hardware for SysfsHardware {
	fn set_direction(&mut self, line: Line, direction: Direction) {
		self.line(line).set_direction(direction);
	}

	fn set_level(&mut self, line: Line, high: bool) {
		self.line(line).set_value(high);
	}

	fn read_level(&mut self, line: Line) -> bool {
		self.line(line).value()
	}
}

/// Export (if needed) and open the three lines below `root`.
pub fn open_gpio(root: &Path, pins: Pins) -> crate::AResult<SysfsHardware> {
	ensure!(
		pins.clock != pins.data && pins.clock != pins.reset && pins.data != pins.reset,
		"GPIO lines must be distinct: {:?}", pins
	);
	Ok(SysfsHardware {
		clock: GpioLine::open(root, pins.clock)?,
		data: GpioLine::open(root, pins.data)?,
		reset: GpioLine::open(root, pins.reset)?,
	})
}

#[cfg(test)]
mod test {
	use std::fs;

	use super::*;
	use crate::icsp::LowLevel;

	#[test]
	fn distinct_pins_required() {
		let pins = Pins { clock: 2, data: 2, reset: 4 };
		assert!(open_gpio(Path::new("/nonexistent"), pins).is_err());
	}

	fn fake_root(name: &str) -> std::path::PathBuf {
		let root = std::env::temp_dir().join(format!("dspic-lvp-{}-{}", name, std::process::id()));
		for n in [2u32, 3, 4].iter() {
			let dir = root.join(format!("gpio{}", n));
			fs::create_dir_all(&dir).unwrap();
			fs::write(dir.join("direction"), "in\n").unwrap();
			fs::write(dir.join("value"), "0\n").unwrap();
		}
		root
	}

	fn file(root: &Path, name: &str) -> String {
		fs::read_to_string(root.join(name)).unwrap().trim().to_string()
	}

	#[test]
	fn drives_exported_lines() {
		let root = fake_root("drive");

		let mut hw = open_gpio(&root, Pins::default()).unwrap();
		hw.set_direction(Line::Clock, Direction::Output);
		hw.set_level(Line::Clock, true);
		assert_eq!(file(&root, "gpio2/direction"), "low");
		assert_eq!(&fs::read(root.join("gpio2/value")).unwrap()[..1], b"1");
		assert!(hw.read_level(Line::Clock));
		assert!(!hw.read_level(Line::Data));

		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn released_reset_stays_high() {
		let root = fake_root("reset");

		let mut hw = open_gpio(&root, Pins::default()).unwrap();
		hw.set_reset(false);
		assert_eq!(file(&root, "gpio4/direction"), "high");
		// input level untouched until the line drives
		assert_eq!(file(&root, "gpio4/value"), "0");

		hw.set_reset(true);
		assert_eq!(file(&root, "gpio4/value"), "0");
		hw.set_reset(false);
		assert_eq!(file(&root, "gpio4/value"), "1");
		// already an output, no second direction write
		assert_eq!(file(&root, "gpio4/direction"), "high");

		fs::remove_dir_all(&root).unwrap();
	}
}
