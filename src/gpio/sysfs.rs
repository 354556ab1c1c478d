use std::fs;
use std::io::Write;
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::icsp::Direction;

// udev may need a moment to fix permissions of freshly exported lines
const EXPORT_SETTLE: Duration = Duration::from_millis(100);

pub struct GpioLine {
	number: u32,
	direction: fs::File,
	value: fs::File,
	// level to drive once the line is an output
	level: bool,
	output: bool,
}

impl GpioLine {
	pub fn open(root: &Path, number: u32) -> crate::AResult<Self> {
		let dir = root.join(format!("gpio{}", number));

		with_context!(("open GPIO {} in {}", number, root.display()), {
			if !dir.exists() {
				debug!("Exporting GPIO {}", number);
				fs::OpenOptions::new().write(true).open(root.join("export"))?
					.write_all(number.to_string().as_bytes())?;
				thread::sleep(EXPORT_SETTLE);
			}

			let direction = fs::OpenOptions::new().write(true).open(dir.join("direction"))?;
			let value = fs::OpenOptions::new().read(true).write(true).open(dir.join("value"))?;

			Ok(GpioLine {
				number,
				direction,
				value,
				level: false,
				output: false,
			})
		})
	}

	/// Switching to output drives the last level given to `set_value`.
	///
	/// Plain "out" would make the kernel drive the line low first, so the
	/// level goes into the same write ("high"/"low"). Nothing is written if
	/// the line already is an output.
	pub fn set_direction(&mut self, direction: Direction) {
		let text: &[u8] = match direction {
			Direction::Input => b"in",
			Direction::Output if self.output => return,
			Direction::Output if self.level => b"high",
			Direction::Output => b"low",
		};
		// need to write in one syscall
		self.direction.write_all_at(text, 0)
			.unwrap_or_else(|e| panic!("setting direction of GPIO {} failed: {}", self.number, e));
		self.output = Direction::Output == direction;
	}

	/// Inputs only remember the level; sysfs refuses value writes on them.
	pub fn set_value(&mut self, high: bool) {
		self.level = high;
		if !self.output {
			return;
		}
		let text: &[u8] = if high { b"1" } else { b"0" };
		self.value.write_all_at(text, 0)
			.unwrap_or_else(|e| panic!("writing GPIO {} failed: {}", self.number, e));
	}

	pub fn value(&mut self) -> bool {
		let mut buf = [0u8];
		let len = self.value.read_at(&mut buf, 0)
			.unwrap_or_else(|e| panic!("reading GPIO {} failed: {}", self.number, e));
		1 == len && b'1' == buf[0]
	}
}
