//! Intel HEX images.
//!
//! Addresses in dsPIC HEX files are byte addresses, twice the program memory
//! address; each instruction word takes four bytes (low word, upper byte,
//! phantom byte).

use std::fs;
use std::path::Path;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Chunk {
	pub address: u32,
	pub data: Vec<u8>,
}

impl Chunk {
	/// One past the last byte; may be beyond the 32-bit address space.
	pub fn end(&self) -> u64 {
		u64::from(self.address) + self.data.len() as u64
	}
}

/// Parse HEX records into chunks sorted by address.
///
/// Chunks must start on even addresses and must not overlap.
pub fn parse_ihex(text: &str) -> crate::AResult<Vec<Chunk>> {
	use ihex::Record;

	let mut base_address = 0u32;
	let mut chunks = Vec::new();

	for (line, record) in ihex::Reader::new(text).enumerate() {
		let record = record.map_err(|e| format_err!("record {}: {}", line + 1, e))?;
		match record {
			Record::Data { offset, value } => {
				if !value.is_empty() {
					chunks.push(Chunk {
						address: base_address + u32::from(offset),
						data: value,
					});
				}
			},
			Record::ExtendedSegmentAddress(segment) => {
				base_address = u32::from(segment) * 16;
			},
			Record::ExtendedLinearAddress(upper) => {
				base_address = u32::from(upper) << 16;
			},
			Record::EndOfFile => break,
			Record::StartSegmentAddress { .. } | Record::StartLinearAddress(_) => (),
		}
	}

	// keeps file order for equal addresses; those overlap anyway
	chunks.sort_by_key(|c| c.address);

	for chunk in &chunks {
		ensure!(0 == chunk.address % 2, "Data at odd address 0x{:06x}", chunk.address);
	}
	for pair in chunks.windows(2) {
		ensure!(pair[0].end() <= u64::from(pair[1].address),
			"Overlapping data at 0x{:06x} and 0x{:06x}", pair[0].address, pair[1].address
		);
	}

	Ok(chunks)
}

pub fn read_ihex<P: AsRef<Path>>(path: P) -> crate::AResult<Vec<Chunk>> {
	let path = path.as_ref();
	with_context!(("reading {}", path.display()), {
		let text = fs::read_to_string(path)?;
		let chunks = parse_ihex(&text)?;
		info!("Read {} data records from {}", chunks.len(), path.display());
		Ok(chunks)
	})
}
