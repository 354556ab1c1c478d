//! Packs a byte stream into flash rows.

/// Erased flash word.
pub const BLANK: u16 = 0xffff;

/// Buffer for the row being assembled.
///
/// Addresses handed to `write` are byte addresses of the image; row addresses
/// are word addresses (byte address / 2), always a multiple of the row size.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RowAssembler {
	words: Vec<u16>,
	address: Option<u32>,
}

impl RowAssembler {
	pub fn new(row_size: usize) -> Self {
		// row writes load latches four words at a time
		assert!(row_size > 0 && 0 == row_size % 4, "invalid row size {}", row_size);
		RowAssembler {
			words: vec![BLANK; row_size],
			address: None,
		}
	}

	pub fn row_size(&self) -> usize {
		self.words.len()
	}

	/// word address of the buffered row, `None` before any data arrived
	pub fn address(&self) -> Option<u32> {
		self.address
	}

	pub fn words(&self) -> &[u16] {
		&self.words
	}

	pub fn is_blank(&self) -> bool {
		self.words.iter().all(|&w| w == BLANK)
	}

	/// Forget buffered data and the row address.
	pub fn reset(&mut self) {
		self.clear();
		self.address = None;
	}

	fn clear(&mut self) {
		for w in self.words.iter_mut() {
			*w = BLANK;
		}
	}

	/// Hand the buffered row to `commit` unless it is blank, then blank the
	/// buffer. The row address is kept.
	pub fn flush<F>(&mut self, mut commit: F)
	where
		F: FnMut(u32, &[u16]),
	{
		if let Some(address) = self.address {
			if self.is_blank() {
				debug!("skipping blank row @{:06x}", address);
			} else {
				commit(address, &self.words);
			}
		}
		self.clear();
	}

	/// Add `data` starting at byte `address`.
	///
	/// Writes must come in non-decreasing address order. The low address bit
	/// is ignored; an odd byte count is padded with a blank byte. Data running
	/// past the end of the row continues at the start of the next one; a row
	/// that gets full is committed right away.
	pub fn write<F>(&mut self, address: u32, data: &[u8], mut commit: F)
	where
		F: FnMut(u32, &[u16]),
	{
		let row_size = self.words.len() as u32;
		let word_address = address >> 1;
		let mut row_address = word_address - word_address % row_size;

		if self.address != Some(row_address) {
			self.flush(&mut commit);
			self.address = Some(row_address);
		}

		let mut index = (word_address % row_size) as usize;
		for pair in data.chunks(2) {
			let low = pair[0];
			let high = pair.get(1).cloned().unwrap_or(0xff);
			self.words[index] = u16::from_le_bytes([low, high]);
			index += 1;

			if index == self.words.len() {
				self.flush(&mut commit);
				row_address = row_address.wrapping_add(row_size);
				self.address = Some(row_address);
				index = 0;
			}
		}
	}
}
