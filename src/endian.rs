//! Reading multi-byte integers out of content.

/// Byte order of a value in the content being sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
	Little,
	Big,
	/// PDP-11: little-endian 16-bit words, high word first.
	Middle,
}

impl Endianness {
	/// Byte order of the host, for the unprefixed magic types.
	pub fn native() -> Self {
		if cfg!(target_endian = "big") {
			Endianness::Big
		} else {
			Endianness::Little
		}
	}

	/// Read `bytes` (1 to 8 of them) as an unsigned integer.
	///
	/// Middle order only differs from little order for 4-byte values.
	pub fn convert(self, bytes: &[u8]) -> Option<u64> {
		if bytes.is_empty() || bytes.len() > 8 {
			return None;
		}
		let val = match self {
			Endianness::Big => bytes.iter().fold(0u64, |acc, &b| acc << 8 | u64::from(b)),
			Endianness::Middle if bytes.len() == 4 => {
				u64::from(bytes[1]) << 24
					| u64::from(bytes[0]) << 16
					| u64::from(bytes[3]) << 8
					| u64::from(bytes[2])
			}
			Endianness::Little | Endianness::Middle => {
				bytes.iter().rev().fold(0u64, |acc, &b| acc << 8 | u64::from(b))
			}
		};
		Some(val)
	}

	/// Read `bytes` as an ID3 synchsafe integer: 7 significant bits per byte.
	pub fn convert_id3(self, bytes: &[u8]) -> Option<u64> {
		if bytes.is_empty() || bytes.len() > 8 {
			return None;
		}
		let fold = |acc: u64, b: &u8| acc << 7 | u64::from(b & 0x7f);
		let val = match self {
			Endianness::Big => bytes.iter().fold(0, fold),
			Endianness::Little | Endianness::Middle => bytes.iter().rev().fold(0, fold),
		};
		Some(val)
	}
}

#[cfg(test)]
mod tests {
	use super::Endianness::*;

	#[test]
	fn byte_orders() {
		let b = [0x01, 0x02, 0x03, 0x04];
		assert_eq!(Little.convert(&b), Some(0x0403_0201));
		assert_eq!(Big.convert(&b), Some(0x0102_0304));
		assert_eq!(Middle.convert(&b), Some(0x0201_0403));
		assert_eq!(Big.convert(&b[..2]), Some(0x0102));
		assert_eq!(Middle.convert(&b[..2]), Some(0x0201));
		assert_eq!(Little.convert(&[0xff]), Some(0xff));
	}

	#[test]
	fn bad_widths() {
		assert_eq!(Little.convert(&[]), None);
		assert_eq!(Big.convert(&[0; 9]), None);
	}

	#[test]
	fn synchsafe() {
		// 0x00 0x00 0x02 0x01 => (2 << 7) | 1
		assert_eq!(Big.convert_id3(&[0, 0, 2, 1]), Some(257));
		assert_eq!(Little.convert_id3(&[1, 2, 0, 0]), Some(257));
		assert_eq!(Big.convert_id3(&[0x7f, 0x7f, 0x7f, 0x7f]), Some(0x0fff_ffff));
		assert_eq!(Big.convert_id3(&[0x80, 0, 0, 0x81]), Some(1));
	}
}
