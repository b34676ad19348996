//! ILDA frame header parsing
//!
//! Every section of an ILDA file starts with a fixed 32-byte header:
//!
//! ```text
//! offset  size  field
//!      0     4  "ILDA" magic
//!      4     3  reserved
//!      7     1  format code
//!      8     8  frame name
//!     16     8  company name
//!     24     2  number of records (big-endian)
//!     26     2  frame number (big-endian)
//!     28     2  total frames (big-endian)
//!     30     1  projector number
//!     31     1  reserved
//! ```

/// Header length in bytes.
pub const HEADER_LEN: usize = 32;

/// Magic tag at the start of every frame header.
pub const ILDA_MAGIC: [u8; 4] = *b"ILDA";

/// Format codes this decoder understands.
pub const SUPPORTED_FORMATS: [u8; 5] = [0, 1, 2, 4, 5];

/// Record size per format code (index = format). Unknown formats map
/// to zero: no payload, records unreadable.
const BYTES_PER_RECORD: [u8; 6] = [8, 6, 3, 0, 10, 8];

/// 3-D indexed colour
pub const FORMAT_3D_INDEXED: u8 = 0;
/// 2-D indexed colour
pub const FORMAT_2D_INDEXED: u8 = 1;
/// Colour palette section
pub const FORMAT_PALETTE: u8 = 2;
/// 3-D true colour
pub const FORMAT_3D_TRUE: u8 = 4;
/// 2-D true colour
pub const FORMAT_2D_TRUE: u8 = 5;

/// Parsed frame header fields the decoder cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IldaHeader {
    pub format: u8,
    pub records: u16,
    pub frame_number: u16,
    pub total_frames: u16,
}

impl IldaHeader {
    /// Extract the fields from a raw 32-byte header without validation.
    ///
    /// Mid-stream headers (frame boundaries, loop restarts) are trusted;
    /// only the initial `open` validates magic and format.
    pub fn parse(raw: &[u8; HEADER_LEN]) -> Self {
        Self {
            format: raw[7],
            records: u16::from_be_bytes([raw[24], raw[25]]),
            frame_number: u16::from_be_bytes([raw[26], raw[27]]),
            total_frames: u16::from_be_bytes([raw[28], raw[29]]),
        }
    }

    /// Whether the raw header starts with the "ILDA" magic tag.
    pub fn has_magic(raw: &[u8; HEADER_LEN]) -> bool {
        raw[..4] == ILDA_MAGIC
    }

    /// Record size for this header's format, zero if unreadable.
    pub fn bytes_per_record(&self) -> u8 {
        bytes_per_record(self.format)
    }
}

/// Record size for a format code, zero for unknown formats.
pub fn bytes_per_record(format: u8) -> u8 {
    BYTES_PER_RECORD
        .get(format as usize)
        .copied()
        .unwrap_or(0)
}

/// Whether the decoder accepts this format code on `open`.
pub fn format_supported(format: u8) -> bool {
    SUPPORTED_FORMATS.contains(&format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(format: u8, records: u16) -> [u8; HEADER_LEN] {
        let mut h = [0u8; HEADER_LEN];
        h[..4].copy_from_slice(b"ILDA");
        h[7] = format;
        h[24..26].copy_from_slice(&records.to_be_bytes());
        h[26..28].copy_from_slice(&3u16.to_be_bytes());
        h[28..30].copy_from_slice(&7u16.to_be_bytes());
        h
    }

    #[test]
    fn test_parse_big_endian_fields() {
        let h = IldaHeader::parse(&raw_header(5, 0x0102));
        assert_eq!(h.format, 5);
        assert_eq!(h.records, 0x0102);
        assert_eq!(h.frame_number, 3);
        assert_eq!(h.total_frames, 7);
    }

    #[test]
    fn test_magic_detection() {
        let good = raw_header(0, 1);
        assert!(IldaHeader::has_magic(&good));
        let mut bad = good;
        bad[0] = b'X';
        assert!(!IldaHeader::has_magic(&bad));
    }

    #[test]
    fn test_record_size_table() {
        assert_eq!(bytes_per_record(0), 8);
        assert_eq!(bytes_per_record(1), 6);
        assert_eq!(bytes_per_record(2), 3);
        assert_eq!(bytes_per_record(3), 0);
        assert_eq!(bytes_per_record(4), 10);
        assert_eq!(bytes_per_record(5), 8);
        assert_eq!(bytes_per_record(6), 0);
        assert_eq!(bytes_per_record(255), 0);
    }

    #[test]
    fn test_supported_formats() {
        for f in [0, 1, 2, 4, 5] {
            assert!(format_supported(f));
        }
        for f in [3, 6, 7, 255] {
            assert!(!format_supported(f));
        }
    }
}
