//! Looping ILDA file-stream decoder
//!
//! Stateful cursor over a seekable byte stream producing bounded chunks
//! of [`Point`]s. The decoder handles multi-frame and multi-format
//! files, palette sections, and corrupt or truncated input.
//!
//! Error policy: only [`IldaDecoder::open`] can fail hard (bad magic,
//! unsupported format, truncated first header). Everything after that
//! recovers by restarting from byte offset zero - the same transition
//! that implements end-of-file looping - so callers never see a
//! mid-stream error, only "zero points this call" when the stream is
//! genuinely unreadable.

pub mod header;

pub use header::{IldaHeader, HEADER_LEN, SUPPORTED_FORMATS};

use crate::point::{expand_channel, Point};
use crate::traits::RecordStream;
use header::{FORMAT_3D_INDEXED, FORMAT_3D_TRUE, FORMAT_PALETTE};

/// Blanking flag in the record status byte.
const STATUS_BLANKED: u8 = 0x40;

/// Hard failures reported by [`IldaDecoder::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError {
    /// Stream ended before a full 32-byte header was read.
    Truncated,
    /// Header does not start with the "ILDA" tag.
    BadMagic,
    /// Format code outside {0, 1, 2, 4, 5}.
    UnsupportedFormat(u8),
}

/// Decoder cursor state.
///
/// `Restart` is entered from every failure path (truncated header,
/// zero-record terminator, short record read) and seeks back to the
/// first header, which is also how normal looping playback works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    Closed,
    Streaming,
    FrameBoundary,
    Restart,
}

/// Stateful decoder over a [`RecordStream`].
///
/// Owns the stream exclusively while open; `close` hands it back.
pub struct IldaDecoder<S: RecordStream> {
    stream: Option<S>,
    state: State,
    current: IldaHeader,
    bytes_per_record: u8,
    frame_idx: u16,
    record_idx: u16,
    /// Byte offset of the next record to read.
    next_offset: u32,
    /// Persistent palette for indexed-colour formats, RGB per entry.
    /// Survives frame boundaries and restarts.
    palette: [[u8; 3]; 256],
}

impl<S: RecordStream> Default for IldaDecoder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RecordStream> IldaDecoder<S> {
    pub const fn new() -> Self {
        Self {
            stream: None,
            state: State::Closed,
            current: IldaHeader {
                format: 0,
                records: 0,
                frame_number: 0,
                total_frames: 0,
            },
            bytes_per_record: 0,
            frame_idx: 0,
            record_idx: 0,
            next_offset: 0,
            palette: [[0; 3]; 256],
        }
    }

    /// Validate the first header and take ownership of the stream.
    ///
    /// On failure the stream is dropped and the decoder stays closed,
    /// so a failed open is equivalent to never starting playback.
    pub fn open(&mut self, mut stream: S) -> Result<(), OpenError> {
        self.stream = None;
        self.state = State::Closed;

        stream.seek(0);
        let mut raw = [0u8; HEADER_LEN];
        if stream.read(&mut raw) != HEADER_LEN {
            return Err(OpenError::Truncated);
        }
        if !IldaHeader::has_magic(&raw) {
            return Err(OpenError::BadMagic);
        }
        let h = IldaHeader::parse(&raw);
        if !header::format_supported(h.format) {
            return Err(OpenError::UnsupportedFormat(h.format));
        }

        self.current = h;
        self.bytes_per_record = h.bytes_per_record();
        self.frame_idx = 0;
        self.record_idx = 0;
        self.next_offset = stream.position();
        self.stream = Some(stream);
        self.state = State::Streaming;
        Ok(())
    }

    /// Release the underlying stream and stop decoding.
    pub fn close(&mut self) -> Option<S> {
        self.state = State::Closed;
        self.take_stream()
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Frame index within the current pass over the file.
    pub fn frame_index(&self) -> u16 {
        self.frame_idx
    }

    /// Record index within the current frame.
    pub fn record_index(&self) -> u16 {
        self.record_idx
    }

    fn take_stream(&mut self) -> Option<S> {
        self.stream.take()
    }

    /// Fill `out` with up to `out.len()` decoded points.
    ///
    /// Returns the number of points emitted. Zero is not an error: the
    /// decoder may be closed, or the stream unreadable this call (it
    /// will retry the restart on the next call).
    pub fn decode_chunk(&mut self, out: &mut [Point]) -> usize {
        let mut emitted = 0;
        // Guards against spinning on a stream that fails right after
        // every restart: a second restart with no points emitted since
        // the previous one ends this call.
        let mut last_restart_emitted: Option<usize> = None;

        while emitted < out.len() {
            match self.state {
                State::Closed => return emitted,

                State::Restart => {
                    if last_restart_emitted == Some(emitted) {
                        return emitted;
                    }
                    last_restart_emitted = Some(emitted);
                    if !self.restart() {
                        return emitted;
                    }
                }

                State::FrameBoundary => {
                    let Some(stream) = self.stream.as_mut() else {
                        self.state = State::Closed;
                        return emitted;
                    };
                    let mut raw = [0u8; HEADER_LEN];
                    if stream.read(&mut raw) != HEADER_LEN {
                        // Truncated file: treat as end-of-sequence.
                        self.state = State::Restart;
                        continue;
                    }
                    let h = IldaHeader::parse(&raw);
                    if h.records == 0 || h.bytes_per_record() == 0 {
                        // Explicit terminator, or a format whose records
                        // this decoder cannot read.
                        self.state = State::Restart;
                        continue;
                    }
                    self.current = h;
                    self.bytes_per_record = h.bytes_per_record();
                    self.frame_idx = self.frame_idx.wrapping_add(1);
                    self.record_idx = 0;
                    self.next_offset = stream.position();
                    self.state = State::Streaming;
                }

                State::Streaming => {
                    if self.record_idx >= self.current.records {
                        self.state = State::FrameBoundary;
                        continue;
                    }
                    let Some(stream) = self.stream.as_mut() else {
                        self.state = State::Closed;
                        return emitted;
                    };
                    if stream.position() != self.next_offset {
                        stream.seek(self.next_offset);
                    }
                    let len = self.bytes_per_record as usize;
                    let mut rec = [0u8; 10];
                    if stream.read(&mut rec[..len]) != len {
                        // Short read mid-frame: corruption or truncation.
                        self.state = State::Restart;
                        continue;
                    }
                    let slot = self.record_idx;
                    self.record_idx += 1;
                    self.next_offset = stream.position();

                    if self.current.format == FORMAT_PALETTE {
                        // Palette records are stored, never emitted.
                        // File order is B, G, R.
                        if let Some(entry) = self.palette.get_mut(slot as usize) {
                            *entry = [rec[2], rec[1], rec[0]];
                        }
                        continue;
                    }

                    out[emitted] = self.decode_record(&rec);
                    emitted += 1;
                }
            }
        }
        emitted
    }

    /// Seek to offset zero and re-adopt the first header.
    ///
    /// Returns `false` when even the first header cannot be read; the
    /// decoder stays in `Restart` and tries again on the next call.
    fn restart(&mut self) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            self.state = State::Closed;
            return false;
        };
        stream.seek(0);
        let mut raw = [0u8; HEADER_LEN];
        if stream.read(&mut raw) != HEADER_LEN {
            return false;
        }
        // The first header was validated at open; trust it here.
        let h = IldaHeader::parse(&raw);
        if h.bytes_per_record() == 0 {
            return false;
        }
        self.current = h;
        self.bytes_per_record = h.bytes_per_record();
        self.frame_idx = 0;
        self.record_idx = 0;
        self.next_offset = stream.position();
        self.state = State::Streaming;
        true
    }

    /// Decode one non-palette record into a point.
    fn decode_record(&self, rec: &[u8]) -> Point {
        let raw_x = i16::from_be_bytes([rec[0], rec[1]]);
        let raw_y = i16::from_be_bytes([rec[2], rec[3]]);

        // 3-D formats carry a Z word: read past it, unused for output.
        let is_3d =
            self.current.format == FORMAT_3D_INDEXED || self.current.format == FORMAT_3D_TRUE;
        let status_at = if is_3d { 6 } else { 4 };
        let status = rec[status_at];

        let (r, g, b) = if status & STATUS_BLANKED != 0 {
            // Blanked points suppress colour regardless of the fields.
            (0, 0, 0)
        } else if self.current.format == FORMAT_3D_INDEXED
            || self.current.format == header::FORMAT_2D_INDEXED
        {
            let entry = self.palette[rec[status_at + 1] as usize];
            (
                expand_channel(entry[0]),
                expand_channel(entry[1]),
                expand_channel(entry[2]),
            )
        } else {
            // True-colour records carry B, G, R after the status byte.
            (
                expand_channel(rec[status_at + 3]),
                expand_channel(rec[status_at + 2]),
                expand_channel(rec[status_at + 1]),
            )
        };

        Point::from_signed_xy(raw_x, raw_y, r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory RecordStream fixture.
    struct MemStream {
        data: heapless::Vec<u8, 1024>,
        pos: usize,
    }

    impl MemStream {
        fn new(bytes: &[u8]) -> Self {
            let mut data = heapless::Vec::new();
            data.extend_from_slice(bytes).unwrap();
            Self { data, pos: 0 }
        }
    }

    impl RecordStream for MemStream {
        fn read(&mut self, buf: &mut [u8]) -> usize {
            let avail = self.data.len().saturating_sub(self.pos);
            let n = buf.len().min(avail);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            n
        }

        fn seek(&mut self, offset: u32) {
            self.pos = offset as usize;
        }

        fn position(&self) -> u32 {
            self.pos as u32
        }
    }

    fn push_header(out: &mut heapless::Vec<u8, 1024>, format: u8, records: u16) {
        let mut h = [0u8; HEADER_LEN];
        h[..4].copy_from_slice(b"ILDA");
        h[7] = format;
        h[24..26].copy_from_slice(&records.to_be_bytes());
        out.extend_from_slice(&h).unwrap();
    }

    /// Format 5 record: X, Y big-endian, status, B, G, R.
    fn push_record_2d_true(
        out: &mut heapless::Vec<u8, 1024>,
        x: i16,
        y: i16,
        status: u8,
        r: u8,
        g: u8,
        b: u8,
    ) {
        out.extend_from_slice(&x.to_be_bytes()).unwrap();
        out.extend_from_slice(&y.to_be_bytes()).unwrap();
        out.extend_from_slice(&[status, b, g, r]).unwrap();
    }

    fn open_decoder(bytes: &[u8]) -> IldaDecoder<MemStream> {
        let mut dec = IldaDecoder::new();
        dec.open(MemStream::new(bytes)).unwrap();
        dec
    }

    #[test]
    fn test_open_rejects_bad_magic() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 5, 1);
        file[0] = b'X';
        let mut dec: IldaDecoder<MemStream> = IldaDecoder::new();
        assert_eq!(dec.open(MemStream::new(&file)), Err(OpenError::BadMagic));
        assert!(!dec.is_open());
    }

    #[test]
    fn test_open_rejects_unsupported_format() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 3, 1);
        let mut dec: IldaDecoder<MemStream> = IldaDecoder::new();
        assert_eq!(
            dec.open(MemStream::new(&file)),
            Err(OpenError::UnsupportedFormat(3))
        );
        assert!(!dec.is_open());
    }

    #[test]
    fn test_open_rejects_truncated_header() {
        let mut dec: IldaDecoder<MemStream> = IldaDecoder::new();
        assert_eq!(
            dec.open(MemStream::new(b"ILDA\x00\x00")),
            Err(OpenError::Truncated)
        );
    }

    #[test]
    fn test_closed_decoder_emits_nothing() {
        let mut dec: IldaDecoder<MemStream> = IldaDecoder::new();
        let mut out = [Point::BLANK; 4];
        assert_eq!(dec.decode_chunk(&mut out), 0);
    }

    #[test]
    fn test_format5_decode_and_blanking_bit() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 5, 2);
        push_record_2d_true(&mut file, 0, 0, 0x00, 255, 0, 0);
        push_record_2d_true(&mut file, 100, -100, STATUS_BLANKED, 12, 34, 56);

        let mut dec = open_decoder(&file);
        let mut out = [Point::BLANK; 2];
        assert_eq!(dec.decode_chunk(&mut out), 2);

        assert_eq!(
            out[0],
            Point {
                x: 0x8000,
                y: 0x8000,
                r: 0xFFFF,
                g: 0,
                b: 0
            }
        );
        // Status bit 6 blanks the point regardless of its colour bytes.
        assert_eq!(out[1].x, 0x8064);
        assert_eq!(out[1].y, 0x8064);
        assert!(out[1].is_blanked());
    }

    #[test]
    fn test_zero_record_terminator_loops_to_first_frame() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 5, 2);
        push_record_2d_true(&mut file, 10, 0, 0, 1, 2, 3);
        push_record_2d_true(&mut file, 20, 0, 0, 4, 5, 6);
        push_header(&mut file, 5, 0); // terminator

        let mut dec = open_decoder(&file);
        let mut out = [Point::BLANK; 2];
        assert_eq!(dec.decode_chunk(&mut out), 2);
        let first_pass = out;

        // The very next call resumes from the file's first frame.
        assert_eq!(dec.decode_chunk(&mut out), 2);
        assert_eq!(out, first_pass);
        assert_eq!(dec.frame_index(), 0);
        assert_eq!(dec.record_index(), 2);
    }

    #[test]
    fn test_truncated_file_loops_without_terminator() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 5, 1);
        push_record_2d_true(&mut file, 10, 0, 0, 1, 2, 3);
        // EOF right after the frame - no terminator header.

        let mut dec = open_decoder(&file);
        let mut out = [Point::BLANK; 3];
        // One record per pass, looping twice within a single chunk call.
        assert_eq!(dec.decode_chunk(&mut out), 3);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn test_truncated_record_restarts_stream() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 5, 3);
        push_record_2d_true(&mut file, 10, 0, 0, 1, 2, 3);
        file.extend_from_slice(&[0x00, 0x05]).unwrap(); // torn second record

        let mut dec = open_decoder(&file);
        let mut out = [Point::BLANK; 2];
        assert_eq!(dec.decode_chunk(&mut out), 2);
        // Second point is the first record again, after the restart.
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn test_palette_section_feeds_indexed_frame() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 2, 2);
        file.extend_from_slice(&[0x10, 0x20, 0x30]).unwrap(); // slot 0: B,G,R
        file.extend_from_slice(&[0xFF, 0x00, 0xAA]).unwrap(); // slot 1
        push_header(&mut file, 1, 1);
        // Format 1 record: X, Y, status, colour index.
        file.extend_from_slice(&50i16.to_be_bytes()).unwrap();
        file.extend_from_slice(&0i16.to_be_bytes()).unwrap();
        file.extend_from_slice(&[0x00, 0x01]).unwrap();

        let mut dec = open_decoder(&file);
        let mut out = [Point::BLANK; 1];
        // Palette records fill no output slots; the one point comes from
        // the indexed frame using palette slot 1.
        assert_eq!(dec.decode_chunk(&mut out), 1);
        assert_eq!(out[0].r, 0xAAAA);
        assert_eq!(out[0].g, 0x0000);
        assert_eq!(out[0].b, 0xFFFF);
    }

    #[test]
    fn test_format0_skips_z_word() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        // Palette slot 0 via a palette section first.
        push_header(&mut file, 2, 1);
        file.extend_from_slice(&[0x01, 0x02, 0x03]).unwrap();
        push_header(&mut file, 0, 1);
        // Format 0 record: X, Y, Z, status, colour index.
        file.extend_from_slice(&7i16.to_be_bytes()).unwrap();
        file.extend_from_slice(&(-7i16).to_be_bytes()).unwrap();
        file.extend_from_slice(&1234i16.to_be_bytes()).unwrap();
        file.extend_from_slice(&[0x00, 0x00]).unwrap();

        let mut dec = open_decoder(&file);
        let mut out = [Point::BLANK; 1];
        assert_eq!(dec.decode_chunk(&mut out), 1);
        assert_eq!(out[0].x, 0x8007);
        assert_eq!(out[0].y, 0x8007);
        assert_eq!(out[0].r, 0x0303);
        assert_eq!(out[0].g, 0x0202);
        assert_eq!(out[0].b, 0x0101);
    }

    #[test]
    fn test_close_returns_stream() {
        let mut file: heapless::Vec<u8, 1024> = heapless::Vec::new();
        push_header(&mut file, 5, 1);
        push_record_2d_true(&mut file, 0, 0, 0, 1, 1, 1);

        let mut dec = open_decoder(&file);
        assert!(dec.is_open());
        assert!(dec.close().is_some());
        assert!(!dec.is_open());

        let mut out = [Point::BLANK; 1];
        assert_eq!(dec.decode_chunk(&mut out), 0);
    }
}
