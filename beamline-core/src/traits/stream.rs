//! Seekable byte source for the ILDA decoder

/// A seekable, readable byte source (SD file, test fixture).
///
/// Failures are reported as short or zero reads, never as errors: the
/// decoder treats any short read as truncation and recovers by
/// restarting from offset zero, so there is nothing useful an error
/// variant could add.
pub trait RecordStream {
    /// Read up to `buf.len()` bytes at the current position, advancing it.
    ///
    /// Returns the number of bytes actually read; fewer than requested
    /// means end-of-stream or an underlying read fault.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Move the read position to an absolute byte offset.
    fn seek(&mut self, offset: u32);

    /// Current absolute read position.
    fn position(&self) -> u32;
}
