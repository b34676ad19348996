//! SD card file access
//!
//! Adapter glue between the FAT filesystem layer and the decoder's
//! stream interface.

use embedded_sdmmc::{BlockDevice, File, TimeSource, Timestamp};

use beamline_core::traits::RecordStream;

/// Timestamp source for a board with no RTC. Files are only ever read,
/// so the epoch placeholder never lands on disk.
pub struct NullTimeSource;

impl TimeSource for NullTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// An open FAT file exposed as a seekable record stream.
///
/// Filesystem failures surface as short reads, which the decoder
/// treats as restart points rather than errors.
pub struct SdFileStream<
    'a,
    D,
    T,
    const MAX_DIRS: usize,
    const MAX_FILES: usize,
    const MAX_VOLUMES: usize,
> where
    D: BlockDevice,
    T: TimeSource,
{
    file: File<'a, D, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>,
}

impl<'a, D, T, const MAX_DIRS: usize, const MAX_FILES: usize, const MAX_VOLUMES: usize>
    SdFileStream<'a, D, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>
where
    D: BlockDevice,
    T: TimeSource,
{
    pub fn new(file: File<'a, D, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>) -> Self {
        Self { file }
    }
}

impl<'a, D, T, const MAX_DIRS: usize, const MAX_FILES: usize, const MAX_VOLUMES: usize>
    RecordStream for SdFileStream<'a, D, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>
where
    D: BlockDevice,
    T: TimeSource,
{
    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.file.read(buf).unwrap_or(0)
    }

    fn seek(&mut self, offset: u32) {
        let _ = self.file.seek_from_start(offset);
    }

    fn position(&self) -> u32 {
        self.file.offset()
    }
}
