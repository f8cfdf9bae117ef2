//! EXIF orientation lookup.

use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

use super::orientation::Orientation;

/// Reads the metadata the pipeline needs from acquired files.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// EXIF orientation of an in-memory image file.
    ///
    /// Returns `None` if the file has no EXIF data or extraction fails.
    pub fn orientation_from_bytes(bytes: &[u8]) -> Option<Orientation> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new().read_from_container(&mut cursor).ok()?;
        Self::orientation_of(&exif)
    }

    fn orientation_of(exif: &exif::Exif) -> Option<Orientation> {
        Self::get_u32(exif, Tag::Orientation).map(Orientation::from_exif)
    }

    /// Get a u32 field from EXIF data.
    fn get_u32(exif: &exif::Exif, tag: Tag) -> Option<u32> {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| x as u32),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
    }
}
