//! Cheap checks on an acquired file before decoding it.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates acquired files before decode.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that `path` exists, is within the size limit and starts with
    /// known image magic bytes.
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::from_read(path, e))?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let mut header = [0u8; 12];
        let bytes_read = std::fs::File::open(path)
            .and_then(|mut file| file.read(&mut header))
            .map_err(|e| PipelineError::from_read(path, e))?;

        if !Self::is_image_header(&header[..bytes_read]) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `header` starts like a format the gallery or camera can hand
    /// back.
    fn is_image_header(header: &[u8]) -> bool {
        match header {
            [0xFF, 0xD8, 0xFF, ..] => true,
            [0x89, b'P', b'N', b'G', ..] => true,
            [b'G', b'I', b'F', b'8', ..] => true,
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => true,
            [b'B', b'M', ..] => header.len() >= 4,
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => true,
            // HEIC/HEIF/AVIF: ftyp box at offset 4
            [_, _, _, _, b'f', b't', b'y', b'p', ..] => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_headers() {
        assert!(Validator::is_image_header(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(Validator::is_image_header(&[
            0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A
        ]));
        assert!(Validator::is_image_header(b"RIFF\0\0\0\0WEBP"));
        assert!(Validator::is_image_header(b"\0\0\0\x18ftypheic"));
        assert!(Validator::is_image_header(&[b'I', b'I', 0x2A, 0x00]));
    }

    #[test]
    fn test_rejected_headers() {
        assert!(!Validator::is_image_header(&[0, 0, 0, 0]));
        assert!(!Validator::is_image_header(b"RIFF\0\0\0\0WAVE"));
        assert!(!Validator::is_image_header(&[b'I', b'I', 0x00, 0x00]));
        assert!(!Validator::is_image_header(&[0xFF]));
        assert!(!Validator::is_image_header(&[]));
    }

    #[test]
    fn test_missing_file() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator
            .validate(Path::new("/nonexistent/picked.jpg"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn test_text_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, "definitely not a photo").unwrap();
        let err = Validator::new(LimitsConfig::default())
            .validate(&path)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(2 * 1024 * 1024, 0);
        std::fs::write(&path, bytes).unwrap();

        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let err = Validator::new(limits).validate(&path).unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { .. }));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
