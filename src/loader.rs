use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag, Value};
use tracing::debug;

use crate::error::Result;

/// Decoding and scaling as provided by the host's rendering stack.
///
/// Decoding is split from scaling so the cycler can validate a candidate
/// before the output size is known.
pub trait ImageLoader {
    /// A decoded image at its native size.
    type Decoded;
    /// An image scaled to the output, ready to be painted.
    type Frame;

    fn decode(&mut self, path: &Path) -> Result<Self::Decoded>;

    fn scale(&mut self, image: Self::Decoded, width: u32, height: u32) -> Result<Self::Frame>;
}

/// The rotations we honour from the EXIF `Orientation` tag.
/// Mirrored orientations (2, 4, 5, 7) are shown unrotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    Rotate180,
    Rotate90Cw,
    Rotate90Ccw,
}

impl Orientation {
    pub fn from_exif(value: u16) -> Self {
        match value {
            3 => Self::Rotate180,
            6 => Self::Rotate90Cw,
            8 => Self::Rotate90Ccw,
            _ => Self::Normal,
        }
    }
}

/// Reads the orientation from the image's EXIF block, if it has one.
pub fn read_orientation(path: &Path, bytes: &[u8]) -> Orientation {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No EXIF data for {}: {e}", path.display());
            return Orientation::Normal;
        }
    };

    match exif.get_field(Tag::Orientation, In::PRIMARY).map(|f| &f.value) {
        Some(Value::Short(values)) if !values.is_empty() => Orientation::from_exif(values[0]),
        _ => Orientation::Normal,
    }
}

/// Lowercased extension with a leading dot, as decoders expect for a hint.
pub fn extension_hint(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    format!(".{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A JPEG that is nothing but SOI, an APP1 EXIF segment carrying a
    /// single Orientation entry, and EOI.
    fn jpeg_with_orientation(value: u8) -> Vec<u8> {
        let mut tiff = vec![b'I', b'I', 0x2a, 0x00, 0x08, 0x00, 0x00, 0x00];
        tiff.extend_from_slice(&[0x01, 0x00]);
        tiff.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(&[value, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);
        let len = (payload.len() + 2) as u16;

        let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
        jpeg.extend_from_slice(&len.to_be_bytes());
        jpeg.extend_from_slice(&payload);
        jpeg.extend_from_slice(&[0xff, 0xd9]);
        jpeg
    }

    #[test]
    fn reads_rotation_from_jpeg() {
        let path = Path::new("photo.jpg");
        assert_eq!(read_orientation(path, &jpeg_with_orientation(6)), Orientation::Rotate90Cw);
        assert_eq!(read_orientation(path, &jpeg_with_orientation(3)), Orientation::Rotate180);
        assert_eq!(read_orientation(path, &jpeg_with_orientation(8)), Orientation::Rotate90Ccw);
    }

    #[test]
    fn mirrored_and_missing_orientations_are_normal() {
        let path = Path::new("photo.jpg");
        assert_eq!(read_orientation(path, &jpeg_with_orientation(2)), Orientation::Normal);
        assert_eq!(read_orientation(path, b"not an image"), Orientation::Normal);
    }

    #[test]
    fn extension_hint_is_lowercase_with_dot() {
        assert_eq!(extension_hint(Path::new("/a/B.JPG")), ".jpg");
        assert_eq!(extension_hint(Path::new("/a/noext")), ".");
    }
}
