use crate::Result;
use image::ImageReader;
use std::io::Cursor;

/// What a front-end shows next to the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    /// Format detected from the bytes, if recognised.
    pub detected_media_type: Option<&'static str>,
}

impl Preview {
    pub fn caption(&self) -> String {
        match self.detected_media_type {
            Some(media_type) => format!("Preview ({}x{}, {})", self.width, self.height, media_type),
            None => format!("Preview ({}x{})", self.width, self.height),
        }
    }
}

/// Reads the image header to get its dimensions. Pixel data is not decoded.
pub fn inspect(bytes: &[u8]) -> Result<Preview> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let detected_media_type = reader.format().map(|f| f.to_mime_type());
    let (width, height) = reader.into_dimensions()?;

    Ok(Preview {
        width,
        height,
        detected_media_type,
    })
}
