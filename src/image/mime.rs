use std::path::Path;

/// Media types the front-ends accept for upload.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// File extensions offered in upload pickers, in display order.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Maps an upload's file name onto its declared media type.
///
/// Returns `None` for anything outside [`ALLOWED_EXTENSIONS`]; callers reject
/// those uploads before they reach [`super::prepare`].
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

pub fn is_supported(media_type: &str) -> bool {
    SUPPORTED_MEDIA_TYPES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(media_type))
}

/// Guesses the media type from magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        _ => None,
    }
}
