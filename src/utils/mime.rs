//! Image MIME type resolution for uploads

/// Resolve the MIME type of an uploaded image
///
/// A declared `image/*` type wins. Missing or generic declarations such as
/// `application/octet-stream` fall back to magic-byte detection. Returns
/// `None` when the bytes are not a recognised image.
pub fn resolve_image_mime(declared: Option<&str>, bytes: &[u8]) -> Option<String> {
    if let Some(declared) = declared.map(str::trim) {
        if declared.starts_with("image/") {
            return Some(declared.to_ascii_lowercase());
        }
    }

    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type().to_string())
}
