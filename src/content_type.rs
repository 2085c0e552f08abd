//! File extension to MIME type resolution
//!
//! The backend sends raw bytes and a filename; the MIME type used to
//! display the bytes is derived from the filename extension.

/// MIME type used when the extension is unknown or missing
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Resolve a file extension (without the dot) to a MIME type
///
/// Matching is case-insensitive. Unknown and empty extensions resolve to
/// [`DEFAULT_CONTENT_TYPE`].
///
/// # Examples
///
/// ```
/// use phototag::content_type::resolve;
///
/// assert_eq!(resolve("PNG"), "image/png");
/// assert_eq!(resolve("jpg"), "image/jpeg");
/// assert_eq!(resolve("webp"), "image/jpeg");
/// ```
pub fn resolve(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "tiff" => "image/tiff",
        "icon" | "ico" => "image/vnd.microsoft.icon",
        "x-icon" => "image/x-icon",
        "djvu" => "image/vnd.djvu",
        "svg" => "image/svg+xml",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Extension of `filename`: the text after the last `.`, or `""`
pub fn extension_of(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

/// Resolve the MIME type for a filename by its extension
pub fn resolve_filename(filename: &str) -> &'static str {
    resolve(extension_of(filename))
}
