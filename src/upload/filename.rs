//! Filename handling for uploads.
//!
//! Client filenames are untrusted. Extension parsing looks only at the last
//! path component and its final suffix; the download name is rebuilt from a
//! sanitized stem so it is always safe to place in a `Content-Disposition`
//! header.

/// Prefix added to every download filename.
pub const DOWNLOAD_PREFIX: &str = "compressed_";

/// Stem used when sanitizing leaves nothing behind.
pub const FALLBACK_STEM: &str = "image";

/// Last path component of a client filename, accepting `/` and `\` separators.
pub fn base_name(filename: &str) -> &str {
    filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename)
}

/// Split a filename into stem and extension (without the dot).
///
/// Only the final suffix counts. Leading dots belong to the stem, so
/// `.png` has no extension. A trailing dot yields an empty extension.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    let name = base_name(filename);
    match name.rfind('.') {
        Some(idx) if !name[..idx].chars().all(|c| c == '.') => {
            (&name[..idx], Some(&name[idx + 1..]))
        }
        _ => (name, None),
    }
}

/// Lowercased extension of a filename, if any.
pub fn extension(filename: &str) -> Option<String> {
    split_extension(filename).1.map(str::to_ascii_lowercase)
}

/// Reduce a filename stem to a conservative ASCII subset.
///
/// Whitespace runs become `_`, anything outside `[A-Za-z0-9._-]` is dropped,
/// and leading/trailing `.` and `_` are trimmed.
pub fn sanitize_stem(stem: &str) -> String {
    let joined = stem.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    filtered.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// Build the attachment filename for a processed upload.
///
/// `"compressed_" + sanitized stem + "." + lowercase extension`.
pub fn download_filename(original: &str) -> String {
    let (stem, ext) = split_extension(original);

    let mut stem = sanitize_stem(stem);
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }

    match ext {
        Some(ext) if !ext.is_empty() => {
            format!("{}{}.{}", DOWNLOAD_PREFIX, stem, ext.to_ascii_lowercase())
        }
        _ => format!("{}{}", DOWNLOAD_PREFIX, stem),
    }
}
