//! File-name rules shared by the media walker and the metadata indexer.
//!
//! A media file and its sidecar meet on the *base name*: the media name without
//! its extension, and the descriptor name without its descriptor suffix and
//! without the media extension Takeout embeds before it.
//!
//! ```text
//! IMG_1.jpg       -> IMG_1
//! IMG_1.jpg.json  -> IMG_1
//! IMG_1.json      -> IMG_1
//! trip.v2.mov     -> trip.v2
//! ```

/// Extensions served as media, compared case-insensitively
pub const MEDIA_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "gif", "heic", "heif", "mp4", "mov", "mkv",
];

/// Split `name` at its last dot. Dotfiles like `.json` have no extension.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some((stem, ext)),
        _ => None,
    }
}

pub fn is_media_extension(extension: &str) -> bool {
    MEDIA_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(extension))
}

/// Whether a file name carries an allowlisted media extension
pub fn is_media_file(name: &str) -> bool {
    split_extension(name).map_or(false, |(_, ext)| is_media_extension(ext))
}

/// Join key of a media file: its name without the final extension
pub fn media_base_name(name: &str) -> &str {
    split_extension(name).map_or(name, |(stem, _)| stem)
}

/// Join key of a descriptor file: the descriptor suffix removed, then any
/// residual media extension removed
pub fn descriptor_base_name(name: &str) -> &str {
    let stem = media_base_name(name);
    match split_extension(stem) {
        Some((inner, ext)) if is_media_extension(ext) => inner,
        _ => stem,
    }
}
