use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for file extensions kept on storage names (without the leading dot)
    /// - Valid: "pdf", "PNG", "mp4", "7z"
    /// - Invalid: "", "tar.gz", "p df", "exe;rm", "averyveryverylongext"
    pub static ref EXTENSION_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]{1,16}$").unwrap();
}

/// Extension of a client-supplied filename, including the leading dot
///
/// Only the last path component is considered and only the part after its
/// last dot. Returns an empty string when there is no usable extension.
/// A dotfile such as `.bashrc` has an empty stem and yields no extension, so it is
/// stored under the bare token.
pub fn storage_extension(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && EXTENSION_REGEX.is_match(ext) => {
            format!(".{}", ext)
        }
        _ => String::new(),
    }
}

/// Make an untrusted filename safe to embed in a quoted header parameter
pub fn sanitize_header_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
