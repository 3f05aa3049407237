//! Filesystem-safe file names for resolved stream titles.

/// Longest file name most Linux filesystems accept (NAME_MAX), in bytes.
const NAME_MAX: usize = 255;

/// Sanitizes a resolved title for use as a file stem.
///
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing spaces, dots and underscores
/// - Leaves room for `.<extension>` and the `.part` suffix within NAME_MAX
///
/// Spaces inside the title are kept; the file names are meant for people.
pub fn sanitize_title(title: &str, extension: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_underscore = false;

    for c in title.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');
    let stem = if trimmed.is_empty() { "download" } else { trimmed };

    let budget = NAME_MAX.saturating_sub(extension.len() + ".part".len() + 1);
    if stem.len() > budget {
        let mut take = budget;
        while take > 0 && !stem.is_char_boundary(take) {
            take -= 1;
        }
        stem[..take].to_string()
    } else {
        stem.to_string()
    }
}

/// `<sanitized title>.<extension>`
pub fn stream_file_name(title: &str, extension: &str) -> String {
    format!("{}.{}", sanitize_title(title, extension), extension)
}
