//! Request-level checks applied to an upload before any bytes are written.

use audiovault_core::AppError;

/// Longest sanitized filename, in bytes
pub const MAX_FILENAME_BYTES: usize = 200;
const MAX_EXTENSION_BYTES: usize = 16;

/// Normalize MIME type by stripping parameters (e.g. "audio/mpeg; rate=44100" -> "audio/mpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Validate content type against the audio allow-list. Compares the normalized MIME type only.
pub fn validate_content_type(content_type: &str, allowed_types: &[String]) -> Result<(), AppError> {
    let normalized = normalize_mime_type(content_type);
    if !allowed_types
        .iter()
        .any(|ct| normalized == ct.to_lowercase())
    {
        return Err(AppError::UnsupportedMediaType {
            content_type: content_type.to_string(),
            allowed: allowed_types.to_vec(),
        });
    }
    Ok(())
}

/// Sanitize an uploaded filename for use in scratch and storage names.
///
/// Directory components are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`, and runs
/// of dots collapse to one. The result fits in [`MAX_FILENAME_BYTES`] with its extension kept,
/// leaving room for the `{uuid}_` prefix under the 255-byte limit of common filesystems.
pub fn sanitize_filename(filename: &str) -> String {
    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let mut sanitized = String::with_capacity(filename_only.len());
    for c in filename_only.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '.' && sanitized.ends_with('.') {
            continue;
        }
        sanitized.push(c);
    }

    let sanitized = truncate_keeping_extension(sanitized);
    if sanitized.trim_matches('.').len() < 3 {
        return "audio".to_string();
    }
    sanitized
}

fn truncate_keeping_extension(name: String) -> String {
    if name.len() <= MAX_FILENAME_BYTES {
        return name;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION_BYTES => {
            (stem, Some(ext))
        }
        _ => (name.as_str(), None),
    };
    let budget = match ext {
        Some(ext) => MAX_FILENAME_BYTES - ext.len() - 1,
        None => MAX_FILENAME_BYTES,
    };
    let mut cut = budget.min(stem.len());
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    match ext {
        Some(ext) => format!("{}.{}", &stem[..cut], ext),
        None => stem[..cut].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["audio/mpeg".to_string(), "audio/wav".to_string()]
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert!(validate_content_type("audio/mpeg; charset=binary", &allowed()).is_ok());
        assert!(validate_content_type("AUDIO/WAV", &allowed()).is_ok());
    }

    #[test]
    fn content_type_outside_allow_list_is_rejected() {
        let err = validate_content_type("video/mp4", &allowed()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File type video/mp4 is not allowed. Allowed: audio/mpeg, audio/wav"
        );
    }

    #[test]
    fn sanitize_filename_collapses_dot_runs_instead_of_rejecting() {
        assert_eq!(sanitize_filename("take..mp3"), "take.mp3");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(".."), "audio");
        assert_eq!(sanitize_filename("...."), "audio");
    }

    #[test]
    fn sanitize_filename_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("morning song.mp3"), "morning_song.mp3");
        assert_eq!(sanitize_filename("dir/track-01.wav"), "track-01.wav");
        assert_eq!(sanitize_filename("C:\\music\\set.ogg"), "set.ogg");
        assert_eq!(sanitize_filename("caf\u{e9}.mp3"), "caf_.mp3");
        assert_eq!(sanitize_filename(""), "audio");
    }

    #[test]
    fn long_filename_is_capped_in_bytes_and_keeps_extension() {
        let long = format!("{}.mp3", "a".repeat(240));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.len(), MAX_FILENAME_BYTES);
        assert!(sanitized.ends_with(".mp3"));

        let multibyte = format!("{}.wav", "\u{1F3B5}".repeat(100));
        let sanitized = sanitize_filename(&multibyte);
        assert!(sanitized.len() <= MAX_FILENAME_BYTES);
        assert!(sanitized.ends_with(".wav"));
    }

    #[test]
    fn long_name_without_extension_is_truncated() {
        let sanitized = sanitize_filename(&"b".repeat(300));
        assert_eq!(sanitized, "b".repeat(MAX_FILENAME_BYTES));
    }
}
