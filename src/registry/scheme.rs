//! Scheme extraction from raw reference strings.

/// Split a raw reference into an optional scheme and the remainder.
///
/// The scheme is everything before the first colon. A single letter
/// followed by `:\` or `:/` is a Windows drive path, not a scheme, so
/// `C:\work\notes.md` routes to the default backend intact.
pub fn parse_scheme(input: &str) -> (Option<&str>, &str) {
    let Some(idx) = input.find(':') else {
        return (None, input);
    };

    if idx == 1 {
        let next = input.as_bytes().get(2);
        if matches!(next, Some(b'\\') | Some(b'/')) {
            return (None, input);
        }
    }

    (Some(&input[..idx]), &input[idx + 1..])
}
