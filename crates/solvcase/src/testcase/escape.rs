use std::borrow::Cow;

fn needs_escape(b: u8) -> bool {
    matches!(b, b'\\' | b' ' | b'\t')
}

/// Escape backslash, space and tab as `\XX` with lowercase hex digits
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' | ' ' | '\t' => {
                out.push('\\');
                out.push_str(&hex::encode([c as u8]));
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Undo [`escape`]. A backslash not followed by two hex digits stays as is.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 2 < bytes.len() {
            if let Ok(decoded) = hex::decode(&bytes[i + 1..i + 3]) {
                out.extend_from_slice(&decoded);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}
