//! Identifier normalization shared by result entries and search terms.

use std::fmt::Write as _;

/// Converts a label or search term into the identifier form used for prefix matching.
///
/// The input is lowercased, then ASCII letters, digits, `_` and every code point at or
/// above 0x80 pass through unchanged. Any other character is written as `_` followed by
/// its code point in lowercase hex, padded to two digits (`' '` becomes `_20`).
///
/// The output only contains characters that pass through, so normalizing twice is the
/// same as normalizing once.
pub fn normalize_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if passes_through(c) {
            id.push(c);
        } else {
            let _ = write!(id, "_{:02x}", u32::from(c));
        }
    }
    id
}

/// Normalizes a raw search term: trims surrounding whitespace, lowercases, then applies
/// [`normalize_id`].
pub fn normalize_term(term: &str) -> String {
    normalize_id(&term.trim().to_lowercase())
}

fn passes_through(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || u32::from(c) >= 0x80
}

/// Decodes the HTML entities Doxygen writes into result labels.
///
/// Unknown entities are left as-is.
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            decode_entity(entity).map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
