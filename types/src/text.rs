//! Small pure text helpers.

use std::borrow::Cow;

/// Length in characters, the unit the details budget is measured in.
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Reverse the chat platform's markup escaping (`&lt;`, `&amp;`, `&#35;`, ...).
///
/// Single pass, so `&amp;lt;` becomes `&lt;` rather than `<`. Unknown or
/// unterminated entities are kept as written.
#[must_use]
pub fn unescape_markup(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let decoded = after
            .find(';')
            .and_then(|end| decode_entity(&after[..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}
