//! Character reference decoding for text and attribute values.
//!
//! Covers numeric references (`&#38;`, `&#x26;`) and the named references
//! that show up in hand-written templates. Anything else is left as-is.

const NAMED: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("trade", "\u{2122}"),
    ("hellip", "\u{2026}"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("laquo", "\u{ab}"),
    ("raquo", "\u{bb}"),
    ("middot", "\u{b7}"),
    ("bull", "\u{2022}"),
    ("times", "\u{d7}"),
    ("divide", "\u{f7}"),
    ("plusmn", "\u{b1}"),
    ("deg", "\u{b0}"),
    ("sect", "\u{a7}"),
    ("para", "\u{b6}"),
    ("cent", "\u{a2}"),
    ("pound", "\u{a3}"),
    ("yen", "\u{a5}"),
    ("euro", "\u{20ac}"),
];

/// Decode a character reference starting right after the `&`.
///
/// Returns the decoded text and the number of characters consumed
/// (including the terminating `;`), or `None` when `input` does not start
/// with a complete, known reference.
pub fn decode(input: &[char]) -> Option<(String, usize)> {
    let end = input.iter().take(32).position(|&c| c == ';')?;
    let body: String = input[..end].iter().collect();

    let decoded = if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok()?
            }
            Some(_) => return None,
            None if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) => {
                number.parse().ok()?
            }
            None => return None,
        };
        char::from_u32(code)?.to_string()
    } else {
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        let (_, text) = NAMED.iter().find(|(name, _)| *name == body)?;
        (*text).to_string()
    };

    Some((decoded, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_named_reference() {
        assert_eq!(decode(&chars("amp; rest")), Some(("&".to_string(), 4)));
        assert_eq!(decode(&chars("nbsp;")), Some(("\u{a0}".to_string(), 5)));
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode(&chars("#38;")), Some(("&".to_string(), 4)));
        assert_eq!(decode(&chars("#x26;")), Some(("&".to_string(), 5)));
        assert_eq!(decode(&chars("#X3C;")), Some(("<".to_string(), 5)));
    }

    #[test]
    fn test_unknown_or_incomplete() {
        assert_eq!(decode(&chars("bogus;")), None);
        assert_eq!(decode(&chars("amp")), None);
        assert_eq!(decode(&chars("#x;")), None);
        assert_eq!(decode(&chars(" amp;")), None);
    }
}
