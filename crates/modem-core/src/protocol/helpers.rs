//! Low-level helpers shared by the reply parsers.

use super::error::ParseError;

/// Return the text following `tag`, trimmed, or `None` if the tag is absent.
pub fn strip_tag<'a>(reply: &'a str, tag: &str) -> Option<&'a str> {
    reply.find(tag).map(|idx| reply[idx + tag.len()..].trim())
}

/// Trim a field and remove one pair of surrounding double quotes.
///
/// Returns `None` when nothing is left.
pub fn unquote(field: &str) -> Option<&str> {
    let field = field.trim();
    let field = field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field);
    if field.is_empty() { None } else { Some(field) }
}

/// Split a reply body into top-level groups.
///
/// `(0-6),(0,2,3)` yields `["0-6", "0,2,3"]`; bare items between commas are
/// returned as-is, so `1,2` yields `["1", "2"]`.
pub fn split_groups<'a>(command: &'static str, text: &'a str) -> Result<Vec<&'a str>, ParseError> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, c) in text.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    start = idx + 1;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(ParseError::malformed(command, text));
                }
                depth -= 1;
                if depth == 0 {
                    groups.push(text[start..idx].trim());
                    start = idx + 1;
                }
            }
            ',' if depth == 0 => {
                let bare = text[start..idx].trim();
                if !bare.is_empty() {
                    groups.push(bare);
                }
                start = idx + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::malformed(command, text));
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        groups.push(tail);
    }

    Ok(groups)
}

/// Widest `low-high` span expanded by [`parse_uint_list`].
pub const MAX_RANGE_SPAN: u32 = 255;

/// Parse a list of unsigned integers, e.g. `0,2,3`, `0-6` or `0-2,5`.
///
/// An empty string yields an empty list. Ranges wider than
/// [`MAX_RANGE_SPAN`] are rejected as malformed.
pub fn parse_uint_list(command: &'static str, text: &str) -> Result<Vec<u32>, ParseError> {
    let mut values = Vec::new();
    let text = text.trim();
    if text.is_empty() {
        return Ok(values);
    }

    for item in text.split(',') {
        let item = item.trim();
        match item.split_once('-') {
            Some((low, high)) => {
                let low = parse_uint(command, low)?;
                let high = parse_uint(command, high)?;
                if low > high || high - low > MAX_RANGE_SPAN {
                    return Err(ParseError::malformed(command, text));
                }
                values.extend(low..=high);
            }
            None => values.push(parse_uint(command, item)?),
        }
    }

    Ok(values)
}

fn parse_uint(command: &'static str, text: &str) -> Result<u32, ParseError> {
    text.trim()
        .parse()
        .map_err(|_| ParseError::malformed(command, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tag() {
        assert_eq!(strip_tag("+URAT: 1,2\r\n", "+URAT:"), Some("1,2"));
        assert_eq!(strip_tag("\r\n+URAT: (0-6)", "+URAT:"), Some("(0-6)"));
        assert_eq!(strip_tag("+CFUN: 1", "+URAT:"), None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"ECM\""), Some("ECM"));
        assert_eq!(unquote(" RNDIS "), Some("RNDIS"));
        assert_eq!(unquote("\"\""), None);
        assert_eq!(unquote(""), None);
    }

    #[test]
    fn test_split_groups() {
        assert_eq!(split_groups("t", "(0-6),(0,2,3)").unwrap(), vec!["0-6", "0,2,3"]);
        assert_eq!(split_groups("t", "(0-6)").unwrap(), vec!["0-6"]);
        assert_eq!(split_groups("t", "(0-6),()").unwrap(), vec!["0-6", ""]);
        assert_eq!(split_groups("t", "1,2").unwrap(), vec!["1", "2"]);
        assert!(split_groups("t", "(0-6").is_err());
        assert!(split_groups("t", "0-6)").is_err());
    }

    #[test]
    fn test_parse_uint_list() {
        assert_eq!(parse_uint_list("t", "0-6").unwrap(), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(parse_uint_list("t", "0,2,3").unwrap(), vec![0, 2, 3]);
        assert_eq!(parse_uint_list("t", "0-2, 5").unwrap(), vec![0, 1, 2, 5]);
        assert!(parse_uint_list("t", "").unwrap().is_empty());
        assert!(parse_uint_list("t", "4-2").is_err());
        assert!(parse_uint_list("t", "a").is_err());
    }

    #[test]
    fn test_parse_uint_list_range_limit() {
        assert_eq!(parse_uint_list("t", "0-255").unwrap().len(), 256);
        assert!(matches!(
            parse_uint_list("t", "0-256"),
            Err(ParseError::MalformedReply { .. })
        ));
        assert!(matches!(
            parse_uint_list("t", "0-4000000000"),
            Err(ParseError::MalformedReply { .. })
        ));
    }
}
