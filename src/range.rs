// (low, high); (0, 0) when unparseable
pub type NumericRange = (f64, f64);

// Hyphen, en dash, em dash, non-breaking hyphen
const DASHES: [char; 4] = ['-', '\u{2013}', '\u{2014}', '\u{2011}'];

// Parse strings like "12-34", "12–34" or "1,234-2,345" into a (low, high) pair
pub fn parse_range(input: Option<&str>) -> NumericRange {
    let Some(text) = input else { return (0.0, 0.0) };

    let parts: Vec<&str> = text.split(&DASHES[..]).collect();
    match parts.as_slice() {
        [low, high] => (parse_component(low), parse_component(high)),
        _ => (0.0, 0.0),
    }
}

fn parse_component(raw: &str) -> f64 {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    strip_trailing_group_separator(&mut cleaned);
    let normalized = cleaned.replacen(',', ".", 1);
    leading_number(&normalized).unwrap_or(0.0)
}

// "1,234" -> "1234", "1.234" -> "1234"; "1,23" and "1,2345" are left alone
fn strip_trailing_group_separator(s: &mut String) {
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len < 4 {
        return;
    }
    let sep = bytes[len - 4];
    if (sep == b'.' || sep == b',') && bytes[len - 3..].iter().all(u8::is_ascii_digit) {
        s.remove(len - 4);
    }
}

// Longest prefix that reads as a decimal literal, e.g. "1.5.2" -> 1.5
fn leading_number(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_hyphen_range() {
        assert_eq!(parse_range(Some("12-34")), (12.0, 34.0));
    }

    #[test]
    fn accepts_unicode_dashes() {
        assert_eq!(parse_range(Some("12\u{2013}34")), (12.0, 34.0));
        assert_eq!(parse_range(Some("12\u{2014}34")), (12.0, 34.0));
        assert_eq!(parse_range(Some("12\u{2011}34")), (12.0, 34.0));
    }

    #[test]
    fn missing_or_empty_input_is_zero() {
        assert_eq!(parse_range(None), (0.0, 0.0));
        assert_eq!(parse_range(Some("")), (0.0, 0.0));
    }

    #[test]
    fn wrong_number_of_parts_is_zero() {
        assert_eq!(parse_range(Some("42")), (0.0, 0.0));
        assert_eq!(parse_range(Some("1-2-3")), (0.0, 0.0));
        assert_eq!(parse_range(Some("1\u{2013}2-3")), (0.0, 0.0));
    }

    #[test]
    fn strips_trailing_thousands_group() {
        assert_eq!(parse_range(Some("1,234-2,345")), (1234.0, 2345.0));
        assert_eq!(parse_range(Some("1.234-2.345")), (1234.0, 2345.0));
    }

    #[test]
    fn comma_is_a_decimal_point_otherwise() {
        assert_eq!(parse_range(Some("12,5-34,1")), (12.5, 34.1));
        assert_eq!(parse_range(Some("1,23-1,2345")), (1.23, 1.2345));
    }

    #[test]
    fn ignores_units_and_whitespace() {
        assert_eq!(parse_range(Some(" 5 ppm - 10 ppm")), (5.0, 10.0));
        assert_eq!(parse_range(Some("20°C – 30°C")), (20.0, 30.0));
    }

    #[test]
    fn non_numeric_side_becomes_zero() {
        assert_eq!(parse_range(Some("abc-7")), (0.0, 7.0));
        assert_eq!(parse_range(Some("-")), (0.0, 0.0));
    }

    #[test]
    fn takes_leading_number_when_several_dots_remain() {
        assert_eq!(parse_range(Some("1.5.2-3")), (1.5, 3.0));
    }

    #[test]
    fn leading_separator_stays_fractional() {
        assert_eq!(parse_range(Some("x, 1-2")), (0.1, 2.0));
    }
}
