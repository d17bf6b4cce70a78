//! Numeric field extraction shared by the table parsers

/// Leading whitespace separated numbers of `text` in `radix`, stopping at the
/// first token that is not a number (e.g. the description on an interrupt line).
pub fn parse_fields(text: &str, radix: u32) -> impl Iterator<Item = u64> + '_ {
    text.split_whitespace().map_while(move |token| u64::from_str_radix(token, radix).ok())
}

/// Parse the first `n + 1` fields of `text` and return field `n`
#[must_use]
pub fn nth_field(text: &str, n: usize, radix: u32) -> Option<u64> {
    for (index, value) in parse_fields(text, radix).enumerate() {
        if index == n {
            return Some(value);
        }
    }
    None
}

/// Text after the first `:` (the counters of an interrupt table line)
#[must_use]
pub fn after_label(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, rest)| rest)
}
