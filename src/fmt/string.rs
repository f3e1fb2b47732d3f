use std::fmt::Display;

/// Replace every `{}` in `fmt` with the next argument, left to right.
///
/// Placeholders without a matching argument are kept as `{}`, arguments
/// without a placeholder are ignored.
pub fn format_string(fmt: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(fmt.len() + args.len() * 8);
    let mut args = args.iter();
    let mut rest = fmt;
    while let Some(i) = rest.find("{}") {
        out.push_str(&rest[..i]);
        match args.next() {
            Some(arg) => out.push_str(&arg.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[i + 2..];
    }
    out.push_str(rest);
    out
}

/// Substitute `{lead}{name}` placeholders in a single pass.
///
/// `table` maps placeholder names (without the lead character) to their
/// values. When several names match at one position the longest wins.
/// Doubling the lead character in front of a known placeholder escapes it:
/// with `lead = '%'`, `%%msg` renders as the literal `%msg`. Substituted
/// values are never scanned again.
pub fn substitute_placeholders(template: &str, lead: char, table: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(i) = rest.find(lead) {
        out.push_str(&rest[..i]);
        let after = &rest[i + lead.len_utf8()..];
        if let Some(after_escape) = after.strip_prefix(lead) {
            if let Some((name, _)) = longest_match(after_escape, table) {
                out.push(lead);
                out.push_str(name);
                rest = &after_escape[name.len()..];
                continue;
            }
        }
        match longest_match(after, table) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len()..];
            }
            None => {
                out.push(lead);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn longest_match<'a>(s: &str, table: &[(&'a str, &'a str)]) -> Option<(&'a str, &'a str)> {
    table
        .iter()
        .filter(|(name, _)| !name.is_empty() && s.starts_with(name))
        .max_by_key(|(name, _)| name.len())
        .copied()
}

/// Split on any of the characters in `delims`, trimming tokens and
/// dropping empty ones.
pub fn split(s: &str, delims: &str) -> Vec<String> {
    s.split(|c: char| delims.contains(c))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Separators accepted between the items of a list value
pub const LIST_SEPARATORS: &str = " \t\r\n,|;";

/// Split a list value: tokens separated by whitespace, `,`, `|` or `;`
pub fn split_list(s: &str) -> Vec<String> {
    split(s, LIST_SEPARATORS)
}

/// Strip one pair of matching single or double quotes around `s`.
pub fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parse common spellings of a boolean, case-insensitive.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub trait ReplaceLineEnding {
    /// Rewrite every line break to `line_ending`.
    ///
    /// A trailing line ending is kept if present, or added if
    /// `force_trailing_newline` is set.
    fn replace_line_ending(&self, line_ending: &str, force_trailing_newline: bool) -> String;
}

impl ReplaceLineEnding for str {
    fn replace_line_ending(&self, line_ending: &str, force_trailing_newline: bool) -> String {
        let has_trailing_newline = force_trailing_newline || self.ends_with('\n');
        let mut result = String::with_capacity(self.len() + line_ending.len());
        let mut lines = self.lines().peekable();
        while let Some(line) = lines.next() {
            result.push_str(line);
            if lines.peek().is_some() {
                result.push_str(line_ending);
            }
        }
        if has_trailing_newline {
            result.push_str(line_ending);
        }
        result
    }
}
