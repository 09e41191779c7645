//! Hop line parsing.
//!
//! Input lines are `source|destination|claim_id|status_code`. Fields
//! are opaque strings; the status code is deliberately not parsed as a
//! number.

/// Field delimiter in hop lines.
pub const FIELD_DELIMITER: char = '|';

/// One parsed hop line, borrowing from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopRecord<'a> {
    pub source: &'a str,
    pub destination: &'a str,
    pub claim_id: &'a str,
    pub status_code: &'a str,
}

/// Outcome of parsing a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    Hop(HopRecord<'a>),
    /// Empty line (possibly a trailing newline). Ignored, not counted
    /// as malformed.
    Blank,
    /// Wrong field count, or an empty claim id or status code.
    Malformed,
}

/// Parse one input line. Trailing newline characters are stripped;
/// everything else is taken verbatim.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return ParsedLine::Blank;
    }

    let mut fields = line.split(FIELD_DELIMITER);
    let (Some(source), Some(destination), Some(claim_id), Some(status_code), None) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return ParsedLine::Malformed;
    };

    if claim_id.is_empty() || status_code.is_empty() {
        return ParsedLine::Malformed;
    }

    ParsedLine::Hop(HopRecord {
        source,
        destination,
        claim_id,
        status_code,
    })
}
