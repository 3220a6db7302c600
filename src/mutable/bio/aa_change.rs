use regex::Regex;

use crate::types::ResidueNumber;

// How the amino acid change of a variant row is written.
//   PlainDigits:     "R273H", "175R>175H" - the position is the first run of digits
//   ProteinNotation: "p.Arg273His", optionally with an "ENSP...:" prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AaChangeNotation {
    PlainDigits,
    ProteinNotation,
}

lazy_static! {
    static ref DIGITS_RE: Regex = Regex::new(r"\d+").unwrap();
    static ref PROTEIN_POSITION_RE: Regex = Regex::new(r"p\.(\D*)(\d+)").unwrap();
    static ref DIGIT_SPLIT_RE: Regex = Regex::new(r"(\d+)").unwrap();
}

// "." is what the cohort tables use for "no protein change"
pub fn is_placeholder_aa_change(aa_change: &str) -> bool {
    let trimmed = aa_change.trim();
    trimmed.is_empty() || trimmed == "."
}

pub fn first_digits(text: &str) -> Option<&str> {
    DIGITS_RE.find(text).map(|m| m.as_str())
}

// the text after the last ':', so "ENSP00000269305:p.Arg273His" gives
// "p.Arg273His"
pub fn strip_transcript_prefix(aa_change: &str) -> &str {
    aa_change.rsplit(':').next().unwrap_or(aa_change)
}

pub fn parse_aa_position(aa_change: &str, notation: AaChangeNotation)
    -> Option<ResidueNumber>
{
    let digits =
        match notation {
            AaChangeNotation::PlainDigits => first_digits(aa_change)?,
            AaChangeNotation::ProteinNotation => {
                let captures = PROTEIN_POSITION_RE.captures(aa_change)?;
                captures.get(2)?.as_str()
            }
        };

    digits.parse().ok()
}

// Split around the digit runs, keeping the digits, and rebuild from the
// first two parts and the last one: "R273H" -> "R273H", "175R>175H" -> "175R>H"
pub fn rebuild_plain_label(aa_change: &str) -> String {
    let trimmed = aa_change.trim();
    let mut parts: Vec<&str> = vec![];
    let mut last_end = 0;

    for digit_match in DIGIT_SPLIT_RE.find_iter(trimmed) {
        if digit_match.start() > last_end {
            parts.push(&trimmed[last_end..digit_match.start()]);
        }
        parts.push(digit_match.as_str());
        last_end = digit_match.end();
    }
    if last_end < trimmed.len() {
        parts.push(&trimmed[last_end..]);
    }

    // "R273" or "273" have nothing to rebuild
    if parts.len() < 3 {
        return trimmed.to_owned();
    }

    format!("{}{}{}", parts[0], parts[1], parts[parts.len() - 1])
}
