//! Callsign extraction from transcribed speech
//!
//! Operators give callsigns two ways: spelled directly ("W1AW") or in the
//! ITU phonetic alphabet ("Whiskey One Alpha Whiskey"). Extraction runs the
//! callsign pattern over the raw transcript first, then rewrites phonetic
//! words to letters and runs the pattern again. Direct matches score higher
//! than phonetic reconstructions, which survive more recognizer mangling.

use std::sync::OnceLock;

use regex::Regex;

/// How a callsign was recovered from the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Matched verbatim in the transcript
    Direct,
    /// Reconstructed from phonetic-alphabet words
    Phonetic,
}

/// A validated callsign candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedCallsign {
    /// Upper-cased callsign text
    pub text: String,
    /// Extraction confidence in [0, 1]
    pub confidence: f32,
    /// How the candidate was recovered
    pub method: ExtractionMethod,
}

const DIRECT_CONFIDENCE: f32 = 0.90;
const PHONETIC_CONFIDENCE: f32 = 0.70;

/// Words that recognizers commonly smear into callsign-shaped tokens
const BANNED_SUBSTRINGS: [&str; 5] = ["HELLO", "OVER", "ROGER", "COPY", "BREAK"];

fn callsign_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[A-Z]{1,2}[0-9]{1,2}[A-Z]{1,4}\b")
            .expect("callsign regex should compile")
    })
}

/// Extract validated callsigns from a transcript.
///
/// Direct matches come first in transcript order, then phonetic
/// reconstructions not already found, in rewritten-text order. No duplicates.
pub fn extract_callsigns(text: &str) -> Vec<ExtractedCallsign> {
    let mut results: Vec<ExtractedCallsign> = Vec::new();

    for m in callsign_regex().find_iter(text) {
        let candidate = m.as_str().to_ascii_uppercase();
        if is_valid_callsign(&candidate) && !results.iter().any(|r| r.text == candidate) {
            results.push(ExtractedCallsign {
                text: candidate,
                confidence: DIRECT_CONFIDENCE,
                method: ExtractionMethod::Direct,
            });
        }
    }

    let rewritten = phonetic_rewrite(text);
    for m in callsign_regex().find_iter(&rewritten) {
        let candidate = m.as_str().to_ascii_uppercase();
        if is_valid_callsign(&candidate) && !results.iter().any(|r| r.text == candidate) {
            results.push(ExtractedCallsign {
                text: candidate,
                confidence: PHONETIC_CONFIDENCE,
                method: ExtractionMethod::Phonetic,
            });
        }
    }

    results
}

/// Callsign validity heuristics.
///
/// Syntax aside, these reject the recognizer confusions that happen to match
/// the callsign pattern: length 4-7, at least one digit, letters at both
/// ends, none of the banned words inside.
pub fn is_valid_callsign(candidate: &str) -> bool {
    let len = candidate.len();
    if !(4..=7).contains(&len) {
        return false;
    }
    if !candidate.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let first = candidate.chars().next();
    let last = candidate.chars().last();
    if !matches!(first, Some(c) if c.is_ascii_alphabetic()) {
        return false;
    }
    if !matches!(last, Some(c) if c.is_ascii_alphabetic()) {
        return false;
    }
    let upper = candidate.to_ascii_uppercase();
    if BANNED_SUBSTRINGS.iter().any(|b| upper.contains(b)) {
        return false;
    }
    true
}

/// Map a spoken token to the letter or digit it spells, if any
fn phonetic_value(token: &str) -> Option<char> {
    let c = match token {
        "alpha" | "alfa" => 'A',
        "bravo" => 'B',
        "charlie" => 'C',
        "delta" => 'D',
        "echo" => 'E',
        "foxtrot" | "fox" => 'F',
        "golf" => 'G',
        "hotel" => 'H',
        "india" => 'I',
        "juliett" | "juliet" => 'J',
        "kilo" => 'K',
        "lima" => 'L',
        "mike" => 'M',
        "november" => 'N',
        "oscar" => 'O',
        "papa" => 'P',
        "quebec" => 'Q',
        "romeo" => 'R',
        "sierra" => 'S',
        "tango" => 'T',
        "uniform" => 'U',
        "victor" => 'V',
        "whiskey" | "whisky" => 'W',
        "xray" => 'X',
        "yankee" => 'Y',
        "zulu" => 'Z',
        "zero" | "oh" => '0',
        "one" | "wun" => '1',
        "two" => '2',
        "three" | "tree" => '3',
        "four" | "fower" => '4',
        "five" | "fife" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" | "ait" => '8',
        "nine" | "niner" => '9',
        _ => return None,
    };
    Some(c)
}

/// Rewrite phonetic-alphabet words into the characters they spell.
///
/// Consecutive phonetic tokens (and bare single letters or digits)
/// accumulate into one word; any other token flushes the accumulator and
/// passes through unchanged. The token `"4"` contributes a `4`; the token
/// `"44"` is opaque and flushes.
fn phonetic_rewrite(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut acc = String::new();

    for token in text.split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '-' | '/' | '\\'))
    {
        if token.is_empty() {
            continue;
        }
        let lower = token.to_ascii_lowercase();
        if let Some(c) = phonetic_value(&lower) {
            acc.push(c);
            continue;
        }
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphanumeric() {
                acc.push(c.to_ascii_uppercase());
                continue;
            }
        }
        if !acc.is_empty() {
            words.push(std::mem::take(&mut acc));
        }
        words.push(token.to_string());
    }

    if !acc.is_empty() {
        words.push(acc);
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn phonetic_only_transcript() {
        let results =
            extract_callsigns("CQ CQ CQ this is Fox Four Juliet Zulu Whiskey portable");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "F4JZW");
        assert_eq!(results[0].method, ExtractionMethod::Phonetic);
        assert!((results[0].confidence - 0.70).abs() < f32::EPSILON);
    }

    #[test]
    fn direct_transcript_yields_both_calls() {
        let results = extract_callsigns("W1AW this is F4JZW");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "W1AW");
        assert_eq!(results[1].text, "F4JZW");
        for r in &results {
            assert_eq!(r.method, ExtractionMethod::Direct);
            assert!((r.confidence - 0.90).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn banned_words_yield_nothing() {
        assert!(extract_callsigns("HELLO WORLD").is_empty());
        assert!(extract_callsigns("roger roger over").is_empty());
    }

    #[test]
    fn lowercase_direct_match_is_uppercased() {
        let results = extract_callsigns("this is w1aw again");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "W1AW");
    }

    #[test]
    fn direct_match_not_duplicated_by_phonetic_pass() {
        // Same callsign spoken both ways in one over.
        let results = extract_callsigns("F4JZW Fox Four Juliet Zulu Whiskey");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, ExtractionMethod::Direct);
    }

    #[test]
    fn ait_and_niner_variants_decode() {
        let results = extract_callsigns("Kilo Ait Alpha Bravo Charlie");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "K8ABC");
    }

    #[test]
    fn bare_letters_and_digits_accumulate() {
        let results = extract_callsigns("W 1 A W calling");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "W1AW");
        assert_eq!(results[0].method, ExtractionMethod::Phonetic);
    }

    #[test]
    fn multi_digit_numeral_is_opaque() {
        // "44" flushes the accumulator, so no callsign forms around it.
        assert!(extract_callsigns("Whiskey 44 Alpha").is_empty());
    }

    #[test]
    fn validation_boundaries() {
        assert!(is_valid_callsign("W1AW"));
        assert!(is_valid_callsign("VK2ABCD"));
        assert!(!is_valid_callsign("W1A")); // too short
        assert!(!is_valid_callsign("VK2ABCDE")); // too long
        assert!(!is_valid_callsign("WAAW")); // no digit
        assert!(!is_valid_callsign("1W1AW")); // leading digit
        assert!(!is_valid_callsign("W1AW1")); // trailing digit
        assert!(!is_valid_callsign("W1COPY")); // banned word
    }

    proptest! {
        #[test]
        fn results_are_unique_and_valid(text in "[A-Za-z0-9 ,./-]{0,80}") {
            let results = extract_callsigns(&text);
            for (i, r) in results.iter().enumerate() {
                prop_assert!(is_valid_callsign(&r.text));
                prop_assert!(results[..i].iter().all(|p| p.text != r.text));
            }
        }

        #[test]
        fn direct_results_precede_phonetic(text in "[A-Za-z0-9 ]{0,60}") {
            let results = extract_callsigns(&text);
            let first_phonetic = results
                .iter()
                .position(|r| r.method == ExtractionMethod::Phonetic)
                .unwrap_or(results.len());
            prop_assert!(results[first_phonetic..]
                .iter()
                .all(|r| r.method == ExtractionMethod::Phonetic));
        }
    }
}
