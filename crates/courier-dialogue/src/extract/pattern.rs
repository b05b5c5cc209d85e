//! Regex-based slot extraction.
//!
//! Scans every user turn in order so that later mentions overwrite earlier
//! ones. Place names are read word by word after a marker (`from`, `to`,
//! `origin:` ...) and stop at the first connective, temporal word, digit or
//! punctuation. A user turn with no marker at all can still answer the
//! question asked in the assistant turn right before it.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use async_trait::async_trait;
use courier_core::{Role, ShipmentRecord, Slot, Turn};
use regex::Regex;

use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::prompts;

/// Longest place name accepted, in words.
const MAX_PLACE_WORDS: usize = 4;

/// Longest bare reply (no marker) still treated as an answer.
const MAX_BARE_ANSWER_WORDS: usize = MAX_PLACE_WORDS + 2;

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

/// A phrase that introduces a place.
struct Marker {
    re: Regex,
    /// Common English ("to go", "leaving soon") also follows this marker, so
    /// the place must be written with a capital letter.
    needs_capital: bool,
}

struct SlotPatterns {
    origin: Vec<Marker>,
    destination: Vec<Marker>,
    leading_route: Regex,
    dates: Vec<Regex>,
    time: Regex,
}

static PATTERNS: LazyLock<SlotPatterns> = LazyLock::new(|| {
    let mk = |pats: &[(&str, bool)]| -> Vec<Marker> {
        pats.iter()
            .map(|(p, needs_capital)| Marker {
                re: Regex::new(p).expect("Invalid slot regex"),
                needs_capital: *needs_capital,
            })
            .collect()
    };

    const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
    const WEEKDAY: &str = r"(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thu|fri|sat|sun)";

    // Most specific first; the first pattern that matches wins.
    let date_patterns = [
        r"(?i)\b\d{4}-\d{1,2}-\d{1,2}\b".to_string(),
        r"(?i)\b\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}\b".to_string(),
        format!(
            r"(?i)\b(?:{WEEKDAY},?\s+)?(?:the\s+)?\d{{1,2}}(?:st|nd|rd|th)?(?:\s+of)?\s+{MONTH}\b(?:,?\s+\d{{4}}\b)?"
        ),
        format!(
            r"(?i)\b(?:{WEEKDAY},?\s+)?{MONTH}\s+\d{{1,2}}(?:st|nd|rd|th)?\b(?:,?\s+\d{{4}}\b)?"
        ),
        format!(
            r"(?i)\b(?:day\s+after\s+tomorrow|today|tomorrow|tonight|this\s+(?:morning|afternoon|evening)|next\s+(?:week|{WEEKDAY}))\b"
        ),
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b".to_string(),
    ];

    SlotPatterns {
        // Each pattern matches the marker only; the place is read from the
        // text that follows.
        origin: mk(&[
            (r"(?i)\bfrom\s+", false),
            (r"(?i)\borigin(?:\s+city)?(?:\s*:\s*|\s+is\s+)", false),
            (r"(?i)\b(?:leaving|departing)\s+", true),
            (r"(?i)\bcollect(?:ed|ion)?\s+(?:it\s+)?(?:in|at)\s+", true),
        ]),
        destination: mk(&[
            (r"(?i)\bto\s+", true),
            (r"(?i)\bdestination(?:\s+city)?(?:\s*:\s*|\s+is\s+)", false),
            (r"(?i)\b(?:arriving|arrive)\s+(?:in|at)\s+", true),
        ]),
        // "Sheffield to London" with no "from".
        leading_route: Regex::new(r"(?i)^\s*([a-z][a-z' -]*?)\s+to\s+")
            .expect("Invalid leading route regex"),
        dates: date_patterns
            .iter()
            .map(|p| Regex::new(p).expect("Invalid date regex"))
            .collect(),
        time: Regex::new(
            r"(?i)\b(?:\d{1,2}[:.][0-5]\d(?:\s*[ap]m\b)?|\d{1,2}\s*[ap]m\b|noon\b|midnight\b)",
        )
        .expect("Invalid time regex"),
    }
});

/// Words that end a place name.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "to", "from", "at", "on", "by", "for", "in", "and", "or", "via", "then", "before",
        "after", "around", "with", "but", "please", "asap", "today", "tomorrow", "tonight",
        "next", "this", "leaving", "departing", "arriving", "actually", "instead", "soon",
        "now", "later",
    ]
    .into_iter()
    .collect()
});

/// Words that can never start a place name.
static NON_PLACE_STARTS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "me", "us", "you", "i", "it", "them", "my", "our", "your", "here",
        "there", "somewhere", "ship", "send", "deliver", "move", "get", "go", "be", "have",
        "do", "know", "make", "arrange", "book", "collect", "pick", "transport", "post",
        "courier", "yes", "no", "not", "ok", "okay", "sure", "thanks", "thank", "hello", "hi",
        "hey", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
        "noon", "midnight", "morning", "afternoon", "evening", "week", "what", "why", "how",
        "who", "where", "when", "which", "can", "could", "would", "will", "please",
    ]
    .into_iter()
    .chain(STOP_WORDS.iter().copied())
    .chain(NON_PLACE_WORDS.iter().copied())
    .collect()
});

/// Words that can appear nowhere in a place name.
static NON_PLACE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "i", "i'd", "i'm", "i'll", "i've", "we", "we'd", "we're", "we'll",
        "you'd", "let's", "like", "want", "need", "mean", "help", "schedule", "check",
    ]
    .into_iter()
    .collect()
});

// =============================================================================
// PatternExtractor
// =============================================================================

/// Local, deterministic extractor. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract from a whole history synchronously.
    pub fn extract_history(&self, history: &[Turn]) -> ShipmentRecord {
        let mut record = ShipmentRecord::empty();
        let mut last_assistant: Option<&str> = None;

        for turn in history {
            match turn.role {
                Role::Assistant => last_assistant = Some(turn.content.as_str()),
                Role::User => {
                    let awaiting = last_assistant.and_then(prompts::asked_slot);
                    let found = self.extract_message(&turn.content, awaiting);
                    let (merged, _) = record.merge(&found);
                    record = merged;
                }
            }
        }

        record
    }

    /// Extract from one user message.
    ///
    /// `awaiting` is the slot the preceding assistant turn asked for; it lets
    /// a marker-less reply such as "London" fill that slot.
    pub fn extract_message(&self, text: &str, awaiting: Option<Slot>) -> ShipmentRecord {
        let mut origin = last_place(&PATTERNS.origin, text);
        let mut destination = last_place(&PATTERNS.destination, text);

        if origin.is_none() {
            if let Some(caps) = PATTERNS.leading_route.captures(text) {
                let lead = caps[1].trim();
                let place = if starts_with_capital(lead) {
                    take_place(lead)
                } else {
                    None
                };
                if let Some(place) = place {
                    // The whole lead-in must be the place, not "I want".
                    if place.split_whitespace().count() == lead.split_whitespace().count() {
                        origin = Some(place);
                    }
                }
            }
        }

        if origin.is_none() && destination.is_none() {
            if let Some(slot @ (Slot::Origin | Slot::Destination)) = awaiting {
                if let Some(place) = bare_place(text) {
                    match slot {
                        Slot::Origin => origin = Some(place),
                        _ => destination = Some(place),
                    }
                }
            }
        }

        ShipmentRecord {
            origin_city: origin,
            destination_city: destination,
            ship_date_or_time: date_or_time(text),
        }
    }
}

#[async_trait]
impl Extractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn extract(&self, history: &[Turn]) -> Result<ShipmentRecord, ExtractError> {
        Ok(self.extract_history(history))
    }
}

// =============================================================================
// Places
// =============================================================================

/// The last acceptable place following any of the markers.
fn last_place(markers: &[Marker], text: &str) -> Option<String> {
    let mut best: Option<(usize, String)> = None;
    for marker in markers {
        for m in marker.re.find_iter(text) {
            let rest = &text[m.end()..];
            if marker.needs_capital && !starts_with_capital(rest) {
                continue;
            }
            if let Some(place) = take_place(rest) {
                let later = match &best {
                    Some((pos, _)) => m.start() > *pos,
                    None => true,
                };
                if later {
                    best = Some((m.start(), place));
                }
            }
        }
    }
    best.map(|(_, place)| place)
}

/// Read a place name from the start of `rest`.
fn take_place(rest: &str) -> Option<String> {
    let mut words: Vec<&str> = Vec::new();

    for raw in rest.split_whitespace() {
        let word = raw.trim_end_matches([',', '.', '!', '?', ';', ':', ')']);
        let ends_clause = word.len() != raw.len();
        if word.is_empty() {
            break;
        }

        let lower = word.to_lowercase();
        if words.is_empty() && NON_PLACE_STARTS.contains(lower.as_str()) {
            return None;
        }
        let is_name_word = word
            .chars()
            .all(|c| c.is_alphabetic() || c == '-' || c == '\'');
        if STOP_WORDS.contains(lower.as_str()) || !is_name_word {
            break;
        }

        words.push(word);
        if ends_clause || words.len() == MAX_PLACE_WORDS {
            break;
        }
    }

    if words.is_empty()
        || words
            .iter()
            .any(|w| NON_PLACE_WORDS.contains(w.to_lowercase().as_str()))
    {
        return None;
    }
    Some(title_case_if_lower(&words.join(" ")))
}

fn starts_with_capital(text: &str) -> bool {
    text.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase())
}

/// A marker-less reply that is just a place name.
///
/// A question ("what do you mean?") is never an answer.
fn bare_place(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.ends_with('?') || trimmed.split_whitespace().count() > MAX_BARE_ANSWER_WORDS {
        return None;
    }
    take_place(trimmed)
}

/// "newcastle upon tyne" -> "Newcastle Upon Tyne"; mixed case is kept.
fn title_case_if_lower(s: &str) -> String {
    if s.chars().any(|c| c.is_uppercase()) {
        return s.to_string();
    }
    s.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Dates and times
// =============================================================================

/// The date and/or clock time mentioned in `text`, joined `"<date> <time>"`.
fn date_or_time(text: &str) -> Option<String> {
    let date_span: Option<Range<usize>> = PATTERNS
        .dates
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.range());

    // Search for a time outside the date so "07.02.2026" is not read as 07:02.
    let time = match &date_span {
        Some(span) => {
            let masked = mask(text, span.clone());
            PATTERNS.time.find(&masked).map(|m| text[m.range()].to_string())
        }
        None => PATTERNS.time.find(text).map(|m| m.as_str().to_string()),
    };
    let date = date_span.map(|span| text[span].trim().to_string());

    match (date, time) {
        (Some(d), Some(t)) => Some(format!("{} {}", d, t.trim())),
        (Some(d), None) => Some(d),
        (None, Some(t)) => Some(t.trim().to_string()),
        (None, None) => None,
    }
}

/// Replace the bytes in `span` with spaces, keeping offsets intact.
fn mask(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push_str(&" ".repeat(span.end - span.start));
    out.push_str(&text[span.end..]);
    out
}
