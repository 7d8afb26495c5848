//! Intent classification for short, colloquial, mixed-language messages.
//!
//! Messages are English with Hindi-transliterated terms mixed in, so a
//! single keyword list misclassifies too often. Classification runs three
//! ordered stages and falls through:
//!
//! 1. pattern stage — anchored regexes for unambiguous booking and fetch
//!    phrasings; booking patterns are checked first and the first category
//!    with any match wins outright;
//! 2. weighted-keyword stage — three independent scores from curated
//!    keyword lists, then contextual adjustments applied in a fixed order;
//! 3. decision stage — fixed thresholds, then a last-resort keyword
//!    fallback.
//!
//! The stage order, thresholds, and phrase lists are load-bearing:
//! reordering them changes classification outcomes.

use std::sync::LazyLock;

use regex::Regex;

// ============================================================================
// Intent
// ============================================================================

/// The classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Book a new meeting.
    Book,
    /// List or query existing meetings.
    Fetch,
    /// Small talk or a general question.
    Chat,
    /// No category won; routed to the conversational responder.
    Unknown,
}

// ============================================================================
// Keyword lists
// ============================================================================

// Single words match whole tokens; phrases (containing a space or
// apostrophe-s forms) match as substrings.

const BOOKING_KEYWORDS: &[&str] = &[
    "book",
    "schedule",
    "set up",
    "add event",
    "arrange",
    "fix",
    "meet",
    "meeting",
    "appointment",
    "call",
    "zoom",
    "google meet",
    // Hindi-transliterated
    "baithak",
    "milna",
    "mulaqat",
    "nirdharit",
];

const FETCH_KEYWORDS: &[&str] = &[
    "list",
    "show",
    "view",
    "check",
    "display",
    "upcoming",
    "agenda",
    "today",
    "tomorrow",
    "week",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "what meetings",
    "today's schedule",
    "meeting list",
    // Hindi-transliterated
    "dikhao",
    "batao",
    "aaj ki meeting",
    "kal ki meeting",
    "meri meeting",
    "kya meeting",
    "kaun si meeting",
];

const CHAT_KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "yo",
    "thanks",
    "thank you",
    "bye",
    "goodbye",
    "good morning",
    "good afternoon",
    "good evening",
    "how are you",
    "who are you",
    "are you a bot",
    "what day",
    "what date",
    // Hindi-transliterated
    "namaste",
    "aaj kya hai",
    "kaun ho",
];

const STRONG_BOOKING_PHRASES: &[&str] = &[
    "let's meet",
    "can we meet",
    "meeting with",
    "call with",
    "lunch with",
    "dinner with",
    "coffee with",
];

const STRONG_FETCH_PHRASES: &[&str] = &[
    "free today",
    "free tomorrow",
    "busy today",
    "busy tomorrow",
    "what's my schedule",
    "check my calendar",
];

const INTERROGATIVE_STARTS: &[&str] = &[
    "what", "when", "where", "which", "how", "do i", "am i", "is there",
];

const FILLER_WORDS: &[&str] = &[
    "please", "hey", "um", "umm", "ok", "okay", "so", "just", "the", "a", "an", "can", "you",
    "me", "my", "hai", "ji", "na", "to",
];

const FALLBACK_BOOKING_TERMS: &[&str] = &["meet", "call", "appointment"];
const FALLBACK_FETCH_TERMS: &[&str] = &["show", "list", "today", "tomorrow", "schedule"];

// ============================================================================
// Pattern stage regexes
// ============================================================================

static BOOKING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "book/schedule/set up ... meeting/appointment/call"
        Regex::new(r"\b(book|schedule|set\s*up|arrange|fix)\b.{0,40}\b(meeting|appointment|call|event|slot)\b")
            .expect("Invalid regex"),
        // "meeting ... schedule karo" (verb after the noun)
        Regex::new(r"\b(meeting|appointment|call)\b.{0,30}\b(book|schedule)\b")
            .expect("Invalid regex"),
    ]
});

static FETCH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "what/when/do i have ... meeting(s)"
        Regex::new(r"\b(what|when|do\s+i\s+have)\b.{0,40}\bmeetings?\b").expect("Invalid regex"),
        // "list/show/view ... meetings/events/schedule/calendar"
        Regex::new(r"\b(list|show|view)\b.{0,30}\b(meetings?|events?|schedule|calendar)\b")
            .expect("Invalid regex"),
    ]
});

// ============================================================================
// Classifier
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
struct Scores {
    booking: i32,
    fetch: i32,
    chat: i32,
}

/// Three-stage intent classifier.
///
/// Pure function of `(text, temporal_present)`: no state, safe to share
/// across concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a message. `temporal_present` is whether the date/time
    /// extractor found a temporal reference in the same text.
    pub fn classify(&self, text: &str, temporal_present: bool) -> Intent {
        let text = text.to_lowercase();
        let text = text.trim();

        // Stage 1: deterministic patterns, booking checked first.
        if BOOKING_PATTERNS.iter().any(|p| p.is_match(text)) {
            return Intent::Book;
        }
        if FETCH_PATTERNS.iter().any(|p| p.is_match(text)) {
            return Intent::Fetch;
        }

        // Stage 2: weighted keywords plus contextual adjustments.
        let words: Vec<&str> = tokenize(text);
        let mut scores = Scores {
            booking: keyword_score(text, &words, BOOKING_KEYWORDS),
            fetch: keyword_score(text, &words, FETCH_KEYWORDS),
            chat: keyword_score(text, &words, CHAT_KEYWORDS),
        };

        if INTERROGATIVE_STARTS.iter().any(|s| text.starts_with(s)) {
            scores.fetch += 2;
        }
        if temporal_present && scores.booking > 0 {
            scores.booking += 2;
        }
        if temporal_present && scores.fetch > 0 {
            scores.fetch += 1;
        }
        if STRONG_BOOKING_PHRASES.iter().any(|p| text.contains(p)) {
            scores.booking += 3;
        }
        if STRONG_FETCH_PHRASES.iter().any(|p| text.contains(p)) {
            scores.fetch += 3;
        }

        // Very short messages with any chat signal are greetings.
        let content_words = words
            .iter()
            .filter(|w| !FILLER_WORDS.contains(w))
            .count();
        if content_words <= 2 && scores.chat > 0 {
            return Intent::Chat;
        }

        // Stage 3: decision thresholds, then keyword fallback.
        if scores.booking >= 2 && scores.booking > scores.fetch {
            Intent::Book
        } else if scores.fetch >= 1 && scores.fetch >= scores.booking {
            Intent::Fetch
        } else if scores.chat > scores.booking && scores.chat > scores.fetch {
            Intent::Chat
        } else if temporal_present && FALLBACK_BOOKING_TERMS.iter().any(|t| text.contains(t)) {
            Intent::Book
        } else if FALLBACK_FETCH_TERMS.iter().any(|t| text.contains(t)) {
            Intent::Fetch
        } else {
            Intent::Unknown
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect()
}

/// Count keyword occurrences: single words against tokens, phrases as
/// substrings.
fn keyword_score(text: &str, words: &[&str], keywords: &[&str]) -> i32 {
    let mut score = 0;
    for kw in keywords {
        if kw.contains(' ') {
            score += text.matches(kw).count() as i32;
        } else {
            score += words.iter().filter(|w| *w == kw).count() as i32;
        }
    }
    score
}

// ============================================================================
// Tests
// ============================================================================
