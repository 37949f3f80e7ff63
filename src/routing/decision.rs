//! Pure routing decision: trigger keywords first, then the detected language.

use super::traits::{LanguageTag, RoutingDecision};

/// Separators users commonly type between the trigger and the question.
const TRIGGER_SEPARATORS: &[char] = &[':', '：', ',', '，', '、'];

/// Assistant trigger prefixes, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSet {
    triggers: Vec<String>,
}

impl TriggerSet {
    /// Blank entries are dropped; longer triggers are tried first.
    pub fn new<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut triggers: Vec<String> = triggers
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        triggers.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        triggers.dedup();
        Self { triggers }
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(String::as_str)
    }

    /// If `text` starts with a trigger, the cleaned remainder (possibly empty).
    ///
    /// A trigger ending in a letter must be followed by whitespace, a
    /// separator or the end of the text; CJK triggers need no boundary.
    pub fn strip<'a>(&self, text: &'a str) -> Option<&'a str> {
        let text = text.trim_start();
        self.triggers.iter().find_map(|trigger| {
            let rest = strip_prefix_ignore_case(text, trigger)?;
            if !ends_at_boundary(trigger, rest) {
                return None;
            }
            Some(rest.trim_start_matches(is_separator).trim_end())
        })
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || TRIGGER_SEPARATORS.contains(&c)
}

fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

fn ends_at_boundary(trigger: &str, rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(next) => is_separator(next) || trigger.chars().last().is_some_and(is_cjk),
    }
}

/// `text.strip_prefix(prefix)`, comparing lowercase forms.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut wanted = prefix.chars().flat_map(char::to_lowercase).peekable();
    for (idx, ch) in text.char_indices() {
        if wanted.peek().is_none() {
            return Some(&text[idx..]);
        }
        for lower in ch.to_lowercase() {
            if wanted.next() != Some(lower) {
                return None;
            }
        }
    }
    wanted.peek().is_none().then_some("")
}

/// Step 1: trigger detection. `None` means "not a trigger, detect the language".
///
/// Triggers are only honoured when the assistant is available; otherwise the
/// text is translated like any other message.
pub fn route_trigger(
    text: &str,
    triggers: &TriggerSet,
    ai_enabled: bool,
) -> Option<RoutingDecision> {
    if !ai_enabled {
        return None;
    }
    let question = triggers.strip(text)?;
    if question.is_empty() {
        Some(RoutingDecision::Help)
    } else {
        Some(RoutingDecision::AiAssist {
            question: question.to_string(),
        })
    }
}

/// Step 2: language pair for a detected language.
pub fn route_language(tag: &LanguageTag) -> RoutingDecision {
    match tag {
        LanguageTag::ZhTw | LanguageTag::ZhCn => RoutingDecision::Translate {
            source: tag.clone(),
            target: LanguageTag::Id,
        },
        LanguageTag::Id => RoutingDecision::Translate {
            source: LanguageTag::Id,
            target: LanguageTag::ZhTw,
        },
        LanguageTag::En => RoutingDecision::Translate {
            source: LanguageTag::En,
            target: LanguageTag::Id,
        },
        LanguageTag::Other(_) => RoutingDecision::Ignore,
    }
}

/// Offline language guess used when detection is unavailable: any CJK
/// ideograph means Chinese, otherwise Indonesian.
pub fn guess_language(text: &str) -> LanguageTag {
    if text.chars().any(is_cjk) {
        LanguageTag::ZhTw
    } else {
        LanguageTag::Id
    }
}
