//! Roll invocation recognition.
//!
//! Decides whether an inbound chat message is a roll command and whether it
//! asks for hidden delivery. Rules are tried in a fixed priority order:
//!
//! 1. `roll [expr] [reason]` with an optional `-rh` / `--rh` flag
//! 2. `rh...` hidden roll
//! 3. `r...` plain roll
//! 4. `N#...` bare repeat marker
//! 5. `2d6`, `d20`, `p` ... a notation family letter with optional numbers
//!
//! The `r` and `rh` markers must be followed by end of text, a non-letter, or
//! a single family letter, so `random` or `rhythm` are left for other
//! handlers. A bare family letter must be followed by end of text, a digit or
//! an operator, so `a question` is not a roll. Family letters match in either
//! case.

use std::sync::OnceLock;

use regex::Regex;

use dicer_types::RollRequest;

pub const HIDDEN_FLAGS: [&str; 2] = ["-rh", "--rh"];

/// Shorthand rule that matched, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shorthand {
    Command,
    Hidden,
    Plain,
    Repeat,
    /// Bare die marker; `family` is the lower-cased notation family letter.
    Die { family: char },
}

#[derive(Debug)]
struct Grammar {
    command: Regex,
    hidden: Regex,
    plain: Regex,
    repeat: Regex,
    die: Regex,
}

impl Grammar {
    fn new() -> Self {
        Self {
            command: Regex::new(r"(?s)^roll(?:\s+(?P<payload>.*))?$")
                .expect("valid roll command regex"),
            hidden: Regex::new(r"(?s)^rh(?P<payload>|\P{L}.*|(?i:[a-z])(?:\P{L}.*)?)$")
                .expect("valid hidden roll regex"),
            plain: Regex::new(r"(?s)^r(?P<payload>|\P{L}.*|(?i:[a-z])(?:\P{L}.*)?)$")
                .expect("valid plain roll regex"),
            repeat: Regex::new(r"^\d+#").expect("valid repeat marker regex"),
            die: Regex::new(r"^\d*(?P<family>(?i:[dpacf]))(?:$|[\d+\-*/()<>=!#])")
                .expect("valid die marker regex"),
        }
    }
}

static GRAMMAR: OnceLock<Grammar> = OnceLock::new();

fn grammar() -> &'static Grammar {
    GRAMMAR.get_or_init(Grammar::new)
}

/// Inbound chat text plus how it was directed at the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    /// Command prefix the message starts with, if any.
    pub prefix: Option<String>,
    /// The message mentions the bot or arrived in a direct conversation.
    pub addressed: bool,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>, prefix: Option<String>, addressed: bool) -> Self {
        Self {
            text: text.into(),
            prefix,
            addressed,
        }
    }

    /// Build from raw chat text, stripping a leading `@bot_name` mention and
    /// detecting the first configured prefix the remaining text starts with.
    pub fn from_chat(raw: &str, bot_name: &str, prefixes: &[String]) -> Self {
        let (addressed, text) = strip_mention(raw, bot_name);
        let prefix = match_prefix(text, prefixes).map(ToString::to_string);
        Self::new(text, prefix, addressed)
    }
}

fn strip_mention<'a>(raw: &'a str, bot_name: &str) -> (bool, &'a str) {
    let trimmed = raw.trim_start();
    let stripped = trimmed
        .strip_prefix('@')
        .and_then(|rest| rest.strip_prefix(bot_name))
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));
    match stripped {
        Some(rest) if !bot_name.is_empty() => (true, rest.trim_start()),
        _ => (false, trimmed),
    }
}

/// First configured prefix that `text` starts with.
pub fn match_prefix<'a>(text: &str, prefixes: &'a [String]) -> Option<&'a str> {
    let text = text.trim_start();
    prefixes
        .iter()
        .map(String::as_str)
        .find(|prefix| !prefix.is_empty() && text.starts_with(prefix))
}

/// Classify `text` against the shorthand rules.
///
/// Returns the matched rule and the resulting request, or `None` when the
/// message should be left to other handlers.
pub fn classify(
    text: &str,
    prefix: Option<&str>,
    addressed: bool,
) -> Option<(Shorthand, RollRequest)> {
    if prefix.is_none() && !addressed {
        return None;
    }

    let mut body = text.trim_start();
    if let Some(prefix) = prefix {
        body = body.strip_prefix(prefix).unwrap_or(body);
    }
    let body = body.trim();
    let grammar = grammar();

    if let Some(caps) = grammar.command.captures(body) {
        let payload = caps.name("payload").map_or("", |m| m.as_str());
        return Some((Shorthand::Command, command_request(payload)));
    }
    if let Some(caps) = grammar.hidden.captures(body) {
        return Some((Shorthand::Hidden, RollRequest::new(payload_of(&caps), true)));
    }
    if let Some(caps) = grammar.plain.captures(body) {
        return Some((Shorthand::Plain, RollRequest::new(payload_of(&caps), false)));
    }
    if grammar.repeat.is_match(body) {
        return Some((Shorthand::Repeat, RollRequest::new(body, false)));
    }
    if let Some(caps) = grammar.die.captures(body) {
        let family = caps["family"].chars().next()?.to_ascii_lowercase();
        return Some((Shorthand::Die { family }, RollRequest::new(body, false)));
    }
    None
}

/// Recognize a roll invocation. See [`classify`].
pub fn recognize(text: &str, prefix: Option<&str>, addressed: bool) -> Option<RollRequest> {
    classify(text, prefix, addressed).map(|(_, request)| request)
}

fn payload_of(caps: &regex::Captures<'_>) -> String {
    caps.name("payload")
        .map_or("", |m| m.as_str())
        .trim()
        .to_string()
}

/// Parse the argument list of the explicit `roll` command.
///
/// The hidden flag may appear anywhere among the arguments.
pub fn command_request(args: &str) -> RollRequest {
    let mut hidden = false;
    let rest: Vec<&str> = args
        .split_whitespace()
        .filter(|token| {
            let is_flag = HIDDEN_FLAGS.contains(token);
            hidden |= is_flag;
            !is_flag
        })
        .collect();
    RollRequest::new(rest.join(" "), hidden)
}
