use std::time::Duration;

/// Configuration for a single entry of a CSS `transition` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionConfig {
    pub property: String,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl TransitionConfig {
    pub fn new(property: impl Into<String>, duration: Duration, easing: Easing) -> Self {
        Self {
            property: property.into(),
            duration,
            delay: Duration::ZERO,
            easing,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns true if this entry animates `property` (directly or via `all`).
    pub fn applies_to(&self, property: &str) -> bool {
        self.property == property || self.property == "all"
    }

    /// Time from the style change until the transition ends.
    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }
}

/// Easing function for transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Apply easing to progress (0.0 to 1.0).
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }

    /// Parse a CSS timing keyword. `ease` is approximated by `EaseInOut`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "linear" => Some(Easing::Linear),
            "ease-in" => Some(Easing::EaseIn),
            "ease-out" => Some(Easing::EaseOut),
            "ease" | "ease-in-out" => Some(Easing::EaseInOut),
            _ => None,
        }
    }
}

/// Parse a CSS time value (`300ms`, `0.3s`). Negative values clamp to zero.
pub fn parse_time(token: &str) -> Option<Duration> {
    let (number, scale) = if let Some(ms) = token.strip_suffix("ms") {
        (ms, 1e6)
    } else if let Some(s) = token.strip_suffix('s') {
        (s, 1e9)
    } else {
        return None;
    };
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(Duration::from_nanos((value * scale).max(0.0).round() as u64))
}

/// Parse a comma-separated CSS `transition` declaration.
///
/// Each entry follows the CSS shorthand: an optional property name, up to two
/// times (duration then delay) and an optional timing function. Entries that
/// cannot be understood are skipped.
pub fn parse_transitions(declaration: &str) -> Vec<TransitionConfig> {
    split_top_level(declaration, |c| c == ',')
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(parse_entry)
        .collect()
}

/// Substring test for a property name inside a transition declaration.
pub fn mentions_property(declaration: &str, property: &str) -> bool {
    declaration.contains(property)
}

fn parse_entry(entry: &str) -> Option<TransitionConfig> {
    let mut property: Option<String> = None;
    let mut times = Vec::with_capacity(2);
    let mut easing = Easing::EaseInOut;

    for token in split_top_level(entry, char::is_whitespace) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(time) = parse_time(token) {
            times.push(time);
        } else if let Some(parsed) = Easing::from_keyword(token) {
            easing = parsed;
        } else if token.contains('(') {
            log::warn!("Unsupported timing function '{}', using linear", token);
            easing = Easing::Linear;
        } else if property.is_none() && is_ident(token) {
            property = Some(token.to_string());
        } else {
            log::warn!("Skipping malformed transition entry '{}'", entry.trim());
            return None;
        }
    }

    if times.len() > 2 {
        log::warn!("Skipping malformed transition entry '{}'", entry.trim());
        return None;
    }

    let mut times = times.into_iter();
    Some(TransitionConfig {
        property: property.unwrap_or_else(|| "all".to_string()),
        duration: times.next().unwrap_or_default(),
        delay: times.next().unwrap_or_default(),
        easing,
    })
}

fn is_ident(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '-')
}

/// Split on `is_sep` while ignoring separators nested in parentheses.
fn split_top_level(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}
