use std::fmt;
use std::str::FromStr;

use crate::error::{DomError, Result};
use crate::selector::Selector;

/// A CSS `height` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Height {
    #[default]
    Auto,
    Px(u32),
}

impl Height {
    pub fn px(self) -> Option<u32> {
        match self {
            Height::Px(px) => Some(px),
            Height::Auto => None,
        }
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Height::Auto => f.write_str("auto"),
            Height::Px(px) => write!(f, "{px}px"),
        }
    }
}

impl FromStr for Height {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Height::Auto);
        }
        let number = value.strip_suffix("px").unwrap_or(value);
        // Unitless values other than zero are not valid CSS lengths.
        if number.len() == value.len() && number != "0" {
            return Err(DomError::InvalidHeight(s.to_string()));
        }
        match number.parse::<f64>() {
            Ok(px) if px.is_finite() && px >= 0.0 => Ok(Height::Px(px.round() as u32)),
            _ => Err(DomError::InvalidHeight(s.to_string())),
        }
    }
}

/// Inline style overrides of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub height: Option<Height>,
    pub transition: Option<String>,
}

/// A stylesheet rule. Only the properties the document models are kept.
#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: Selector,
    pub height: Option<Height>,
    pub transition: Option<String>,
    pub display_none: bool,
}

impl Rule {
    pub fn new(selector: &str) -> Result<Self> {
        Ok(Self {
            selector: selector.parse()?,
            height: None,
            transition: None,
            display_none: false,
        })
    }

    pub fn height(mut self, height: Height) -> Self {
        self.height = Some(height);
        self
    }

    pub fn transition(mut self, declaration: impl Into<String>) -> Self {
        self.transition = Some(declaration.into());
        self
    }

    pub fn display_none(mut self) -> Self {
        self.display_none = true;
        self
    }
}

/// Ordered rules; later rules win.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}
