//! A small CSS selector subset: compound selectors (`*`, tag, `#id`, `.class`)
//! joined by descendant combinators, in comma-separated lists.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DomError, Result};
use crate::node::{Arena, Node, NodeId};

static COMPOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*|[A-Za-z][A-Za-z0-9-]*)?((?:[#.][A-Za-z_-][A-Za-z0-9_-]*)*)$")
        .expect("compound selector pattern is valid")
});

static QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([#.])([A-Za-z_-][A-Za-z0-9_-]*)").expect("qualifier pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.ids.iter().all(|id| node.id.as_deref() == Some(id.as_str()))
            && self.classes.iter().all(|class| node.classes.contains(class))
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    /// Each alternative is ancestor-first; the last compound is the subject.
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: String| DomError::InvalidSelector {
            selector: source.to_string(),
            reason,
        };

        if source.trim().is_empty() {
            return Err(invalid("empty selector".to_string()));
        }

        let mut alternatives = Vec::new();
        for part in source.split(',') {
            let compounds = part
                .split_whitespace()
                .map(|text| parse_compound(text).ok_or_else(|| invalid(format!("unsupported syntax '{text}'"))))
                .collect::<Result<Vec<_>>>()?;
            if compounds.is_empty() {
                return Err(invalid("empty entry in selector list".to_string()));
            }
            alternatives.push(compounds);
        }

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn matches(&self, arena: &Arena, id: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|compounds| matches_complex(compounds, arena, id))
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_compound(text: &str) -> Option<Compound> {
    let captures = COMPOUND.captures(text)?;
    let mut compound = Compound {
        tag: captures
            .get(1)
            .map(|m| m.as_str())
            .filter(|tag| *tag != "*")
            .map(str::to_string),
        ..Default::default()
    };
    let qualifiers = captures.get(2).map_or("", |m| m.as_str());
    for qualifier in QUALIFIER.captures_iter(qualifiers) {
        let name = qualifier[2].to_string();
        match &qualifier[1] {
            "#" => compound.ids.push(name),
            _ => compound.classes.push(name),
        }
    }
    Some(compound)
}

fn matches_complex(compounds: &[Compound], arena: &Arena, id: NodeId) -> bool {
    let Some((subject, ancestors)) = compounds.split_last() else {
        return false;
    };
    let Some(node) = arena.get(id) else {
        return false;
    };
    if !subject.matches(node) {
        return false;
    }

    // Descendant combinators only: matching each compound against the
    // nearest qualifying ancestor is sufficient.
    let mut chain = arena.ancestry(id).skip(1);
    ancestors.iter().rev().all(|compound| {
        chain.any(|ancestor| arena.get(ancestor).is_some_and(|n| compound.matches(n)))
    })
}
