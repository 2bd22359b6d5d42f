use crate::config::Settings;

/// Where an element is in the expand/collapse cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    Collapsed,
    Collapsing,
    Expanding,
    Expanded,
}

impl ElementState {
    /// State inferred from layout for an element the engine has not touched.
    pub fn from_rendered_height(height: u32) -> Self {
        if height == 0 {
            ElementState::Collapsed
        } else {
            ElementState::Expanded
        }
    }

    /// True while heading to, or resting at, full height.
    pub fn is_open(self) -> bool {
        matches!(self, ElementState::Expanding | ElementState::Expanded)
    }

    /// The transient class projected for this state, if any.
    pub fn marker(self, settings: &Settings) -> Option<&str> {
        match self {
            ElementState::Expanding => Some(settings.expanding_class.as_str()),
            ElementState::Collapsing => Some(settings.collapsing_class.as_str()),
            ElementState::Collapsed | ElementState::Expanded => None,
        }
    }

    /// True when no transition is in flight.
    pub fn is_settled(self) -> bool {
        matches!(self, ElementState::Collapsed | ElementState::Expanded)
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementState::Collapsed => "collapsed",
            ElementState::Collapsing => "collapsing",
            ElementState::Expanding => "expanding",
            ElementState::Expanded => "expanded",
        };
        f.write_str(name)
    }
}
