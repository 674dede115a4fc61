/// Velocity component naming utilities
///
/// Provides consistent component names across plot formats, figures and data input.
use std::fmt;
use std::str::FromStr;

use crate::error::PlotError;

/// Number of velocity components carried by every field.
pub const COMPONENT_COUNT: usize = 3;

/// Get all component names as a static array
pub const COMPONENT_NAMES: [&str; COMPONENT_COUNT] = ["u", "v", "w"];

/// One of the three velocity components of a wind field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    U,
    V,
    W,
}

impl Component {
    pub const ALL: [Component; COMPONENT_COUNT] = [Component::U, Component::V, Component::W];

    /// Array index of this component (0=u, 1=v, 2=w).
    pub fn index(self) -> usize {
        match self {
            Component::U => 0,
            Component::V => 1,
            Component::W => 2,
        }
    }

    pub fn name(self) -> &'static str {
        COMPONENT_NAMES[self.index()]
    }

    pub fn from_index(index: usize) -> Result<Self, PlotError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| PlotError::UnknownComponent(index.to_string()))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = PlotError;

    /// Accepts `u`, `v`, `w` (either case) or `0`, `1`, `2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "0" => Ok(Component::U),
            "v" | "1" => Ok(Component::V),
            "w" | "2" => Ok(Component::W),
            _ => Err(PlotError::UnknownComponent(s.to_string())),
        }
    }
}

/// Parses a comma separated component list such as `u,w` or `0,1,2`.
pub fn parse_component_list(list: &str) -> Result<Vec<Component>, PlotError> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}
