use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Canonical name of a catalog component (e.g., `Hours of Operation`).
///
/// Names are the keys of the `components` object and the values written to
/// persistent storage.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentName(pub String);

/// Short URL-safe alias for a component (e.g., `hours`).
///
/// Only aliases travel in the `pinned` query parameter.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alias(pub String);

impl ComponentName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Alias {
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ComponentName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Alias {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ComponentName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Alias {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The two button flavors a card can carry.
///
/// Pinned cards offer `Unpin`; search results offer `Pin`. The CSS class is
/// also the delegated click selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Affordance {
    Pin,
    Unpin,
}

impl Affordance {
    pub fn for_pinned(pinned: bool) -> Self {
        if pinned {
            Affordance::Unpin
        } else {
            Affordance::Pin
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Affordance::Pin => "pin-button",
            Affordance::Unpin => "unpin-button",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Affordance::Pin => "Pin",
            Affordance::Unpin => "Unpin",
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "pin-button" => Some(Affordance::Pin),
            "unpin-button" => Some(Affordance::Unpin),
            _ => None,
        }
    }
}
