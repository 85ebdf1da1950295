use serde::{Deserialize, Serialize};

/// Whether a holder has a card: proven, disproven, or not yet known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriState {
    Yes,
    No,
    #[default]
    Unknown,
}

impl TriState {
    pub const fn is_yes(self) -> bool {
        matches!(self, TriState::Yes)
    }

    pub const fn is_no(self) -> bool {
        matches!(self, TriState::No)
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, TriState::Unknown)
    }

    pub const fn as_option(self) -> Option<bool> {
        match self {
            TriState::Yes => Some(true),
            TriState::No => Some(false),
            TriState::Unknown => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { TriState::Yes } else { TriState::No }
    }
}

#[cfg(test)]
mod tests {
    use super::TriState;

    #[test]
    fn defaults_to_unknown() {
        assert_eq!(TriState::default(), TriState::Unknown);
        assert_eq!(TriState::default().as_option(), None);
    }

    #[test]
    fn converts_from_bool() {
        assert!(TriState::from(true).is_yes());
        assert!(TriState::from(false).is_no());
        assert_eq!(TriState::No.as_option(), Some(false));
    }
}
