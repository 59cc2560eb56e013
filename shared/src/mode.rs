use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which edit surface is showing inside the shared edit parent.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditTab {
    Profile,
    Pin,
}

/// Exactly one of these is active at a time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    View,
    EditProfile,
    EditPin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeCommand {
    RequestEdit,
    SelectTab(EditTab),
    Cancel,
    Close,
    MutationSucceeded,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("cannot {command:?} while in {from:?}")]
    InvalidTransition { from: Mode, command: ModeCommand },
}

impl Mode {
    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(self, Self::EditProfile | Self::EditPin)
    }

    #[must_use]
    pub const fn edit_tab(self) -> Option<EditTab> {
        match self {
            Self::View => None,
            Self::EditProfile => Some(EditTab::Profile),
            Self::EditPin => Some(EditTab::Pin),
        }
    }

    #[must_use]
    pub const fn for_tab(tab: EditTab) -> Self {
        match tab {
            EditTab::Profile => Self::EditProfile,
            EditTab::Pin => Self::EditPin,
        }
    }

    /// Closing and mutation success are accepted from every state; the rest
    /// only apply on one side of the View/Edit boundary.
    pub fn transition(self, command: ModeCommand) -> Result<Self, ModeError> {
        match (self, command) {
            (_, ModeCommand::Close | ModeCommand::MutationSucceeded) => Ok(Self::View),
            (Self::View, ModeCommand::RequestEdit) => Ok(Self::EditProfile),
            (Self::EditProfile | Self::EditPin, ModeCommand::SelectTab(tab)) => {
                Ok(Self::for_tab(tab))
            }
            (Self::EditProfile | Self::EditPin, ModeCommand::Cancel) => Ok(Self::View),
            (from, command) => Err(ModeError::InvalidTransition { from, command }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn starts_in_view() {
        assert_eq!(Mode::default(), Mode::View);
    }

    #[test]
    fn edit_request_opens_profile_tab() {
        assert_eq!(Mode::View.transition(ModeCommand::RequestEdit), Ok(Mode::EditProfile));
    }

    #[test]
    fn tabs_switch_both_ways() {
        let pin = Mode::EditProfile
            .transition(ModeCommand::SelectTab(EditTab::Pin))
            .unwrap();
        assert_eq!(pin, Mode::EditPin);
        let profile = pin.transition(ModeCommand::SelectTab(EditTab::Profile)).unwrap();
        assert_eq!(profile, Mode::EditProfile);
    }

    #[test]
    fn cancel_returns_to_view_from_either_tab() {
        assert_eq!(Mode::EditProfile.transition(ModeCommand::Cancel), Ok(Mode::View));
        assert_eq!(Mode::EditPin.transition(ModeCommand::Cancel), Ok(Mode::View));
    }

    #[test]
    fn close_and_success_always_land_in_view() {
        for mode in [Mode::View, Mode::EditProfile, Mode::EditPin] {
            assert_eq!(mode.transition(ModeCommand::Close), Ok(Mode::View));
            assert_eq!(mode.transition(ModeCommand::MutationSucceeded), Ok(Mode::View));
        }
    }

    #[test]
    fn tab_switch_from_view_is_rejected() {
        assert_matches!(
            Mode::View.transition(ModeCommand::SelectTab(EditTab::Pin)),
            Err(ModeError::InvalidTransition { from: Mode::View, .. })
        );
    }

    #[test]
    fn cancel_from_view_is_rejected() {
        assert!(Mode::View.transition(ModeCommand::Cancel).is_err());
    }

    #[test]
    fn edit_request_while_editing_is_rejected() {
        assert!(Mode::EditPin.transition(ModeCommand::RequestEdit).is_err());
    }

    #[test]
    fn edit_tab_mirrors_mode() {
        assert_eq!(Mode::View.edit_tab(), None);
        assert_eq!(Mode::EditPin.edit_tab(), Some(EditTab::Pin));
        assert!(Mode::EditProfile.is_editing());
        assert!(!Mode::View.is_editing());
    }
}
