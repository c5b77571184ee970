//! Hardware switch stimuli

use std::fmt;

/// `SW_LID` from linux/input-event-codes.h
pub const SW_LID: u16 = 0x00;
/// `SW_HEADPHONE_INSERT` from linux/input-event-codes.h
pub const SW_HEADPHONE_INSERT: u16 = 0x02;

/// A switch transition the configuration can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchStimulus {
    LidOpen,
    LidClose,
    HeadphonesIn,
    HeadphonesOut,
}

impl SwitchStimulus {
    /// Map a switch event to its stimulus. Unknown switches give `None`.
    pub fn from_event(code: u16, value: i32) -> Option<Self> {
        match code {
            SW_LID if value == 0 => Some(Self::LidOpen),
            SW_LID => Some(Self::LidClose),
            SW_HEADPHONE_INSERT if value == 1 => Some(Self::HeadphonesIn),
            SW_HEADPHONE_INSERT => Some(Self::HeadphonesOut),
            _ => None,
        }
    }

    /// The section name that binds this stimulus
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LidOpen => "LidOpen",
            Self::LidClose => "LidClose",
            Self::HeadphonesIn => "HeadphonesIn",
            Self::HeadphonesOut => "HeadphonesOut",
        }
    }
}

impl fmt::Display for SwitchStimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lid_switch() {
        assert_eq!(
            SwitchStimulus::from_event(SW_LID, 0),
            Some(SwitchStimulus::LidOpen)
        );
        assert_eq!(
            SwitchStimulus::from_event(SW_LID, 1),
            Some(SwitchStimulus::LidClose)
        );
    }

    #[test]
    fn test_headphone_switch() {
        assert_eq!(
            SwitchStimulus::from_event(SW_HEADPHONE_INSERT, 1),
            Some(SwitchStimulus::HeadphonesIn)
        );
        assert_eq!(
            SwitchStimulus::from_event(SW_HEADPHONE_INSERT, 0),
            Some(SwitchStimulus::HeadphonesOut)
        );
    }

    #[test]
    fn test_other_switches_ignored() {
        // SW_TABLET_MODE
        assert_eq!(SwitchStimulus::from_event(0x01, 1), None);
        // SW_MICROPHONE_INSERT
        assert_eq!(SwitchStimulus::from_event(0x04, 1), None);
    }

    #[test]
    fn test_stimulus_names() {
        assert_eq!(SwitchStimulus::LidOpen.to_string(), "LidOpen");
        assert_eq!(SwitchStimulus::LidClose.to_string(), "LidClose");
        assert_eq!(SwitchStimulus::HeadphonesIn.to_string(), "HeadphonesIn");
        assert_eq!(SwitchStimulus::HeadphonesOut.to_string(), "HeadphonesOut");
    }
}
