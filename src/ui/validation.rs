//! Start input validation shared by every UI boundary

use crate::{error::InputError, state::Minutes};

/// Duration shortcuts offered next to the input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Five,
    Fifteen,
    Thirty,
    Sixty,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Five, Preset::Fifteen, Preset::Thirty, Preset::Sixty];

    pub fn minutes(self) -> u32 {
        match self {
            Preset::Five => 5,
            Preset::Fifteen => 15,
            Preset::Thirty => 30,
            Preset::Sixty => 60,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.minutes() == minutes)
    }
}

/// Check raw user input before anything is sent to the timer service
///
/// Checks run in a fixed order: empty input, Bluetooth state, then range.
/// Text that is not a whole number is reported as out of range.
pub fn validate_start(input: &str, bluetooth_on: bool) -> Result<Minutes, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    if !bluetooth_on {
        return Err(InputError::BluetoothOff);
    }

    input
        .parse::<i64>()
        .map_err(|_| InputError::OutOfRange)
        .and_then(Minutes::try_from)
}
