use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every key on the ATI remote. Tokens match what the remote driver reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    A,
    B,
    C,
    D,
    E,
    F,
    Question,
    Pwr,
    Fm,
    Tv,
    Guide,
    Tv2,
    Dvd,
    Expand,
    Hand,
    Check,
    X,
    VolUp,
    VolDown,
    Ati,
    Mute,
    ChUp,
    ChDown,
    Rewind,
    Play,
    FastFwd,
    Rec,
    Pause,
    Stop,
    Time,
    Info,
    Ok,
    DUp,
    DDown,
    DLeft,
    DRight,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    RoundDUp,
    RoundDDown,
}

const TOKENS: [(Button, &str); 48] = [
    (Button::A, "A"),
    (Button::B, "B"),
    (Button::C, "C"),
    (Button::D, "D"),
    (Button::E, "E"),
    (Button::F, "F"),
    (Button::Question, "?"),
    (Button::Pwr, "PWR"),
    (Button::Fm, "FM"),
    (Button::Tv, "TV"),
    (Button::Guide, "GUIDE"),
    (Button::Tv2, "TV2"),
    (Button::Dvd, "DVD"),
    (Button::Expand, "EXPAND"),
    (Button::Hand, "HAND"),
    (Button::Check, "CHECK"),
    (Button::X, "X"),
    (Button::VolUp, "VOL_UP"),
    (Button::VolDown, "VOL_DOWN"),
    (Button::Ati, "ATI"),
    (Button::Mute, "MUTE"),
    (Button::ChUp, "CH_UP"),
    (Button::ChDown, "CH_DOWN"),
    (Button::Rewind, "REWIND"),
    (Button::Play, "PLAY"),
    (Button::FastFwd, "FAST_FWD"),
    (Button::Rec, "REC"),
    (Button::Pause, "PAUSE"),
    (Button::Stop, "STOP"),
    (Button::Time, "TIME"),
    (Button::Info, "INFO"),
    (Button::Ok, "OK"),
    (Button::DUp, "D_UP"),
    (Button::DDown, "D_DOWN"),
    (Button::DLeft, "D_LEFT"),
    (Button::DRight, "D_RIGHT"),
    (Button::Digit0, "0"),
    (Button::Digit1, "1"),
    (Button::Digit2, "2"),
    (Button::Digit3, "3"),
    (Button::Digit4, "4"),
    (Button::Digit5, "5"),
    (Button::Digit6, "6"),
    (Button::Digit7, "7"),
    (Button::Digit8, "8"),
    (Button::Digit9, "9"),
    (Button::RoundDUp, "ROUND_D_UP"),
    (Button::RoundDDown, "ROUND_D_DOWN"),
];

impl Button {
    /// The confirmation key that completes a two-key sequence.
    pub const CONFIRM: Button = Button::Ok;

    pub fn token(&self) -> &'static str {
        TOKENS
            .iter()
            .find(|(button, _)| button == self)
            .map(|(_, token)| *token)
            .unwrap_or("?")
    }

    pub fn all() -> impl Iterator<Item = Button> {
        TOKENS.iter().map(|(button, _)| *button)
    }

    /// Number pad key, `None` above 9.
    pub fn digit(n: u8) -> Option<Button> {
        const DIGITS: [Button; 10] = [
            Button::Digit0,
            Button::Digit1,
            Button::Digit2,
            Button::Digit3,
            Button::Digit4,
            Button::Digit5,
            Button::Digit6,
            Button::Digit7,
            Button::Digit8,
            Button::Digit9,
        ];
        DIGITS.get(usize::from(n)).copied()
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownButton(pub String);

impl fmt::Display for UnknownButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown remote button: {}", self.0)
    }
}

impl FromStr for Button {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        TOKENS
            .iter()
            .find(|(_, t)| *t == token)
            .map(|(button, _)| *button)
            .ok_or_else(|| UnknownButton(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_button_has_a_distinct_token() {
        let buttons: HashSet<Button> = Button::all().collect();
        let tokens: HashSet<&str> = Button::all().map(|b| b.token()).collect();
        assert_eq!(buttons.len(), TOKENS.len());
        assert_eq!(tokens.len(), TOKENS.len());
    }

    #[test]
    fn tokens_parse_back_to_their_button() {
        for button in Button::all() {
            assert_eq!(button.token().parse::<Button>(), Ok(button));
        }
    }

    #[test]
    fn remote_tokens_match_driver_names() {
        assert_eq!("VOL_UP".parse::<Button>(), Ok(Button::VolUp));
        assert_eq!("CH_DOWN".parse::<Button>(), Ok(Button::ChDown));
        assert_eq!(" OK ".parse::<Button>(), Ok(Button::Ok));
        assert_eq!(Button::DLeft.to_string(), "D_LEFT");
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert_eq!(
            "vol_up".parse::<Button>(),
            Err(UnknownButton("vol_up".to_string()))
        );
        assert!("".parse::<Button>().is_err());
    }
}
