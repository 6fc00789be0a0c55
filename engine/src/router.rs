use crate::button::Button;
use crate::event::Reaction;
use crate::{Side, Sport};
use log::debug;
use serde::{Deserialize, Serialize};

/// Operation dispatched to the active match. Each sport ignores what it does not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MarkIn(Side),
    MarkOut(Side),
    RemoveIn(Side),
    LockInFrame,
    ToggleMeasure,
    CyclePoints(Side),
    Undo,
    ThrowStone(Side),
    Power,
    Confirm,
    Nav(Direction),
    StartClock,
    StopClock,
    RequestRename(Side),
    React(Reaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Keys that open a two-key sequence completed by `Button::CONFIRM`.
pub const ARM_BUTTONS: [Button; 4] = [Button::Time, Button::Stop, Button::A, Button::B];

pub struct Keymap {
    pub single: &'static [(Button, Command)],
    /// Armed key followed by the confirmation key.
    pub confirmed: &'static [(Button, Command)],
}

pub static BOCCE_KEYMAP: Keymap = Keymap {
    single: &[
        (Button::VolUp, Command::MarkIn(Side::Home)),
        (Button::VolDown, Command::RemoveIn(Side::Home)),
        (Button::Check, Command::MarkOut(Side::Home)),
        (Button::ChUp, Command::MarkIn(Side::Away)),
        (Button::ChDown, Command::RemoveIn(Side::Away)),
        (Button::X, Command::MarkOut(Side::Away)),
        (Button::Ati, Command::LockInFrame),
        (Button::Play, Command::ToggleMeasure),
        (Button::Rewind, Command::Undo),
    ],
    confirmed: &[
        (Button::Time, Command::StartClock),
        (Button::Stop, Command::StopClock),
        (Button::A, Command::RequestRename(Side::Home)),
        (Button::B, Command::RequestRename(Side::Away)),
    ],
};

pub static CURLING_KEYMAP: Keymap = Keymap {
    single: &[
        (Button::Pwr, Command::Power),
        (Button::A, Command::CyclePoints(Side::Home)),
        (Button::B, Command::CyclePoints(Side::Away)),
        (Button::VolDown, Command::ThrowStone(Side::Home)),
        (Button::ChDown, Command::ThrowStone(Side::Away)),
        (Button::Rewind, Command::Undo),
        (Button::Ok, Command::Confirm),
        (Button::DUp, Command::Nav(Direction::Up)),
        (Button::DDown, Command::Nav(Direction::Down)),
        (Button::DLeft, Command::Nav(Direction::Left)),
        (Button::DRight, Command::Nav(Direction::Right)),
    ],
    confirmed: &[
        (Button::Time, Command::StartClock),
        (Button::Stop, Command::StopClock),
        (Button::A, Command::RequestRename(Side::Home)),
        (Button::B, Command::RequestRename(Side::Away)),
    ],
};

impl Keymap {
    pub fn for_sport(sport: Sport) -> &'static Keymap {
        match sport {
            Sport::Bocce => &BOCCE_KEYMAP,
            Sport::Curling => &CURLING_KEYMAP,
        }
    }

    fn single(&self, button: Button) -> Option<Command> {
        lookup(self.single, button)
    }

    fn confirmed(&self, armed: Button) -> Option<Command> {
        lookup(self.confirmed, armed)
    }
}

fn lookup(table: &[(Button, Command)], button: Button) -> Option<Command> {
    table
        .iter()
        .find(|(b, _)| *b == button)
        .map(|(_, command)| *command)
}

/// Turns button presses into commands, remembering just enough to
/// recognise "arm + OK" sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRouter {
    sport: Sport,
    previous_button: Option<Button>,
    waiting_for_confirmation: bool,
}

impl ButtonRouter {
    pub fn new(sport: Sport) -> Self {
        Self {
            sport,
            previous_button: None,
            waiting_for_confirmation: false,
        }
    }

    pub fn previous_button(&self) -> Option<Button> {
        self.previous_button
    }

    pub fn waiting_for_confirmation(&self) -> bool {
        self.waiting_for_confirmation
    }

    pub fn route(&mut self, button: Button) -> Option<Command> {
        let keymap = Keymap::for_sport(self.sport);

        // Anything but OK after an arm key cancels the pending sequence.
        if button != Button::CONFIRM
            && self.previous_button.is_some_and(|prev| ARM_BUTTONS.contains(&prev))
        {
            self.waiting_for_confirmation = false;
        }

        let command = if button == Button::CONFIRM && self.waiting_for_confirmation {
            self.waiting_for_confirmation = false;
            self.previous_button.and_then(|armed| keymap.confirmed(armed))
        } else {
            if ARM_BUTTONS.contains(&button) {
                self.waiting_for_confirmation = true;
            }
            keymap.single(button)
        };

        self.previous_button = Some(button);
        debug!("{} routed {button} -> {command:?}", self.sport);
        command
    }

    /// Forgets any pending sequence, e.g. after a new game starts.
    pub fn reset(&mut self) {
        self.previous_button = None;
        self.waiting_for_confirmation = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route_all(router: &mut ButtonRouter, buttons: &[Button]) -> Vec<Option<Command>> {
        buttons.iter().map(|b| router.route(*b)).collect()
    }

    #[test]
    fn time_then_ok_starts_the_clock() {
        let mut router = ButtonRouter::new(Sport::Bocce);
        let out = route_all(&mut router, &[Button::Time, Button::Ok]);
        assert_eq!(out, vec![None, Some(Command::StartClock)]);
        assert!(!router.waiting_for_confirmation());
    }

    #[test]
    fn intervening_key_cancels_pending_sequence() {
        let mut router = ButtonRouter::new(Sport::Bocce);
        let out = route_all(&mut router, &[Button::Time, Button::ChUp, Button::Ok]);
        assert_eq!(out[1], Some(Command::MarkIn(Side::Away)));
        assert_eq!(out[2], None);
        assert!(!router.waiting_for_confirmation());
    }

    #[test]
    fn ok_without_arm_is_a_plain_key() {
        let mut bocce = ButtonRouter::new(Sport::Bocce);
        assert_eq!(bocce.route(Button::Ok), None);
        let mut curling = ButtonRouter::new(Sport::Curling);
        assert_eq!(curling.route(Button::Ok), Some(Command::Confirm));
    }

    #[test]
    fn second_ok_does_not_repeat_the_sequence() {
        let mut router = ButtonRouter::new(Sport::Curling);
        let out = route_all(&mut router, &[Button::Stop, Button::Ok, Button::Ok]);
        assert_eq!(out, vec![None, Some(Command::StopClock), Some(Command::Confirm)]);
    }

    #[test]
    fn re_arming_uses_the_latest_arm_key() {
        let mut router = ButtonRouter::new(Sport::Bocce);
        let out = route_all(&mut router, &[Button::Time, Button::A, Button::Ok]);
        assert_eq!(out[2], Some(Command::RequestRename(Side::Home)));
    }

    #[test]
    fn curling_a_cycles_points_and_arms_rename() {
        let mut router = ButtonRouter::new(Sport::Curling);
        assert_eq!(router.route(Button::A), Some(Command::CyclePoints(Side::Home)));
        assert!(router.waiting_for_confirmation());
        assert_eq!(router.route(Button::Ok), Some(Command::RequestRename(Side::Home)));
    }

    #[test]
    fn unmapped_buttons_are_ignored() {
        let mut router = ButtonRouter::new(Sport::Bocce);
        assert_eq!(router.route(Button::Mute), None);
        assert_eq!(router.route(Button::Digit7), None);
        assert_eq!(router.previous_button(), Some(Button::Digit7));
    }

    #[test]
    fn keymaps_have_no_duplicate_buttons() {
        for keymap in [&BOCCE_KEYMAP, &CURLING_KEYMAP] {
            for (i, (a, _)) in keymap.single.iter().enumerate() {
                assert!(keymap.single[i + 1..].iter().all(|(b, _)| b != a), "{a}");
            }
            for (armed, _) in keymap.confirmed {
                assert!(ARM_BUTTONS.contains(armed));
            }
        }
    }
}
