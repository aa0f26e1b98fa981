//! Input Provider
//!
//! The simulation never sees devices. A host implements `InputMethod` over
//! whatever event type its windowing layer produces; the world only asks
//! boolean questions about each event. `ScriptedInput` is the built-in
//! implementation used by tests and the headless runner.

use serde::{Serialize, Deserialize};

/// Predicates over an opaque input event. Every predicate defaults to false.
pub trait InputMethod {
    type Event;

    fn is_right(&self, _event: &Self::Event) -> bool { false }
    fn is_left(&self, _event: &Self::Event) -> bool { false }
    fn is_up(&self, _event: &Self::Event) -> bool { false }
    fn is_down(&self, _event: &Self::Event) -> bool { false }
    fn is_jump(&self, _event: &Self::Event) -> bool { false }
    fn is_shoot(&self, _event: &Self::Event) -> bool { false }
    fn is_start(&self, _event: &Self::Event) -> bool { false }
    fn is_pause(&self, _event: &Self::Event) -> bool { false }
    fn is_cancel(&self, _event: &Self::Event) -> bool { false }

    fn is_pressed(&self, _event: &Self::Event) -> bool { false }
    fn is_released(&self, _event: &Self::Event) -> bool { false }
}

/// Logical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Shoot,
    Start,
    Pause,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// A press or release of one button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub button: Button,
    pub state: ButtonState,
}

impl ButtonEvent {
    pub fn pressed(button: Button) -> Self {
        Self { button, state: ButtonState::Pressed }
    }

    pub fn released(button: Button) -> Self {
        Self { button, state: ButtonState::Released }
    }
}

/// `InputMethod` over `ButtonEvent`s
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedInput;

impl InputMethod for ScriptedInput {
    type Event = ButtonEvent;

    fn is_right(&self, event: &ButtonEvent) -> bool { event.button == Button::Right }
    fn is_left(&self, event: &ButtonEvent) -> bool { event.button == Button::Left }
    fn is_up(&self, event: &ButtonEvent) -> bool { event.button == Button::Up }
    fn is_down(&self, event: &ButtonEvent) -> bool { event.button == Button::Down }
    fn is_jump(&self, event: &ButtonEvent) -> bool { event.button == Button::Jump }
    fn is_shoot(&self, event: &ButtonEvent) -> bool { event.button == Button::Shoot }
    fn is_start(&self, event: &ButtonEvent) -> bool { event.button == Button::Start }
    fn is_pause(&self, event: &ButtonEvent) -> bool { event.button == Button::Pause }
    fn is_cancel(&self, event: &ButtonEvent) -> bool { event.button == Button::Cancel }

    fn is_pressed(&self, event: &ButtonEvent) -> bool { event.state == ButtonState::Pressed }
    fn is_released(&self, event: &ButtonEvent) -> bool { event.state == ButtonState::Released }
}

/// Player intent derived from one input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    MoveLeft,
    MoveRight,
    StopX,
    Up,
    StopUp,
    Down,
    StopDown,
    Jump,
    Shoot,
    StopShooting,
}

impl PlayerCommand {
    /// Translate an input event. Menu buttons map to nothing.
    pub fn from_input<I: InputMethod>(input: &I, event: &I::Event) -> Option<Self> {
        let pressed = input.is_pressed(event);
        let released = input.is_released(event);

        if input.is_right(event) {
            if pressed { return Some(PlayerCommand::MoveRight); }
            if released { return Some(PlayerCommand::StopX); }
        } else if input.is_left(event) {
            if pressed { return Some(PlayerCommand::MoveLeft); }
            if released { return Some(PlayerCommand::StopX); }
        } else if input.is_up(event) {
            if pressed { return Some(PlayerCommand::Up); }
            if released { return Some(PlayerCommand::StopUp); }
        } else if input.is_down(event) {
            if pressed { return Some(PlayerCommand::Down); }
            if released { return Some(PlayerCommand::StopDown); }
        } else if input.is_jump(event) {
            if pressed { return Some(PlayerCommand::Jump); }
        } else if input.is_shoot(event) {
            if pressed { return Some(PlayerCommand::Shoot); }
            if released { return Some(PlayerCommand::StopShooting); }
        }
        None
    }
}

/// A button event scheduled for a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub tick: u64,
    pub button: Button,
    pub state: ButtonState,
}

/// Timeline of button events, loadable from RON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputScript {
    pub events: Vec<ScriptedEvent>,
}

impl InputScript {
    /// Events scheduled for `tick`, in file order
    pub fn events_at(&self, tick: u64) -> impl Iterator<Item = ButtonEvent> + '_ {
        self.events
            .iter()
            .filter(move |e| e.tick == tick)
            .map(|e| ButtonEvent { button: e.button, state: e.state })
    }

    /// Last tick that has an event
    pub fn last_tick(&self) -> Option<u64> {
        self.events.iter().map(|e| e.tick).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_mapping() {
        let input = ScriptedInput;
        let cmd = |e: ButtonEvent| PlayerCommand::from_input(&input, &e);

        assert_eq!(cmd(ButtonEvent::pressed(Button::Right)), Some(PlayerCommand::MoveRight));
        assert_eq!(cmd(ButtonEvent::released(Button::Left)), Some(PlayerCommand::StopX));
        assert_eq!(cmd(ButtonEvent::pressed(Button::Jump)), Some(PlayerCommand::Jump));
        assert_eq!(cmd(ButtonEvent::released(Button::Jump)), None);
        assert_eq!(cmd(ButtonEvent::released(Button::Shoot)), Some(PlayerCommand::StopShooting));
        assert_eq!(cmd(ButtonEvent::pressed(Button::Pause)), None);
    }

    #[test]
    fn test_default_predicates_are_false() {
        struct Nothing;
        impl InputMethod for Nothing {
            type Event = ();
        }
        assert_eq!(PlayerCommand::from_input(&Nothing, &()), None);
    }

    #[test]
    fn test_script_parses_and_filters() {
        let script: InputScript = ron::from_str(
            "(events: [(tick: 0, button: Right, state: Pressed), (tick: 30, button: Right, state: Released), (tick: 30, button: Jump, state: Pressed)])",
        ).unwrap();
        assert_eq!(script.last_tick(), Some(30));
        let at_30: Vec<_> = script.events_at(30).collect();
        assert_eq!(at_30, vec![ButtonEvent::released(Button::Right), ButtonEvent::pressed(Button::Jump)]);
        assert_eq!(script.events_at(5).count(), 0);
    }
}
