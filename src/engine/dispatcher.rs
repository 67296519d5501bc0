//! Turns transitions into synthesized input and mode changes
//!
//! A transition's button index is compared against every slot of the mapping
//! snapshot and every matching slot fires. Synthesis failures are logged and the
//! tick carries on.

use crate::engine::edge::{Transition, TriggerEdge};
use crate::engine::runtime::RuntimeMode;
use crate::engine::StatusEvent;
use crate::mapping::{
    ControlAction, InputCode, Key, MappingError, MappingTable, Slot, SlotKind, TriggerSide,
};
use crate::platform::{Platform, SynthesisError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub struct ActionDispatcher<'a> {
    platform: &'a mut dyn Platform,
    mapping: &'a MappingTable,
    mode: &'a RuntimeMode,
    status_sender: &'a mpsc::Sender<StatusEvent>,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(
        platform: &'a mut dyn Platform,
        mapping: &'a MappingTable,
        mode: &'a RuntimeMode,
        status_sender: &'a mpsc::Sender<StatusEvent>,
    ) -> Self {
        Self {
            platform,
            mapping,
            mode,
            status_sender,
        }
    }

    /// Fires every slot bound to the transition's button
    pub fn dispatch(&mut self, transition: Transition) {
        self.dispatch_matching(transition, |_| true);
    }

    /// Dispatch while input is disabled
    ///
    /// A press only fires the disable toggle. A release fires the release half
    /// of every slot on that button, so keys and mouse buttons pressed together
    /// with the toggle are not left held.
    pub fn dispatch_while_disabled(&mut self, transition: Transition) {
        if transition.is_press() {
            self.dispatch_matching(transition, |slot| {
                slot.kind() == SlotKind::Control(ControlAction::DisableToggle)
            });
        } else {
            self.dispatch(transition);
        }
    }

    fn dispatch_matching(&mut self, transition: Transition, filter: impl Fn(Slot) -> bool) {
        let Ok(index) = u16::try_from(transition.index()) else {
            return;
        };
        let code = InputCode(index);
        let pressed = transition.is_press();

        let slots: Vec<Slot> = self
            .mapping
            .slots_bound_to(code)
            .filter(|slot| filter(*slot))
            .collect();
        if slots.is_empty() {
            debug!("No slot bound to button {}", index);
            return;
        }

        for slot in slots {
            debug!("{:?} fires slot {}", transition, slot);
            match slot.kind() {
                SlotKind::Mouse(button) => {
                    let result = if pressed {
                        self.platform.mouse_down(button)
                    } else {
                        self.platform.mouse_up(button)
                    };
                    log_failure(result, "mouse button");
                }
                SlotKind::Control(action) => {
                    if pressed {
                        self.control(action);
                    }
                }
                SlotKind::Keyboard => self.key(code, pressed),
            }
        }
    }

    /// Presses or releases the key bound to a trigger
    pub fn dispatch_trigger(&mut self, side: TriggerSide, edge: TriggerEdge) {
        let slot = Slot::for_trigger(side);
        let Some(code) = self.mapping.effective_binding(slot) else {
            return;
        };
        self.key(code, edge == TriggerEdge::Pressed);
    }

    /// Scrolls by `amount` clicks
    pub fn scroll(&mut self, amount: i32) {
        log_failure(self.platform.scroll(amount), "scroll");
    }

    fn key(&mut self, code: InputCode, pressed: bool) {
        let Some(key) = Key::from_virtual_code(code.0) else {
            error!("{}", MappingError::UnresolvableKey(code.0));
            return;
        };
        let result = if pressed {
            self.platform.key_down(key)
        } else {
            self.platform.key_up(key)
        };
        log_failure(result, key.name());
    }

    fn control(&mut self, action: ControlAction) {
        match action {
            ControlAction::HideWindow => {
                let hidden = self.mode.toggle_window_hidden();
                log_failure(self.platform.set_window_visible(!hidden), "window");
                self.publish(if hidden {
                    StatusEvent::WindowHidden
                } else {
                    StatusEvent::WindowShown
                });
            }
            ControlAction::DisableToggle => {
                let disabled = self.mode.toggle_input_disabled();
                info!("Input {}", if disabled { "disabled" } else { "enabled" });
                self.publish(if disabled {
                    StatusEvent::InputDisabled
                } else {
                    StatusEvent::InputEnabled
                });
            }
            ControlAction::SpeedCycle => {
                let speed = self.mode.cycle_speed();
                info!("Sensitivity multiplier set to {}", speed);
                self.publish(StatusEvent::SpeedChanged(speed));
            }
        }
    }

    fn publish(&self, event: StatusEvent) {
        if let Err(e) = self.status_sender.try_send(event) {
            warn!("Failed to publish status event: {}", e);
        }
    }
}

fn log_failure(result: Result<(), SynthesisError>, what: &str) {
    if let Err(e) = result {
        error!("Input synthesis failed ({}): {}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MouseButton;
    use crate::testing::{PlatformCall, RecordingPlatform};
    use pretty_assertions::assert_eq;

    struct Harness {
        platform: RecordingPlatform,
        mapping: MappingTable,
        mode: RuntimeMode,
        status_tx: mpsc::Sender<StatusEvent>,
        status_rx: mpsc::Receiver<StatusEvent>,
    }

    impl Harness {
        fn new(mapping: MappingTable) -> Self {
            let (status_tx, status_rx) = mpsc::channel(16);
            Self {
                platform: RecordingPlatform::default(),
                mapping,
                mode: RuntimeMode::default(),
                status_tx,
                status_rx,
            }
        }

        fn dispatch(&mut self, transition: Transition) -> Vec<PlatformCall> {
            let mut platform = self.platform.clone();
            ActionDispatcher::new(&mut platform, &self.mapping, &self.mode, &self.status_tx)
                .dispatch(transition);
            self.platform.taken()
        }
    }

    #[test]
    fn mouse_left_on_button_zero() {
        let mut harness = Harness::new(MappingTable::default());
        assert_eq!(
            harness.dispatch(Transition::Pressed(0)),
            vec![PlatformCall::MouseDown(MouseButton::Left)]
        );
        assert_eq!(
            harness.dispatch(Transition::Released(0)),
            vec![PlatformCall::MouseUp(MouseButton::Left)]
        );
    }

    #[test]
    fn shared_code_fires_every_slot() {
        let mut mapping = MappingTable::unbound();
        mapping.bind(Slot::MouseRight, Some(InputCode(0x1)));
        mapping.bind(Slot::AButton, Some(InputCode(0x1)));
        let mut harness = Harness::new(mapping);

        // 0x1 has no key in the table, so only the mouse fires
        assert_eq!(
            harness.dispatch(Transition::Pressed(1)),
            vec![PlatformCall::MouseDown(MouseButton::Right)]
        );

        let mut mapping = MappingTable::unbound();
        mapping.bind(Slot::MouseMiddle, Some(InputCode(0x9)));
        mapping.bind(Slot::Start, Some(InputCode(0x9)));
        let mut harness = Harness::new(mapping);
        assert_eq!(
            harness.dispatch(Transition::Pressed(9)),
            vec![
                PlatformCall::MouseDown(MouseButton::Middle),
                PlatformCall::KeyDown(Key::Tab)
            ]
        );
    }

    #[test]
    fn keyboard_slot_presses_and_releases_key() {
        let mut harness = Harness::new(MappingTable::default());
        // back and right_trigger default to backspace; index 8 is the left thumb
        assert_eq!(
            harness.dispatch(Transition::Pressed(8)),
            vec![
                PlatformCall::KeyDown(Key::Backspace),
                PlatformCall::KeyDown(Key::Backspace)
            ]
        );
        assert_eq!(
            harness.dispatch(Transition::Released(8)),
            vec![
                PlatformCall::KeyUp(Key::Backspace),
                PlatformCall::KeyUp(Key::Backspace)
            ]
        );
    }

    #[test]
    fn unknown_key_code_is_a_no_op() {
        let mut mapping = MappingTable::unbound();
        mapping.bind(Slot::YButton, Some(InputCode(0x3)));
        let mut harness = Harness::new(mapping);
        assert_eq!(harness.dispatch(Transition::Pressed(3)), vec![]);
    }

    #[test]
    fn control_actions_fire_on_press_only() {
        let mut mapping = MappingTable::unbound();
        mapping.bind(Slot::SpeedCycle, Some(InputCode(0x4)));
        mapping.bind(Slot::HideWindow, Some(InputCode(0x5)));
        let mut harness = Harness::new(mapping);

        harness.dispatch(Transition::Pressed(4));
        harness.dispatch(Transition::Released(4));
        assert_eq!(harness.mode.sensitivity(), 2.0);
        assert_eq!(
            harness.status_rx.try_recv().unwrap(),
            StatusEvent::SpeedChanged(2.0)
        );
        assert!(harness.status_rx.try_recv().is_err());

        assert_eq!(
            harness.dispatch(Transition::Pressed(5)),
            vec![PlatformCall::WindowVisible(false)]
        );
        assert!(harness.mode.is_window_hidden());
        assert_eq!(
            harness.status_rx.try_recv().unwrap(),
            StatusEvent::WindowHidden
        );
    }

    #[test]
    fn disabled_mode_only_toggles() {
        let mut mapping = MappingTable::unbound();
        mapping.bind(Slot::DisableToggle, Some(InputCode(0x7)));
        mapping.bind(Slot::MouseLeft, Some(InputCode(0x7)));
        let mut harness = Harness::new(mapping);
        harness.mode.toggle_input_disabled();

        let mut platform = harness.platform.clone();
        ActionDispatcher::new(
            &mut platform,
            &harness.mapping,
            &harness.mode,
            &harness.status_tx,
        )
        .dispatch_while_disabled(Transition::Pressed(7));

        assert_eq!(harness.platform.taken(), vec![]);
        assert!(!harness.mode.is_input_disabled());
        assert_eq!(
            harness.status_rx.try_recv().unwrap(),
            StatusEvent::InputEnabled
        );
    }

    #[test]
    fn disabled_mode_still_releases_shared_slots() {
        let mut mapping = MappingTable::unbound();
        mapping.bind(Slot::DisableToggle, Some(InputCode(0x8)));
        mapping.bind(Slot::MouseLeft, Some(InputCode(0x8)));
        mapping.bind(Slot::Back, Some(InputCode(0x8)));
        let mut harness = Harness::new(mapping);
        harness.mode.toggle_input_disabled();

        let mut platform = harness.platform.clone();
        ActionDispatcher::new(
            &mut platform,
            &harness.mapping,
            &harness.mode,
            &harness.status_tx,
        )
        .dispatch_while_disabled(Transition::Released(8));

        assert_eq!(
            harness.platform.taken(),
            vec![
                PlatformCall::MouseUp(MouseButton::Left),
                PlatformCall::KeyUp(Key::Backspace)
            ]
        );
        assert!(harness.mode.is_input_disabled());
        assert!(harness.status_rx.try_recv().is_err());
    }

    #[test]
    fn trigger_uses_its_slot_code() {
        let harness = Harness::new(MappingTable::default());
        let mut platform = harness.platform.clone();
        let mut dispatcher = ActionDispatcher::new(
            &mut platform,
            &harness.mapping,
            &harness.mode,
            &harness.status_tx,
        );
        dispatcher.dispatch_trigger(TriggerSide::Left, TriggerEdge::Pressed);
        dispatcher.dispatch_trigger(TriggerSide::Left, TriggerEdge::Released);
        drop(dispatcher);

        assert_eq!(
            harness.platform.taken(),
            vec![
                PlatformCall::KeyDown(Key::Space),
                PlatformCall::KeyUp(Key::Space)
            ]
        );
    }
}
