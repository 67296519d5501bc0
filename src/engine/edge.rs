//! Press/release detection for buttons and analog triggers

use crate::mapping::TriggerSide;

/// Right stick radius (raw units) below which no scrolling happens
pub const SCROLL_DEAD_ZONE: f64 = 5000.0;

/// Wheel clicks per raw axis unit
pub const SCROLL_FACTOR: f64 = 0.005;

/// Rescaled trigger value a trigger has to exceed to count as pressed
pub const TRIGGER_THRESHOLD: f64 = 0.5;

/// Change of a button between two ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pressed(usize),
    Released(usize),
}

impl Transition {
    pub fn index(self) -> usize {
        match self {
            Transition::Pressed(index) | Transition::Released(index) => index,
        }
    }

    pub fn is_press(self) -> bool {
        matches!(self, Transition::Pressed(_))
    }
}

/// Change of a trigger latch between two ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEdge {
    Pressed,
    Released,
}

/// Whether a trigger axis (-1.0..=1.0) counts as pressed
pub fn trigger_pressed(axis: f32) -> bool {
    (f64::from(axis) + 1.0) / 2.0 > TRIGGER_THRESHOLD
}

/// Wheel clicks for a raw right-stick vertical value
///
/// Not edge-detected: returns an amount on every tick the stick stays past the
/// scroll dead zone.
pub fn scroll_amount(raw_axis: f64) -> Option<i32> {
    if raw_axis.abs() > SCROLL_DEAD_ZONE {
        Some((raw_axis * SCROLL_FACTOR).trunc() as i32)
    } else {
        None
    }
}

/// Boolean latch with edge reporting
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerLatch {
    pressed: bool,
}

impl TriggerLatch {
    pub fn update(&mut self, axis: f32) -> Option<TriggerEdge> {
        let now = trigger_pressed(axis);
        let edge = match (self.pressed, now) {
            (false, true) => Some(TriggerEdge::Pressed),
            (true, false) => Some(TriggerEdge::Released),
            _ => None,
        };
        self.pressed = now;
        edge
    }
}

/// Last observed button and trigger state
#[derive(Debug, Default)]
pub struct EdgeDetector {
    previous: Vec<bool>,
    left_trigger: TriggerLatch,
    right_trigger: TriggerLatch,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions of every button, in index order
    pub fn update(&mut self, current: &[bool]) -> Vec<Transition> {
        self.update_filtered(current, |_| true)
    }

    /// Transitions of the buttons selected by `tracked`, in index order
    ///
    /// Untracked buttons keep their previous state, so a change that happened
    /// while they were untracked is reported once they are tracked again.
    pub fn update_filtered(
        &mut self,
        current: &[bool],
        mut tracked: impl FnMut(usize) -> bool,
    ) -> Vec<Transition> {
        if self.previous.len() < current.len() {
            self.previous.resize(current.len(), false);
        }

        let mut transitions = Vec::new();
        for (index, &now) in current.iter().enumerate() {
            if !tracked(index) {
                continue;
            }
            let before = self.previous[index];
            match (before, now) {
                (false, true) => transitions.push(Transition::Pressed(index)),
                (true, false) => transitions.push(Transition::Released(index)),
                _ => {}
            }
            self.previous[index] = now;
        }
        transitions
    }

    /// Latch edges for both triggers, left first
    pub fn update_triggers(&mut self, left: f32, right: f32) -> Vec<(TriggerSide, TriggerEdge)> {
        let mut edges = Vec::with_capacity(2);
        if let Some(edge) = self.left_trigger.update(left) {
            edges.push((TriggerSide::Left, edge));
        }
        if let Some(edge) = self.right_trigger.update(right) {
            edges.push((TriggerSide::Right, edge));
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn held_button_presses_once() {
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.update(&[true, false]), vec![Transition::Pressed(0)]);
        assert_eq!(detector.update(&[true, false]), vec![]);
        assert_eq!(detector.update(&[false, false]), vec![Transition::Released(0)]);
        assert_eq!(detector.update(&[false, false]), vec![]);
    }

    #[test]
    fn transitions_come_in_index_order() {
        let mut detector = EdgeDetector::new();
        detector.update(&[false, true, false]);
        assert_eq!(
            detector.update(&[true, false, true]),
            vec![
                Transition::Pressed(0),
                Transition::Released(1),
                Transition::Pressed(2)
            ]
        );
    }

    #[test]
    fn untracked_buttons_are_frozen() {
        let mut detector = EdgeDetector::new();
        detector.update(&[true, false]);

        // button 0 released while untracked, button 1 tracked
        let only_one = |index: usize| index == 1;
        assert_eq!(
            detector.update_filtered(&[false, true], only_one),
            vec![Transition::Pressed(1)]
        );

        // release of button 0 surfaces once it is tracked again
        assert_eq!(
            detector.update(&[false, true]),
            vec![Transition::Released(0)]
        );
    }

    #[test]
    fn trigger_threshold_is_strict() {
        // 0.5 after rescale
        assert!(!trigger_pressed(0.0));
        // 0.51 after rescale
        assert!(trigger_pressed(0.02));
        assert!(!trigger_pressed(-1.0));
        assert!(trigger_pressed(1.0));
    }

    #[test]
    fn trigger_latch_reports_edges() {
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.update_triggers(-1.0, -1.0), vec![]);
        assert_eq!(
            detector.update_triggers(0.8, -1.0),
            vec![(TriggerSide::Left, TriggerEdge::Pressed)]
        );
        assert_eq!(detector.update_triggers(0.9, -1.0), vec![]);
        assert_eq!(
            detector.update_triggers(-1.0, 1.0),
            vec![
                (TriggerSide::Left, TriggerEdge::Released),
                (TriggerSide::Right, TriggerEdge::Pressed)
            ]
        );
    }

    #[test]
    fn scroll_only_past_dead_zone() {
        assert_eq!(scroll_amount(5000.0), None);
        assert_eq!(scroll_amount(-4999.0), None);
        assert_eq!(scroll_amount(5001.0), Some(25));
        assert_eq!(scroll_amount(-32767.0), Some(-163));
    }
}
