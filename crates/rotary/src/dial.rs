use crate::geometry::{self, Bounds, Degrees, HALF_TURN, Point};
use crate::layout::{DialLayout, OptionIndex};
use crate::ticker::{TICK_INTERVAL, TickGuard, TickSource};
use std::time::{Duration, Instant};

pub type SelectCallback = Box<dyn FnMut(OptionIndex)>;

/// Pointer state captured on pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_angle: Degrees,
    pub committed_offset: Degrees,
}

/// Linear decay of the offset back to rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnAnimation {
    pub from: Degrees,
    pub started: Instant,
    pub duration: Duration,
}

impl ReturnAnimation {
    pub fn new(from: Degrees, return_speed: f64, started: Instant) -> Self {
        Self {
            from,
            started,
            // very slow speeds saturate instead of overflowing Duration
            duration: Duration::try_from_secs_f64(*from / return_speed).unwrap_or(Duration::MAX),
        }
    }

    pub fn fraction(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        now.saturating_duration_since(self.started).as_secs_f64() / self.duration.as_secs_f64()
    }

    pub fn offset_at(&self, now: Instant) -> Degrees {
        Degrees::new((1.0 - self.fraction(now).min(1.0)) * *self.from)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.fraction(now) >= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Dragging(DragSession),
    Animating(ReturnAnimation),
}

/// Snapshot handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialState {
    pub offset: Degrees,
    pub locked: bool,
}

/// The rotary dial state machine.
///
/// The offset only grows in the layout's rotation sense and stays within
/// `[0, max_offset]`. The tick guard lives exactly as long as the return animation.
pub struct Dial<T: TickSource> {
    layout: DialLayout,
    phase: Phase,
    offset: Degrees,
    selection: Option<OptionIndex>,
    ticks: T,
    guard: Option<T::Guard>,
    on_select: Option<SelectCallback>,
}

impl<T: TickSource> Dial<T> {
    pub fn new(layout: DialLayout, ticks: T) -> Self {
        Self {
            layout,
            phase: Phase::Idle,
            offset: Degrees::ZERO,
            selection: None,
            ticks,
            guard: None,
            on_select: None,
        }
    }

    pub fn set_on_select(&mut self, callback: impl FnMut(OptionIndex) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    pub fn layout(&self) -> &DialLayout {
        &self.layout
    }

    /// Swaps the layout and puts the dial back at rest.
    pub fn set_layout(&mut self, layout: DialLayout) {
        self.stop_ticking();
        self.layout = layout;
        self.phase = Phase::Idle;
        self.offset = Degrees::ZERO;
        self.selection = None;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn offset(&self) -> Degrees {
        self.offset
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.phase, Phase::Animating(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    pub fn state(&self) -> DialState {
        DialState {
            offset: self.offset,
            locked: self.is_locked(),
        }
    }

    /// Option currently aligned with the indicator.
    pub fn selection(&self) -> Option<OptionIndex> {
        self.selection
    }

    pub fn is_selected(&self, index: OptionIndex) -> bool {
        self.selection == Some(index)
    }

    /// Logical position of every option at the current offset.
    pub fn positions(&self) -> impl Iterator<Item = (OptionIndex, Degrees)> + '_ {
        (0..self.layout.options())
            .map(OptionIndex::new)
            .map(|i| (i, self.layout.logical_position(i, self.offset)))
    }

    pub fn on_pointer_down(&mut self, pointer: Point, bounds: &Bounds) -> bool {
        self.begin_drag(geometry::pointer_angle(pointer, bounds))
    }

    pub fn on_pointer_move(&mut self, pointer: Point, bounds: &Bounds, now: Instant) -> bool {
        self.update_drag(geometry::pointer_angle(pointer, bounds), now)
    }

    pub fn on_pointer_up(&mut self, now: Instant) -> Option<OptionIndex> {
        self.end_drag(now)
    }

    /// Starts a drag. Ignored while the return animation runs.
    pub fn begin_drag(&mut self, pointer_angle: Degrees) -> bool {
        if self.is_locked() {
            log::trace!("pointer down ignored while returning to rest");
            return false;
        }
        self.phase = Phase::Dragging(DragSession {
            start_angle: pointer_angle,
            committed_offset: self.offset,
        });
        log::debug!("drag started at {pointer_angle}");
        true
    }

    /// Follows the pointer. Returns whether the offset changed.
    pub fn update_drag(&mut self, pointer_angle: Degrees, now: Instant) -> bool {
        let Phase::Dragging(session) = self.phase else {
            return false;
        };

        let sign = self.layout.rotation().drag_sign();
        let diff = geometry::normalize(sign * (*pointer_angle - *session.start_angle));
        let candidate = geometry::normalize(*session.committed_offset + *diff);
        let max = self.layout.max_offset();

        // a jump of more than half a turn means the candidate wrapped past an end
        let wrapped = (*candidate - *self.offset).abs() > HALF_TURN;
        if candidate > max || wrapped {
            // the side of the last offset tells which end the pointer ran past
            let clamped = if *self.offset < HALF_TURN {
                Degrees::ZERO
            } else {
                max
            };
            log::debug!("drag clamped to {clamped} (candidate {candidate})");
            self.offset = clamped;
            self.selection = self.layout.compute_selection(clamped);
            self.release(now);
            return true;
        }

        let changed = candidate != self.offset;
        self.offset = candidate;
        self.selection = self.layout.compute_selection(candidate);
        changed
    }

    /// Finishes the gesture and reports the aligned option, if any.
    pub fn end_drag(&mut self, now: Instant) -> Option<OptionIndex> {
        if !self.is_dragging() {
            return None;
        }
        self.release(now)
    }

    fn release(&mut self, now: Instant) -> Option<OptionIndex> {
        self.phase = Phase::Idle;
        let selection = self.selection;

        if let Some(index) = selection {
            log::info!("option {index} selected");
            if let Some(callback) = self.on_select.as_mut() {
                callback(index);
            }
        }

        if self.offset > Degrees::ZERO {
            self.run_return_animation(now);
        }
        selection
    }

    fn run_return_animation(&mut self, now: Instant) {
        let animation = ReturnAnimation::new(self.offset, self.layout.return_speed(), now);
        log::debug!(
            "returning from {} over {:?}",
            animation.from,
            animation.duration
        );
        self.stop_ticking();
        self.guard = Some(self.ticks.start(TICK_INTERVAL));
        self.phase = Phase::Animating(animation);
    }

    /// Advances the return animation. Returns whether it is still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Phase::Animating(animation) = self.phase else {
            return false;
        };

        if animation.is_finished(now) {
            self.offset = Degrees::ZERO;
            self.selection = None;
            self.phase = Phase::Idle;
            self.stop_ticking();
            log::debug!("dial at rest");
            return false;
        }

        self.offset = animation.offset_at(now);
        self.selection = self.layout.compute_selection(self.offset);
        true
    }

    fn stop_ticking(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rotation;
    use crate::ticker::ManualTicks;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dial() -> (Dial<ManualTicks>, ManualTicks) {
        let ticks = ManualTicks::new();
        (Dial::new(DialLayout::default(), ticks.clone()), ticks)
    }

    fn recorder(dial: &mut Dial<ManualTicks>) -> Rc<RefCell<Vec<OptionIndex>>> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        dial.set_on_select(move |i| sink.borrow_mut().push(i));
        calls
    }

    fn at(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_one_segment_selects_first_option() {
        let (mut dial, _) = dial();
        let calls = recorder(&mut dial);
        let now = Instant::now();

        // clockwise: pointer angle decreases by one segment
        assert!(dial.begin_drag(Degrees::new(90.0)));
        assert!(dial.update_drag(Degrees::new(60.0), now));
        assert_eq!(*dial.offset(), 30.0);
        assert!(dial.is_selected(OptionIndex::new(0)));

        assert_eq!(dial.end_drag(now), Some(OptionIndex::new(0)));
        assert_eq!(*calls.borrow(), vec![OptionIndex::new(0)]);
        assert!(dial.is_locked());

        // a stray pointer-up must not report again
        assert_eq!(dial.end_drag(now), None);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_counter_clockwise_dial() {
        let layout = DialLayout::builder()
            .rotation(Rotation::CounterClockwise)
            .build()
            .unwrap();
        let mut dial = Dial::new(layout, ManualTicks::new());
        let now = Instant::now();

        dial.begin_drag(Degrees::new(350.0));
        dial.update_drag(Degrees::new(35.0), now);
        assert_eq!(*dial.offset(), 45.0);
        assert_eq!(dial.selection(), Some(OptionIndex::new(1)));
    }

    #[test]
    fn test_pointer_events_use_geometry() {
        let (mut dial, _) = dial();
        let bounds = Bounds::new(0.0, 0.0, 200.0, 200.0);
        let now = Instant::now();

        let top = Point::new(100.0, 20.0);
        let lower_right = Point::polar(bounds.center(), Degrees::new(-15.0), 80.0);
        assert!(dial.on_pointer_down(top, &bounds));
        assert!(dial.on_pointer_move(lower_right, &bounds, now));
        assert!((*dial.offset() - 105.0).abs() < 1e-9);
        assert_eq!(dial.on_pointer_up(now), Some(OptionIndex::new(3)));
    }

    #[test]
    fn test_no_callback_without_alignment() {
        let (mut dial, ticks) = dial();
        let calls = recorder(&mut dial);
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(90.0), now);
        assert_eq!(dial.end_drag(now), None);
        assert!(calls.borrow().is_empty());
        // already at rest, nothing to animate
        assert!(!dial.is_locked());
        assert_eq!(ticks.started(), 0);
    }

    #[test]
    fn test_clamp_at_max_offset() {
        let (mut dial, ticks) = dial();
        let calls = recorder(&mut dial);
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        for step in 1..=10 {
            dial.update_drag(Degrees::new(90.0 - 30.0 * step as f64), now);
            assert!(dial.offset() <= dial.layout().max_offset());
        }
        assert_eq!(*dial.offset(), 300.0);
        assert!(dial.is_dragging());

        // 340 degrees lands in the forbidden slice past the last padding
        dial.update_drag(Degrees::new(90.0 - 340.0), now);
        assert_eq!(dial.offset(), dial.layout().max_offset());
        assert!(!dial.is_dragging());
        assert!(dial.is_locked());
        assert!(ticks.is_active());
        assert!(calls.borrow().is_empty());

        // further movement is ignored
        assert!(!dial.update_drag(Degrees::new(0.0), now));
        assert_eq!(dial.offset(), dial.layout().max_offset());
    }

    #[test]
    fn test_clamp_at_rest_side() {
        let (mut dial, ticks) = dial();
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        // wrong direction: counter-clockwise on a clockwise dial
        dial.update_drag(Degrees::new(100.0), now);
        assert_eq!(dial.offset(), Degrees::ZERO);
        assert_eq!(*dial.phase(), Phase::Idle);
        assert_eq!(ticks.started(), 0);
    }

    #[test]
    fn test_wrong_way_flick_from_rest() {
        let (mut dial, ticks) = dial();
        let calls = recorder(&mut dial);
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        // 80 degrees counter-clockwise in one event would wrap to 280
        assert!(dial.update_drag(Degrees::new(170.0), now));
        assert_eq!(dial.offset(), Degrees::ZERO);
        assert!(!dial.is_dragging());

        assert_eq!(dial.end_drag(now), None);
        assert!(calls.borrow().is_empty());
        assert_eq!(ticks.started(), 0);
    }

    #[test]
    fn test_jump_past_max_does_not_wrap() {
        let (mut dial, ticks) = dial();
        let calls = recorder(&mut dial);
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(90.0 - 150.0), now);
        dial.update_drag(Degrees::new(90.0 - 320.0), now);
        assert_eq!(*dial.offset(), 320.0);
        assert!(dial.is_dragging());

        // 55 more degrees would wrap the candidate to 15
        dial.update_drag(Degrees::new(90.0 - 375.0), now);
        assert_eq!(dial.offset(), dial.layout().max_offset());
        assert!(!dial.is_dragging());
        assert!(dial.is_locked());
        assert!(ticks.is_active());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_tiny_return_speed_saturates() {
        let layout = DialLayout::builder().return_speed(1e-20).build().unwrap();
        let mut dial = Dial::new(layout, ManualTicks::new());
        let start = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(60.0), start);
        assert_eq!(dial.end_drag(start), Some(OptionIndex::new(0)));

        let Phase::Animating(animation) = *dial.phase() else {
            panic!("expected animation");
        };
        assert_eq!(animation.duration, Duration::MAX);
        assert!(dial.tick(at(start, 1000)));
        assert!(dial.is_locked());
    }

    #[test]
    fn test_return_animation_decays_to_rest() {
        let (mut dial, ticks) = dial();
        let start = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(0.0), start);
        assert_eq!(dial.end_drag(start), Some(OptionIndex::new(2)));

        // 90 degrees at 360 deg/s takes 250 ms
        let Phase::Animating(animation) = *dial.phase() else {
            panic!("expected animation");
        };
        assert_eq!(animation.duration, Duration::from_millis(250));
        assert_eq!(ticks.interval(), Some(TICK_INTERVAL));

        let mut last = dial.offset();
        let mut elapsed = 0;
        loop {
            elapsed += 16;
            let running = dial.tick(at(start, elapsed));
            assert!(dial.offset() <= last);
            last = dial.offset();
            assert_eq!(dial.is_locked(), dial.offset() > Degrees::ZERO);
            if !running {
                break;
            }
            assert!(ticks.is_active());
        }

        assert_eq!(dial.offset(), Degrees::ZERO);
        assert!(!dial.is_locked());
        assert!(!ticks.is_active());
        assert!(elapsed >= 250);
    }

    #[test]
    fn test_halfway_tick_is_linear() {
        let (mut dial, _) = dial();
        let start = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(0.0), start);
        dial.end_drag(start);

        assert!(dial.tick(at(start, 125)));
        assert!((*dial.offset() - 45.0).abs() < 1e-6);
    }

    #[test]
    fn test_input_blocked_while_animating() {
        let (mut dial, _) = dial();
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(30.0), now);
        dial.end_drag(now);
        let offset = dial.offset();

        assert!(!dial.begin_drag(Degrees::new(45.0)));
        assert!(!dial.update_drag(Degrees::new(10.0), now));
        assert_eq!(dial.end_drag(now), None);
        assert_eq!(dial.offset(), offset);
        assert!(dial.is_locked());
    }

    #[test]
    fn test_drop_mid_animation_releases_ticker() {
        let (mut dial, ticks) = dial();
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(30.0), now);
        dial.end_drag(now);
        assert!(ticks.is_active());

        drop(dial);
        assert!(!ticks.is_active());
    }

    #[test]
    fn test_set_layout_resets_dial() {
        let (mut dial, ticks) = dial();
        let now = Instant::now();

        dial.begin_drag(Degrees::new(90.0));
        dial.update_drag(Degrees::new(30.0), now);
        dial.end_drag(now);

        dial.set_layout(DialLayout::builder().options(4).build().unwrap());
        assert!(!ticks.is_active());
        assert_eq!(dial.state(), DialState { offset: Degrees::ZERO, locked: false });
        assert_eq!(dial.positions().count(), 4);
    }
}
