use crate::config::Config;
use crate::gui::dial::{HOLE_FILL, HOLE_ORBIT, HOLE_RADIUS, REFERENCE_SIZE, RING_OUTER};
use gtk::prelude::*;
use gtk4 as gtk;
use rotary::geometry::{self, Bounds, Degrees, Point};
use rotary::{Dial, DialLayout, OptionIndex, TickGuard, TickSource};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

pub type SharedDial = Rc<RefCell<Dial<GlibTicks>>>;

/// Runs the dial's return animation on the glib main loop and redraws after every tick.
pub struct GlibTicks {
    dial: Weak<RefCell<Dial<GlibTicks>>>,
    area: gtk::DrawingArea,
}

impl GlibTicks {
    pub fn new(dial: Weak<RefCell<Dial<GlibTicks>>>, area: gtk::DrawingArea) -> Self {
        Self { dial, area }
    }
}

impl TickSource for GlibTicks {
    type Guard = GlibGuard;

    fn start(&mut self, interval: Duration) -> GlibGuard {
        let source = Rc::new(Cell::new(None));
        let (dial, area, slot) = (self.dial.clone(), self.area.clone(), source.clone());

        let id = glib::timeout_add_local(interval, move || {
            let running = dial
                .upgrade()
                .is_some_and(|d| d.borrow_mut().tick(Instant::now()));
            area.queue_draw();
            if running {
                glib::ControlFlow::Continue
            } else {
                // the dial dropped its guard on completion, make sure nobody removes us twice
                slot.take();
                glib::ControlFlow::Break
            }
        });
        source.set(Some(id));

        GlibGuard { source }
    }
}

pub struct GlibGuard {
    source: Rc<Cell<Option<glib::SourceId>>>,
}

impl TickGuard for GlibGuard {}

impl Drop for GlibGuard {
    fn drop(&mut self) {
        if let Some(id) = self.source.take() {
            id.remove();
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoleGeometry {
    pub index: OptionIndex,
    pub angle: Degrees,
    pub center: Point,
    pub radius: f64,
}

impl HoleGeometry {
    /// Hole size, shrunk when many options crowd the orbit.
    pub fn radius(layout: &DialLayout, scale: f64) -> f64 {
        let half_gap = layout.segment_angle().radians() / 2.0;
        HOLE_RADIUS.min(HOLE_ORBIT * half_gap.sin() * HOLE_FILL) * scale
    }

    pub fn calculate<T: TickSource>(dial: &Dial<T>, center: Point, scale: f64) -> Vec<Self> {
        let radius = Self::radius(dial.layout(), scale);
        dial.positions()
            .map(|(index, position)| {
                let angle = geometry::visual_rotation(position, dial.layout());
                Self {
                    index,
                    angle,
                    center: Point::polar(center, angle, HOLE_ORBIT * scale),
                    radius,
                }
            })
            .collect()
    }
}

pub struct State {
    pub dial: SharedDial,
    pub config: Config,
    pub last_selected: Option<OptionIndex>,
}

impl State {
    pub fn new(config: Config, area: &gtk::DrawingArea) -> Self {
        let layout = Self::layout_or_default(&config);
        let area = area.clone();
        let dial = Rc::new_cyclic(|weak| {
            RefCell::new(Dial::new(layout, GlibTicks::new(weak.clone(), area)))
        });

        Self {
            dial,
            config,
            last_selected: None,
        }
    }

    fn layout_or_default(config: &Config) -> DialLayout {
        config.dial.layout().unwrap_or_else(|e| {
            log::error!("Invalid dial layout, using defaults: {}", e);
            DialLayout::default()
        })
    }

    pub fn apply_config(&mut self, config: Config) {
        let layout = Self::layout_or_default(&config);
        self.dial.borrow_mut().set_layout(layout);
        self.config = config;
        self.last_selected = None;
    }

    pub fn bounds(area: &gtk::DrawingArea) -> Bounds {
        Bounds::new(0.0, 0.0, area.width() as f64, area.height() as f64)
    }

    pub fn scale(bounds: &Bounds) -> f64 {
        bounds.width.min(bounds.height) / REFERENCE_SIZE
    }

    pub fn hits_dial(point: Point, bounds: &Bounds) -> bool {
        let center = bounds.center();
        (point.x - center.x).hypot(point.y - center.y) <= RING_OUTER * Self::scale(bounds)
    }

    /// Presses outside the finger wheel are left alone.
    pub fn pointer_down(&self, point: Point, bounds: &Bounds) -> bool {
        Self::hits_dial(point, bounds) && self.dial.borrow_mut().on_pointer_down(point, bounds)
    }

    pub fn pointer_move(&self, point: Point, bounds: &Bounds) -> bool {
        self.dial
            .borrow_mut()
            .on_pointer_move(point, bounds, Instant::now())
    }

    pub fn pointer_up(&self) -> Option<OptionIndex> {
        self.dial.borrow_mut().on_pointer_up(Instant::now())
    }

    pub fn label(&self, index: OptionIndex) -> String {
        self.config.label(index)
    }
}
