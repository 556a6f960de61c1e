pub mod model;
pub mod view;

pub use model::{GlibTicks, HoleGeometry, SharedDial, State};
pub use view::draw;

pub const REFERENCE_SIZE: f64 = 320.0;
pub const PLATE_RADIUS: f64 = 158.0;
pub const RING_OUTER: f64 = 150.0; // finger wheel edge, also the press area
pub const RING_INNER: f64 = 58.0;
pub const HOLE_ORBIT: f64 = 108.0; // hole centers
pub const HOLE_RADIUS: f64 = 24.0;
pub const HOLE_FILL: f64 = 0.85; // share of the gap between neighbours a hole may take
pub const STOP_INNER: f64 = 128.0;
pub const STOP_OUTER: f64 = 158.0;
pub const STOP_WIDTH: f64 = 6.0;
pub const GLOW_WIDTH: f64 = 8.0;
pub const LABEL_SCALE: f64 = 0.8; // font size relative to hole radius
pub const CENTER_FONT_SIZE: f64 = 44.0;
