pub mod dial;
pub mod geometry;
pub mod layout;
pub mod macros;
pub mod ticker;

pub use dial::{Dial, DialState, DragSession, Phase, ReturnAnimation};
pub use geometry::{Bounds, Degrees, Point};
pub use layout::{DialLayout, LayoutError, OptionIndex, Rotation};
pub use ticker::{ManualTicks, TICK_INTERVAL, TickGuard, TickSource};
