use crate::layout::DialLayout;
use derive_more::{Deref, Display, From, Into};

pub const FULL_TURN: f64 = 360.0;
pub const HALF_TURN: f64 = 180.0;

/// An angle in degrees. Polar angles use 0 = right, counter-clockwise positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Display, Deref, From, Into)]
#[display("{_0:.1}°")]
pub struct Degrees(f64);

crate::impl_newtype!(Degrees, f64);

impl Degrees {
    pub const ZERO: Self = Self::new(0.0);

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Screen point at `radius` from `center` along the polar `angle`.
    /// Screen y grows downwards, so the sine term is subtracted.
    pub fn polar(center: Point, angle: Degrees, radius: f64) -> Self {
        let rad = angle.radians();
        Self::new(center.x + radius * rad.cos(), center.y - radius * rad.sin())
    }
}

/// Bounding rectangle of the dial element, in the same space as pointer positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Folds any angle into [0, 360).
pub fn normalize(deg: f64) -> Degrees {
    let folded = deg.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negative inputs up to the modulus itself
    Degrees::new(if folded >= FULL_TURN { 0.0 } else { folded })
}

/// Polar angle of `pointer` around the center of `bounds`, in [0, 360).
pub fn pointer_angle(pointer: Point, bounds: &Bounds) -> Degrees {
    let center = bounds.center();
    let (dx, dy) = (pointer.x - center.x, center.y - pointer.y);
    normalize(dy.atan2(dx).to_degrees())
}

/// Polar angle at which a logical segment position is drawn.
///
/// Position 0 sits on the indicator. Positive positions lie on the side the dial
/// rotates away from, so increasing the offset carries them towards the indicator.
pub fn visual_rotation(position: Degrees, layout: &DialLayout) -> Degrees {
    normalize(*layout.indicator_angle() - layout.rotation().drag_sign() * *position)
}
