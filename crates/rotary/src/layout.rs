use crate::geometry::{Degrees, FULL_TURN};
use derive_more::{Deref, Display, From, Into};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

pub const DEFAULT_OPTIONS: usize = 10;
pub const DEFAULT_INDICATOR_ANGLE: f64 = 300.0;
pub const DEFAULT_RETURN_SPEED: f64 = 360.0;

/// Segments that never hold an option: one under the indicator at rest and one past the last option.
pub const PADDING_SEGMENTS: usize = 2;
/// Padding segments in front of option 0.
pub const LEAD_SEGMENTS: usize = 1;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Rotation {
    #[default]
    #[strum(to_string = "clockwise", serialize = "cw")]
    Clockwise,
    #[strum(
        to_string = "counter-clockwise",
        serialize = "counterclockwise",
        serialize = "ccw"
    )]
    CounterClockwise,
}

impl Rotation {
    /// Sign turning a change in pointer angle into a change in offset.
    pub fn drag_sign(&self) -> f64 {
        match self {
            Self::Clockwise => -1.0,
            Self::CounterClockwise => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Deref, From, Into)]
pub struct OptionIndex(usize);

crate::impl_newtype!(OptionIndex, usize);

impl OptionIndex {
    /// Integer encoding of a selection, `-1` when nothing is aligned.
    pub fn sentinel(selection: Option<OptionIndex>) -> i64 {
        selection.map_or(-1, |i| i.0 as i64)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("A dial needs at least one option")]
    NoOptions,
    #[error("Return speed must be a positive number of degrees per second, got {0}")]
    InvalidReturnSpeed(f64),
    #[error("Indicator angle must be finite, got {0}")]
    InvalidIndicatorAngle(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    Padding,
    Option(OptionIndex),
}

/// One angular slice of the dial and the offsets `(start, end]` that align it with the indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub role: SegmentRole,
    pub start: Degrees,
    pub end: Degrees,
}

/// Validated dial configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DialLayout {
    options: usize,
    rotation: Rotation,
    indicator_angle: Degrees,
    return_speed: f64,
}

impl Default for DialLayout {
    fn default() -> Self {
        Self {
            options: DEFAULT_OPTIONS,
            rotation: Rotation::default(),
            indicator_angle: Degrees::new(DEFAULT_INDICATOR_ANGLE),
            return_speed: DEFAULT_RETURN_SPEED,
        }
    }
}

impl DialLayout {
    pub fn builder() -> DialLayoutBuilder {
        DialLayoutBuilder::default()
    }

    pub fn options(&self) -> usize {
        self.options
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn indicator_angle(&self) -> Degrees {
        self.indicator_angle
    }

    /// Degrees per second covered by the return animation.
    pub fn return_speed(&self) -> f64 {
        self.return_speed
    }

    pub fn segment_count(&self) -> usize {
        self.options + PADDING_SEGMENTS
    }

    pub fn segment_angle(&self) -> Degrees {
        Degrees::new(FULL_TURN / self.segment_count() as f64)
    }

    pub fn max_offset(&self) -> Degrees {
        Degrees::new(FULL_TURN - *self.segment_angle())
    }

    /// Distance of an option from the indicator at the given offset. Not normalized.
    pub fn logical_position(&self, index: OptionIndex, offset: Degrees) -> Degrees {
        Degrees::new(*self.segment_angle() * (*index + LEAD_SEGMENTS) as f64 - *offset)
    }

    /// The option whose segment covers the indicator, if any.
    pub fn compute_selection(&self, offset: Degrees) -> Option<OptionIndex> {
        let width = *self.segment_angle();
        (0..self.options).map(OptionIndex::new).find(|&i| {
            let position = *self.logical_position(i, offset);
            (0.0..width).contains(&position)
        })
    }

    pub fn segments(&self) -> Vec<Segment> {
        let width = *self.segment_angle();
        (0..self.segment_count())
            .map(|s| {
                let role = s
                    .checked_sub(LEAD_SEGMENTS)
                    .filter(|&i| i < self.options)
                    .map_or(SegmentRole::Padding, |i| {
                        SegmentRole::Option(OptionIndex::new(i))
                    });
                // the lead padding is aligned only at rest
                let (start, end) = match s.checked_sub(LEAD_SEGMENTS) {
                    None => (0.0, 0.0),
                    Some(k) => (width * k as f64, width * (k + 1) as f64),
                };
                Segment {
                    index: s,
                    role,
                    start: Degrees::new(start),
                    end: Degrees::new(end),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DialLayoutBuilder {
    options: Option<usize>,
    rotation: Option<Rotation>,
    indicator_angle: Option<f64>,
    return_speed: Option<f64>,
}

impl DialLayoutBuilder {
    pub fn options(mut self, options: usize) -> Self {
        self.options = Some(options);
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn indicator_angle(mut self, degrees: f64) -> Self {
        self.indicator_angle = Some(degrees);
        self
    }

    pub fn return_speed(mut self, degrees_per_second: f64) -> Self {
        self.return_speed = Some(degrees_per_second);
        self
    }

    pub fn build(self) -> Result<DialLayout, LayoutError> {
        let defaults = DialLayout::default();

        let options = self.options.unwrap_or(defaults.options);
        if options == 0 {
            return Err(LayoutError::NoOptions);
        }

        let indicator = self.indicator_angle.unwrap_or(*defaults.indicator_angle);
        if !indicator.is_finite() {
            return Err(LayoutError::InvalidIndicatorAngle(indicator));
        }

        let return_speed = self.return_speed.unwrap_or(defaults.return_speed);
        if !return_speed.is_finite() || return_speed <= 0.0 {
            return Err(LayoutError::InvalidReturnSpeed(return_speed));
        }

        Ok(DialLayout {
            options,
            rotation: self.rotation.unwrap_or(defaults.rotation),
            indicator_angle: crate::geometry::normalize(indicator),
            return_speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_segments() {
        let layout = DialLayout::default();
        assert_eq!(layout.segment_count(), 12);
        assert_eq!(*layout.segment_angle(), 30.0);
        assert_eq!(*layout.max_offset(), 330.0);
    }

    #[test]
    fn test_selection_at_most_one() {
        for options in [1, 3, 7, 10, 24] {
            let layout = DialLayout::builder().options(options).build().unwrap();
            let max = *layout.max_offset();
            let mut offset = 0.0;
            while offset <= max {
                let hits = (0..options)
                    .map(OptionIndex::new)
                    .filter(|&i| {
                        let p = *layout.logical_position(i, Degrees::new(offset));
                        (0.0..*layout.segment_angle()).contains(&p)
                    })
                    .count();
                assert!(hits <= 1, "{hits} options at offset {offset}");
                offset += 0.25;
            }
        }
    }

    #[test]
    fn test_selection_boundaries() {
        let layout = DialLayout::default();
        assert_eq!(layout.compute_selection(Degrees::ZERO), None);
        assert_eq!(layout.compute_selection(Degrees::new(15.0)), Some(OptionIndex::new(0)));
        assert_eq!(layout.compute_selection(Degrees::new(30.0)), Some(OptionIndex::new(0)));
        assert_eq!(layout.compute_selection(Degrees::new(30.5)), Some(OptionIndex::new(1)));
        assert_eq!(layout.compute_selection(Degrees::new(300.0)), Some(OptionIndex::new(9)));
        assert_eq!(layout.compute_selection(Degrees::new(310.0)), None);
        assert_eq!(layout.compute_selection(layout.max_offset()), None);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let layout = DialLayout::default();
        let offset = Degrees::new(123.4);
        let first = layout.compute_selection(offset);
        for _ in 0..5 {
            assert_eq!(layout.compute_selection(offset), first);
        }
    }

    #[test]
    fn test_segments_match_selection() {
        let layout = DialLayout::builder().options(4).build().unwrap();
        let segments = layout.segments();
        assert_eq!(segments.len(), 6);
        assert_eq!(segments[0].role, SegmentRole::Padding);
        assert_eq!(segments[5].role, SegmentRole::Padding);

        for seg in &segments[1..5] {
            let mid = Degrees::new((*seg.start + *seg.end) / 2.0);
            let SegmentRole::Option(i) = seg.role else {
                panic!("segment {} should hold an option", seg.index);
            };
            assert_eq!(layout.compute_selection(mid), Some(i));
            assert_eq!(layout.compute_selection(seg.end), Some(i));
        }
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert_eq!(
            DialLayout::builder().options(0).build(),
            Err(LayoutError::NoOptions)
        );
        assert_eq!(
            DialLayout::builder().return_speed(0.0).build(),
            Err(LayoutError::InvalidReturnSpeed(0.0))
        );
        assert!(matches!(
            DialLayout::builder().indicator_angle(f64::NAN).build(),
            Err(LayoutError::InvalidIndicatorAngle(_))
        ));
    }

    #[test]
    fn test_sentinel() {
        assert_eq!(OptionIndex::sentinel(None), -1);
        assert_eq!(OptionIndex::sentinel(Some(OptionIndex::new(4))), 4);
    }

    #[test]
    fn test_rotation_deserialization() {
        let cases = vec![
            ("\"clockwise\"", Rotation::Clockwise),
            ("\"CW\"", Rotation::Clockwise),
            ("\"counter-clockwise\"", Rotation::CounterClockwise),
            ("\"CounterClockwise\"", Rotation::CounterClockwise),
            ("\"ccw\"", Rotation::CounterClockwise),
        ];

        for (json, expected) in cases {
            let deserialized: Rotation = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }
}
