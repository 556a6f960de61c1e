use super::model::{HoleGeometry, State};
use super::{
    CENTER_FONT_SIZE, GLOW_WIDTH, LABEL_SCALE, PLATE_RADIUS, RING_INNER, RING_OUTER, STOP_INNER,
    STOP_OUTER, STOP_WIDTH,
};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use palette::Srgba;
use rotary::geometry::{Bounds, Degrees, Point};
use std::f64::consts::PI;

struct HoleRenderer<'a> {
    geometry: &'a HoleGeometry,
    selected: bool,
    label: &'a str,
}

impl<'a> HoleRenderer<'a> {
    fn new(geometry: &'a HoleGeometry, selected: bool, label: &'a str) -> Self {
        Self {
            geometry,
            selected,
            label,
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let color = HoleState::resolve(self.selected).color(colors);
        set_source(cr, color);
        cr.arc(
            self.geometry.center.x,
            self.geometry.center.y,
            self.geometry.radius,
            0.0,
            2.0 * PI,
        );
        cr.fill()?;
        self.draw_text(cr, colors)
    }

    fn draw_text(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        set_source(cr, colors.text);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(self.geometry.radius * LABEL_SCALE);
        show_centered(cr, self.label, self.geometry.center)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoleState {
    Selected,
    Idle,
}

impl HoleState {
    fn resolve(selected: bool) -> Self {
        if selected { Self::Selected } else { Self::Idle }
    }

    fn color(&self, colors: &ThemeColors) -> Srgba<f64> {
        match self {
            Self::Selected => colors.selected,
            Self::Idle => colors.hole,
        }
    }
}

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn show_centered(cr: &Context, text: &str, at: Point) -> Result<(), cairo::Error> {
    if let Ok(ext) = cr.text_extents(text) {
        cr.move_to(
            at.x - ext.width() / 2.0 - ext.x_bearing(),
            at.y - ext.height() / 2.0 - ext.y_bearing(),
        );
        cr.show_text(text)?;
    }
    Ok(())
}

pub fn draw(
    cr: &Context,
    state: &State,
    colors: &ThemeColors,
    width: f64,
    height: f64,
) -> Result<(), cairo::Error> {
    let bounds = Bounds::new(0.0, 0.0, width, height);
    let center = bounds.center();
    let scale = State::scale(&bounds);
    let dial = state.dial.borrow();

    draw_plate(cr, center, scale, colors)?;
    draw_wheel(cr, center, scale, dial.is_locked(), colors)?;

    for hole in HoleGeometry::calculate(&dial, center, scale) {
        let label = state.label(hole.index);
        HoleRenderer::new(&hole, dial.is_selected(hole.index), &label).draw(cr, colors)?;
    }

    draw_finger_stop(cr, center, scale, dial.layout().indicator_angle(), colors)?;
    draw_center_label(cr, state, center, scale, colors)
}

fn draw_plate(
    cr: &Context,
    center: Point,
    scale: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_source(cr, colors.plate);
    cr.arc(center.x, center.y, PLATE_RADIUS * scale, 0.0, 2.0 * PI);
    cr.fill()
}

/// The rotating wheel is an annulus; it glows while returning to rest.
fn draw_wheel(
    cr: &Context,
    center: Point,
    scale: f64,
    locked: bool,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    cr.save()?;
    set_source(cr, colors.ring);
    cr.set_fill_rule(cairo::FillRule::EvenOdd);
    cr.arc(center.x, center.y, RING_OUTER * scale, 0.0, 2.0 * PI);
    cr.new_sub_path();
    cr.arc(center.x, center.y, RING_INNER * scale, 0.0, 2.0 * PI);
    cr.fill()?;
    cr.restore()?;

    if locked {
        set_source(cr, colors.active);
        cr.set_line_width(GLOW_WIDTH * scale);
        cr.arc(center.x, center.y, RING_OUTER * scale, 0.0, 2.0 * PI);
        cr.stroke()?;
    }
    Ok(())
}

fn draw_finger_stop(
    cr: &Context,
    center: Point,
    scale: f64,
    angle: Degrees,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let inner = Point::polar(center, angle, STOP_INNER * scale);
    let outer = Point::polar(center, angle, STOP_OUTER * scale);

    set_source(cr, colors.indicator);
    cr.set_line_width(STOP_WIDTH * scale);
    cr.set_line_cap(cairo::LineCap::Round);
    cr.move_to(inner.x, inner.y);
    cr.line_to(outer.x, outer.y);
    cr.stroke()
}

fn draw_center_label(
    cr: &Context,
    state: &State,
    center: Point,
    scale: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let Some(index) = state.last_selected else {
        return Ok(());
    };
    set_source(cr, colors.text);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(CENTER_FONT_SIZE * scale);
    show_centered(cr, &state.label(index), center)
}
