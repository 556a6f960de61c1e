use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub plate: Srgba<f64>,
    pub ring: Srgba<f64>,
    pub hole: Srgba<f64>,
    pub selected: Srgba<f64>,
    pub active: Srgba<f64>,
    pub indicator: Srgba<f64>,
    pub text: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            plate: Self::lookup_color(
                context,
                "theme_bg_color",
                Srgba::new(0.92, 0.92, 0.9, 1.0),
                None,
            ),
            ring: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.12, 0.12, 0.12, 0.9),
                Some(0.85),
            ),
            hole: Self::lookup_color(
                context,
                "theme_base_color",
                Srgba::new(0.97, 0.97, 0.95, 1.0),
                Some(1.0),
            ),
            selected: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                Srgba::new(0.4, 0.4, 0.8, 0.9),
                Some(0.9),
            ),
            active: Self::lookup_color(
                context,
                "accent_color",
                Srgba::new(0.95, 0.6, 0.2, 0.8),
                Some(0.6),
            ),
            indicator: Self::lookup_color(
                context,
                "error_color",
                Srgba::new(0.8, 0.2, 0.2, 1.0),
                Some(1.0),
            ),
            text: Self::lookup_color(
                context,
                "theme_text_color",
                Srgba::new(0.1, 0.1, 0.1, 1.0),
                Some(1.0),
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.phonedial-drawing-area {
    background: none;
    background-color: transparent;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
