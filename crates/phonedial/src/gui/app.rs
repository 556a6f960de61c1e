use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::gui::dial::{self, State};
use crate::gui::theme::{self, ThemeColors};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use rotary::{OptionIndex, Point};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub struct AppModel {
    pub state: Rc<RefCell<State>>,
    pub config_path: PathBuf,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Selected(OptionIndex),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, PathBuf, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Phone Dial"),
            set_default_size: (window_size, window_size),
            add_css_class: "phonedial-window",

            #[local_ref]
            drawing_area -> gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "phonedial-drawing-area",

                add_controller = gtk::GestureDrag {
                    set_button: gtk::gdk::BUTTON_PRIMARY,
                    connect_drag_begin[sender] => move |_, x, y| {
                        sender.input(AppMsg::PointerDown(Point::new(x, y)));
                    },
                    connect_drag_update[sender] => move |gesture, dx, dy| {
                        if let Some((x, y)) = gesture.start_point() {
                            sender.input(AppMsg::PointerMove(Point::new(x + dx, y + dy)));
                        }
                    },
                    connect_drag_end[sender] => move |_, _, _| {
                        sender.input(AppMsg::PointerUp);
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, config_path, rx) = init;

        theme::load_css();

        let window_size = config.window.size;
        let drawing_area = gtk::DrawingArea::default();
        let state = State::new(config, &drawing_area);

        {
            let sender = sender.clone();
            state
                .dial
                .borrow_mut()
                .set_on_select(move |index| sender.input(AppMsg::Selected(index)));
        }

        let model = AppModel {
            state: Rc::new(RefCell::new(state)),
            config_path,
            drawing_area: drawing_area.clone(),
        };

        let drawing_area = &model.drawing_area;
        let widgets = view_output!();

        let state_draw = model.state.clone();
        model
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = dial::draw(
                    cr,
                    &state_draw.borrow(),
                    &colors,
                    width as f64,
                    height as f64,
                ) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        let bounds = State::bounds(&self.drawing_area);
        let redraw = match msg {
            AppMsg::PointerDown(point) => self.state.borrow().pointer_down(point, &bounds),
            AppMsg::PointerMove(point) => self.state.borrow().pointer_move(point, &bounds),
            AppMsg::PointerUp => {
                // the release itself always changes what is drawn (lock glow, animation)
                self.state.borrow().pointer_up();
                true
            }
            AppMsg::Selected(index) => {
                let mut state = self.state.borrow_mut();
                log::info!("{} selected!", state.label(index));
                state.last_selected = Some(index);
                true
            }
            AppMsg::ConfigReload => match config::load_config(&self.config_path) {
                Ok(new_config) => {
                    self.state.borrow_mut().apply_config(new_config);
                    log::info!("Configuration reloaded");
                    true
                }
                Err(e) => {
                    log::error!("Failed to reload config: {}", e);
                    false
                }
            },
        };

        if redraw {
            self.drawing_area.queue_draw();
        }
    }
}
