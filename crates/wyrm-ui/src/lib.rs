mod painter;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};
use wyrm_core::{DriverMode, Engine, EngineConfig, InputEvent, ProfileKind, Resize, Vec2, Viewport};
use wyrm_platform::{
    ImmediateGate, PermissionGate, PermissionTicket, ProfileSelector, PromptGate, PromptRequest,
    ThresholdSelector, UserNotice,
};

pub use painter::EguiSink;

const TOAST_MS: f64 = 3000.0;
// Arrow keys stand in for a tilt sensor on desktop.
const KEY_TILT_DEG: f32 = 15.0;

pub struct UiOptions {
    pub inner_size: [f32; 2],
    /// Ask before enabling tilt steering instead of granting at once.
    pub prompt_for_sensor: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            inner_size: [1280.0, 800.0],
            prompt_for_sensor: true,
        }
    }
}

pub fn run_ui(config: EngineConfig, options: UiOptions) -> wyrm_platform::Result<()> {
    let [width, height] = options.inner_size;
    let selector = ThresholdSelector::new(config.profile_threshold);
    let engine = Engine::new(config, Viewport::new(width, height))?;
    let sensor = if options.prompt_for_sensor {
        Sensor::Prompt(PromptGate::new())
    } else {
        Sensor::Immediate(ImmediateGate)
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Wyrm")
            .with_inner_size(options.inner_size),
        ..Default::default()
    };
    eframe::run_native(
        "Wyrm",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(WyrmApp::new(engine, sensor, selector)))),
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

enum Sensor {
    Immediate(ImmediateGate),
    Prompt(PromptGate),
}

impl Sensor {
    fn gate(&mut self) -> &mut dyn PermissionGate {
        match self {
            Sensor::Immediate(gate) => gate,
            Sensor::Prompt(gate) => gate,
        }
    }
}

/// Forwards notices to the toast list drawn by [`WyrmApp`].
pub struct ToastNotice {
    sender: Sender<String>,
}

impl UserNotice for ToastNotice {
    fn notice(&mut self, message: &str) {
        let _ = self.sender.send(message.to_owned());
    }
}

struct Toast {
    text: String,
    until_ms: f64,
}

pub struct WyrmApp {
    engine: Engine,
    sensor: Sensor,
    selector: ThresholdSelector,
    ticket: Option<PermissionTicket>,
    prompt: Option<PromptRequest>,
    notices: ToastNotice,
    notice_receiver: Receiver<String>,
    toasts: Vec<Toast>,
}

impl WyrmApp {
    fn new(engine: Engine, sensor: Sensor, selector: ThresholdSelector) -> Self {
        let (sender, notice_receiver) = crossbeam_channel::unbounded();
        Self {
            engine,
            sensor,
            selector,
            ticket: None,
            prompt: None,
            notices: ToastNotice { sender },
            notice_receiver,
            toasts: Vec::new(),
        }
    }

    fn pump_input(&mut self, context: &egui::Context, now_ms: f64) {
        let screen = context.screen_rect();
        let viewport = Viewport::new(screen.width(), screen.height());
        // Minimised windows report an empty rect; keep the last real size.
        if viewport.width >= 1.0 && viewport.height >= 1.0 && viewport != self.engine.viewport() {
            let resize = self.engine.handle(&InputEvent::Resized(viewport), now_ms);
            if let Some(Resize::Reinitialized(profile)) = resize {
                // The rebuilt scene has no pending request to resolve.
                self.ticket = None;
                self.prompt = None;
                if let Sensor::Prompt(gate) = &mut self.sensor {
                    while gate.next_prompt().is_some() {}
                }
                debug!(?profile, "scene rebuilt, permission state cleared");
            }
        }

        let (events, tilt) = context.input(|i| {
            let mut events = Vec::new();
            for event in &i.events {
                match event {
                    egui::Event::PointerMoved(pos) => {
                        events.push(InputEvent::PointerMoved(Vec2::new(pos.x, pos.y)));
                    }
                    egui::Event::Touch {
                        phase: egui::TouchPhase::Start | egui::TouchPhase::Move,
                        pos,
                        ..
                    } => events.push(InputEvent::TouchMoved(vec![Vec2::new(pos.x, pos.y)])),
                    _ => {}
                }
            }
            let axis = |negative, positive| {
                (i.key_down(positive) as i8 - i.key_down(negative) as i8) as f32 * KEY_TILT_DEG
            };
            let tilt = (
                axis(egui::Key::ArrowLeft, egui::Key::ArrowRight),
                axis(egui::Key::ArrowUp, egui::Key::ArrowDown),
            );
            (events, tilt)
        });

        for event in &events {
            self.engine.handle(event, now_ms);
        }
        if self.engine.driver_mode() == Some(DriverMode::Orientation) {
            let (gamma, beta) = tilt;
            let sample = InputEvent::Orientation {
                gamma: Some(gamma),
                beta: Some(beta),
            };
            self.engine.handle(&sample, now_ms);
        }
    }

    fn toggle_tilt(&mut self) {
        match self.engine.driver_mode() {
            Some(DriverMode::Orientation) => self.engine.disable_orientation(),
            Some(DriverMode::Pointer) => match self.engine.request_orientation() {
                Ok(()) => self.ticket = Some(self.sensor.gate().request()),
                Err(err) => self.notices.notice(&err.to_string()),
            },
            None => {}
        }
    }

    fn poll_permission(&mut self) {
        let Some(outcome) = self.ticket.as_ref().and_then(PermissionTicket::poll) else {
            return;
        };
        self.ticket = None;
        if let Err(err) = self.engine.resolve_orientation(outcome) {
            self.notices.notice(&err.to_string());
        }
    }

    fn show_tilt_toggle(&mut self, context: &egui::Context) {
        if self.selector.select(self.engine.viewport()) != ProfileKind::Compact {
            return;
        }
        let label = match (self.engine.driver_mode(), self.ticket.is_some()) {
            (_, true) => "Waiting for sensor...",
            (Some(DriverMode::Orientation), false) => "Tilt: on",
            _ => "Tilt: off",
        };
        let clicked = egui::Area::new(egui::Id::new("wyrm_tilt_toggle"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .show(context, |ui| ui.button(label).clicked())
            .inner;
        if clicked {
            debug!("tilt toggle clicked");
            self.toggle_tilt();
        }
    }

    fn show_prompt(&mut self, context: &egui::Context) {
        if self.prompt.is_none() {
            if let Sensor::Prompt(gate) = &mut self.sensor {
                self.prompt = gate.next_prompt();
            }
        }
        if self.prompt.is_none() {
            return;
        }

        let mut answer = None;
        egui::Window::new("Motion sensor")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(context, |ui| {
                ui.label("Steer the wyrm by tilting? Arrow keys act as the sensor on desktop.");
                ui.horizontal(|ui| {
                    if ui.button("Allow").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("Deny").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if let Some(allow) = answer {
            if let Some(prompt) = self.prompt.take() {
                if allow {
                    prompt.grant();
                } else {
                    prompt.deny();
                }
            }
        }
    }

    fn show_toasts(&mut self, context: &egui::Context, now_ms: f64) {
        while let Ok(text) = self.notice_receiver.try_recv() {
            info!(%text, "showing notice");
            self.toasts.push(Toast {
                text,
                until_ms: now_ms + TOAST_MS,
            });
        }
        self.toasts.retain(|toast| toast.until_ms > now_ms);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("wyrm_toasts"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .show(context, |ui| {
                for toast in &self.toasts {
                    egui::Frame::popup(&context.style()).show(ui, |ui| {
                        ui.label(&toast.text);
                    });
                }
            });
    }
}

impl eframe::App for WyrmApp {
    fn update(&mut self, context: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = context.input(|i| i.time) * 1000.0;

        self.pump_input(context, now_ms);
        self.poll_permission();
        self.engine.frame(now_ms);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::BLACK))
            .show(context, |ui| {
                let mut sink = EguiSink::new(ui.painter());
                self.engine.render(&mut sink);
            });

        self.show_tilt_toggle(context);
        self.show_prompt(context);
        self.show_toasts(context, now_ms);

        context.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact_app(sensor: Sensor) -> WyrmApp {
        let engine = Engine::with_seed(EngineConfig::default(), Viewport::new(400.0, 800.0), 5).unwrap();
        WyrmApp::new(engine, sensor, ThresholdSelector::default())
    }

    #[test]
    fn immediate_sensor_switches_on_next_poll() {
        let mut app = compact_app(Sensor::Immediate(ImmediateGate));
        app.toggle_tilt();
        assert_eq!(app.engine.driver_mode(), Some(DriverMode::Pointer));
        app.poll_permission();
        assert_eq!(app.engine.driver_mode(), Some(DriverMode::Orientation));
        app.toggle_tilt();
        assert_eq!(app.engine.driver_mode(), Some(DriverMode::Pointer));
    }

    #[test]
    fn denied_prompt_leaves_a_notice() {
        let mut app = compact_app(Sensor::Prompt(PromptGate::new()));
        app.toggle_tilt();
        app.poll_permission();
        assert!(app.ticket.is_some());

        let Sensor::Prompt(gate) = &mut app.sensor else {
            unreachable!()
        };
        gate.next_prompt().unwrap().deny();
        app.poll_permission();
        assert_eq!(app.engine.driver_mode(), Some(DriverMode::Pointer));
        assert_eq!(
            app.notice_receiver.try_recv().unwrap(),
            "motion sensor access was denied"
        );
    }

    #[test]
    fn second_request_while_pending_is_rejected() {
        let mut app = compact_app(Sensor::Prompt(PromptGate::new()));
        app.toggle_tilt();
        app.toggle_tilt();
        assert_eq!(
            app.notice_receiver.try_recv().unwrap(),
            "a motion sensor request is already pending"
        );
    }
}
