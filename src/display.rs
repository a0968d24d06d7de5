use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use egui::{Color32, ColorImage, Event, Key, Modifiers, TextureHandle, TextureOptions};
use palette::Srgb;

use crate::buffer::{ChannelOrder, PixelBuffer};
use crate::error::{Error, Result};
use crate::filter::CHANNELS;

/// Why `wait_for_key` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Pressed(Key),
    /// A key egui has no `Key` for, reported by the character it typed.
    Text(char),
    /// A modifier (shift, ctrl, alt, command) pressed on its own.
    Modifier(Modifiers),
    TimedOut,
    /// The window was closed without a key press.
    WindowClosed,
}

/// Handle to one titled window and the RGB frame it shows.
///
/// Surfaces are created by [`DisplayBackend::show`] and consumed by
/// [`DisplayBackend::teardown`], so a released surface cannot be reused.
pub struct DisplaySurface {
    title: String,
    frame: ColorImage,
}

impl DisplaySurface {
    /// Prepares a frame from a 3-channel RGB buffer.
    pub fn new(buf: &PixelBuffer, title: &str) -> Result<Self> {
        if buf.channels() != CHANNELS {
            return Err(Error::InvalidShape {
                channels: buf.channels(),
            });
        }
        if buf.order() != ChannelOrder::Rgb {
            return Err(Error::OrderMismatch {
                declared: ChannelOrder::Rgb,
                actual: buf.order(),
            });
        }
        if buf.is_empty() {
            return Err(Error::Display("cannot show an empty image".to_string()));
        }

        let colors = palette::cast::from_component_slice::<Srgb<u8>>(buf.as_raw());
        let pixels = colors
            .iter()
            .map(|c| Color32::from_rgb(c.red, c.green, c.blue))
            .collect();

        Ok(Self {
            title: title.to_string(),
            frame: ColorImage {
                size: [buf.width(), buf.height()],
                pixels,
            },
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// `[width, height]` in pixels.
    pub fn size(&self) -> [usize; 2] {
        self.frame.size
    }

    pub fn frame(&self) -> &ColorImage {
        &self.frame
    }
}

impl fmt::Debug for DisplaySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySurface")
            .field("title", &self.title)
            .field("size", &self.frame.size)
            .finish()
    }
}

/// Windowing operations the pipeline drives, in call order.
pub trait DisplayBackend {
    fn show(&mut self, buf: &PixelBuffer, title: &str) -> Result<DisplaySurface>;

    /// Blocks until a key press, window close, or `timeout_ms` elapses.
    /// A timeout of 0 waits indefinitely.
    fn wait_for_key(&mut self, surface: &mut DisplaySurface, timeout_ms: u64)
        -> Result<KeyCode>;

    fn teardown(&mut self, surface: DisplaySurface);
}

/// Native window backend built on eframe.
///
/// eframe opens the OS window together with its event loop, so the window
/// is realized in `wait_for_key` and destroyed when that loop exits.
#[derive(Debug, Default)]
pub struct NativeDisplay;

impl NativeDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayBackend for NativeDisplay {
    fn show(&mut self, buf: &PixelBuffer, title: &str) -> Result<DisplaySurface> {
        if !has_display_server(|name| {
            std::env::var_os(name).map_or(false, |value| !value.is_empty())
        }) {
            return Err(Error::Display(
                "no window system found (DISPLAY and WAYLAND_DISPLAY are unset)".to_string(),
            ));
        }

        let surface = DisplaySurface::new(buf, title)?;
        log::info!(
            "showing {}x{} image in window {:?}",
            buf.width(),
            buf.height(),
            title
        );
        Ok(surface)
    }

    fn wait_for_key(
        &mut self,
        surface: &mut DisplaySurface,
        timeout_ms: u64,
    ) -> Result<KeyCode> {
        let outcome = Rc::new(Cell::new(None));
        let viewer = Viewer {
            pending: Some(surface.frame.clone()),
            texture: None,
            held: Modifiers::NONE,
            deadline: deadline(timeout_ms),
            outcome: Rc::clone(&outcome),
        };

        let [width, height] = surface.size();
        let options = eframe::NativeOptions {
            initial_window_size: Some(egui::vec2(width as f32, height as f32)),
            resizable: false,
            ..Default::default()
        };

        log::debug!("waiting for key press (timeout {} ms)", timeout_ms);
        eframe::run_native(
            &surface.title,
            options,
            Box::new(move |_cc| Box::new(viewer)),
        )
        .map_err(|e| Error::Display(e.to_string()))?;

        Ok(outcome.get().unwrap_or(KeyCode::WindowClosed))
    }

    fn teardown(&mut self, surface: DisplaySurface) {
        log::info!("closed window {:?}", surface.title);
        drop(surface);
    }
}

fn deadline(timeout_ms: u64) -> Option<Instant> {
    match timeout_ms {
        0 => None,
        ms => Some(Instant::now() + Duration::from_millis(ms)),
    }
}

#[cfg(target_os = "linux")]
fn has_display_server(is_set: impl Fn(&str) -> bool) -> bool {
    is_set("DISPLAY") || is_set("WAYLAND_DISPLAY")
}

#[cfg(not(target_os = "linux"))]
fn has_display_server(_is_set: impl Fn(&str) -> bool) -> bool {
    true
}

struct Viewer {
    pending: Option<ColorImage>,
    texture: Option<TextureHandle>,
    held: Modifiers,
    deadline: Option<Instant>,
    outcome: Rc<Cell<Option<KeyCode>>>,
}

impl Viewer {
    fn finish(&self, code: KeyCode, frame: &mut eframe::Frame) {
        log::debug!("wait finished: {:?}", code);
        self.outcome.set(Some(code));
        frame.close();
    }
}

impl eframe::App for Viewer {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if let Some(image) = self.pending.take() {
            self.texture = Some(ctx.load_texture("frame", image, TextureOptions::NEAREST));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.image(texture, texture.size_vec2());
                }
            });

        if self.outcome.get().is_some() {
            return;
        }
        let now = Instant::now();
        match outcome(ctx, self.held, self.deadline, now) {
            Some(code) => self.finish(code, frame),
            None => {
                if let Some(deadline) = self.deadline {
                    ctx.request_repaint_after(deadline - now);
                }
            }
        }
        self.held = ctx.input(|input| input.modifiers);
    }
}

/// Decides whether the wait is over for the current frame's input.
///
/// `held` is the modifier state of the previous frame.
fn outcome(
    ctx: &egui::Context,
    held: Modifiers,
    deadline: Option<Instant>,
    now: Instant,
) -> Option<KeyCode> {
    pressed_key(ctx, held).or(match deadline {
        Some(deadline) if now >= deadline => Some(KeyCode::TimedOut),
        _ => None,
    })
}

fn pressed_key(ctx: &egui::Context, held: Modifiers) -> Option<KeyCode> {
    ctx.input(|input| {
        let key = input.events.iter().find_map(|event| match event {
            Event::Key {
                key, pressed: true, ..
            } => Some(KeyCode::Pressed(*key)),
            Event::Text(text) => text.chars().next().map(KeyCode::Text),
            _ => None,
        });
        key.or_else(|| {
            let pressed = newly_held(held, input.modifiers);
            pressed.any().then_some(KeyCode::Modifier(pressed))
        })
    })
}

fn newly_held(before: Modifiers, now: Modifiers) -> Modifiers {
    Modifiers {
        alt: now.alt && !before.alt,
        ctrl: now.ctrl && !before.ctrl,
        shift: now.shift && !before.shift,
        mac_cmd: now.mac_cmd && !before.mac_cmd,
        command: now.command && !before.command,
    }
}
