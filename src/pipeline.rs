//! Load, convert, show and wait, as one linear run.
//!
//! A run walks `Idle -> Loaded -> ColorConverted -> Displayed ->
//! AwaitingKey -> Closed`, one operation per transition. On failure the
//! pipeline keeps the last stage it reached and is marked failed. Once a
//! surface has been shown it is torn down on every way out of `run`.

use std::fmt;
use std::path::Path;

use crate::buffer::{ChannelOrder, PixelBuffer};
use crate::display::{DisplayBackend, DisplaySurface, KeyCode};
use crate::error::{Error, Result};
use crate::filter::convert_channel_order;
use crate::loader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loaded,
    ColorConverted,
    Displayed,
    AwaitingKey,
    Closed,
}

impl Stage {
    /// The only stage reachable from `self`.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Loaded),
            Stage::Loaded => Some(Stage::ColorConverted),
            Stage::ColorConverted => Some(Stage::Displayed),
            Stage::Displayed => Some(Stage::AwaitingKey),
            Stage::AwaitingKey => Some(Stage::Closed),
            Stage::Closed => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct Pipeline<B: DisplayBackend> {
    backend: B,
    stage: Stage,
    failed: bool,
}

impl<B: DisplayBackend> Pipeline<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            stage: Stage::Idle,
            failed: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Decodes `path`, converts it to RGB and shows it under `title` until a
    /// key is pressed or `timeout_ms` elapses.
    pub fn run<P: AsRef<Path>>(
        &mut self,
        path: P,
        title: &str,
        timeout_ms: u64,
    ) -> Result<KeyCode> {
        if self.stage != Stage::Idle || self.failed {
            return Err(Error::AlreadyRun);
        }
        let result = self.run_stages(path.as_ref(), title, timeout_ms);
        if let Err(e) = &result {
            self.failed = true;
            log::error!("pipeline failed after stage {}: {}", self.stage, e);
        }
        result
    }

    fn run_stages(&mut self, path: &Path, title: &str, timeout_ms: u64) -> Result<KeyCode> {
        let bgr = loader::load(path)?;
        self.advance(Stage::Loaded);

        let rgb = convert_channel_order(bgr, ChannelOrder::Bgr, ChannelOrder::Rgb)?;
        self.advance(Stage::ColorConverted);

        self.display(&rgb, title, timeout_ms)
    }

    fn display(&mut self, rgb: &PixelBuffer, title: &str, timeout_ms: u64) -> Result<KeyCode> {
        let surface = self.backend.show(rgb, title)?;
        self.advance(Stage::Displayed);
        self.advance(Stage::AwaitingKey);

        let mut shown = ShownSurface::new(&mut self.backend, surface);
        let key = shown.wait_for_key(timeout_ms);
        drop(shown);

        let key = key?;
        self.advance(Stage::Closed);
        log::info!("closed after {:?}", key);
        Ok(key)
    }

    fn advance(&mut self, to: Stage) {
        debug_assert_eq!(self.stage.next(), Some(to), "skipped a stage");
        self.stage = to;
        log::debug!("stage -> {}", to);
    }
}

/// Returns the surface to its backend's `teardown` when dropped.
struct ShownSurface<'a, B: DisplayBackend> {
    backend: &'a mut B,
    /// Present from `new` until `drop` hands it to `teardown`.
    surface: Option<DisplaySurface>,
}

impl<'a, B: DisplayBackend> ShownSurface<'a, B> {
    fn new(backend: &'a mut B, surface: DisplaySurface) -> Self {
        Self {
            backend,
            surface: Some(surface),
        }
    }

    fn wait_for_key(&mut self, timeout_ms: u64) -> Result<KeyCode> {
        let (backend, surface) = self.parts();
        backend.wait_for_key(surface, timeout_ms)
    }

    fn parts(&mut self) -> (&mut B, &mut DisplaySurface) {
        match self.surface.as_mut() {
            Some(surface) => (&mut *self.backend, surface),
            None => unreachable!("surface is only taken on drop"),
        }
    }
}

impl<B: DisplayBackend> Drop for ShownSurface<'_, B> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.backend.teardown(surface);
        }
    }
}
