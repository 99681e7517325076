//! Interface between the watch app and the platform that runs it.
//!
//! The platform owns the event loop, the screen, and font resources. It calls
//! into a [`WatchApp`] serially: once on init, once per minute on tick, once
//! per dirty layer when it composes a frame, and once on deinit. The app calls
//! back through [`Host`].

pub mod sim;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::FontSpec;
use crate::layout::Rect;
use crate::renderer::DrawOp;
use crate::time_utils::WallClock;

/// Font resource issued by [`Host::load_font`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub usize);

/// Screen layer created by [`Host::add_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

pub trait Host {
    fn screen_size(&self) -> (u32, u32);
    fn now(&self) -> WallClock;
    fn add_layer(&mut self, bounds: Rect) -> LayerId;
    /// Request a redraw. Drawing happens in the next compose, not here.
    fn mark_dirty(&mut self, layer: LayerId);
    fn load_font(&mut self, spec: &FontSpec) -> Result<FontHandle>;
    fn unload_font(&mut self, font: FontHandle);
}

pub trait WatchApp {
    fn on_init(&mut self, host: &mut dyn Host) -> Result<()>;
    fn on_tick(&mut self, now: WallClock, host: &mut dyn Host);
    fn on_deinit(&mut self, host: &mut dyn Host);
    /// Draw instructions for one layer, in layer order.
    fn draw_layer(&self, layer: LayerId, bounds: Rect) -> Vec<DrawOp>;
}

/// The host side of a frame: draw every dirty layer.
pub trait Compositor {
    /// Returns the number of layers drawn.
    fn compose(&mut self, app: &dyn WatchApp) -> Result<usize>;
}

/// Turns clock readings into minute ticks.
#[derive(Debug, Clone)]
pub struct MinuteTicker {
    last: WallClock,
}

impl MinuteTicker {
    pub fn new(start: WallClock) -> Self {
        Self { last: start }
    }

    pub fn poll(&mut self, now: WallClock) -> Option<WallClock> {
        if now == self.last {
            return None;
        }
        self.last = now;
        Some(now)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Compose the first frame and exit.
    pub once: bool,
    pub poll_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { once: false, poll_interval: Duration::from_millis(250) }
    }
}

/// Run `app` on `host` until Ctrl-C, or for a single frame with `once`.
pub fn run<H: Host + Compositor>(app: &mut dyn WatchApp, host: &mut H, options: &RunOptions) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    if !options.once {
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .context("Failed to set signal handler")?;
    }

    app.on_init(host)?;
    let result = event_loop(app, host, options, &running);
    app.on_deinit(host);
    result
}

fn event_loop<H: Host + Compositor>(
    app: &mut dyn WatchApp,
    host: &mut H,
    options: &RunOptions,
    running: &AtomicBool,
) -> Result<()> {
    let drawn = host.compose(app)?;
    log::debug!("Initial frame: {} layers", drawn);

    let mut ticker = MinuteTicker::new(host.now());
    while !options.once && running.load(Ordering::SeqCst) {
        std::thread::sleep(options.poll_interval);
        if let Some(now) = ticker.poll(host.now()) {
            log::debug!("Tick {}", now);
            app.on_tick(now, host);
            host.compose(app)?;
        }
    }
    Ok(())
}
