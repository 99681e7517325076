//! Desktop stand-in for the watch: a framebuffer the size of the watch
//! screen, fonts from the system, time from the system clock, and a PNG
//! written after every composed frame.

use anyhow::Result;
use std::path::PathBuf;

use crate::canvas::{Canvas, FontState};
use crate::config::FontSpec;
use crate::host::{Compositor, FontHandle, Host, LayerId, WatchApp};
use crate::layout::Rect;
use crate::renderer::{Color, DrawOp};
use crate::time_utils::WallClock;

struct LoadedFont {
    face: FontState,
    size: f32,
}

struct Layer {
    bounds: Rect,
    dirty: bool,
}

pub struct SimHost {
    canvas: Canvas,
    fonts: Vec<Option<LoadedFont>>,
    layers: Vec<Layer>,
    output: Option<PathBuf>,
    frames: u64,
}

impl SimHost {
    pub fn new(width: u32, height: u32, output: Option<PathBuf>) -> Result<Self> {
        let mut canvas = Canvas::new(width, height)?;
        // Window background behind the layers.
        canvas.clear(Color::Black);
        Ok(Self { canvas, fonts: Vec::new(), layers: Vec::new(), output, frames: 0 })
    }

    fn execute(&mut self, op: &DrawOp) {
        match op {
            DrawOp::FillRect { rect, color } => self.canvas.fill_rect(*rect, *color),
            DrawOp::Text { rect, text, font, align, overflow, color } => {
                match self.fonts.get(font.0).and_then(Option::as_ref) {
                    Some(loaded) => {
                        loaded.face.draw_text_box(&mut self.canvas, text, *rect, loaded.size, *align, *overflow, *color)
                    }
                    None => log::warn!("Draw with unloaded font {:?}", font),
                }
            }
        }
    }
}

impl Host for SimHost {
    fn screen_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn now(&self) -> WallClock {
        WallClock::now()
    }

    fn add_layer(&mut self, bounds: Rect) -> LayerId {
        self.layers.push(Layer { bounds, dirty: false });
        LayerId(self.layers.len() - 1)
    }

    fn mark_dirty(&mut self, layer: LayerId) {
        match self.layers.get_mut(layer.0) {
            Some(l) => l.dirty = true,
            None => log::warn!("mark_dirty on unknown layer {:?}", layer),
        }
    }

    fn load_font(&mut self, spec: &FontSpec) -> Result<FontHandle> {
        let face = FontState::load(&spec.font)?;
        self.fonts.push(Some(LoadedFont { face, size: spec.size }));
        log::info!("Loaded font {} at {}px", spec.font, spec.size);
        Ok(FontHandle(self.fonts.len() - 1))
    }

    fn unload_font(&mut self, font: FontHandle) {
        match self.fonts.get_mut(font.0).and_then(Option::take) {
            Some(_) => log::debug!("Unloaded font {:?}", font),
            None => log::warn!("unload_font on unknown font {:?}", font),
        }
    }
}

impl Compositor for SimHost {
    fn compose(&mut self, app: &dyn WatchApp) -> Result<usize> {
        let mut drawn = 0;
        for idx in 0..self.layers.len() {
            if !self.layers[idx].dirty {
                continue;
            }
            let ops = app.draw_layer(LayerId(idx), self.layers[idx].bounds);
            for op in &ops {
                self.execute(op);
            }
            self.layers[idx].dirty = false;
            drawn += 1;
        }

        if drawn > 0 {
            self.frames += 1;
            log::debug!("Frame {}: {} layers", self.frames, drawn);
            if let Some(path) = &self.output {
                match self.canvas.save_png(path) {
                    Ok(()) => log::info!("Wrote frame {} to {}", self.frames, path.display()),
                    Err(e) => log::warn!("{:#}", e),
                }
            }
        }
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stripes;

    impl WatchApp for Stripes {
        fn on_init(&mut self, _host: &mut dyn Host) -> Result<()> {
            Ok(())
        }
        fn on_tick(&mut self, _now: WallClock, _host: &mut dyn Host) {}
        fn on_deinit(&mut self, _host: &mut dyn Host) {}
        fn draw_layer(&self, layer: LayerId, bounds: Rect) -> Vec<DrawOp> {
            let color = if layer.0 % 2 == 0 { Color::White } else { Color::Black };
            vec![DrawOp::FillRect { rect: bounds, color }]
        }
    }

    #[test]
    fn composes_only_dirty_layers() {
        let mut host = SimHost::new(144, 168, None).unwrap();
        let top = host.add_layer(Rect::new(0, 0, 144, 84));
        let bottom = host.add_layer(Rect::new(0, 84, 144, 84));

        host.mark_dirty(top);
        assert_eq!(host.compose(&Stripes).unwrap(), 1);
        assert_eq!(host.canvas.pixel(10, 10), Some(Color::White));
        assert_eq!(host.canvas.pixel(10, 100), Some(Color::Black));

        assert_eq!(host.compose(&Stripes).unwrap(), 0);

        host.mark_dirty(top);
        host.mark_dirty(bottom);
        assert_eq!(host.compose(&Stripes).unwrap(), 2);
        assert_eq!(host.frames, 2);
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut host = SimHost::new(144, 168, None).unwrap();
        host.mark_dirty(LayerId(7));
        host.unload_font(FontHandle(3));
        assert_eq!(host.compose(&Stripes).unwrap(), 0);
    }
}
