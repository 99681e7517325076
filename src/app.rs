use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::host::{Host, LayerId, WatchApp};
use crate::layout::{self, Rect};
use crate::renderer::{zone, DrawOp, FontPair};
use crate::time_utils::{self, WallClock};

/// World clock face: one horizontal band per configured zone.
pub struct WorldClock {
    config: AppConfig,
    device_offset: i32,
    /// `layers[i]` shows `config.zone[i]`.
    layers: Vec<LayerId>,
    fonts: Option<FontPair>,
    now: WallClock,
}

impl WorldClock {
    pub fn new(config: AppConfig, device_offset: i32) -> Self {
        Self { config, device_offset, layers: Vec::new(), fonts: None, now: WallClock::default() }
    }
}

impl WatchApp for WorldClock {
    fn on_init(&mut self, host: &mut dyn Host) -> Result<()> {
        let count = self.config.zone.len();
        let pair = self.config.font_pair_for(count).context("No font pair configured")?;
        log::info!(
            "{} zones: label font {} {}px, time font {} {}px",
            count, pair.thin.font, pair.thin.size, pair.thick.font, pair.thick.size
        );

        let thin = host.load_font(&pair.thin)?;
        let thick = match host.load_font(&pair.thick) {
            Ok(f) => f,
            Err(e) => {
                host.unload_font(thin);
                return Err(e);
            }
        };
        self.fonts = Some(FontPair { thin, thick });
        self.now = host.now();

        let (width, height) = host.screen_size();
        self.layers = layout::horizontal_bands(width, height, count)
            .into_iter()
            .map(|band| host.add_layer(band))
            .collect();
        for &layer in &self.layers {
            host.mark_dirty(layer);
        }
        Ok(())
    }

    fn on_tick(&mut self, now: WallClock, host: &mut dyn Host) {
        self.now = now;
        for &layer in &self.layers {
            host.mark_dirty(layer);
        }
    }

    fn on_deinit(&mut self, host: &mut dyn Host) {
        if let Some(fonts) = self.fonts.take() {
            host.unload_font(fonts.thin);
            host.unload_font(fonts.thick);
        }
    }

    fn draw_layer(&self, layer: LayerId, bounds: Rect) -> Vec<DrawOp> {
        let Some(fonts) = &self.fonts else { return Vec::new() };
        let Some(idx) = self.layers.iter().position(|&l| l == layer) else { return Vec::new() };
        let zone = &self.config.zone[idx];
        let local = time_utils::compute_local_time(self.now, self.device_offset, zone.offset);
        zone::render_zone(zone, local, bounds, fonts)
    }
}
