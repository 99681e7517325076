use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::Path;
use tiny_skia::{Color as SkColor, Paint, Pixmap, Rect as SkRect, Transform};

use crate::layout::Rect;
use crate::renderer::{Color, TextAlign, TextOverflow};

const ELLIPSIS: &str = "...";

/// Monochrome framebuffer. Every pixel is either black or white.
pub struct Canvas {
    pub pixmap: Pixmap,
}

pub struct FontState {
    font: fontdue::Font,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .with_context(|| format!("Failed to create {}x{} framebuffer", width, height))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self, color: Color) {
        let [r, g, b, a] = color.rgba();
        self.pixmap.fill(SkColor::from_rgba8(r, g, b, a));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(r) = SkRect::from_xywh(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32) {
            let [cr, cg, cb, ca] = color.rgba();
            let mut paint = Paint::default();
            paint.set_color_rgba8(cr, cg, cb, ca);
            paint.anti_alias = false;
            self.pixmap.fill_rect(r, &paint, Transform::identity(), None);
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        let idx = ((y as u32 * self.width() + x as u32) * 4) as usize;
        let rgba = color.rgba();
        self.pixmap.data_mut()[idx..idx + 4].copy_from_slice(&rgba);
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        // Pixels are opaque, so premultiplied and straight RGBA agree.
        image::save_buffer(path, self.pixmap.data(), self.width(), self.height(), image::ColorType::Rgba8)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
impl Canvas {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let p = self.pixmap.pixel(x, y)?;
        Some(if p.red() >= 0x80 { Color::White } else { Color::Black })
    }
}

impl FontState {
    /// Load a font by file path, else by file name under the system font
    /// directories, else fall back to any installed font.
    pub fn load(font_name: &str) -> Result<Self> {
        if let Ok(data) = std::fs::read(font_name) {
            return Self::from_bytes(data).with_context(|| format!("Failed to parse font {}", font_name));
        }

        let search_paths = [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/nix/var/nix/profiles/system/sw/share/X11/fonts",
        ];

        let wanted = font_name.to_lowercase();
        let exact = |stem: &str| stem == wanted;
        let partial = |stem: &str| stem.contains(&wanted);
        let any = |_: &str| true;
        let matchers: [&dyn Fn(&str) -> bool; 3] = [&exact, &partial, &any];

        for (pass, matcher) in matchers.iter().enumerate() {
            for base in &search_paths {
                if let Some(font) = Self::walk_for_font(Path::new(base), *matcher) {
                    if pass == 2 {
                        log::warn!("Font {:?} not found, using a fallback", font_name);
                    }
                    return Ok(font);
                }
            }
        }

        anyhow::bail!("No fonts found on system. Install a TTF font or set a font path in the config.")
    }

    fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default()).map_err(anyhow::Error::msg)?;
        Ok(Self { font })
    }

    fn walk_for_font(dir: &Path, matches: &dyn Fn(&str) -> bool) -> Option<Self> {
        let entries = std::fs::read_dir(dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if let Some(f) = Self::walk_for_font(&path, matches) {
                    return Some(f);
                }
                continue;
            }
            let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase());
            if !matches!(ext.as_deref(), Some("ttf") | Some("otf")) {
                continue;
            }
            let stem = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()).unwrap_or_default();
            if !matches(&stem) {
                continue;
            }
            if let Ok(font) = std::fs::read(&path).map_err(anyhow::Error::from).and_then(Self::from_bytes) {
                log::info!("Found font: {}", path.display());
                return Some(font);
            }
        }
        None
    }

    pub fn measure_text(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|ch| self.font.metrics(ch, size).advance_width).sum()
    }

    /// Draw `text` inside `rect` with its baseline one ascent below the top.
    /// Nothing outside `rect` is touched.
    pub fn draw_text_box(
        &self,
        canvas: &mut Canvas,
        text: &str,
        rect: Rect,
        size: f32,
        align: TextAlign,
        overflow: TextOverflow,
        color: Color,
    ) {
        let max_width = rect.w as f32;
        let text = match overflow {
            TextOverflow::TrailingEllipsis => {
                match fit_with_ellipsis(text, max_width, |s| self.measure_text(s, size)) {
                    Some(t) => t,
                    None => return,
                }
            }
        };

        let Some((ink_left, ink_right)) = self.ink_extent(&text, size) else { return };
        let x = match align {
            TextAlign::Center => rect.x as f32 + (max_width - (ink_right - ink_left)) / 2.0 - ink_left,
        };
        let baseline = rect.y as f32 + self.baseline_offset(size, rect.h);
        self.draw_text(canvas, &text, x, baseline, size, color, rect);
    }

    /// Distance from the box top to the baseline. Raised when the line is
    /// taller than the box so descenders stay inside.
    fn baseline_offset(&self, size: f32, box_h: u32) -> f32 {
        match self.font.horizontal_line_metrics(size) {
            Some(lines) => lines.ascent.min(box_h as f32 + lines.descent).floor(),
            None => size,
        }
    }

    /// Left and right edge of the inked columns, relative to the pen start.
    fn ink_extent(&self, text: &str, size: f32) -> Option<(f32, f32)> {
        let mut pen = 0.0f32;
        let mut extent: Option<(f32, f32)> = None;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, size);
            let mut inked = (0..metrics.width)
                .filter(|&col| (0..metrics.height).any(|row| is_ink(bitmap[row * metrics.width + col])));
            if let Some(first) = inked.next() {
                let last = inked.last().unwrap_or(first);
                let left = pen + (metrics.xmin + first as i32) as f32;
                let right = pen + (metrics.xmin + last as i32 + 1) as f32;
                extent = Some(match extent {
                    Some((l, r)) => (l.min(left), r.max(right)),
                    None => (left, right),
                });
            }
            pen += metrics.advance_width;
        }
        extent
    }

    fn draw_text(&self, canvas: &mut Canvas, text: &str, x: f32, baseline: f32, size: f32, color: Color, clip: Rect) {
        let mut cursor_x = x;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, size);
            let gx = cursor_x.floor() as i32 + metrics.xmin;
            let gy = baseline as i32 - metrics.height as i32 - metrics.ymin;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    if !is_ink(bitmap[row * metrics.width + col]) {
                        continue;
                    }
                    let px = gx + col as i32;
                    let py = gy + row as i32;
                    if px >= clip.x && px < clip.right() && py >= clip.y && py < clip.bottom() {
                        canvas.set_pixel(px, py, color);
                    }
                }
            }
            cursor_x += metrics.advance_width;
        }
    }
}

/// No grey on this screen: half coverage or more is ink.
fn is_ink(coverage: u8) -> bool {
    coverage >= 0x80
}

/// Shorten `text` so that it measures at most `max_width`, replacing the cut
/// tail with an ellipsis. Returns `None` when not even the ellipsis fits.
pub fn fit_with_ellipsis<'a>(text: &'a str, max_width: f32, measure: impl Fn(&str) -> f32) -> Option<Cow<'a, str>> {
    if measure(text) <= max_width {
        return Some(Cow::Borrowed(text));
    }
    if measure(ELLIPSIS) > max_width {
        return None;
    }
    for (idx, _) in text.char_indices().rev() {
        let candidate = format!("{}{}", text[..idx].trim_end(), ELLIPSIS);
        if measure(&candidate) <= max_width {
            return Some(Cow::Owned(candidate));
        }
    }
    Some(Cow::Borrowed(ELLIPSIS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(fit_with_ellipsis("Tokyo", 144.0, fixed).as_deref(), Some("Tokyo"));
        assert_eq!(fit_with_ellipsis("", 0.0, fixed).as_deref(), Some(""));
    }

    #[test]
    fn long_text_gets_ellipsis() {
        let fitted = fit_with_ellipsis("Santa Cruz de la Sierra", 144.0, fixed).unwrap();
        assert_eq!(fitted, "Santa Cruz...");
        assert!(fixed(&fitted) <= 144.0);
    }

    #[test]
    fn exact_fit_is_not_truncated() {
        assert_eq!(fit_with_ellipsis("12345", 50.0, fixed).as_deref(), Some("12345"));
        assert_eq!(fit_with_ellipsis("123456", 50.0, fixed).as_deref(), Some("12..."));
    }

    #[test]
    fn multibyte_names_cut_on_char_boundary() {
        let fitted = fit_with_ellipsis("São Paulo", 60.0, fixed).unwrap();
        assert_eq!(fitted, "São...");
    }

    #[test]
    fn only_ellipsis_fits() {
        assert_eq!(fit_with_ellipsis("Eindhoven", 30.0, fixed).as_deref(), Some("..."));
    }

    #[test]
    fn nothing_fits() {
        assert_eq!(fit_with_ellipsis("Eindhoven", 25.0, fixed), None);
    }

    fn system_font(name: &str) -> Option<FontState> {
        match FontState::load(name) {
            Ok(font) => Some(font),
            Err(e) => {
                eprintln!("skipping, no usable font: {:#}", e);
                None
            }
        }
    }

    fn ink(canvas: &Canvas) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.pixel(x, y) == Some(Color::White) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn draw_white(font: &FontState, text: &str, rect: Rect, size: f32) -> Canvas {
        let mut canvas = Canvas::new(144, 168).unwrap();
        canvas.clear(Color::Black);
        font.draw_text_box(&mut canvas, text, rect, size, TextAlign::Center, TextOverflow::TrailingEllipsis, Color::White);
        canvas
    }

    #[test]
    fn text_is_centred_on_its_ink() {
        let Some(font) = system_font("DejaVuSans-Bold") else { return };
        for text in ["19:30", "07:05", "Tokyo"] {
            let pixels = ink(&draw_white(&font, text, Rect::new(0, 112, 144, 56), 30.0));
            assert!(!pixels.is_empty(), "{} drew nothing", text);
            let min_x = pixels.iter().map(|p| p.0).min().unwrap() as i32;
            let max_x = pixels.iter().map(|p| p.0).max().unwrap() as i32;
            let left = min_x;
            let right = 143 - max_x;
            assert!((left - right).abs() <= 1, "{}: left margin {} right margin {}", text, left, right);
        }
    }

    #[test]
    fn descenders_fit_in_label_box() {
        let Some(font) = system_font("DejaVuSans") else { return };
        let label = Rect::new(0, 56, 144, 18);
        let boxed = ink(&draw_white(&font, "Tokyo", label, 16.0));
        let free = ink(&draw_white(&font, "Tokyo", Rect::new(0, 56, 144, 100), 16.0));

        assert!(!boxed.is_empty());
        assert!(boxed.iter().all(|&(_, y)| y >= 56 && y < 74), "ink outside the label box");
        assert_eq!(boxed.len(), free.len(), "glyphs were clipped");
    }

    #[test]
    fn overlong_label_stays_in_box() {
        let Some(font) = system_font("DejaVuSans") else { return };
        let label = Rect::new(0, 0, 144, 18);
        let pixels = ink(&draw_white(&font, "Santa Cruz de la Sierra, Bolivia", label, 16.0));
        assert!(!pixels.is_empty());
        assert!(pixels.iter().all(|&(x, y)| x < 144 && y < 18));
    }

    #[test]
    fn fill_rect_is_exact() {
        let mut canvas = Canvas::new(144, 168).unwrap();
        canvas.clear(Color::White);
        canvas.fill_rect(Rect::new(0, 56, 144, 56), Color::Black);
        assert_eq!(canvas.pixel(0, 55), Some(Color::White));
        assert_eq!(canvas.pixel(0, 56), Some(Color::Black));
        assert_eq!(canvas.pixel(143, 111), Some(Color::Black));
        assert_eq!(canvas.pixel(143, 112), Some(Color::White));
        assert_eq!(canvas.pixel(144, 0), None);
    }
}
