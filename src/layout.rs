/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    /// Split into the top third and the remaining bottom part.
    pub fn split_thirds(&self) -> (Rect, Rect) {
        let top_h = self.h / 3;
        let top = Rect::new(self.x, self.y, self.w, top_h);
        let bottom = Rect::new(self.x, self.y + top_h as i32, self.w, self.h - top_h);
        (top, bottom)
    }
}

/// Partition a `width`×`height` screen into `count` full-width horizontal
/// bands. Band `i` spans rows `[i*height/count, (i+1)*height/count)`, so the
/// bands tile the screen exactly even when `height` is not a multiple of
/// `count`.
pub fn horizontal_bands(width: u32, height: u32, count: usize) -> Vec<Rect> {
    let n = count as u64;
    let h = height as u64;
    (0..n)
        .map(|i| {
            let top = (i * h / n) as u32;
            let bottom = ((i + 1) * h / n) as u32;
            Rect::new(0, top as i32, width, bottom - top)
        })
        .collect()
}
