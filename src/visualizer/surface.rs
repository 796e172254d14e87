//! Drawing surface abstraction and the in-memory display list the render task
//! draws into.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

/// Linear blend between two colors; `t = 0` is `bottom`, `t = 1` is `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub bottom: Rgb,
    pub top: Rgb,
}

impl Gradient {
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb(
            mix(self.bottom.0, self.top.0),
            mix(self.bottom.1, self.top.1),
            mix(self.bottom.2, self.top.2),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Gradient spanning the rectangle's own height.
    Vertical(Gradient),
}

/// Axis-aligned rectangle in surface units, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

pub trait DrawSurface {
    /// `(width, height)` in surface units.
    fn size(&self) -> (f64, f64);
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, rect: Rect, fill: Fill);
}

/// Display list of one rendered frame.
///
/// The terminal UI rasterizes it into cells; size changes take effect on the
/// next frame.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    width: f64,
    height: f64,
    background: Option<Rgb>,
    rects: Vec<(Rect, Fill)>,
}

impl FrameBuffer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    pub fn rects(&self) -> &[(Rect, Fill)] {
        &self.rects
    }
}

impl DrawSurface for FrameBuffer {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.background = Some(color);
        self.rects.clear();
    }

    fn fill_rect(&mut self, rect: Rect, fill: Fill) {
        self.rects.push((rect, fill));
    }
}
