//! Designer-canvas geometry
//!
//! Panels are placed in the pixel space of the original 2560×1440 design
//! (origin top-left, Y down). Plot space is normalised to `0..1` with its
//! origin bottom-left and Y up, which makes it independent of the size of the
//! surface that ends up showing the dashboard.

use ratatui::layout::Rect;

/// A fixed pixel space panels are designed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

/// The canvas the dashboard was drawn on.
pub const DESIGNER_CANVAS: Canvas = Canvas {
    width: 2560.0,
    height: 1440.0,
};

/// Rectangle in canvas pixels; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Rectangle in plot space; `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn pixel_to_unit(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.width, 1.0 - y / self.height)
    }

    pub fn unit_to_pixel(&self, u: f64, v: f64) -> (f64, f64) {
        (u * self.width, (1.0 - v) * self.height)
    }

    /// After the flip `(x, y)` lands on the rectangle's top edge, so the
    /// height is taken off once more to reach the bottom-left corner.
    pub fn rect_to_unit(&self, rect: PixelRect) -> UnitRect {
        let (x, top) = self.pixel_to_unit(rect.x, rect.y);
        let height = rect.h / self.height;
        UnitRect {
            x,
            y: top - height,
            width: rect.w / self.width,
            height,
        }
    }

    pub fn unit_to_rect(&self, rect: UnitRect) -> PixelRect {
        let (x, y) = self.unit_to_pixel(rect.x, rect.y + rect.height);
        PixelRect {
            x,
            y,
            w: rect.width * self.width,
            h: rect.height * self.height,
        }
    }
}

impl UnitRect {
    /// Map onto a grid of terminal cells (origin top-left).
    ///
    /// Edges are rounded independently so neighbouring panels share borders
    /// instead of overlapping or leaving gaps. The result is clipped to `area`.
    pub fn to_area(&self, area: Rect) -> Rect {
        let cols = f64::from(area.width);
        let rows = f64::from(area.height);

        let left = (self.x * cols).round().clamp(0.0, cols);
        let right = ((self.x + self.width) * cols).round().clamp(0.0, cols);
        let top = ((1.0 - self.y - self.height) * rows).round().clamp(0.0, rows);
        let bottom = ((1.0 - self.y) * rows).round().clamp(0.0, rows);

        Rect {
            x: area.x + left as u16,
            y: area.y + top as u16,
            width: (right - left).max(0.0) as u16,
            height: (bottom - top).max(0.0) as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_pixel_to_unit_flips_y() {
        let (u, v) = DESIGNER_CANVAS.pixel_to_unit(0.0, 0.0);
        assert_eq!((u, v), (0.0, 1.0));
        let (u, v) = DESIGNER_CANVAS.pixel_to_unit(2560.0, 1440.0);
        assert_eq!((u, v), (1.0, 0.0));
    }

    #[test]
    fn test_rect_round_trip() {
        let rect = PixelRect::new(469.0, 43.0, 2049.0, 272.0);
        let unit = DESIGNER_CANVAS.rect_to_unit(rect);
        assert!((unit.y - (1.0 - 315.0 / 1440.0)).abs() < EPSILON);

        let back = DESIGNER_CANVAS.unit_to_rect(unit);
        assert!((back.x - rect.x).abs() < EPSILON);
        assert!((back.y - rect.y).abs() < EPSILON);
        assert!((back.w - rect.w).abs() < EPSILON);
        assert!((back.h - rect.h).abs() < EPSILON);
    }

    #[test]
    fn test_to_area_keeps_top_left_on_top() {
        let area = Rect::new(0, 0, 256, 144);
        let top = DESIGNER_CANVAS
            .rect_to_unit(PixelRect::new(0.0, 0.0, 1280.0, 720.0))
            .to_area(area);
        assert_eq!(top, Rect::new(0, 0, 128, 72));

        let bottom_right = DESIGNER_CANVAS
            .rect_to_unit(PixelRect::new(1280.0, 720.0, 1280.0, 720.0))
            .to_area(area);
        assert_eq!(bottom_right, Rect::new(128, 72, 128, 72));
    }

    #[test]
    fn test_to_area_respects_offset_and_clips() {
        let area = Rect::new(10, 5, 100, 50);
        let full = DESIGNER_CANVAS
            .rect_to_unit(PixelRect::new(-100.0, -100.0, 3000.0, 2000.0))
            .to_area(area);
        assert_eq!(full, area);
    }
}
