//! Screen-space geometry primitives.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in source-screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "w")]
    pub width: f64,
    #[serde(rename = "h")]
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Whether both corner pairs of the rectangles agree within `tolerance`
    /// pixels. Used to absorb minor UI chrome movement when comparing window
    /// rectangles.
    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.right() - other.right()).abs() <= tolerance
            && (self.bottom() - other.bottom()).abs() <= tolerance
    }

    /// Clamp the rectangle to lie within `(0, 0)..(screen_w, screen_h)`.
    pub fn clamped_to_screen(&self, screen_w: f64, screen_h: f64) -> Rect {
        let x = self.x.max(0.0);
        let y = self.y.max(0.0);
        let width = self.width.min(screen_w - x);
        let height = self.height.min(screen_h - y);
        Rect::new(x, y, width.max(0.0), height.max(0.0))
    }
}

/// Euclidean distance between two points.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
