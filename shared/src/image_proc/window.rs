//! Square search windows around a projected position

use ndarray::{s, ArrayView2};

/// Half-open pixel window `[x0, x1) × [y0, y1)` clipped to the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl SearchWindow {
    /// Window of half-width `radius` around the truncated position `(x, y)`.
    ///
    /// Returns `None` when nothing of the window overlaps an image of shape
    /// `(rows, cols)`.
    pub fn around(x: f64, y: f64, radius: usize, shape: (usize, usize)) -> Option<Self> {
        let (rows, cols) = shape;
        let (cx, cy) = (x.trunc() as i64, y.trunc() as i64);
        let r = radius as i64;

        let x0 = (cx - r).max(0);
        let x1 = (cx + r + 1).min(cols as i64);
        let y0 = (cy - r).max(0);
        let y1 = (cy + r + 1).min(rows as i64);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self {
            x0: x0 as usize,
            x1: x1 as usize,
            y0: y0 as usize,
            y1: y1 as usize,
        })
    }

    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn view<'b>(&self, grid: &'b ArrayView2<'_, f64>) -> ArrayView2<'b, f64> {
        grid.slice(s![self.y0..self.y1, self.x0..self.x1])
    }
}

/// Pixel of the highest finite value within `radius` of `(x, y)`.
///
/// A uniform window (max equals min with no NaN) or a window without any
/// finite value keeps the truncated input position. Ties resolve to the first
/// maximum in row-major order.
pub fn local_max_position(grid: &ArrayView2<f64>, x: f64, y: f64, radius: usize) -> (usize, usize) {
    let fallback = (x.trunc().max(0.0) as usize, y.trunc().max(0.0) as usize);
    let Some(window) = SearchWindow::around(x, y, radius, grid.dim()) else {
        return fallback;
    };
    let sub = window.view(grid);

    let has_nan = sub.iter().any(|v| v.is_nan());
    let min = sub.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = sub.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !has_nan && max == min {
        return fallback;
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in sub.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }

    match best {
        Some((i, _)) => {
            let w = window.width();
            (window.x0 + i % w, window.y0 + i / w)
        }
        None => fallback,
    }
}

/// Highest non-NaN value within `radius` of `(x, y)`, NaN if there is none
pub fn local_max_value(grid: &ArrayView2<f64>, x: f64, y: f64, radius: usize) -> f64 {
    let Some(window) = SearchWindow::around(x, y, radius, grid.dim()) else {
        return f64::NAN;
    };
    window
        .view(grid)
        .iter()
        .filter(|v| !v.is_nan())
        .cloned()
        .fold(f64::NAN, f64::max)
}
