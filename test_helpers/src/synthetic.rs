//! Synthetic all-sky frames

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Add a circular Gaussian of peak `amplitude` centred at `(x, y)`
pub fn add_gaussian_star(frame: &mut Array2<f64>, x: f64, y: f64, amplitude: f64, sigma: f64) {
    let (height, width) = frame.dim();
    let radius = (4.0 * sigma).ceil() as i64;
    let sigma2 = sigma * sigma;

    let x_min = (x.round() as i64 - radius).max(0);
    let x_max = (x.round() as i64 + radius).min(width as i64 - 1);
    let y_min = (y.round() as i64 - radius).max(0);
    let y_max = (y.round() as i64 + radius).min(height as i64 - 1);

    for row in y_min..=y_max {
        for col in x_min..=x_max {
            let dx = col as f64 - x;
            let dy = row as f64 - y;
            frame[[row as usize, col as usize]] += amplitude * (-(dx * dx + dy * dy) / (2.0 * sigma2)).exp();
        }
    }
}

/// Builder for a frame with a flat background, Gaussian stars and uniform
/// noise. Values are clamped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct SyntheticSky {
    width: usize,
    height: usize,
    background: f64,
    noise: Option<(f64, u64)>,
    stars: Vec<(f64, f64, f64, f64)>,
}

impl SyntheticSky {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            background: 0.0,
            noise: None,
            stars: Vec::new(),
        }
    }

    pub fn background(mut self, level: f64) -> Self {
        self.background = level;
        self
    }

    /// Uniform noise in `[-amplitude, amplitude)` from a seeded ChaCha8 stream
    pub fn noise(mut self, amplitude: f64, seed: u64) -> Self {
        self.noise = Some((amplitude, seed));
        self
    }

    pub fn star(mut self, x: f64, y: f64, amplitude: f64, sigma: f64) -> Self {
        self.stars.push((x, y, amplitude, sigma));
        self
    }

    pub fn render(&self) -> Array2<f64> {
        let mut frame = Array2::from_elem((self.height, self.width), self.background);
        for &(x, y, amplitude, sigma) in &self.stars {
            add_gaussian_star(&mut frame, x, y, amplitude, sigma);
        }
        if let Some((amplitude, seed)) = self.noise {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for pixel in frame.iter_mut() {
                *pixel += rng.gen_range(-amplitude..amplitude);
            }
        }
        frame.mapv_inplace(|v| v.clamp(0.0, 1.0));
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_peak_at_centre() {
        let frame = SyntheticSky::new(32, 24)
            .background(0.1)
            .star(10.0, 12.0, 0.5, 1.5)
            .render();
        assert_eq!(frame.dim(), (24, 32));
        assert!((frame[[12, 10]] - 0.6).abs() < 1e-12);
        assert!(frame[[12, 11]] < frame[[12, 10]]);
        assert!((frame[[0, 31]] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_star_near_edge_is_clipped() {
        let mut frame = Array2::zeros((10, 10));
        add_gaussian_star(&mut frame, 0.0, 9.0, 1.0, 2.0);
        assert_eq!(frame[[9, 0]], 1.0);
    }

    #[test]
    fn test_noise_is_reproducible() {
        let a = SyntheticSky::new(16, 16).background(0.5).noise(0.05, 7).render();
        let b = SyntheticSky::new(16, 16).background(0.5).noise(0.05, 7).render();
        let c = SyntheticSky::new(16, 16).background(0.5).noise(0.05, 8).render();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|v| (0.45..0.55).contains(v)));
    }
}
