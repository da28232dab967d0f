//! Threshold masks and connected-component labelling
//!
//! Used by the rate scan to count how many pixels and how many separate
//! clusters a response map has above a candidate threshold.

use ndarray::{Array2, ArrayView2};

/// Apply thresholding to an image and return a binary mask
///
/// # Arguments
///
/// * `image` - Input response grid (NaN never passes)
/// * `threshold` - Threshold value
///
/// # Returns
///
/// A binary mask where true indicates a pixel strictly above threshold
pub fn apply_threshold(image: &ArrayView2<f64>, threshold: f64) -> Array2<bool> {
    image.mapv(|v| v > threshold)
}

/// Number of pixels strictly above `threshold`
pub fn count_above(image: &ArrayView2<f64>, threshold: f64) -> usize {
    image.iter().filter(|&&v| v > threshold).count()
}

/// Find connected components in a binary mask
///
/// This uses a 4-connectivity flood fill: only orthogonal neighbours join,
/// diagonal contact leaves two components.
///
/// # Returns
///
/// A labeled image where each connected component has a unique label
/// (background is 0) and the number of components
pub fn connected_components(mask: &ArrayView2<bool>) -> (Array2<u32>, u32) {
    let (rows, cols) = mask.dim();
    let mut labels = Array2::zeros((rows, cols));
    let mut label_counter = 0;

    let neighbors = [(-1, 0), (0, -1), (0, 1), (1, 0)];

    for i in 0..rows {
        for j in 0..cols {
            if !mask[[i, j]] || labels[[i, j]] != 0 {
                continue;
            }
            label_counter += 1;
            let mut stack = vec![(i, j)];

            while let Some((y, x)) = stack.pop() {
                if labels[[y, x]] != 0 {
                    continue;
                }
                labels[[y, x]] = label_counter;

                for &(dy, dx) in &neighbors {
                    let ny = y as isize + dy;
                    let nx = x as isize + dx;
                    if ny < 0 || ny >= rows as isize || nx < 0 || nx >= cols as isize {
                        continue;
                    }
                    let (ny, nx) = (ny as usize, nx as usize);
                    if mask[[ny, nx]] && labels[[ny, nx]] == 0 {
                        stack.push((ny, nx));
                    }
                }
            }
        }
    }

    (labels, label_counter)
}

/// Number of 4-connected clusters of pixels above `threshold`
pub fn count_clusters(image: &ArrayView2<f64>, threshold: f64) -> u32 {
    let mask = apply_threshold(image, threshold);
    connected_components(&mask.view()).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_apply_threshold() {
        let image = arr2(&[[0.1, 0.9], [0.8, f64::NAN]]);

        let mask = apply_threshold(&image.view(), 0.5);

        assert!(!mask[[0, 0]]);
        assert!(mask[[0, 1]]);
        assert!(mask[[1, 0]]);
        assert!(!mask[[1, 1]]);
        assert_eq!(count_above(&image.view(), 0.5), 2);
    }

    #[test]
    fn test_connected_components() {
        let mask = arr2(&[
            [false, true, true, false],
            [false, true, false, false],
            [false, false, false, true],
            [false, false, true, true],
        ]);

        let (labels, num_labels) = connected_components(&mask.view());

        // (1,1) and (2,3) do not touch, so two components
        assert_eq!(num_labels, 2);

        let label1 = labels[[0, 1]];
        let label2 = labels[[2, 3]];
        assert!(label1 > 0);
        assert!(label2 > 0);
        assert_ne!(label1, label2);

        assert_eq!(labels[[0, 1]], labels[[0, 2]]);
        assert_eq!(labels[[0, 1]], labels[[1, 1]]);
        assert_eq!(labels[[2, 3]], labels[[3, 3]]);
        assert_eq!(labels[[2, 3]], labels[[3, 2]]);
        assert_eq!(labels[[0, 0]], 0);
    }

    #[test]
    fn test_diagonal_pixels_stay_separate() {
        let image = arr2(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(count_clusters(&image.view(), 0.5), 3);
        assert_eq!(count_clusters(&image.view(), 2.0), 0);
    }

    #[test]
    fn test_cross_is_one_cluster() {
        let image = arr2(&[[0.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]]);
        assert_eq!(count_clusters(&image.view(), 0.5), 1);
    }
}
