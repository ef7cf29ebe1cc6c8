//! Connected component labeling of automatically binarized images.
//!
//! The pipeline is: luma reduction, Otsu threshold, foreground selection,
//! union-find labeling, and a random color per label for display.
//!
//! ## Polarity
//!
//! Foreground is the *darker* Otsu class: every pixel at or below the
//! threshold. This matches the usual case of dark objects on a light page or
//! bench. Invert the image first to label bright objects.

use log::debug;
use rand::Rng;

use crate::error::{ImageError, Result};
use crate::luminance::to_luma;
use crate::raster::RasterImage;
use crate::statistics::HistogramDescriptor;

/// Pixel adjacency used when growing regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Up, down, left, right.
    FourWay,
    /// Includes the four diagonals.
    #[default]
    EightWay,
}

/// Per-pixel region labels. 0 is background; regions are numbered 1..=count
/// in the order their first pixel appears in a raster scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    count: u32,
}

impl LabelMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of non-background regions.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Label at (`x`, `y`).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.labels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// All labels in row-major order.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Pixel count of every region, indexed by label (index 0 is background).
    pub fn region_sizes(&self) -> Vec<u32> {
        let mut sizes = vec![0u32; self.count as usize + 1];
        for &l in &self.labels {
            sizes[l as usize] += 1;
        }
        sizes
    }
}

/// Result of [`label_components`].
#[derive(Debug, Clone)]
pub struct LabeledComponents {
    /// RGB rendering: black background, one random color per region.
    pub colored: RasterImage,
    pub label_map: LabelMap,
    /// Number of regions, excluding background.
    pub count: u32,
    /// The Otsu threshold used for binarization.
    pub threshold: u8,
}

/// Otsu's threshold: the level that maximizes between-class variance.
///
/// Class one is `0..=t`, class two `t+1..=255`. Levels that leave either class
/// empty are skipped, so a histogram with a single occupied bin yields 0.
pub fn otsu_threshold(hist: &HistogramDescriptor) -> u8 {
    let total_mean: f64 = hist
        .probabilities
        .iter()
        .enumerate()
        .map(|(i, &p)| i as f64 * p)
        .sum();

    let mut weight_low = 0.0f64;
    let mut mean_acc_low = 0.0f64;
    let mut best = 0u8;
    let mut best_sigma = 0.0f64;

    for (i, &p) in hist.probabilities.iter().enumerate() {
        weight_low += p;
        mean_acc_low += i as f64 * p;
        let weight_high = 1.0 - weight_low;
        if weight_low < f64::EPSILON || weight_high < f64::EPSILON {
            continue;
        }
        let mean_low = mean_acc_low / weight_low;
        let mean_high = (total_mean - mean_acc_low) / weight_high;
        let diff = mean_low - mean_high;
        let sigma = weight_low * weight_high * diff * diff;
        if sigma > best_sigma {
            best_sigma = sigma;
            best = i as u8;
        }
    }

    best
}

/// Foreground mask of a single-channel image: `true` where value <= threshold.
pub fn binarize(image: &RasterImage, threshold: u8) -> Vec<bool> {
    to_luma(image)
        .pixels()
        .iter()
        .map(|&v| v <= threshold)
        .collect()
}

/// Label connected `true` regions of a row-major mask.
///
/// # Errors
///
/// Returns `ImageError::InvalidInput` if `mask.len()` is not `width * height`.
pub fn label_mask(
    mask: &[bool],
    width: u32,
    height: u32,
    connectivity: Connectivity,
) -> Result<LabelMap> {
    let w = width as usize;
    let h = height as usize;
    if w.checked_mul(h) != Some(mask.len()) {
        return Err(ImageError::InvalidInput(format!(
            "mask of {} cells does not cover {}x{}",
            mask.len(),
            width,
            height
        )));
    }

    let mut provisional = vec![0u32; w * h];
    let mut sets = DisjointSet::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if !mask[idx] {
                continue;
            }

            let mut current = 0u32;
            for (nx, ny) in previous_neighbors(x, y, w, connectivity) {
                let neighbor = provisional[ny * w + nx];
                if neighbor == 0 {
                    continue;
                }
                if current == 0 {
                    current = neighbor;
                } else {
                    sets.union(current, neighbor);
                }
            }

            if current == 0 {
                current = sets.make_set();
            }
            provisional[idx] = current;
        }
    }

    // Second pass: resolve roots and renumber densely in first-seen order.
    let mut dense = vec![0u32; sets.len() + 1];
    let mut count = 0u32;
    let labels = provisional
        .into_iter()
        .map(|p| {
            if p == 0 {
                return 0;
            }
            let root = sets.find(p) as usize;
            if dense[root] == 0 {
                count += 1;
                dense[root] = count;
            }
            dense[root]
        })
        .collect();

    Ok(LabelMap {
        width,
        height,
        labels,
        count,
    })
}

/// Already-visited neighbors of (`x`, `y`) in raster order.
fn previous_neighbors(
    x: usize,
    y: usize,
    width: usize,
    connectivity: Connectivity,
) -> impl Iterator<Item = (usize, usize)> {
    let mut out = Vec::with_capacity(4);
    if x > 0 {
        out.push((x - 1, y));
    }
    if y > 0 {
        out.push((x, y - 1));
        if connectivity == Connectivity::EightWay {
            if x > 0 {
                out.push((x - 1, y - 1));
            }
            if x + 1 < width {
                out.push((x + 1, y - 1));
            }
        }
    }
    out.into_iter()
}

/// Union-find over provisional labels (1-based; slot 0 unused).
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn len(&self) -> usize {
        self.parent.len() - 1
    }

    fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Keep the older label as root.
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child as usize] = root;
        }
    }
}

/// Binarize with Otsu and label dark regions, coloring them from the thread RNG.
///
/// Colors differ between calls; use [`label_components_with_rng`] with a seeded
/// generator when reproducible output is needed.
#[cfg(feature = "thread-rng")]
pub fn label_components(image: &RasterImage) -> Result<LabeledComponents> {
    label_components_with_rng(image, &mut rand::rng())
}

/// Binarize with Otsu and label dark regions, coloring them from `rng`.
///
/// A histogram with a single occupied level has no bimodal split and is
/// reported as all background.
pub fn label_components_with_rng<R: Rng + ?Sized>(
    image: &RasterImage,
    rng: &mut R,
) -> Result<LabeledComponents> {
    let luma = to_luma(image);
    let hist = HistogramDescriptor::from_samples(luma.pixels())?;
    let threshold = otsu_threshold(&hist);

    let mask: Vec<bool> = if hist.occupied_bins() < 2 {
        vec![false; luma.pixel_count()]
    } else {
        luma.pixels().iter().map(|&v| v <= threshold).collect()
    };

    let label_map = label_mask(&mask, luma.width(), luma.height(), Connectivity::EightWay)?;
    let colored = render_labels(&label_map, rng);
    let count = label_map.count();

    debug!(
        "labeling: threshold={} components={} ({}x{})",
        threshold,
        count,
        luma.width(),
        luma.height()
    );

    Ok(LabeledComponents {
        colored,
        label_map,
        count,
        threshold,
    })
}

/// Render a label map as RGB: background black, each region one color.
///
/// Region colors are drawn from 1..=255 per channel so no region renders as
/// the background sentinel.
pub fn render_labels<R: Rng + ?Sized>(map: &LabelMap, rng: &mut R) -> RasterImage {
    let mut palette = Vec::with_capacity(map.count() as usize + 1);
    palette.push([0u8, 0, 0]);
    for _ in 0..map.count() {
        palette.push([
            rng.random_range(1..=255u8),
            rng.random_range(1..=255u8),
            rng.random_range(1..=255u8),
        ]);
    }

    let mut pixels = Vec::with_capacity(map.labels().len() * 3);
    for &l in map.labels() {
        pixels.extend_from_slice(&palette[l as usize]);
    }
    RasterImage::from_parts(map.width(), map.height(), 3, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Light background with two dark squares that do not touch.
    fn two_blobs() -> RasterImage {
        let (w, h) = (12u32, 8u32);
        let mut pixels = vec![220u8; (w * h) as usize];
        for y in 1..4 {
            for x in 1..4 {
                pixels[(y * w + x) as usize] = 20;
            }
        }
        for y in 4..7 {
            for x in 7..11 {
                pixels[(y * w + x) as usize] = 30;
            }
        }
        RasterImage::gray(w, h, pixels).unwrap()
    }

    #[test]
    fn test_otsu_bimodal_split() {
        let mut samples = vec![20u8; 100];
        samples.extend(vec![200u8; 100]);
        let hist = HistogramDescriptor::from_samples(&samples).unwrap();
        let t = otsu_threshold(&hist);
        assert!((20..200).contains(&t), "threshold {} should split modes", t);
    }

    #[test]
    fn test_otsu_single_level_is_zero() {
        let hist = HistogramDescriptor::from_samples(&[90u8; 10]).unwrap();
        assert_eq!(otsu_threshold(&hist), 0);
    }

    #[test]
    fn test_uniform_image_has_no_components() {
        let mut rng = StdRng::seed_from_u64(1);
        for value in [0u8, 128, 255] {
            let img = RasterImage::filled(10, 10, 1, value).unwrap();
            let result = label_components_with_rng(&img, &mut rng).unwrap();
            assert_eq!(result.count, 0);
            assert!(result.colored.pixels().iter().all(|&v| v == 0));
            assert!(result.label_map.labels().iter().all(|&l| l == 0));
        }
    }

    #[test]
    fn test_two_blobs_two_labels() {
        let img = two_blobs();
        let mut rng = StdRng::seed_from_u64(7);
        let result = label_components_with_rng(&img, &mut rng).unwrap();
        assert_eq!(result.count, 2);

        let map = &result.label_map;
        // First blob is seen first in raster order.
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(map.get(x, y), 1);
            }
        }
        for y in 4..7 {
            for x in 7..11 {
                assert_eq!(map.get(x, y), 2);
            }
        }
        assert_eq!(map.get(0, 0), 0);
        assert_eq!(map.get(11, 7), 0);
        assert_eq!(map.region_sizes(), vec![96 - 9 - 12, 9, 12]);
    }

    #[test]
    fn test_blob_uniformly_colored() {
        let img = two_blobs();
        let mut rng = StdRng::seed_from_u64(3);
        let result = label_components_with_rng(&img, &mut rng).unwrap();
        let c = &result.colored;
        let first = [c.sample(1, 1, 0), c.sample(1, 1, 1), c.sample(1, 1, 2)];
        assert_ne!(first, [0, 0, 0]);
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!([c.sample(x, y, 0), c.sample(x, y, 1), c.sample(x, y, 2)], first);
            }
        }
        assert_eq!([c.sample(0, 0, 0), c.sample(0, 0, 1), c.sample(0, 0, 2)], [0, 0, 0]);
    }

    #[test]
    fn test_seeded_colors_reproducible() {
        let img = two_blobs();
        let a = label_components_with_rng(&img, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = label_components_with_rng(&img, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.colored, b.colored);
    }

    #[test]
    fn test_diagonal_touch_depends_on_connectivity() {
        // X .
        // . X
        let mask = [true, false, false, true];
        assert_eq!(label_mask(&mask, 2, 2, Connectivity::EightWay).unwrap().count(), 1);
        assert_eq!(label_mask(&mask, 2, 2, Connectivity::FourWay).unwrap().count(), 2);
    }

    #[test]
    fn test_u_shape_merges_into_one_label() {
        // X . X
        // X . X
        // X X X
        let mask = [
            true, false, true, //
            true, false, true, //
            true, true, true,
        ];
        let map = label_mask(&mask, 3, 3, Connectivity::FourWay).unwrap();
        assert_eq!(map.count(), 1);
        assert!(map
            .labels()
            .iter()
            .zip(mask.iter())
            .all(|(&l, &m)| (l == 1) == m));
    }

    #[test]
    fn test_labels_dense_first_seen() {
        // . X . X
        // X . . .
        let mask = [false, true, false, true, true, false, false, false];
        let map = label_mask(&mask, 4, 2, Connectivity::FourWay).unwrap();
        assert_eq!(map.labels(), &[0, 1, 0, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_mask_size_mismatch_rejected() {
        let short = [true, false, true];
        assert!(matches!(
            label_mask(&short, 2, 2, Connectivity::FourWay),
            Err(ImageError::InvalidInput(_))
        ));
        let long = [true; 6];
        assert!(matches!(
            label_mask(&long, 2, 2, Connectivity::EightWay),
            Err(ImageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_color_input_reduced_to_luma() {
        let mut pixels = Vec::new();
        for i in 0..16 {
            if i < 4 {
                pixels.extend_from_slice(&[10, 10, 10]);
            } else {
                pixels.extend_from_slice(&[240, 240, 240]);
            }
        }
        let img = RasterImage::rgb(4, 4, pixels).unwrap();
        let result = label_components_with_rng(&img, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.colored.channels(), 3);
    }

    #[test]
    fn test_binarize_polarity() {
        let img = RasterImage::gray(3, 1, vec![10, 100, 200]).unwrap();
        assert_eq!(binarize(&img, 100), vec![true, true, false]);
    }
}
