//! Channel decomposition into named, displayable planes.
//!
//! [`decompose`] produces visualization planes whose layout depends on the
//! color model. [`split_channels`] and [`merge_channels`] work on the raw,
//! uncolored planes and are exact inverses of each other.

use log::debug;

use crate::color::{hsv_to_rgb, ColorModel};
use crate::error::{ImageError, Result};
use crate::raster::RasterImage;

/// One labelled plane of a decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPlane {
    pub label: &'static str,
    pub image: RasterImage,
}

impl ChannelPlane {
    fn new(label: &'static str, image: RasterImage) -> Self {
        Self { label, image }
    }
}

/// Split an image into visualizable planes according to `model`.
///
/// Single-channel input yields one element holding an unchanged copy. For
/// three-channel input the planes are, in order:
///
/// - `Rgb`: each channel kept in its own output channel, the other two zeroed.
/// - `Hsv`: the hue rendered at full saturation and value (a rainbow strip of
///   that hue), saturation in the red output channel, and value as a
///   single-channel plane.
/// - `Cmyk`: each ink tints the two output channels it does not absorb
///   (cyan → green+blue, magenta → red+blue, yellow → red+green).
/// - `Gray`: treated like `Rgb`; the tag describes a 1-channel image.
pub fn decompose(image: &RasterImage, model: ColorModel) -> Result<Vec<ChannelPlane>> {
    if image.is_grayscale() {
        return Ok(vec![ChannelPlane::new("Gray", image.clone())]);
    }

    let planes = match model {
        ColorModel::Rgb | ColorModel::Gray => vec![
            ChannelPlane::new("Red (R)", tint(image, 0, [true, false, false])),
            ChannelPlane::new("Green (G)", tint(image, 1, [false, true, false])),
            ChannelPlane::new("Blue (B)", tint(image, 2, [false, false, true])),
        ],
        ColorModel::Hsv => vec![
            ChannelPlane::new("Hue (H)", hue_strip(image)),
            ChannelPlane::new("Saturation (S)", tint(image, 1, [true, false, false])),
            ChannelPlane::new("Value (V)", extract_channel(image, 2)),
        ],
        ColorModel::Cmyk => vec![
            ChannelPlane::new("Cyan", tint(image, 0, [false, true, true])),
            ChannelPlane::new("Magenta", tint(image, 1, [true, false, true])),
            ChannelPlane::new("Yellow", tint(image, 2, [true, true, false])),
        ],
    };

    debug!("decompose: {} planes as {}", planes.len(), model);
    Ok(planes)
}

/// Copy `channel` into every output channel flagged in `targets`, zeroing the rest.
fn tint(image: &RasterImage, channel: usize, targets: [bool; 3]) -> RasterImage {
    let mut out = Vec::with_capacity(image.byte_size());
    for px in image.pixels().chunks_exact(3) {
        let v = px[channel];
        out.extend(targets.iter().map(|&on| if on { v } else { 0 }));
    }
    RasterImage::from_parts(image.width(), image.height(), 3, out)
}

/// Render each pixel's hue at full saturation and value.
fn hue_strip(image: &RasterImage) -> RasterImage {
    let mut out = Vec::with_capacity(image.byte_size());
    for px in image.pixels().chunks_exact(3) {
        let (r, g, b) = hsv_to_rgb(px[0], 255, 255);
        out.extend_from_slice(&[r, g, b]);
    }
    RasterImage::from_parts(image.width(), image.height(), 3, out)
}

fn extract_channel(image: &RasterImage, channel: usize) -> RasterImage {
    let stride = image.channels() as usize;
    let pixels = image
        .pixels()
        .chunks_exact(stride)
        .map(|px| px[channel])
        .collect();
    RasterImage::from_parts(image.width(), image.height(), 1, pixels)
}

/// Split an image into its raw single-channel planes, in storage order.
pub fn split_channels(image: &RasterImage) -> Vec<RasterImage> {
    (0..image.channels() as usize)
        .map(|c| extract_channel(image, c))
        .collect()
}

/// Interleave single-channel planes back into one image.
///
/// # Errors
///
/// Returns `ImageError::UnsupportedChannelLayout` unless there are 1 or 3
/// planes, and `ImageError::InvalidInput` if a plane is not single-channel or
/// the plane dimensions differ.
pub fn merge_channels(planes: &[RasterImage]) -> Result<RasterImage> {
    let count = u8::try_from(planes.len()).unwrap_or(u8::MAX);
    if count != 1 && count != 3 {
        return Err(ImageError::UnsupportedChannelLayout(count));
    }

    let first = &planes[0];
    for plane in planes {
        if !plane.is_grayscale() {
            return Err(ImageError::InvalidInput(
                "merge expects single-channel planes".to_string(),
            ));
        }
        if plane.width() != first.width() || plane.height() != first.height() {
            return Err(ImageError::InvalidInput(format!(
                "plane size mismatch: {}x{} vs {}x{}",
                plane.width(),
                plane.height(),
                first.width(),
                first.height()
            )));
        }
    }

    let mut pixels = Vec::with_capacity(first.pixel_count() * planes.len());
    for i in 0..first.pixel_count() {
        pixels.extend(planes.iter().map(|p| p.pixels()[i]));
    }
    RasterImage::new(first.width(), first.height(), count, pixels)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: splitting an RGB image and merging the raw planes is lossless.
        #[test]
        fn prop_split_merge_round_trip(
            (w, h, pixels) in (1u32..=20, 1u32..=20).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), prop::collection::vec(any::<u8>(), (w * h * 3) as usize))
            })
        ) {
            let img = RasterImage::rgb(w, h, pixels).unwrap();
            let merged = merge_channels(&split_channels(&img)).unwrap();
            prop_assert_eq!(merged, img);
        }

        /// Property: the RGB visualization planes sum back to the source.
        #[test]
        fn prop_rgb_planes_sum_to_source(
            (w, h, pixels) in (1u32..=12, 1u32..=12).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), prop::collection::vec(any::<u8>(), (w * h * 3) as usize))
            })
        ) {
            let img = RasterImage::rgb(w, h, pixels).unwrap();
            let planes = decompose(&img, ColorModel::Rgb).unwrap();
            for i in 0..img.byte_size() {
                let sum: u32 = planes.iter().map(|p| p.image.pixels()[i] as u32).sum();
                prop_assert_eq!(sum, img.pixels()[i] as u32);
            }
        }
    }
}
