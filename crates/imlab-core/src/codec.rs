//! Reading and writing image files.
//!
//! Decoding goes through the `image` crate with format sniffing; grayscale
//! sources stay single-channel, everything else becomes RGB. Encoding picks the
//! format from the file extension.

use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageFormat, ImageReader};
use log::debug;

use crate::config::ProcessingConfig;
use crate::error::{ImageError, Result};
use crate::raster::RasterImage;

/// Prefix of exported result files.
pub const RESULT_PREFIX: &str = "result_";

/// Formats this crate can encode.
pub const EXPORT_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// Resolve a file extension to an encodable format.
///
/// # Errors
///
/// Returns `ImageError::InvalidInput` for extensions that are unknown or name a
/// format outside [`EXPORT_FORMATS`] (e.g. "gif", "webp").
pub fn export_format(extension: &str) -> Result<ImageFormat> {
    ImageFormat::from_extension(extension)
        .filter(|format| EXPORT_FORMATS.contains(format))
        .ok_or_else(|| ImageError::InvalidInput(format!("unsupported export format: {}", extension)))
}

/// Decode an image file.
///
/// # Errors
///
/// Returns `ImageError::InvalidInput` if the file cannot be read or decoded.
pub fn decode_file(path: impl AsRef<Path>) -> Result<RasterImage> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        ImageError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
    })?;
    decode_bytes(&bytes)
}

/// Decode an in-memory image, guessing its format from the content.
pub fn decode_bytes(bytes: &[u8]) -> Result<RasterImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::InvalidInput(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| ImageError::InvalidInput(format!("cannot decode image: {}", e)))?;

    let raster = RasterImage::from_dynamic(img)?;
    debug!(
        "decoded {}x{} image ({} channels)",
        raster.width(),
        raster.height(),
        raster.channels()
    );
    Ok(raster)
}

/// Encode to PNG bytes.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>> {
    encode_bytes(image, ImageFormat::Png)
}

/// Encode to bytes in the given format.
pub fn encode_bytes(image: &RasterImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.to_dynamic()?.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}

/// Encode to bytes in the format named by a file extension ("png", "jpg", ...).
pub fn encode_with_extension(image: &RasterImage, extension: &str) -> Result<Vec<u8>> {
    encode_bytes(image, export_format(extension)?)
}

/// Write `image` to `path`, choosing the format from its extension.
pub fn encode_file(image: &RasterImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)
        .ok()
        .filter(|format| EXPORT_FORMATS.contains(format))
        .ok_or_else(|| ImageError::InvalidInput(format!("unknown format: {}", path.display())))?;
    fs::write(path, encode_bytes(image, format)?)?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Write `image` as `result_<unix-millis>.png` inside `output_dir`.
///
/// The directory is created if it does not exist. Returns the written path.
pub fn export_timestamped(image: &RasterImage, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    export_timestamped_as(image, output_dir, "png")
}

/// Like [`export_timestamped`] with an explicit file extension.
///
/// Never overwrites: when `result_<millis>.<ext>` already exists (two exports
/// within the same millisecond), `result_<millis>_1.<ext>`, `_2`, ... are tried.
pub fn export_timestamped_as(
    image: &RasterImage,
    output_dir: impl AsRef<Path>,
    extension: &str,
) -> Result<PathBuf> {
    let bytes = encode_bytes(image, export_format(extension)?)?;
    let dir = output_dir.as_ref();
    fs::create_dir_all(dir)?;

    let millis = unix_millis();
    let mut attempt = 0u32;
    loop {
        let path = dir.join(numbered_file_name(millis, attempt, extension));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(&bytes)?;
                debug!("wrote {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Export into the configured output directory in the configured format.
pub fn export_with_config(image: &RasterImage, config: &ProcessingConfig) -> Result<PathBuf> {
    export_timestamped_as(image, &config.output_dir, &config.export_format)
}

/// File name for a result exported at `millis`.
pub fn output_file_name(millis: u128, extension: &str) -> String {
    numbered_file_name(millis, 0, extension)
}

fn numbered_file_name(millis: u128, attempt: u32, extension: &str) -> String {
    if attempt == 0 {
        format!("{}{}.{}", RESULT_PREFIX, millis, extension)
    } else {
        format!("{}{}_{}.{}", RESULT_PREFIX, millis, attempt, extension)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> RasterImage {
        let pixels: Vec<u8> = (0..(6 * 4 * 3)).map(|i| (i * 3) as u8).collect();
        RasterImage::rgb(6, 4, pixels).unwrap()
    }

    #[test]
    fn test_png_bytes_round_trip() {
        let img = gradient();
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[0..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(decode_bytes(&png).unwrap(), img);
    }

    #[test]
    fn test_gray_png_stays_single_channel() {
        let img = RasterImage::gray(3, 3, (0..9).collect()).unwrap();
        let decoded = decode_bytes(&encode_png(&img).unwrap()).unwrap();
        assert_eq!(decoded.channels(), 1);
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_decode_garbage_is_invalid_input() {
        let result = decode_bytes(&[1, 2, 3, 4]);
        assert!(matches!(result, Err(ImageError::InvalidInput(_))));
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_file("/definitely/not/here.png");
        assert!(matches!(result, Err(ImageError::InvalidInput(_))));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(1234, "png"), "result_1234.png");
        assert_eq!(numbered_file_name(1234, 2, "bmp"), "result_1234_2.bmp");
    }

    #[test]
    fn test_back_to_back_exports_do_not_overwrite() {
        let dir = std::env::temp_dir().join(format!("imlab-burst-{}", unix_millis()));
        let first = RasterImage::filled(4, 4, 1, 10).unwrap();
        let second = RasterImage::filled(4, 4, 1, 200).unwrap();

        let paths: Vec<PathBuf> = (0..5)
            .map(|i| {
                let img = if i % 2 == 0 { &first } else { &second };
                export_timestamped(img, &dir).unwrap()
            })
            .collect();

        for (i, path) in paths.iter().enumerate() {
            assert!(!paths[..i].contains(path));
            let expected = if i % 2 == 0 { &first } else { &second };
            assert_eq!(&decode_file(path).unwrap(), expected);
        }
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 5);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_export_with_config_uses_dir_and_format() {
        let dir = std::env::temp_dir().join(format!("imlab-config-export-{}", unix_millis()));
        let config = ProcessingConfig {
            output_dir: dir.to_string_lossy().into_owned(),
            export_format: "bmp".to_string(),
            ..ProcessingConfig::default()
        };

        let path = export_with_config(&gradient(), &config).unwrap();
        assert!(path.starts_with(&dir));
        assert_eq!(path.extension().unwrap(), "bmp");
        assert_eq!(&fs::read(&path).unwrap()[0..2], b"BM");
        assert_eq!(decode_file(&path).unwrap(), gradient());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_export_format_limited_to_encodable() {
        for ext in ["png", "jpg", "jpeg", "bmp", "tif", "tiff"] {
            assert!(export_format(ext).is_ok(), "{}", ext);
        }
        for ext in ["gif", "webp", "avif", "nope"] {
            assert!(
                matches!(export_format(ext), Err(ImageError::InvalidInput(_))),
                "{}",
                ext
            );
        }
    }

    #[test]
    fn test_export_creates_directory() {
        let dir = std::env::temp_dir().join(format!("imlab-export-{}", unix_millis()));
        let path = export_timestamped(&gradient(), &dir).unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(RESULT_PREFIX));
        assert!(name.ends_with(".png"));
        assert_eq!(decode_file(&path).unwrap(), gradient());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_encode_with_extension() {
        let bmp = encode_with_extension(&gradient(), "bmp").unwrap();
        assert_eq!(&bmp[0..2], b"BM");
        assert!(matches!(
            encode_with_extension(&gradient(), "nope"),
            Err(ImageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_encode_file_unknown_extension() {
        let path = std::env::temp_dir().join("imlab-unknown.nope");
        let result = encode_file(&gradient(), &path);
        assert!(matches!(result, Err(ImageError::InvalidInput(_))));
    }
}
