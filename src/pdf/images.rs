use std::io::Cursor;

use image::ImageDecoder;

use crate::fetch::Resources;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ColorSpace {
    Rgb,
    Gray,
}

pub(crate) enum ImageData {
    /// Baseline JPEG bytes, embedded untouched behind a DCTDecode filter.
    Jpeg { data: Vec<u8>, color: ColorSpace },
    /// Zlib-compressed 8-bit RGB samples with an optional compressed alpha
    /// channel for the soft mask.
    Flate {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

pub(crate) struct DecodedImage {
    pub(crate) pixel_width: u32,
    pub(crate) pixel_height: u32,
    pub(crate) data: ImageData,
}

impl DecodedImage {
    /// Height over width.
    pub(crate) fn aspect(&self) -> f32 {
        self.pixel_height as f32 / self.pixel_width.max(1) as f32
    }
}

/// Outcome of an image lookup. `Absent` means "leave the slot empty and keep
/// laying out"; it is never an error.
pub(crate) enum ImageSlot {
    Ready(DecodedImage),
    Absent,
}

fn jpeg_passthrough(bytes: &[u8]) -> Option<DecodedImage> {
    let decoder = image::codecs::jpeg::JpegDecoder::new(Cursor::new(bytes)).ok()?;
    let (w, h) = decoder.dimensions();
    let color = match decoder.color_type() {
        image::ColorType::Rgb8 => ColorSpace::Rgb,
        image::ColorType::L8 => ColorSpace::Gray,
        _ => return None,
    };
    Some(DecodedImage {
        pixel_width: w,
        pixel_height: h,
        data: ImageData::Jpeg {
            data: bytes.to_vec(),
            color,
        },
    })
}

/// Turn fetched bytes into something that can be embedded. JPEGs are kept as
/// they are; every other format `image` understands is decoded and re-encoded
/// with Flate.
pub(crate) fn decode(bytes: &[u8]) -> Result<DecodedImage, image::ImageError> {
    if matches!(image::guess_format(bytes), Ok(image::ImageFormat::Jpeg))
        && let Some(img) = jpeg_passthrough(bytes)
    {
        return Ok(img);
    }

    let decoded = image::load_from_memory(bytes)?;
    let rgba: image::RgbaImage = decoded.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let alpha = has_alpha.then(|| {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6)
    });

    Ok(DecodedImage {
        pixel_width: w,
        pixel_height: h,
        data: ImageData::Flate { rgb, alpha },
    })
}

/// Fetch and decode one image reference. Never fails: anything that goes
/// wrong is logged and reported as [`ImageSlot::Absent`].
pub(crate) fn load(resources: &Resources, reference: &str) -> ImageSlot {
    if reference.trim().is_empty() {
        log::warn!("Empty image reference, omitting");
        return ImageSlot::Absent;
    }
    let Some(bytes) = resources.fetch_optional(reference) else {
        return ImageSlot::Absent;
    };
    match decode(&bytes) {
        Ok(img) => ImageSlot::Ready(img),
        Err(err) => {
            log::warn!("Could not decode image {reference}: {err}, omitting");
            ImageSlot::Absent
        }
    }
}
