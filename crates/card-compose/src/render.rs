//! Raster compositor
//!
//! Executes composition plans with the `image` crate, draws text with
//! `rusttype` and writes PNG files or single-page PDFs through `printpdf`.

use crate::plan::{
    Anchor, CompositionOp, CompositionPlan, Compositor, ExportFormat, ImageSource, Layer, TextStyle,
};
use crate::types::{CardError, Result};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, RawImageData, RawImageFormat,
    XObjectTransform,
};
use rusttype::{Font, Scale, point};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Line spacing as a multiple of the font size
const LINE_HEIGHT: f32 = 1.2;

#[derive(Default)]
pub struct RasterCompositor {
    fonts: HashMap<PathBuf, Font<'static>>,
    base: Option<RgbaImage>,
    overlay: Option<RgbaImage>,
}

impl RasterCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    fn layer_mut(&mut self, layer: Layer) -> Result<&mut RgbaImage> {
        let slot = match layer {
            Layer::Base => &mut self.base,
            Layer::Overlay => &mut self.overlay,
        };
        slot.as_mut()
            .ok_or_else(|| CardError::Render(format!("{layer:?} layer is not open")))
    }

    fn load_font(&mut self, path: &Path) -> Result<()> {
        if !self.fonts.contains_key(path) {
            let bytes = std::fs::read(path)?;
            let font = Font::try_from_vec(bytes).ok_or_else(|| {
                CardError::Render(format!("Failed to parse font {}", path.display()))
            })?;
            self.fonts.insert(path.to_path_buf(), font);
        }
        Ok(())
    }

    fn apply(&mut self, op: &CompositionOp) -> Result<()> {
        match op {
            CompositionOp::Open { layer, source } => {
                let image = open_source(source)?;
                match layer {
                    Layer::Base => self.base = Some(image),
                    Layer::Overlay => self.overlay = Some(image),
                }
            }
            CompositionOp::Resize {
                layer,
                width,
                height,
            } => {
                let image = self.layer_mut(*layer)?;
                if (image.width(), image.height()) != (*width, *height) {
                    *image = imageops::resize(&*image, *width, *height, FilterType::Lanczos3);
                }
            }
            CompositionOp::Crop {
                layer,
                x,
                y,
                width,
                height,
            } => {
                let image = self.layer_mut(*layer)?;
                if x + width > image.width() || y + height > image.height() {
                    return Err(CardError::Render(format!(
                        "Crop {width}x{height}+{x}+{y} exceeds {}x{} image",
                        image.width(),
                        image.height()
                    )));
                }
                *image = imageops::crop_imm(&*image, *x, *y, *width, *height).to_image();
            }
            CompositionOp::Composite { x, y } => {
                let overlay = self
                    .overlay
                    .take()
                    .ok_or_else(|| CardError::Render("Overlay layer is not open".to_string()))?;
                let base = self.layer_mut(Layer::Base)?;
                imageops::overlay(base, &overlay, *x as i64, *y as i64);
            }
            CompositionOp::Annotate { text, style } => {
                self.load_font(&style.font)?;
                let font = &self.fonts[&style.font];
                let base = self
                    .base
                    .as_mut()
                    .ok_or_else(|| CardError::Render("Base layer is not open".to_string()))?;
                draw_text(base, font, style, text);
            }
            CompositionOp::Export { path, format } => {
                let base = self.layer_mut(Layer::Base)?;
                match format {
                    ExportFormat::Png => base.save_with_format(path, ImageFormat::Png)?,
                    ExportFormat::Pdf { dpi } => {
                        let bytes = pdf_page_bytes(base, *dpi)?;
                        std::fs::write(path, bytes)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Compositor for RasterCompositor {
    fn execute(&mut self, plan: &CompositionPlan) -> Result<()> {
        let result = plan.ops.iter().try_for_each(|op| self.apply(op));
        self.base = None;
        self.overlay = None;
        result
    }
}

fn open_source(source: &ImageSource) -> Result<RgbaImage> {
    Ok(match source {
        ImageSource::File(path) => image::open(path)?.to_rgba8(),
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes)?.to_rgba8(),
        ImageSource::Blank { width, height } => {
            RgbaImage::from_pixel(*width, *height, Rgba([255, 255, 255, 255]))
        }
    })
}

/// Width of one line of text in pixels.
fn line_width(font: &Font<'static>, scale: Scale, line: &str) -> f32 {
    font.layout(line, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

fn draw_text(image: &mut RgbaImage, font: &Font<'static>, style: &TextStyle, text: &str) {
    let scale = Scale::uniform(style.size);
    let ascent = font.v_metrics(scale).ascent;
    let line_height = style.size * LINE_HEIGHT;

    let lines: Vec<&str> = text.lines().collect();
    let widths: Vec<f32> = lines.iter().map(|l| line_width(font, scale, l)).collect();
    let block_height = line_height * lines.len() as f32;

    let (image_w, image_h) = (image.width() as f32, image.height() as f32);
    let (dx, dy) = (style.x as f32, style.y as f32);

    for (i, (line, width)) in lines.iter().zip(&widths).enumerate() {
        let top = match style.anchor {
            Anchor::NorthWest | Anchor::NorthEast => dy,
            Anchor::Center => (image_h - block_height) / 2.0 + dy,
        } + i as f32 * line_height;
        let left = match style.anchor {
            Anchor::NorthWest => dx,
            Anchor::NorthEast => image_w - dx - width,
            Anchor::Center => (image_w - width) / 2.0 + dx,
        };

        for glyph in font.layout(line, scale, point(left, top + ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = gx as i32 + bb.min.x;
                let y = gy as i32 + bb.min.y;
                if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
                    return;
                }
                let pixel = image.get_pixel_mut(x as u32, y as u32);
                blend(pixel, style.color, coverage);
            });
        }
    }
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 4], coverage: f32) {
    let alpha = coverage * color[3] as f32 / 255.0;
    for c in 0..3 {
        let mixed = pixel.0[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
        pixel.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    let out_alpha = pixel.0[3] as f32 + (255.0 - pixel.0[3] as f32) * alpha;
    pixel.0[3] = out_alpha.round().clamp(0.0, 255.0) as u8;
}

/// Encode `image` as a one-page PDF at `dpi`, alpha flattened onto white.
fn pdf_page_bytes(image: &RgbaImage, dpi: f32) -> Result<Vec<u8>> {
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(CardError::Pdf(format!("Invalid dpi {dpi}")));
    }

    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let alpha = pixel.0[3] as f32 / 255.0;
        for c in 0..3 {
            let flat = pixel.0[c] as f32 * alpha + 255.0 * (1.0 - alpha);
            rgb.push(flat.round() as u8);
        }
    }

    let mut doc = PdfDocument::new("Sheet");
    let raw = RawImage {
        pixels: RawImageData::U8(rgb),
        width: image.width() as usize,
        height: image.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let image_id = doc.add_image(&raw);

    let width_mm = image.width() as f32 * 25.4 / dpi;
    let height_mm = image.height() as f32 * 25.4 / dpi;
    let ops = vec![Op::UseXobject {
        id: image_id,
        transform: XObjectTransform {
            dpi: Some(dpi),
            ..Default::default()
        },
    }];
    doc.pages.push(PdfPage::new(Mm(width_mm), Mm(height_mm), ops));

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_cover_photo_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.png");
        let photo = dir.path().join("photo.png");
        let output = dir.path().join("card.png");
        solid(100, 80, [0, 0, 255, 255]).save(&template).unwrap();
        solid(60, 30, [255, 0, 0, 255]).save(&photo).unwrap();

        let mut plan = CompositionPlan::new();
        plan.push(CompositionOp::Open {
            layer: Layer::Base,
            source: ImageSource::File(template),
        })
        .push(CompositionOp::Open {
            layer: Layer::Overlay,
            source: ImageSource::File(photo),
        })
        .push(CompositionOp::Resize {
            layer: Layer::Overlay,
            width: 60,
            height: 30,
        })
        .push(CompositionOp::Crop {
            layer: Layer::Overlay,
            x: 15,
            y: 0,
            width: 30,
            height: 30,
        })
        .push(CompositionOp::Composite { x: 10, y: 20 })
        .push(CompositionOp::Export {
            path: output.clone(),
            format: ExportFormat::Png,
        });

        RasterCompositor::new().execute(&plan).unwrap();

        let card = image::open(&output).unwrap().to_rgba8();
        assert_eq!(card.dimensions(), (100, 80));
        assert_eq!(card.get_pixel(25, 35).0, [255, 0, 0, 255]);
        assert_eq!(card.get_pixel(5, 5).0, [0, 0, 255, 255]);
        assert_eq!(card.get_pixel(45, 35).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_crop_out_of_bounds_fails() {
        let mut plan = CompositionPlan::new();
        plan.push(CompositionOp::Open {
            layer: Layer::Base,
            source: ImageSource::Blank {
                width: 10,
                height: 10,
            },
        })
        .push(CompositionOp::Crop {
            layer: Layer::Base,
            x: 5,
            y: 5,
            width: 10,
            height: 10,
        });
        let err = RasterCompositor::new().execute(&plan).unwrap_err();
        assert!(matches!(err, CardError::Render(_)));
    }

    #[test]
    fn test_composite_without_overlay_fails() {
        let mut plan = CompositionPlan::new();
        plan.push(CompositionOp::Open {
            layer: Layer::Base,
            source: ImageSource::Blank {
                width: 10,
                height: 10,
            },
        })
        .push(CompositionOp::Composite { x: 0, y: 0 });
        assert!(RasterCompositor::new().execute(&plan).is_err());
    }

    #[test]
    fn test_missing_font_fails() {
        let mut plan = CompositionPlan::new();
        plan.push(CompositionOp::Open {
            layer: Layer::Base,
            source: ImageSource::Blank {
                width: 10,
                height: 10,
            },
        })
        .push(CompositionOp::Annotate {
            text: "hi".to_string(),
            style: TextStyle {
                font: PathBuf::from("/no/such/font.ttf"),
                size: 10.0,
                color: [0, 0, 0, 255],
                anchor: Anchor::NorthWest,
                x: 0,
                y: 0,
            },
        });
        assert!(RasterCompositor::new().execute(&plan).is_err());
    }

    #[test]
    fn test_blend_full_coverage() {
        let mut pixel = Rgba([255, 255, 255, 255]);
        blend(&mut pixel, [0, 0, 0, 255], 1.0);
        assert_eq!(pixel.0, [0, 0, 0, 255]);

        let mut pixel = Rgba([255, 255, 255, 255]);
        blend(&mut pixel, [0, 0, 0, 255], 0.0);
        assert_eq!(pixel.0, [255, 255, 255, 255]);
    }
}
