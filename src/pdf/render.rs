//! Per-content-type renderers. Each one places a single block at the cursor,
//! emits its primitives on the canvas and moves the cursor past it. Styles are
//! always passed in; the canvas keeps no current font or colour between calls.

use crate::fonts::FontWeight;

use super::images::{DecodedImage, ImageSlot};
use super::layout::{LayoutCursor, wrap_text};
use super::{Canvas, Footer};

/// Line height as a multiple of the font size.
pub(crate) const LINE_FACTOR: f32 = 1.4;

pub(crate) const INK: [u8; 3] = [31, 41, 55];
pub(crate) const MUTED: [u8; 3] = [107, 114, 128];
pub(crate) const ACCENT: [u8; 3] = [161, 98, 7];
pub(crate) const LINK: [u8; 3] = [29, 78, 216];

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TextStyle {
    pub(crate) weight: FontWeight,
    pub(crate) size: f32,
    pub(crate) color: [u8; 3],
}

impl TextStyle {
    pub(crate) const fn regular(size: f32) -> Self {
        Self {
            weight: FontWeight::Regular,
            size,
            color: INK,
        }
    }

    pub(crate) const fn bold(size: f32) -> Self {
        Self {
            weight: FontWeight::Bold,
            size,
            color: INK,
        }
    }

    pub(crate) const fn color(self, color: [u8; 3]) -> Self {
        Self { color, ..self }
    }

    pub(crate) fn line_height(&self) -> f32 {
        self.size * LINE_FACTOR
    }
}

/// Document header tier (section titles).
pub(crate) const HEADER: TextStyle = TextStyle::bold(24.0).color(ACCENT);
/// Section subheader tier (per item titles).
pub(crate) const SUBHEADER: TextStyle = TextStyle::bold(16.0);
pub(crate) const BODY: TextStyle = TextStyle::regular(11.0);
pub(crate) const FOOTER_TEXT: TextStyle = TextStyle::regular(8.0).color(MUTED);

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Align {
    Left,
    Center,
}

/// Placement of a wrapped text block relative to the content box.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Block {
    pub(crate) align: Align,
    pub(crate) indent: f32,
    /// Extra space below the block.
    pub(crate) gap: f32,
}

impl Block {
    pub(crate) const fn left(gap: f32) -> Self {
        Self {
            align: Align::Left,
            indent: 0.0,
            gap,
        }
    }

    pub(crate) const fn centered(gap: f32) -> Self {
        Self {
            align: Align::Center,
            indent: 0.0,
            gap,
        }
    }

    pub(crate) const fn indented(indent: f32, gap: f32) -> Self {
        Self {
            align: Align::Left,
            indent,
            gap,
        }
    }
}

fn baseline(canvas: &Canvas, cursor_y: f32, style: &TextStyle) -> f32 {
    cursor_y + style.size * canvas.fonts().get(style.weight).ascender_ratio()
}

fn line_x(canvas: &Canvas, line_width: f32, block: &Block) -> f32 {
    let geometry = canvas.geometry();
    let left = geometry.margin + block.indent;
    match block.align {
        Align::Left => left,
        Align::Center => left + ((geometry.content_width() - block.indent) - line_width).max(0.0) / 2.0,
    }
}

/// Vertical space a [`heading`] takes.
pub(crate) fn heading_advance(style: &TextStyle) -> f32 {
    style.size * 1.5
}

/// Single-line bold title. Advances by one and a half times the font size.
pub(crate) fn heading(canvas: &mut Canvas, cursor: &mut LayoutCursor, text: &str, style: &TextStyle, align: Align) {
    let advance = heading_advance(style);
    cursor.ensure_space(advance);
    let width = canvas.fonts().get(style.weight).text_width(text, style.size);
    let block = Block { align, indent: 0.0, gap: 0.0 };
    let x = line_x(canvas, width, &block);
    let y = baseline(canvas, cursor.y(), style);
    canvas.draw_text(cursor.page(), x, y, text, style);
    cursor.advance(advance);
}

/// Height a wrapped block would take, without drawing it.
pub(crate) fn measure_text(canvas: &Canvas, text: &str, style: &TextStyle, block: &Block) -> (Vec<String>, f32) {
    let max_width = canvas.geometry().content_width() - block.indent;
    let font = canvas.fonts().get(style.weight);
    let lines = wrap_text(text, font, style.size, max_width);
    let height = lines.len() as f32 * style.line_height();
    (lines, height)
}

/// Word-wrapped body text, kept together on one page when it fits.
/// Advances by `lines × size × LINE_FACTOR + gap`.
pub(crate) fn paragraph(canvas: &mut Canvas, cursor: &mut LayoutCursor, text: &str, style: &TextStyle, block: &Block) {
    if text.trim().is_empty() {
        return;
    }
    let (lines, height) = measure_text(canvas, text, style, block);
    cursor.ensure_space(height);

    let font = canvas.fonts().get(style.weight);
    let widths: Vec<f32> = lines.iter().map(|l| font.text_width(l, style.size)).collect();
    let top = cursor.y();
    for (i, (line, width)) in lines.iter().zip(widths).enumerate() {
        let x = line_x(canvas, width, block);
        let y = baseline(canvas, top + i as f32 * style.line_height(), style);
        canvas.draw_text(cursor.page(), x, y, line, style);
    }
    cursor.advance(height + block.gap);
}

/// Label drawn in the link colour. With `clickable`, every wrapped line also
/// gets a URI annotation sized to the measured label; the text itself is laid
/// out identically either way.
pub(crate) fn link(
    canvas: &mut Canvas,
    cursor: &mut LayoutCursor,
    label: &str,
    url: &str,
    style: &TextStyle,
    block: &Block,
    clickable: bool,
) {
    let (lines, height) = measure_text(canvas, label, style, block);
    cursor.ensure_space(height);

    let font = canvas.fonts().get(style.weight);
    let widths: Vec<f32> = lines.iter().map(|l| font.text_width(l, style.size)).collect();
    let top = cursor.y();
    for (i, (line, width)) in lines.iter().zip(widths).enumerate() {
        let line_top = top + i as f32 * style.line_height();
        let x = line_x(canvas, width, block);
        let y = baseline(canvas, line_top, style);
        canvas.draw_text(cursor.page(), x, y, line, style);
        if clickable && width > 0.0 {
            canvas.add_link(cursor.page(), x, line_top, width, style.line_height(), url);
        }
    }
    cursor.advance(height + block.gap);
}

/// Draw an already decoded image scaled to fit a `box_w × box_h` box, centred
/// horizontally and top-aligned. Returns the drawn height.
pub(crate) fn fit_image(
    canvas: &mut Canvas,
    page: usize,
    img: &DecodedImage,
    x: f32,
    top: f32,
    box_w: f32,
    box_h: f32,
) -> f32 {
    let aspect = img.aspect();
    let width = box_w.min(box_h / aspect);
    let height = width * aspect;
    let name = canvas.embed_image(img);
    canvas.draw_image(page, &name, x + (box_w - width) / 2.0, top, width, height);
    height
}

/// Size of an image drawn at `width`, narrowed so the height stays within
/// `max_height`.
pub(crate) fn image_size(img: &DecodedImage, width: f32, max_height: f32) -> (f32, f32) {
    let aspect = img.aspect();
    let width = width.min(max_height / aspect);
    (width, width * aspect)
}

/// Image block for an already fetched slot (see [`super::images::load`]). A ready
/// image is drawn centred at the cursor at `(width, width × aspect)`, narrowed
/// when the height would exceed `max_height`, and the cursor moves past it
/// plus `caption_allowance`. An absent image leaves the cursor where it was.
pub(crate) fn image_block(
    canvas: &mut Canvas,
    cursor: &mut LayoutCursor,
    slot: &ImageSlot,
    width: f32,
    max_height: f32,
    caption_allowance: f32,
) -> bool {
    let ImageSlot::Ready(img) = slot else {
        return false;
    };
    let (width, height) = image_size(img, width, max_height);
    cursor.ensure_space(height + caption_allowance);

    let geometry = *canvas.geometry();
    let x = geometry.margin + (geometry.content_width() - width) / 2.0;
    let name = canvas.embed_image(img);
    canvas.draw_image(cursor.page(), &name, x, cursor.y(), width, height);
    cursor.advance(height + caption_allowance);
    true
}

/// Stamp date, title and page numbering onto every page. Runs once all content
/// is placed, since the total page count is only known then.
pub(crate) fn footer_pass(canvas: &mut Canvas, date_label: &str, artist_name: &str) {
    let geometry = *canvas.geometry();
    let total = canvas.page_count();
    let style = FOOTER_TEXT;
    let rule_y = geometry.page_height - geometry.margin + 12.0;
    let base = geometry.page_height - geometry.margin / 2.0;
    let center = format!("{artist_name} - Portfolio");

    for page in 0..total {
        let right = format!("Page {} of {}", page + 1, total);
        let font = canvas.fonts().get(style.weight);
        let center_w = font.text_width(&center, style.size);
        let right_w = font.text_width(&right, style.size);

        canvas.draw_rule(page, geometry.margin, geometry.page_width - geometry.margin, rule_y, MUTED);
        canvas.draw_text(page, geometry.margin, base, date_label, &style);
        canvas.draw_text(page, (geometry.page_width - center_w) / 2.0, base, &center, &style);
        canvas.draw_text(page, geometry.page_width - geometry.margin - right_w, base, &right, &style);
        canvas.set_footer(
            page,
            Footer {
                left: date_label.to_string(),
                center: center.clone(),
                right,
            },
        );
    }
}
