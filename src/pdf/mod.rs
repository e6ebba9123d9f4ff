pub(crate) mod images;
pub(crate) mod layout;
pub(crate) mod render;

use std::collections::HashSet;

use chrono::Datelike;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{FontSet, FontSources};
use images::{ColorSpace, DecodedImage, ImageData};
use layout::PageGeometry;
use render::TextStyle;

pub(crate) struct LinkAnnotation {
    pub(crate) rect: Rect,
    pub(crate) url: String,
}

/// The three strings stamped at the bottom of a page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Footer {
    pub left: String,
    pub center: String,
    pub right: String,
}

/// What ended up on one page, kept alongside the PDF bytes for reporting.
#[derive(Clone, Debug, Default)]
pub struct PageSummary {
    pub images: usize,
    pub links: Vec<String>,
    pub footer: Footer,
}

struct PageCanvas {
    content: Content,
    links: Vec<LinkAnnotation>,
    /// Image XObjects painted on this page, in first-use order.
    xobjects: Vec<(String, Ref)>,
    summary: PageSummary,
}

impl PageCanvas {
    fn new() -> Self {
        Self {
            content: Content::new(),
            links: Vec::new(),
            xobjects: Vec::new(),
            summary: PageSummary::default(),
        }
    }
}

pub(crate) struct DocumentInfo<'a> {
    pub(crate) title: &'a str,
    pub(crate) author: &'a str,
    pub(crate) date: chrono::NaiveDate,
}

/// Drawing surface for a whole document: owns the PDF object graph, one
/// content stream per page, and the shared font and image resources.
/// Coordinates taken by its methods are measured from the top-left corner.
pub(crate) struct Canvas {
    pdf: Pdf,
    next_id: i32,
    geometry: PageGeometry,
    fonts: FontSet,
    pages: Vec<PageCanvas>,
    image_xobjects: Vec<(String, Ref)>,
}

impl Canvas {
    pub(crate) fn new(
        geometry: PageGeometry,
        sources: &FontSources,
        used_chars: &HashSet<char>,
    ) -> Result<Self, Error> {
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let fonts = {
            let mut alloc = || {
                let r = Ref::new(next_id);
                next_id += 1;
                r
            };
            FontSet::register(&mut pdf, sources, used_chars, &mut alloc)?
        };
        Ok(Self {
            pdf,
            next_id,
            geometry,
            fonts,
            pages: vec![PageCanvas::new()],
            image_xobjects: Vec::new(),
        })
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    pub(crate) fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub(crate) fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Grow the page list so that `count` pages exist.
    pub(crate) fn ensure_pages(&mut self, count: usize) {
        while self.pages.len() < count {
            self.pages.push(PageCanvas::new());
        }
    }

    fn page_mut(&mut self, page: usize) -> &mut PageCanvas {
        self.ensure_pages(page + 1);
        &mut self.pages[page]
    }

    fn pdf_y(&self, top_y: f32) -> f32 {
        self.geometry.page_height - top_y
    }

    /// Show a single line of text with its baseline at `baseline` (from the top).
    pub(crate) fn draw_text(&mut self, page: usize, x: f32, baseline: f32, text: &str, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let y = self.pdf_y(baseline);
        let font = self.fonts.get(style.weight);
        let bytes = font.encode(text);
        let pdf_name = font.pdf_name.clone();
        let [r, g, b] = style.color;

        let content = &mut self.page_mut(page).content;
        content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        content.begin_text();
        content.set_font(Name(pdf_name.as_bytes()), style.size);
        content.next_line(x, y);
        content.show(Str(&bytes));
        content.end_text();
    }

    /// Register a clickable URI region. The box spans `top..top + height`.
    pub(crate) fn add_link(&mut self, page: usize, x: f32, top: f32, width: f32, height: f32, url: &str) {
        let rect = Rect::new(x, self.pdf_y(top + height), x + width, self.pdf_y(top));
        let canvas = self.page_mut(page);
        canvas.links.push(LinkAnnotation {
            rect,
            url: url.to_string(),
        });
        canvas.summary.links.push(url.to_string());
    }

    /// Horizontal hairline at `y` (from the top).
    pub(crate) fn draw_rule(&mut self, page: usize, x1: f32, x2: f32, y: f32, color: [u8; 3]) {
        let y = self.pdf_y(y);
        let [r, g, b] = color;
        let content = &mut self.page_mut(page).content;
        content.save_state();
        content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        content.set_line_width(0.5);
        content.move_to(x1, y);
        content.line_to(x2, y);
        content.stroke();
        content.restore_state();
    }

    /// Write the image as an XObject and return its resource name.
    pub(crate) fn embed_image(&mut self, img: &DecodedImage) -> String {
        let xobj_ref = self.alloc();
        let pdf_name = format!("Im{}", self.image_xobjects.len() + 1);
        let (w, h) = (img.pixel_width as i32, img.pixel_height as i32);

        match &img.data {
            ImageData::Jpeg { data, color } => {
                let mut xobj = self.pdf.image_xobject(xobj_ref, data);
                xobj.filter(Filter::DctDecode);
                xobj.width(w);
                xobj.height(h);
                match color {
                    ColorSpace::Rgb => xobj.color_space().device_rgb(),
                    ColorSpace::Gray => xobj.color_space().device_gray(),
                };
                xobj.bits_per_component(8);
            }
            ImageData::Flate { rgb, alpha } => {
                let smask_ref = match alpha {
                    Some(alpha) => {
                        let mask_ref = self.alloc();
                        let mut mask = self.pdf.image_xobject(mask_ref, alpha);
                        mask.filter(Filter::FlateDecode);
                        mask.width(w);
                        mask.height(h);
                        mask.color_space().device_gray();
                        mask.bits_per_component(8);
                        Some(mask_ref)
                    }
                    None => None,
                };

                let mut xobj = self.pdf.image_xobject(xobj_ref, rgb);
                xobj.filter(Filter::FlateDecode);
                xobj.width(w);
                xobj.height(h);
                xobj.color_space().device_rgb();
                xobj.bits_per_component(8);
                if let Some(mask_ref) = smask_ref {
                    xobj.s_mask(mask_ref);
                }
            }
        }

        self.image_xobjects.push((pdf_name.clone(), xobj_ref));
        pdf_name
    }

    /// Paint an embedded image into the box whose top-left corner is `(x, top)`.
    pub(crate) fn draw_image(&mut self, page: usize, name: &str, x: f32, top: f32, width: f32, height: f32) {
        let y_bottom = self.pdf_y(top + height);
        let xobject = self
            .image_xobjects
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| *r);
        let canvas = self.page_mut(page);
        if let Some(xobj_ref) = xobject
            && !canvas.xobjects.iter().any(|(n, _)| n == name)
        {
            canvas.xobjects.push((name.to_string(), xobj_ref));
        }
        canvas.content.save_state();
        canvas.content.transform([width, 0.0, 0.0, height, x, y_bottom]);
        canvas.content.x_object(Name(name.as_bytes()));
        canvas.content.restore_state();
        canvas.summary.images += 1;
    }

    pub(crate) fn set_footer(&mut self, page: usize, footer: Footer) {
        self.page_mut(page).summary.footer = footer;
    }

    /// Serialize the object graph. Consumes the canvas, so nothing can be
    /// drawn after the page count is final.
    pub(crate) fn finish(mut self, info: &DocumentInfo) -> (Vec<u8>, Vec<PageSummary>) {
        let t0 = std::time::Instant::now();
        let catalog_id = self.alloc();
        let pages_id = self.alloc();
        let info_id = self.alloc();

        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();

        let pages = std::mem::take(&mut self.pages);
        let mut summaries = Vec::with_capacity(n);
        let mut page_annot_refs: Vec<Vec<Ref>> = Vec::with_capacity(n);
        let mut page_xobjects: Vec<Vec<(String, Ref)>> = Vec::with_capacity(n);

        for (i, page) in pages.into_iter().enumerate() {
            let annots: Vec<Ref> = page
                .links
                .iter()
                .map(|link| {
                    let annot_ref = self.alloc();
                    let mut annot = self.pdf.annotation(annot_ref);
                    annot
                        .subtype(pdf_writer::types::AnnotationType::Link)
                        .rect(link.rect)
                        .border(0.0, 0.0, 0.0, None);
                    annot
                        .action()
                        .action_type(pdf_writer::types::ActionType::Uri)
                        .uri(Str(link.url.as_bytes()));
                    annot_ref
                })
                .collect();
            page_annot_refs.push(annots);

            let raw = page.content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            self.pdf
                .stream(content_ids[i], &compressed)
                .filter(Filter::FlateDecode);
            summaries.push(page.summary);
            page_xobjects.push(page.xobjects);
        }

        self.pdf.catalog(catalog_id).pages(pages_id);
        self.pdf
            .pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        let font_pairs: Vec<(String, Ref)> = self
            .fonts
            .entries()
            .iter()
            .map(|entry| (entry.pdf_name.clone(), entry.font_ref))
            .collect();

        let geometry = self.geometry;
        for i in 0..n {
            let mut page = self.pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, geometry.page_width, geometry.page_height))
                .parent(pages_id)
                .contents(content_ids[i]);
            if !page_annot_refs[i].is_empty() {
                page.annotations(page_annot_refs[i].iter().copied());
            }
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !page_xobjects[i].is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &page_xobjects[i] {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        let date = pdf_writer::Date::new(info.date.year() as u16)
            .month(info.date.month() as u8)
            .day(info.date.day() as u8);
        self.pdf
            .document_info(info_id)
            .title(TextStr(info.title))
            .author(TextStr(info.author))
            .creator(TextStr(concat!("portfolio-pdf ", env!("CARGO_PKG_VERSION"))))
            .creation_date(date);

        let bytes = self.pdf.finish();
        log::info!(
            "Assembly: {n} pages, {} images, {:.1}ms (output {} bytes)",
            self.image_xobjects.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
            bytes.len(),
        );
        (bytes, summaries)
    }
}
