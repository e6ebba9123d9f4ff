use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;

use crate::config::{DEFAULT_BASE_PATH, DEFAULT_CONFIG_PATH, load_config};
use crate::error::Error;
use crate::fetch::{Fetch, Resources};
use crate::fonts::FontSources;
use crate::model::{SiteConfig, Spotlight};
use crate::pdf::images::{self, ImageSlot};
use crate::pdf::layout::{LayoutCursor, PageGeometry, truncate_to_width};
use crate::pdf::render::{
    self, ACCENT, Align, BODY, Block, HEADER, LINK, MUTED, SUBHEADER, TextStyle,
};
use crate::pdf::{Canvas, DocumentInfo, PageSummary};
use crate::progress::Progress;

const TITLE: TextStyle = TextStyle::bold(28.0);
const TAGLINE: TextStyle = TextStyle::regular(14.0).color(MUTED);
const LEAD: TextStyle = TextStyle::regular(12.0);
const EMPHASIS: TextStyle = TextStyle::bold(12.0).color(ACCENT);
const LABEL: TextStyle = TextStyle::bold(11.0);
const META: TextStyle = TextStyle::regular(10.0).color(MUTED);
const CAPTION: TextStyle = TextStyle::regular(9.0).color(MUTED);
const LINK_TEXT: TextStyle = TextStyle::regular(11.0).color(LINK);

/// Gallery grid: two cells per row, at most six images.
pub const GALLERY_COLUMNS: usize = 2;
pub const GALLERY_MAX_IMAGES: usize = 6;
const GALLERY_CELL_HEIGHT: f32 = 160.0;
const GALLERY_CAPTION_ALLOWANCE: f32 = 20.0;
const GRID_GAP: f32 = 20.0;

const HOME_IMAGE_MAX_HEIGHT: f32 = 220.0;
const SPOTLIGHT_IMAGE_MAX_HEIGHT: f32 = 260.0;
const SPOTLIGHT_CAPTION_ALLOWANCE: f32 = 10.0;

/// Fraction of the content height after which the FAQ starts on a new page.
const FAQ_BREAK_FRACTION: f32 = 0.6;

#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Deployment base path or site root: a URL (`https://host/repo`), a local
    /// directory (`.` by default), or empty for root-relative deployments.
    pub base_path: String,
    pub config_path: String,
    /// Emit clickable link annotations. Visible layout is the same either way.
    pub include_links: bool,
    /// Generation date used for the footer and the file name.
    pub date: NaiveDate,
    pub fonts: FontSources,
    pub geometry: PageGeometry,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            include_links: true,
            date: chrono::Local::now().date_naive(),
            fonts: FontSources::default(),
            geometry: PageGeometry::A4,
        }
    }
}

/// Section-level counts gathered during layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub gallery_images: usize,
    pub gallery_rows: usize,
    pub images_omitted: usize,
}

/// A finished document. Only ever built from a complete run.
#[derive(Clone, Debug)]
pub struct Portfolio {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub pages: Vec<PageSummary>,
    pub stats: LayoutStats,
}

impl Portfolio {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.pages.iter().map(|p| p.images).sum()
    }

    /// Write the document into `dir` under its computed file name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// `"{name with spaces as underscores}_Portfolio_{YYYY-MM-DD}.pdf"`.
pub fn portfolio_filename(artist_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_Portfolio_{}.pdf",
        artist_name.replace(' ', "_"),
        date.format("%Y-%m-%d")
    )
}

/// Playable watch link for an embeddable player URL: the last path segment is
/// taken as the video id.
pub fn watch_url(embed_url: &str) -> String {
    let id = url::Url::parse(embed_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_else(|| {
            let path = embed_url.split(['?', '#']).next().unwrap_or(embed_url);
            path.trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        });
    format!("https://www.youtube.com/watch?v={id}")
}

/// `2024-03-05` → `March 5, 2024`; anything unparsable is shown as given.
pub fn format_press_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn is_external_link(link: &str) -> bool {
    url::Url::parse(link).is_ok_and(|u| matches!(u.scheme(), "http" | "https" | "mailto"))
}

/// Load the content model through `fetcher` and lay out the portfolio.
///
/// Any error aborts the whole run and is logged before it is returned; image
/// failures are the exception and only leave their slot empty.
pub fn generate(
    fetcher: &dyn Fetch,
    options: &GenerateOptions,
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<Portfolio, Error> {
    let mut progress = Progress::new(progress);
    let resources = Resources::new(fetcher, &options.base_path);
    let result = load_config(&resources, &options.config_path).and_then(|config| {
        progress.report(5);
        assemble(&config, &resources, options, &mut progress)
    });
    if let Err(ref err) = result {
        log::error!("Portfolio generation failed: {err}");
    }
    result
}

/// Lay out a content model that is already in memory. Images are still pulled
/// through `fetcher`.
pub fn render_portfolio(
    config: &SiteConfig,
    fetcher: &dyn Fetch,
    options: &GenerateOptions,
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<Portfolio, Error> {
    let mut progress = Progress::new(progress);
    let resources = Resources::new(fetcher, &options.base_path);
    progress.report(5);
    let result = assemble(config, &resources, options, &mut progress);
    if let Err(ref err) = result {
        log::error!("Portfolio generation failed: {err}");
    }
    result
}

fn used_chars(config: &SiteConfig) -> HashSet<char> {
    let mut chars: HashSet<char> = (' '..='~').collect();
    chars.extend(['•', '…']);
    for text in config.visible_text() {
        chars.extend(text.chars());
    }
    chars
}

struct Assembler<'a> {
    config: &'a SiteConfig,
    resources: &'a Resources<'a>,
    options: &'a GenerateOptions,
    canvas: Canvas,
    cursor: LayoutCursor,
    stats: LayoutStats,
}

fn assemble(
    config: &SiteConfig,
    resources: &Resources,
    options: &GenerateOptions,
    progress: &mut Progress,
) -> Result<Portfolio, Error> {
    let t0 = Instant::now();
    let canvas = Canvas::new(options.geometry, &options.fonts, &used_chars(config))?;
    let mut a = Assembler {
        config,
        resources,
        options,
        canvas,
        cursor: LayoutCursor::new(options.geometry),
        stats: LayoutStats::default(),
    };

    a.title_block();
    progress.report(10);
    a.home_images();
    progress.report(20);
    a.biography();
    progress.report(30);
    a.highlights();
    progress.report(40);
    a.gallery();
    progress.report(50);
    a.music();
    progress.report(65);
    a.press();
    progress.report(80);
    a.faq();
    progress.report(90);
    let t_layout = t0.elapsed();

    let Assembler {
        mut canvas,
        cursor,
        stats,
        ..
    } = a;
    canvas.ensure_pages(cursor.page_count());
    let date_label = options.date.format("%B %-d, %Y").to_string();
    render::footer_pass(&mut canvas, &date_label, &config.artist.name);
    progress.report(95);

    let title = format!("{} - Portfolio", config.artist.name);
    let (bytes, pages) = canvas.finish(&DocumentInfo {
        title: &title,
        author: &config.artist.name,
        date: options.date,
    });
    let portfolio = Portfolio {
        filename: portfolio_filename(&config.artist.name, options.date),
        bytes,
        pages,
        stats,
    };
    progress.report(100);

    log::info!(
        "Timing: layout={:.1}ms, total={:.1}ms ({} pages, {} images, {} omitted)",
        t_layout.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
        portfolio.page_count(),
        portfolio.image_count(),
        portfolio.stats.images_omitted,
    );
    Ok(portfolio)
}

impl Assembler<'_> {
    fn content_width(&self) -> f32 {
        self.options.geometry.content_width()
    }

    fn load_image(&mut self, reference: &str) -> ImageSlot {
        let slot = images::load(self.resources, reference);
        if matches!(slot, ImageSlot::Absent) {
            self.stats.images_omitted += 1;
        }
        slot
    }

    fn heading(&mut self, text: &str, style: &TextStyle, align: Align) {
        render::heading(&mut self.canvas, &mut self.cursor, text, style, align);
    }

    fn paragraph(&mut self, text: &str, style: &TextStyle, block: Block) {
        render::paragraph(&mut self.canvas, &mut self.cursor, text, style, &block);
    }

    fn link(&mut self, label: &str, url: &str, block: Block) {
        render::link(
            &mut self.canvas,
            &mut self.cursor,
            label,
            url,
            &LINK_TEXT,
            &block,
            self.options.include_links,
        );
    }

    fn title_block(&mut self) {
        let config = self.config;
        let artist = &config.artist;
        self.heading(&artist.name, &TITLE, Align::Center);
        self.paragraph(&artist.tagline, &TAGLINE, Block::centered(16.0));
    }

    /// Instrument and vocal photos side by side. Both are fetched (in order)
    /// before placement, since the row height depends on the taller one.
    fn home_images(&mut self) {
        let refs = [
            self.config.home.images.veena.clone(),
            self.config.home.images.vocal.clone(),
        ];
        let slots: Vec<ImageSlot> = refs.iter().map(|r| self.load_image(r)).collect();

        let cell_w = (self.content_width() - GRID_GAP) / GALLERY_COLUMNS as f32;
        let row_h = slots
            .iter()
            .map(|slot| match slot {
                ImageSlot::Ready(img) => (cell_w * img.aspect()).min(HOME_IMAGE_MAX_HEIGHT),
                ImageSlot::Absent => 0.0,
            })
            .fold(0.0f32, f32::max);
        if row_h <= 0.0 {
            return;
        }

        self.cursor.ensure_space(row_h);
        let margin = self.options.geometry.margin;
        for (col, slot) in slots.iter().enumerate() {
            if let ImageSlot::Ready(img) = slot {
                let x = margin + col as f32 * (cell_w + GRID_GAP);
                render::fit_image(
                    &mut self.canvas,
                    self.cursor.page(),
                    img,
                    x,
                    self.cursor.y(),
                    cell_w,
                    HOME_IMAGE_MAX_HEIGHT,
                );
            }
        }
        self.cursor.advance(row_h + 16.0);
    }

    fn biography(&mut self) {
        let config = self.config;
        let artist = &config.artist;
        self.paragraph(&artist.brief_bio, &LEAD, Block::centered(18.0));
        if artist.full_bio.is_empty() {
            return;
        }
        self.heading("Biography", &SUBHEADER, Align::Left);
        for para in &artist.full_bio {
            self.paragraph(para, &BODY, Block::left(8.0));
        }
        self.cursor.advance(10.0);
    }

    fn highlights(&mut self) {
        let config = self.config;
        if config.spotlights.is_empty() {
            return;
        }
        self.heading("Highlights", &HEADER, Align::Left);
        for spotlight in &config.spotlights {
            self.spotlight(spotlight);
        }
    }

    /// Title and image are kept on one page: the space for both is reserved
    /// before the title is drawn.
    fn spotlight(&mut self, spotlight: &Spotlight) {
        let width = self.content_width();
        let slot = self.load_image(&spotlight.image_url);
        let image_height = match &slot {
            ImageSlot::Ready(img) => {
                render::image_size(img, width, SPOTLIGHT_IMAGE_MAX_HEIGHT).1 + SPOTLIGHT_CAPTION_ALLOWANCE
            }
            ImageSlot::Absent => 0.0,
        };
        self.cursor
            .ensure_space(render::heading_advance(&SUBHEADER) + image_height);
        self.heading(&spotlight.title, &SUBHEADER, Align::Left);
        render::image_block(
            &mut self.canvas,
            &mut self.cursor,
            &slot,
            width,
            SPOTLIGHT_IMAGE_MAX_HEIGHT,
            SPOTLIGHT_CAPTION_ALLOWANCE,
        );
        self.paragraph(&spotlight.subtitle, &EMPHASIS, Block::left(4.0));
        self.paragraph(&spotlight.description, &BODY, Block::left(8.0));
        for feature in &spotlight.features {
            self.paragraph(&format!("• {}", feature.title), &LABEL, Block::indented(10.0, 0.0));
            self.paragraph(&feature.description, &BODY, Block::indented(20.0, 6.0));
        }
        if let Some(link) = spotlight.cta_link.as_deref().filter(|l| is_external_link(l)) {
            let label = spotlight.cta_text.as_deref().unwrap_or("Learn more");
            self.link(label, link, Block::left(0.0));
        }
        self.cursor.advance(16.0);
    }

    /// Two-column grid of at most six images. Rows are fixed height, so a
    /// missing image leaves a hole rather than shifting its neighbours.
    fn gallery(&mut self) {
        let config = self.config;
        let images = &config.gallery.images;
        if images.is_empty() {
            return;
        }
        self.cursor.new_page();
        self.heading("Gallery", &HEADER, Align::Left);

        let cell_w = (self.content_width() - GRID_GAP) / GALLERY_COLUMNS as f32;
        let row_h = GALLERY_CELL_HEIGHT + GALLERY_CAPTION_ALLOWANCE;
        let margin = self.options.geometry.margin;
        let capped = &images[..images.len().min(GALLERY_MAX_IMAGES)];

        for row in capped.chunks(GALLERY_COLUMNS) {
            self.cursor.ensure_space(row_h);
            let top = self.cursor.y();
            for (col, item) in row.iter().enumerate() {
                let ImageSlot::Ready(img) = self.load_image(&item.src) else {
                    continue;
                };
                let x = margin + col as f32 * (cell_w + GRID_GAP);
                let page = self.cursor.page();
                render::fit_image(&mut self.canvas, page, &img, x, top, cell_w, GALLERY_CELL_HEIGHT);
                self.stats.gallery_images += 1;

                if let Some(caption) = item.caption.as_deref() {
                    let font = self.canvas.fonts().get(CAPTION.weight);
                    let text = truncate_to_width(caption, font, CAPTION.size, cell_w);
                    let w = font.text_width(&text, CAPTION.size);
                    let baseline = top + GALLERY_CELL_HEIGHT + 12.0;
                    self.canvas
                        .draw_text(page, x + (cell_w - w) / 2.0, baseline, &text, &CAPTION);
                }
            }
            self.stats.gallery_rows += 1;
            self.cursor.advance(row_h + 10.0);
        }
    }

    fn music(&mut self) {
        let config = self.config;
        let categories = &config.music.categories;
        if categories.is_empty() {
            return;
        }
        self.cursor.new_page();
        self.heading("Music", &HEADER, Align::Left);
        for category in categories {
            self.heading(&category.name, &SUBHEADER, Align::Left);
            self.paragraph(&category.description, &BODY, Block::left(6.0));
            for video in &category.videos {
                self.link(&video.title, &watch_url(&video.url), Block::indented(10.0, 4.0));
            }
            self.cursor.advance(12.0);
        }
    }

    fn press(&mut self) {
        let config = self.config;
        let articles = &config.press.articles;
        if articles.is_empty() {
            return;
        }
        self.cursor.new_page();
        self.heading("Press", &HEADER, Align::Left);
        for article in articles {
            self.paragraph(&article.title, &TextStyle::bold(13.0), Block::left(2.0));
            let meta = format!("{} • {}", article.publication, format_press_date(&article.date));
            self.paragraph(&meta, &META, Block::left(6.0));
            self.paragraph(&article.excerpt, &BODY, Block::left(4.0));
            self.link("Read article", &article.url, Block::left(0.0));
            self.cursor.advance(14.0);
        }
    }

    fn faq(&mut self) {
        let config = self.config;
        let items = &config.faq.items;
        if items.is_empty() {
            return;
        }
        let threshold = self.options.geometry.content_height() * FAQ_BREAK_FRACTION;
        self.cursor.force_page_if_past(threshold);
        self.heading("Frequently Asked Questions", &HEADER, Align::Left);
        for (i, item) in items.iter().enumerate() {
            let question = format!("{}. {}", i + 1, item.question);
            self.paragraph(&question, &TextStyle::bold(12.0), Block::left(4.0));
            self.paragraph(&item.answer, &BODY, Block::indented(14.0, 12.0));
        }
    }
}
