use crate::fonts::FontEntry;

/// Fixed page geometry in points. Every page of a portfolio shares it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        page_width: 595.28,
        page_height: 841.89,
        margin: 50.0,
    };

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// Lowest y (from the top edge) that content may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Write position within the page sequence. `y` grows downwards from the top
/// edge; conversion to PDF user space happens when primitives are emitted.
#[derive(Clone, Debug)]
pub(crate) struct LayoutCursor {
    geometry: PageGeometry,
    page: usize,
    y: f32,
}

impl LayoutCursor {
    pub(crate) fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            page: 0,
            y: geometry.margin,
        }
    }

    pub(crate) fn page(&self) -> usize {
        self.page
    }

    pub(crate) fn y(&self) -> f32 {
        self.y
    }

    /// Pages touched so far, including the current one.
    pub(crate) fn page_count(&self) -> usize {
        self.page + 1
    }

    pub(crate) fn advance(&mut self, by: f32) {
        self.y += by;
    }

    pub(crate) fn new_page(&mut self) {
        self.page += 1;
        self.y = self.geometry.margin;
    }

    /// Break to a fresh page when `needed` would cross the bottom margin.
    /// A block taller than a whole page still lands on the new page and
    /// overflows it.
    pub(crate) fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y + needed > self.geometry.bottom_limit() {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Break only if something was written more than `threshold` below the top
    /// margin, so a section that starts right after a break does not leave a
    /// blank page behind.
    pub(crate) fn force_page_if_past(&mut self, threshold: f32) -> bool {
        if self.y > self.geometry.margin + threshold {
            self.new_page();
            true
        } else {
            false
        }
    }
}

/// Greedy word wrap. Words wider than a full line are split between
/// characters. Always returns at least one (possibly empty) line.
pub(crate) fn wrap_text(text: &str, font: &FontEntry, font_size: f32, max_width: f32) -> Vec<String> {
    let space_w = font.space_width(font_size);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w: f32 = 0.0;

        for word in paragraph.split_whitespace() {
            let ww = font.text_width(word, font_size);
            let proposed = if current.is_empty() {
                ww
            } else {
                current_w + space_w + ww
            };

            if proposed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = proposed;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            }

            if ww <= max_width {
                current.push_str(word);
                current_w = ww;
                continue;
            }

            for ch in word.chars() {
                let cw = font.char_width_1000(ch) * font_size / 1000.0;
                if !current.is_empty() && current_w + cw > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                current.push(ch);
                current_w += cw;
            }
        }

        lines.push(current);
    }

    // Drop trailing blank lines produced by trailing newlines, but keep one.
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Cut `text` so it fits on a single line of `max_width`, ending in `…` when
/// anything was dropped.
pub(crate) fn truncate_to_width(text: &str, font: &FontEntry, font_size: f32, max_width: f32) -> String {
    if font.text_width(text, font_size) <= max_width {
        return text.to_string();
    }
    let budget = max_width - font.char_width_1000('…') * font_size / 1000.0;
    let mut out = String::new();
    let mut width = 0.0;
    for ch in text.chars() {
        let cw = font.char_width_1000(ch) * font_size / 1000.0;
        if width + cw > budget {
            break;
        }
        out.push(ch);
        width += cw;
    }
    let mut out = out.trim_end().to_string();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_writer::Ref;

    fn helvetica() -> FontEntry {
        let mut pdf = pdf_writer::Pdf::new();
        let mut next = 1;
        let mut alloc = || {
            let r = Ref::new(next);
            next += 1;
            r
        };
        let set = crate::fonts::FontSet::register(
            &mut pdf,
            &Default::default(),
            &Default::default(),
            &mut alloc,
        )
        .unwrap();
        set.regular
    }

    #[test]
    fn ensure_space_breaks_only_when_block_crosses_bottom_margin() {
        let geometry = PageGeometry::A4;
        let mut cursor = LayoutCursor::new(geometry);
        assert!(!cursor.ensure_space(geometry.content_height()));
        cursor.advance(10.0);
        assert!(cursor.ensure_space(geometry.content_height()));
        assert_eq!(cursor.page(), 1);
        assert_eq!(cursor.y(), geometry.margin);
    }

    #[test]
    fn oversize_block_is_placed_after_a_single_break() {
        let mut cursor = LayoutCursor::new(PageGeometry::A4);
        cursor.advance(100.0);
        assert!(cursor.ensure_space(5000.0));
        cursor.advance(5000.0);
        assert_eq!(cursor.page_count(), 2);
    }

    #[test]
    fn forced_break_skips_fresh_pages() {
        let mut cursor = LayoutCursor::new(PageGeometry::A4);
        assert!(!cursor.force_page_if_past(10.0));
        cursor.advance(11.0);
        assert!(cursor.force_page_if_past(10.0));
        assert!(!cursor.force_page_if_past(10.0));
        assert_eq!(cursor.page(), 1);
    }

    #[test]
    fn wrap_respects_width() {
        let font = helvetica();
        let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
        let lines = wrap_text(&text, &font, 11.0, 200.0);
        assert!(lines.len() > 5);
        for line in &lines {
            assert!(font.text_width(line, 11.0) <= 200.0, "{line:?} too wide");
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined.split_whitespace().count(), text.split_whitespace().count());
    }

    #[test]
    fn wrap_splits_long_words() {
        let font = helvetica();
        let lines = wrap_text(&"m".repeat(100), &font, 12.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 100);
    }

    #[test]
    fn wrap_empty_yields_one_line() {
        let font = helvetica();
        assert_eq!(wrap_text("", &font, 12.0, 100.0), vec![String::new()]);
    }

    #[test]
    fn truncate_keeps_short_text_and_ellipsizes_long_text() {
        let font = helvetica();
        assert_eq!(truncate_to_width("Live at Chennai", &font, 9.0, 200.0), "Live at Chennai");

        let long = "Concert at the Music Academy during the December season ".repeat(4);
        let cut = truncate_to_width(&long, &font, 9.0, 120.0);
        assert!(cut.ends_with('…'));
        assert!(font.text_width(&cut, 9.0) <= 120.0 + 0.01);
    }
}
