use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Optional TrueType/OpenType files to embed instead of the standard
/// Helvetica pair.
#[derive(Clone, Debug, Default)]
pub struct FontSources {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

/// Helvetica's ascender in 1000-units.
const HELVETICA_ASCENDER: f32 = 0.718;

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    metrics: Metrics,
}

enum Metrics {
    /// Standard Type1 font shown through WinAnsiEncoding.
    Standard(FontWeight),
    /// Embedded subset shown through Identity-H, one CID per glyph.
    Embedded(EmbeddedMetrics),
}

struct EmbeddedMetrics {
    glyphs: HashMap<char, Glyph>,
    /// Advance of `.notdef`, drawn for characters the face lacks.
    missing_width: f32,
    ascender: f32,
}

#[derive(Clone, Copy, Debug)]
struct Glyph {
    cid: u16,
    width: f32,
}

impl FontEntry {
    /// Advance of `ch` in 1000-units. Characters the font cannot show are
    /// dropped by [`FontEntry::encode`] for standard fonts, so they measure 0.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        match &self.metrics {
            Metrics::Standard(weight) => helvetica_width(*weight, ch).unwrap_or(0.0),
            Metrics::Embedded(m) => m.glyphs.get(&ch).map_or(m.missing_width, |g| g.width),
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(&self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }

    /// Bytes for a `Tj` string operand in this font's encoding.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.metrics {
            Metrics::Standard(_) => text.chars().filter_map(winansi_byte).collect(),
            Metrics::Embedded(m) => text
                .chars()
                .flat_map(|ch| m.glyphs.get(&ch).map_or(0, |g| g.cid).to_be_bytes())
                .collect(),
        }
    }

    pub(crate) fn ascender_ratio(&self) -> f32 {
        match &self.metrics {
            Metrics::Standard(_) => HELVETICA_ASCENDER,
            Metrics::Embedded(m) => m.ascender,
        }
    }
}

/// The regular + bold pair every page references as `/F1` and `/F2`.
pub(crate) struct FontSet {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
}

impl FontSet {
    pub(crate) fn register(
        pdf: &mut Pdf,
        sources: &FontSources,
        used_chars: &HashSet<char>,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<Self, Error> {
        let regular = register_font(
            pdf,
            sources.regular.as_deref(),
            FontWeight::Regular,
            "F1",
            used_chars,
            alloc,
        )?;
        let bold = register_font(
            pdf,
            sources.bold.as_deref(),
            FontWeight::Bold,
            "F2",
            used_chars,
            alloc,
        )?;
        Ok(Self { regular, bold })
    }

    pub(crate) fn get(&self, weight: FontWeight) -> &FontEntry {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    pub(crate) fn entries(&self) -> [&FontEntry; 2] {
        [&self.regular, &self.bold]
    }
}

fn register_font(
    pdf: &mut Pdf,
    source: Option<&Path>,
    weight: FontWeight,
    pdf_name: &str,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<FontEntry, Error> {
    let t0 = std::time::Instant::now();
    let font_ref = alloc();

    let metrics = match source {
        Some(path) => {
            let font_err = |reason: String| Error::Font {
                path: path.to_path_buf(),
                reason,
            };
            let data = std::fs::read(path).map_err(|e| font_err(e.to_string()))?;
            let subset = FontSubset::build(&data, used_chars).map_err(font_err)?;
            subset.write(pdf, font_ref, alloc);
            log::info!(
                "Embedded {} as {pdf_name}: {} glyphs, {} bytes",
                subset.ps_name,
                subset.metrics.glyphs.len(),
                subset.data.len()
            );
            Metrics::Embedded(subset.metrics)
        }
        None => {
            let base_font: &[u8] = match weight {
                FontWeight::Regular => b"Helvetica",
                FontWeight::Bold => b"Helvetica-Bold",
            };
            pdf.type1_font(font_ref)
                .base_font(Name(base_font))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            Metrics::Standard(weight)
        }
    };

    log::debug!(
        "register_font: {source:?} {weight:?} -> {:.1}ms",
        t0.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(FontEntry {
        pdf_name: pdf_name.to_string(),
        font_ref,
        metrics,
    })
}

/// A face cut down to the characters the document draws.
struct FontSubset {
    ps_name: String,
    data: Vec<u8>,
    metrics: EmbeddedMetrics,
    bbox: Rect,
    ascent: f32,
    descent: f32,
    cap_height: f32,
}

impl FontSubset {
    fn build(font_data: &[u8], used_chars: &HashSet<char>) -> Result<Self, String> {
        let face = Face::parse(font_data, 0).map_err(|e| format!("not a TrueType/OpenType font: {e}"))?;
        let ps_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| "EmbeddedFont".to_string())
            .replace(' ', "");
        let scale = 1000.0 / face.units_per_em() as f32;
        let advance = |gid: GlyphId| face.glyph_hor_advance(gid).map_or(0.0, |a| a as f32 * scale);

        // Sorted so that glyph order, and with it the output, is stable.
        let mut chars: Vec<char> = used_chars.iter().copied().collect();
        chars.sort_unstable();
        let mapped: Vec<(char, GlyphId)> = chars
            .into_iter()
            .filter_map(|ch| face.glyph_index(ch).map(|gid| (ch, gid)))
            .collect();

        let mut remapper = subsetter::GlyphRemapper::new();
        for (_, gid) in &mapped {
            remapper.remap(gid.0);
        }
        let (data, subsetted) = match subsetter::subset(font_data, 0, &remapper) {
            Ok(data) => (data, true),
            Err(e) => {
                log::warn!("Subsetting {ps_name} failed ({e}), embedding the whole font");
                (font_data.to_vec(), false)
            }
        };
        if i32::try_from(data.len()).is_err() {
            return Err("font file too large to embed".to_string());
        }

        let glyphs = mapped
            .iter()
            .map(|&(ch, gid)| {
                let cid = if subsetted { remapper.get(gid.0).unwrap_or(0) } else { gid.0 };
                (ch, Glyph { cid, width: advance(gid) })
            })
            .collect();

        let bb = face.global_bounding_box();
        Ok(Self {
            ps_name,
            data,
            metrics: EmbeddedMetrics {
                glyphs,
                missing_width: advance(GlyphId(0)),
                ascender: face.ascender() as f32 * scale / 1000.0,
            },
            bbox: Rect::new(
                bb.x_min as f32 * scale,
                bb.y_min as f32 * scale,
                bb.x_max as f32 * scale,
                bb.y_max as f32 * scale,
            ),
            ascent: face.ascender() as f32 * scale,
            descent: face.descender() as f32 * scale,
            cap_height: face.capital_height().map_or(700.0, |h| h as f32 * scale),
        })
    }

    /// Type0 font -> CIDFontType2 -> descriptor -> FontFile2, plus a ToUnicode
    /// CMap so the text stays searchable.
    fn write(&self, pdf: &mut Pdf, font_ref: Ref, alloc: &mut impl FnMut() -> Ref) {
        let cid_font_ref = alloc();
        let descriptor_ref = alloc();
        let data_ref = alloc();
        let to_unicode_ref = alloc();
        let name = Name(self.ps_name.as_bytes());

        pdf.type0_font(font_ref)
            .base_font(name)
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font_ref)
            .to_unicode(to_unicode_ref);

        {
            let mut cid = pdf.cid_font(cid_font_ref);
            cid.subtype(CidFontType::Type2)
                .base_font(name)
                .system_info(identity())
                .font_descriptor(descriptor_ref)
                .default_width(self.metrics.missing_width)
                .cid_to_gid_map_predefined(Name(b"Identity"));
            let runs = self.width_runs();
            if !runs.is_empty() {
                let mut widths = cid.widths();
                for (start, run) in runs {
                    widths.consecutive(start, run);
                }
            }
        }

        pdf.font_descriptor(descriptor_ref)
            .name(name)
            .flags(FontFlags::NON_SYMBOLIC)
            .bbox(self.bbox)
            .italic_angle(0.0)
            .ascent(self.ascent)
            .descent(self.descent)
            .cap_height(self.cap_height)
            .stem_v(80.0)
            .font_file2(data_ref);

        pdf.stream(data_ref, &self.data)
            .pair(Name(b"Length1"), self.data.len() as i32);

        let cmap_name = format!("{}-UTF16", self.ps_name);
        let mut cmap = UnicodeCmap::new(Name(cmap_name.as_bytes()), identity());
        let by_cid: BTreeMap<u16, char> = self.metrics.glyphs.iter().map(|(&ch, g)| (g.cid, ch)).collect();
        for (cid, ch) in by_cid {
            cmap.pair(cid, ch);
        }
        pdf.stream(to_unicode_ref, cmap.finish().as_slice());
    }

    /// Glyph widths grouped into runs of consecutive CIDs for the `/W` array.
    fn width_runs(&self) -> Vec<(u16, Vec<f32>)> {
        let by_cid: BTreeMap<u16, f32> = self
            .metrics
            .glyphs
            .values()
            .map(|g| (g.cid, g.width))
            .collect();
        let mut runs: Vec<(u16, Vec<f32>)> = Vec::new();
        for (cid, width) in by_cid {
            if let Some((start, widths)) = runs.last_mut()
                && *start as usize + widths.len() == cid as usize
            {
                widths.push(width);
                continue;
            }
            runs.push((cid, vec![width]));
        }
        runs
    }
}

fn identity() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

/// WinAnsi (Windows-1252) byte for `ch`, if the code page has it.
fn winansi_byte(ch: char) -> Option<u8> {
    let byte = match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Helvetica / Helvetica-Bold advance of `ch` at 1000 units/em, `None` when
/// WinAnsi cannot show it. ASCII comes from the AFM files; the rest of the
/// code page is approximated.
fn helvetica_width(weight: FontWeight, ch: char) -> Option<f32> {
    const REGULAR_ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
    ];
    const BOLD_ASCII: [u16; 95] = [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
        975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
        333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
        611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
    ];
    let byte = winansi_byte(ch)?;
    let width = match byte {
        b' '..=b'~' => {
            let ascii = match weight {
                FontWeight::Regular => &REGULAR_ASCII,
                FontWeight::Bold => &BOLD_ASCII,
            };
            ascii[(byte - b' ') as usize]
        }
        0x85 | 0x89 | 0x97 | 0x99 => 1000,
        0x82 | 0x91 | 0x92 => 222,
        0x84 | 0x93 | 0x94 => 333,
        0x95 => 350,
        0xA0 => 278,
        _ => 556,
    };
    Some(width as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helvetica(weight: FontWeight) -> FontEntry {
        FontEntry {
            pdf_name: "F1".into(),
            font_ref: Ref::new(1),
            metrics: Metrics::Standard(weight),
        }
    }

    #[test]
    fn standard_font_encodes_winansi_and_drops_the_rest() {
        let font = helvetica(FontWeight::Regular);
        assert_eq!(font.encode("Café • “raga”"), b"Caf\xe9 \x95 \x93raga\x94".to_vec());
        assert_eq!(font.encode("வீணை"), Vec::<u8>::new());
        assert_eq!(font.text_width("வீணை", 12.0), 0.0);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let text = "Aishwarya Manikarnike";
        assert!(helvetica(FontWeight::Bold).text_width(text, 12.0) > helvetica(FontWeight::Regular).text_width(text, 12.0));
        assert_eq!(helvetica(FontWeight::Regular).space_width(10.0), 2.78);
    }

    #[test]
    fn embedded_font_encodes_cids_and_falls_back_to_notdef() {
        let font = FontEntry {
            pdf_name: "F1".into(),
            font_ref: Ref::new(1),
            metrics: Metrics::Embedded(EmbeddedMetrics {
                glyphs: HashMap::from([
                    ('a', Glyph { cid: 1, width: 500.0 }),
                    ('வ', Glyph { cid: 258, width: 700.0 }),
                ]),
                missing_width: 600.0,
                ascender: 0.9,
            }),
        };
        assert_eq!(font.encode("aவz"), vec![0, 1, 1, 2, 0, 0]);
        assert_eq!(font.text_width("aவz", 1000.0), 1800.0);
        assert_eq!(font.ascender_ratio(), 0.9);
    }

    #[test]
    fn unreadable_face_is_rejected() {
        let chars: HashSet<char> = ('a'..='z').collect();
        let err = FontSubset::build(b"definitely not a font", &chars).err().unwrap();
        assert!(err.starts_with("not a TrueType/OpenType font"), "{err}");
    }
}
