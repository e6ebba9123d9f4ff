mod common;

use std::path::{Path, PathBuf};

use common::{MemorySite, options, sample_config, serve_sample_images};
use lopdf::{Dictionary, Document, Object};
use portfolio_pdf::{FontSources, GenerateOptions, generate};

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

fn find_font(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(Path::new).find(|p| p.is_file()).map(Path::to_path_buf)
}

fn dicts_of_type<'a>(doc: &'a Document, key: &[u8], value: &[u8]) -> Vec<&'a Dictionary> {
    doc.objects
        .values()
        .filter_map(|obj| match obj {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        })
        .filter(|dict| {
            dict.get(key)
                .and_then(|v| v.as_name())
                .is_ok_and(|name| name == value)
        })
        .collect()
}

fn embedded_options(regular: PathBuf, bold: Option<PathBuf>) -> GenerateOptions {
    GenerateOptions {
        fonts: FontSources {
            regular: Some(regular),
            bold,
        },
        ..options()
    }
}

#[test]
fn truetype_font_is_embedded_as_searchable_subset() {
    let _ = env_logger::try_init();
    let Some(regular) = find_font(REGULAR_CANDIDATES) else {
        eprintln!("no TrueType font installed, skipping");
        return;
    };
    let mut config = sample_config();
    // outside WinAnsi, so only an embedded font can show it
    config["artist"]["tagline"] = "Вина и вокал".into();
    let mut site = MemorySite::with_config(&config);
    serve_sample_images(&mut site, 4);

    let portfolio = generate(&site, &embedded_options(regular.clone(), None), None).unwrap();
    assert_eq!(portfolio.page_count(), 4);

    let doc = Document::load_mem(&portfolio.bytes).unwrap();
    let type0 = dicts_of_type(&doc, b"Subtype", b"Type0");
    assert_eq!(type0.len(), 1, "regular face embedded, bold stays standard");
    assert!(type0[0].get(b"ToUnicode").is_ok());
    assert_eq!(
        type0[0].get(b"Encoding").and_then(|e| e.as_name()).unwrap(),
        b"Identity-H"
    );
    assert_eq!(dicts_of_type(&doc, b"Subtype", b"CIDFontType2").len(), 1);
    assert_eq!(dicts_of_type(&doc, b"BaseFont", b"Helvetica-Bold").len(), 1);

    let descriptors = dicts_of_type(&doc, b"Type", b"FontDescriptor");
    assert_eq!(descriptors.len(), 1);
    let font_file = descriptors[0].get(b"FontFile2").and_then(|f| f.as_reference()).unwrap();
    let program = doc.get_object(font_file).and_then(|o| o.as_stream()).unwrap();
    let original = std::fs::metadata(&regular).unwrap().len() as usize;
    assert!(!program.content.is_empty());
    assert!(program.content.len() < original, "font was not subsetted");

    let cmap = doc
        .get_object(type0[0].get(b"ToUnicode").and_then(|r| r.as_reference()).unwrap())
        .and_then(|o| o.as_stream())
        .unwrap();
    let cmap = String::from_utf8_lossy(&cmap.content);
    assert!(cmap.contains("beginbfchar"), "{cmap}");
    // 'В' (U+0412) from the tagline is mapped back to Unicode
    assert!(cmap.contains("<0412>"), "{cmap}");
}

#[test]
fn embedded_fonts_keep_output_stable() {
    let _ = env_logger::try_init();
    let (Some(regular), Some(bold)) = (find_font(REGULAR_CANDIDATES), find_font(BOLD_CANDIDATES)) else {
        eprintln!("no TrueType font pair installed, skipping");
        return;
    };
    let mut site = MemorySite::with_config(&sample_config());
    serve_sample_images(&mut site, 4);
    let opts = embedded_options(regular, Some(bold));

    let first = generate(&site, &opts, None).unwrap();
    let second = generate(&site, &opts, None).unwrap();
    assert_eq!(first.bytes, second.bytes);

    let doc = Document::load_mem(&first.bytes).unwrap();
    assert_eq!(dicts_of_type(&doc, b"Subtype", b"Type0").len(), 2);
    assert!(dicts_of_type(&doc, b"Subtype", b"Type1").is_empty());
}

#[test]
fn file_that_is_not_a_font_is_rejected() {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.ttf");
    std::fs::write(&path, b"these are not glyphs").unwrap();
    let mut site = MemorySite::with_config(&sample_config());
    serve_sample_images(&mut site, 4);

    let err = generate(&site, &embedded_options(path, None), None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("notes.ttf"), "{message}");
    assert!(message.contains("not a TrueType/OpenType font"), "{message}");
}
