#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use portfolio_pdf::{Fetch, FetchError, GenerateOptions};
use serde_json::{Value, json};

pub const BASE: &str = "https://site.test/portfolio";
pub const CONFIG_URL: &str = "https://site.test/portfolio/config/site-config.json";

/// In-memory site: resolved location -> bytes. Anything not registered is a 404.
/// Every request is recorded in order.
#[derive(Default)]
pub struct MemorySite {
    files: HashMap<String, Vec<u8>>,
    failing: HashMap<String, FetchError>,
    pub requests: RefCell<Vec<String>>,
}

impl MemorySite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &Value) -> Self {
        let mut site = Self::new();
        site.insert(CONFIG_URL, serde_json::to_vec(config).unwrap());
        site
    }

    pub fn insert(&mut self, location: &str, bytes: Vec<u8>) {
        self.files.insert(location.to_string(), bytes);
    }

    pub fn insert_image(&mut self, reference: &str, bytes: Vec<u8>) {
        self.insert(&format!("{BASE}{reference}"), bytes);
    }

    pub fn fail_with(&mut self, location: &str, err: FetchError) {
        self.failing.insert(location.to_string(), err);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetch for MemorySite {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.borrow_mut().push(location.to_string());
        if let Some(err) = self.failing.get(location) {
            return Err(match err {
                FetchError::Status(code) => FetchError::Status(*code),
                other => FetchError::Transport(other.to_string()),
            });
        }
        self.files
            .get(location)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 120, if x % 2 == 0 { 255 } else { 180 }])
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 64]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn options() -> GenerateOptions {
    GenerateOptions {
        base_path: BASE.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        ..GenerateOptions::default()
    }
}

pub fn gallery_images(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("g{i}"),
                "src": format!("/images/gallery/{i}.png"),
                "alt": format!("Gallery photo {i}"),
                "width": 800,
                "height": 600,
                "caption": format!("Performance {i}")
            })
        })
        .collect()
}

pub fn faq_items(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({ "question": format!("Question number {}?", i + 1), "answer": "Yes." }))
        .collect()
}

/// A small but complete content model. Sections are short enough that each one
/// fits on the page it starts on.
pub fn sample_config() -> Value {
    json!({
        "artist": {
            "name": "Aishwarya Manikarnike",
            "tagline": "Veena artist and Carnatic vocalist",
            "briefBio": "A performer rooted in the Carnatic tradition.",
            "fullBio": [
                "Trained from the age of five in veena and vocal music."
            ]
        },
        "home": {
            "images": {
                "veena": "/images/home/veena.jpg",
                "vocal": "/images/home/vocal.png"
            },
            "featuredVideos": ["https://www.youtube.com/embed/feat01"]
        },
        "spotlights": [],
        "gallery": { "images": gallery_images(4) },
        "music": {
            "categories": [{
                "id": "veena",
                "name": "Veena",
                "description": "Instrumental recordings.",
                "videos": [
                    { "title": "Raga Kalyani", "url": "https://www.youtube.com/embed/abc123" },
                    { "title": "Raga Mohanam", "url": "https://www.youtube.com/embed/xyz789?rel=0" }
                ]
            }]
        },
        "press": {
            "articles": [{
                "title": "A rising voice",
                "publication": "The Hindu",
                "date": "2024-01-15",
                "url": "https://news.test/rising-voice",
                "excerpt": "An evening of rare ragas."
            }]
        },
        "faq": { "items": faq_items(2) },
        "socialMedia": { "youtube": "https://www.youtube.com/@artist" }
    })
}

/// Serve every image the sample config references.
pub fn serve_sample_images(site: &mut MemorySite, gallery_count: usize) {
    site.insert_image("/images/home/veena.jpg", jpeg(60, 60));
    site.insert_image("/images/home/vocal.png", png(60, 60));
    for i in 0..gallery_count {
        site.insert_image(&format!("/images/gallery/{i}.png"), png(40, 30));
    }
}

pub fn lopdf_page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
}
