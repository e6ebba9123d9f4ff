//! Loading and validating the site content model.

use crate::error::Error;
use crate::fetch::Resources;
use crate::model::SiteConfig;

/// Where the static site keeps its content model, relative to the base path.
pub const DEFAULT_CONFIG_PATH: &str = "config/site-config.json";

/// Base path used when none is given: a static export in the working
/// directory. An empty base path instead keeps references root-relative.
pub const DEFAULT_BASE_PATH: &str = ".";

/// Environment variable consulted for the deployment base path.
pub const BASE_PATH_ENV: &str = "PORTFOLIO_BASE_PATH";

/// Fetch the configuration document through the same base-path rules as every
/// other resource, then parse and validate it.
pub fn load_config(resources: &Resources, config_path: &str) -> Result<SiteConfig, Error> {
    let bytes = resources
        .fetch_required(config_path)
        .map_err(|(location, source)| Error::ConfigFetch { location, source })?;
    parse_config(&bytes)
}

/// Parse and validate an already loaded configuration document.
pub fn parse_config(bytes: &[u8]) -> Result<SiteConfig, Error> {
    let config: SiteConfig = serde_json::from_slice(bytes)?;
    validate_config(&config).map_err(Error::ConfigInvalid)?;
    Ok(config)
}

struct Issues(Vec<String>);

impl Issues {
    fn non_empty(&mut self, path: &str, value: &str) {
        if value.is_empty() {
            self.0.push(format!("{path}: must not be empty"));
        }
    }

    fn url(&mut self, path: &str, value: &str) {
        if url::Url::parse(value).is_err() {
            self.0.push(format!("{path}: invalid url {value:?}"));
        }
    }

    fn positive(&mut self, path: &str, value: f64) {
        if !(value > 0.0) {
            self.0.push(format!("{path}: must be positive, got {value}"));
        }
    }
}

/// Check everything serde cannot express: non-empty strings, URL fields and
/// image dimensions. All problems are collected, one `path: message` per entry.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<String>> {
    let mut v = Issues(Vec::new());

    let artist = &config.artist;
    v.non_empty("artist.name", &artist.name);
    v.non_empty("artist.tagline", &artist.tagline);
    v.non_empty("artist.briefBio", &artist.brief_bio);
    for (i, p) in artist.full_bio.iter().enumerate() {
        v.non_empty(&format!("artist.fullBio[{i}]"), p);
    }

    v.non_empty("home.images.veena", &config.home.images.veena);
    v.non_empty("home.images.vocal", &config.home.images.vocal);
    for (i, url) in config.home.featured_videos.iter().enumerate() {
        v.url(&format!("home.featuredVideos[{i}]"), url);
    }

    for (i, s) in config.spotlights.iter().enumerate() {
        let at = format!("spotlights[{i}]");
        v.non_empty(&format!("{at}.id"), &s.id);
        v.non_empty(&format!("{at}.title"), &s.title);
        v.non_empty(&format!("{at}.subtitle"), &s.subtitle);
        v.non_empty(&format!("{at}.description"), &s.description);
        v.non_empty(&format!("{at}.imageUrl"), &s.image_url);
        for (j, f) in s.features.iter().enumerate() {
            v.non_empty(&format!("{at}.features[{j}].title"), &f.title);
            v.non_empty(&format!("{at}.features[{j}].description"), &f.description);
        }
    }

    for (i, img) in config.gallery.images.iter().enumerate() {
        let at = format!("gallery.images[{i}]");
        v.non_empty(&format!("{at}.id"), &img.id);
        v.non_empty(&format!("{at}.src"), &img.src);
        v.non_empty(&format!("{at}.alt"), &img.alt);
        v.positive(&format!("{at}.width"), img.width);
        v.positive(&format!("{at}.height"), img.height);
    }

    for (i, c) in config.music.categories.iter().enumerate() {
        let at = format!("music.categories[{i}]");
        v.non_empty(&format!("{at}.id"), &c.id);
        v.non_empty(&format!("{at}.name"), &c.name);
        for (j, video) in c.videos.iter().enumerate() {
            v.non_empty(&format!("{at}.videos[{j}].title"), &video.title);
            v.url(&format!("{at}.videos[{j}].url"), &video.url);
        }
    }

    for (i, a) in config.press.articles.iter().enumerate() {
        let at = format!("press.articles[{i}]");
        v.non_empty(&format!("{at}.title"), &a.title);
        v.non_empty(&format!("{at}.publication"), &a.publication);
        v.non_empty(&format!("{at}.date"), &a.date);
        v.url(&format!("{at}.url"), &a.url);
    }

    for (i, item) in config.faq.items.iter().enumerate() {
        v.non_empty(&format!("faq.items[{i}].question"), &item.question);
        v.non_empty(&format!("faq.items[{i}].answer"), &item.answer);
    }

    for (name, url) in config.social_media.links() {
        v.url(&format!("socialMedia.{name}"), url);
    }

    if v.0.is_empty() { Ok(()) } else { Err(v.0) }
}
