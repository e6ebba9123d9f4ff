use serde::{Deserialize, Serialize};

/// The whole site content model, as stored in `config/site-config.json`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub artist: ArtistProfile,
    pub home: HomeSection,
    #[serde(default)]
    pub spotlights: Vec<Spotlight>,
    pub gallery: Gallery,
    pub music: Music,
    pub press: Press,
    pub faq: Faq,
    #[serde(default)]
    pub social_media: SocialMedia,
    #[serde(default)]
    pub features: Option<Features>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfile {
    pub name: String,
    pub tagline: String,
    pub brief_bio: String,
    pub full_bio: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSection {
    pub images: HomeImages,
    #[serde(default)]
    pub featured_videos: Vec<String>,
}

/// The two photos shown side by side on the landing page.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HomeImages {
    /// Primary instrument photo.
    pub veena: String,
    pub vocal: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spotlight {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<SpotlightFeature>,
    pub image_url: String,
    #[serde(default)]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub cta_link: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpotlightFeature {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Gallery {
    pub images: Vec<GalleryImage>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GalleryImage {
    pub id: String,
    pub src: String,
    pub alt: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Music {
    pub categories: Vec<MusicCategory>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MusicCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub videos: Vec<MusicVideo>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MusicVideo {
    pub title: String,
    /// Embeddable player URL, e.g. `https://www.youtube.com/embed/<id>`.
    pub url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Press {
    pub articles: Vec<PressArticle>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PressArticle {
    pub title: String,
    pub publication: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub url: String,
    pub excerpt: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Faq {
    pub items: Vec<FaqItem>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SocialMedia {
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

impl SocialMedia {
    pub fn links(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("youtube", &self.youtube),
            ("facebook", &self.facebook),
            ("instagram", &self.instagram),
            ("twitter", &self.twitter),
            ("linkedin", &self.linkedin),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.as_deref().map(|u| (name, u)))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub swara_animation: SwaraAnimation,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SwaraAnimation {
    pub desktop: bool,
    pub mobile: bool,
}

impl SiteConfig {
    /// Every string that may end up on a page, used to pick glyphs when a
    /// TrueType font is subset.
    pub(crate) fn visible_text(&self) -> Vec<&str> {
        let mut out: Vec<&str> = vec![
            self.artist.name.as_str(),
            self.artist.tagline.as_str(),
            self.artist.brief_bio.as_str(),
        ];
        out.extend(self.artist.full_bio.iter().map(String::as_str));
        for s in &self.spotlights {
            out.extend([s.title.as_str(), s.subtitle.as_str(), s.description.as_str()]);
            for f in &s.features {
                out.extend([f.title.as_str(), f.description.as_str()]);
            }
            out.extend(s.cta_text.as_deref());
        }
        out.extend(
            self.gallery
                .images
                .iter()
                .filter_map(|img| img.caption.as_deref()),
        );
        for c in &self.music.categories {
            out.extend([c.name.as_str(), c.description.as_str()]);
            out.extend(c.videos.iter().map(|v| v.title.as_str()));
        }
        for a in &self.press.articles {
            out.extend([
                a.title.as_str(),
                a.publication.as_str(),
                a.date.as_str(),
                a.excerpt.as_str(),
            ]);
        }
        for item in &self.faq.items {
            out.extend([item.question.as_str(), item.answer.as_str()]);
        }
        out
    }
}
