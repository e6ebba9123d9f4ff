//! Print-ready PDF portfolios generated from a static artist site's content
//! model.
//!
//! [`generate`] loads `site-config.json` through a [`Fetch`] backend, lays the
//! content out on fixed A4 pages and returns the finished [`Portfolio`]. The
//! [`contact`] module carries the site's other outbound integration, the
//! contact-form e-mail dispatch.

mod assemble;
mod config;
pub mod contact;
mod error;
mod fetch;
mod fonts;
mod model;
mod pdf;
mod progress;

pub use assemble::{
    GALLERY_COLUMNS, GALLERY_MAX_IMAGES, GenerateOptions, LayoutStats, Portfolio, format_press_date,
    generate, portfolio_filename, render_portfolio, watch_url,
};
pub use config::{BASE_PATH_ENV, DEFAULT_BASE_PATH, DEFAULT_CONFIG_PATH, load_config, parse_config, validate_config};
pub use error::Error;
pub use fetch::{
    DEFAULT_FETCH_TIMEOUT, Fetch, FetchError, Resources, SiteFetcher, is_absolute, resolve_reference,
};
pub use fonts::FontSources;
pub use model::*;
pub use pdf::layout::PageGeometry;
pub use pdf::{Footer, PageSummary};
pub use progress::Progress;

use std::path::{Path, PathBuf};

/// Generate a portfolio and write it into `output_dir`. Returns the written
/// path alongside the portfolio.
pub fn generate_to_dir(
    fetcher: &dyn Fetch,
    options: &GenerateOptions,
    output_dir: &Path,
    progress: Option<&mut dyn FnMut(u8)>,
) -> Result<(PathBuf, Portfolio), Error> {
    let portfolio = generate(fetcher, options, progress)?;
    let path = portfolio.write_to(output_dir)?;
    log::info!("Wrote {} ({} bytes)", path.display(), portfolio.bytes.len());
    Ok((path, portfolio))
}
