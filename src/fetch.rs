//! Resolving and retrieving site resources.
//!
//! Everything the assembler reads (the configuration document and every image)
//! goes through the [`Fetch`] trait. [`SiteFetcher`] is the built-in backend: it
//! speaks HTTP(S) through a `ureq` agent and reads plain paths from disk, so a
//! deployed site and a local static export directory are handled alike.

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default upper bound for a single request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Retrieves the bytes behind a fully resolved location.
pub trait Fetch {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(location)
    }
}

impl<T: Fetch + ?Sized> Fetch for Box<T> {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(location)
    }
}

/// True for `scheme:...` URLs and protocol-relative `//host/...` references.
pub fn is_absolute(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }
    match reference.find(':') {
        Some(colon) => {
            let scheme = &reference[..colon];
            // A single letter before the colon is a Windows drive, not a scheme.
            scheme.len() > 1
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Rewrite a site reference against the deployment base path.
///
/// Absolute URLs are returned unchanged. Anything else has one trailing slash
/// stripped from `base` and one leading slash stripped from `reference` before
/// the two are joined with `/`.
pub fn resolve_reference(base: &str, reference: &str) -> String {
    if is_absolute(reference) {
        return reference.to_string();
    }
    let base = base.strip_suffix('/').unwrap_or(base);
    let reference = reference.strip_prefix('/').unwrap_or(reference);
    format!("{base}/{reference}")
}

/// HTTP(S) through `ureq`, `file://` URLs and plain paths through the
/// filesystem.
pub struct SiteFetcher {
    agent: ureq::Agent,
}

impl SiteFetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("portfolio-pdf/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
        })?;

        let mut buf = match response
            .header("Content-Length")
            .and_then(|header| header.parse::<usize>().ok())
        {
            Some(size) => Vec::with_capacity(size),
            None => Vec::new(),
        };
        response.into_reader().read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Default for SiteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for SiteFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let t0 = std::time::Instant::now();
        let result = if location.starts_with("http://") || location.starts_with("https://") {
            self.fetch_http(location)
        } else if let Some(rest) = location.strip_prefix("//") {
            self.fetch_http(&format!("https://{rest}"))
        } else if location.starts_with("file://") {
            let path = url::Url::parse(location)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| FetchError::Transport(format!("bad file URL {location}")))?;
            std::fs::read(path).map_err(FetchError::from)
        } else if is_absolute(location) {
            Err(FetchError::Transport(format!(
                "unsupported scheme in {location}"
            )))
        } else {
            std::fs::read(PathBuf::from(location)).map_err(FetchError::from)
        };
        log::debug!(
            "fetch {location}: {} in {:.1}ms",
            match &result {
                Ok(bytes) => format!("{} bytes", bytes.len()),
                Err(e) => e.to_string(),
            },
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        result
    }
}

/// A fetcher bound to a deployment base path. Every lookup resolves the
/// reference first.
pub struct Resources<'a> {
    fetcher: &'a dyn Fetch,
    base_path: &'a str,
}

impl<'a> Resources<'a> {
    pub fn new(fetcher: &'a dyn Fetch, base_path: &'a str) -> Self {
        Self { fetcher, base_path }
    }

    pub fn resolve(&self, reference: &str) -> String {
        resolve_reference(self.base_path, reference)
    }

    /// Fetch a resource that the caller needs; errors propagate.
    pub fn fetch_required(&self, reference: &str) -> Result<Vec<u8>, (String, FetchError)> {
        let location = self.resolve(reference);
        self.fetcher
            .fetch(&location)
            .map_err(|err| (location, err))
    }

    /// Fetch a resource the document can live without. Failures are logged and
    /// mapped to `None`.
    pub fn fetch_optional(&self, reference: &str) -> Option<Vec<u8>> {
        let location = self.resolve(reference);
        match self.fetcher.fetch(&location) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("Could not fetch {location}: {err}, omitting");
                None
            }
        }
    }
}
