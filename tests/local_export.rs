mod common;

use std::fs;
use std::path::Path;

use common::{jpeg, png, sample_config};
use portfolio_pdf::{
    DEFAULT_BASE_PATH, DEFAULT_CONFIG_PATH, GenerateOptions, Resources, SiteFetcher, generate,
};

/// Lay the sample site out on disk the way a static export would.
fn write_export(root: &Path) {
    let write = |rel: &str, bytes: &[u8]| {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    };
    write(DEFAULT_CONFIG_PATH, &serde_json::to_vec(&sample_config()).unwrap());
    write("images/home/veena.jpg", &jpeg(60, 60));
    write("images/home/vocal.png", &png(60, 60));
    for i in 0..4 {
        write(&format!("images/gallery/{i}.png"), &png(40, 30));
    }
}

#[test]
fn default_base_path_reads_relative_to_working_directory() {
    let _ = env_logger::try_init();
    let options = GenerateOptions::default();
    assert_eq!(options.base_path, DEFAULT_BASE_PATH);

    let fetcher = SiteFetcher::new();
    let resources = Resources::new(&fetcher, &options.base_path);
    let location = resources.resolve(&options.config_path);
    assert_eq!(location, "./config/site-config.json");
    assert!(Path::new(&location).is_relative());
}

#[test]
fn directory_export_is_read_from_disk() {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path());

    let options = GenerateOptions {
        base_path: dir.path().to_string_lossy().into_owned(),
        ..common::options()
    };
    let portfolio = generate(&SiteFetcher::new(), &options, None).unwrap();
    assert_eq!(portfolio.page_count(), 4);
    assert_eq!(portfolio.image_count(), 6);
}

#[test]
fn file_url_base_is_read_from_disk() {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path());

    let base = url::Url::from_directory_path(dir.path()).unwrap();
    let options = GenerateOptions {
        base_path: base.to_string(),
        ..common::options()
    };
    let portfolio = generate(&SiteFetcher::new(), &options, None).unwrap();
    assert_eq!(portfolio.stats.images_omitted, 0);
}

#[test]
fn missing_export_directory_is_a_config_error() {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().unwrap();
    let options = GenerateOptions {
        base_path: dir.path().join("missing").to_string_lossy().into_owned(),
        ..common::options()
    };
    let err = generate(&SiteFetcher::new(), &options, None).unwrap_err();
    assert!(err.to_string().starts_with("Failed to load configuration"), "{err}");
}
