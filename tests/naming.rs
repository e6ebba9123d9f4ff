use chrono::NaiveDate;
use portfolio_pdf::{
    Progress, format_press_date, is_absolute, portfolio_filename, resolve_reference, watch_url,
};

#[test]
fn filename_uses_underscored_name_and_iso_date() {
    let _ = env_logger::try_init();
    let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    assert_eq!(
        portfolio_filename("Aishwarya Manikarnike", date),
        "Aishwarya_Manikarnike_Portfolio_2024-03-05.pdf"
    );
    assert_eq!(portfolio_filename("Solo", date), "Solo_Portfolio_2024-03-05.pdf");
}

#[test]
fn watch_link_takes_last_path_segment() {
    let _ = env_logger::try_init();
    let expected = "https://www.youtube.com/watch?v=abc123";
    assert_eq!(watch_url("https://www.youtube.com/embed/abc123"), expected);
    assert_eq!(watch_url("https://www.youtube.com/embed/abc123/"), expected);
    assert_eq!(watch_url("https://www.youtube.com/embed/abc123?si=xyz&rel=0"), expected);
    assert_eq!(watch_url("youtube.com/embed/abc123?rel=0"), expected);
}

#[test]
fn press_dates_are_spelled_out() {
    let _ = env_logger::try_init();
    assert_eq!(format_press_date("2024-01-15"), "January 15, 2024");
    assert_eq!(format_press_date("2023-11-02"), "November 2, 2023");
    assert_eq!(format_press_date("Spring 2022"), "Spring 2022");
}

#[test]
fn absolute_references_are_recognised() {
    let _ = env_logger::try_init();
    assert!(is_absolute("https://cdn.test/a.png"));
    assert!(is_absolute("//cdn.test/a.png"));
    assert!(is_absolute("data:image/png;base64,AAAA"));
    assert!(!is_absolute("/images/a.png"));
    assert!(!is_absolute("images/a.png"));
    assert!(!is_absolute("C:/site/images/a.png"));
}

#[test]
fn references_resolve_against_the_base_path() {
    let _ = env_logger::try_init();
    assert_eq!(resolve_reference("https://host/repo", "/images/a.png"), "https://host/repo/images/a.png");
    assert_eq!(resolve_reference("https://host/repo/", "/images/a.png"), "https://host/repo/images/a.png");
    assert_eq!(resolve_reference("https://host/repo/", "images/a.png"), "https://host/repo/images/a.png");
    assert_eq!(resolve_reference("", "/images/a.png"), "/images/a.png");
    assert_eq!(resolve_reference("/srv/site", "config/site-config.json"), "/srv/site/config/site-config.json");
    assert_eq!(resolve_reference("https://host/repo", "https://cdn.test/a.png"), "https://cdn.test/a.png");
    assert_eq!(resolve_reference("https://host/repo", "//cdn.test/a.png"), "//cdn.test/a.png");
}

#[test]
fn progress_never_goes_backwards() {
    let _ = env_logger::try_init();
    let mut seen = Vec::new();
    {
        let mut record = |p: u8| seen.push(p);
        let mut progress = Progress::new(Some(&mut record));
        for p in [5, 10, 7, 50, 250, 90] {
            progress.report(p);
        }
        assert_eq!(progress.last(), 100);
    }
    assert_eq!(seen, vec![5, 10, 10, 50, 100, 100]);

    let mut silent = Progress::silent();
    silent.report(40);
    assert_eq!(silent.last(), 40);
}
