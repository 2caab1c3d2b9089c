use super::page::parse_score_page;
use super::ScoreAssetPair;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::utils::files::{count_entries, sanitize_name, write_asset_pair};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

/// Byte transport used by the fetcher
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// How a fetch run ended when nothing went wrong past the page request
#[derive(Debug)]
pub enum FetchOutcome {
    /// The output root already holds the target number of entries
    AlreadyPopulated { count: usize },
    /// The page request itself failed; reported, not raised
    PageUnavailable { reason: String },
    /// The page did not advertise a PNG thumbnail together with an SVG link
    NoPair,
    Stored(ScoreAssetPair),
}

/// Scrape the score page and store its PNG/SVG pair under the output root
pub async fn fetch_and_store<F: Fetch>(
    config: &FetchConfig,
    transport: &F,
) -> Result<FetchOutcome, FetchError> {
    let existing = count_entries(&config.output_root)?;
    info!("{} entries in {}", existing, config.output_root.display());
    if existing == config.target_count {
        info!("{} files already downloaded.", existing);
        return Ok(FetchOutcome::AlreadyPopulated { count: existing });
    }

    info!("Fetching score page {}", config.source_url);
    let body = match transport.get_bytes(&config.source_url).await {
        Ok(body) => body,
        Err(e) => {
            error!("Error downloading page: {}", e);
            return Ok(FetchOutcome::PageUnavailable {
                reason: e.to_string(),
            });
        }
    };

    let page = parse_score_page(&String::from_utf8_lossy(&body))?;
    let thumbnail_url = page.payload.thumbnail_url;
    let svg_url = page.first_link.unwrap_or_default();
    info!("Thumbnail: {}", thumbnail_url);
    info!("First link: {}", svg_url);

    if !(thumbnail_url.contains("png") && svg_url.contains("svg")) {
        info!("No PNG, SVG pair found...");
        return Ok(FetchOutcome::NoPair);
    }

    let name = sanitize_name(&page.payload.name);
    if name.is_empty() {
        return Err(FetchError::EmptyName);
    }

    let pair = ScoreAssetPair {
        name,
        png_url: thumbnail_url,
        svg_url,
    };

    let pb = ProgressBar::new(2);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );

    pb.set_message(format!("{}.svg", pair.name));
    let svg = transport.get_bytes(&pair.svg_url).await?;
    pb.inc(1);

    pb.set_message(format!("{}.png", pair.name));
    let png = transport.get_bytes(&pair.png_url).await?;
    pb.inc(1);
    pb.finish_with_message("Download complete!");

    write_asset_pair(&config.output_root, &pair, &png, &svg).await?;
    info!("Downloaded {0}.png and {0}.svg", pair.name);

    Ok(FetchOutcome::Stored(pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::page::tests::fixture;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;

    const PAGE_URL: &str = "http://x/score";

    /// In-memory transport that records every URL it is asked for
    #[derive(Default)]
    struct MockFetch {
        bodies: HashMap<String, Vec<u8>>,
        requested: Mutex<Vec<String>>,
    }

    impl MockFetch {
        fn with(mut self, url: &str, body: &[u8]) -> Self {
            self.bodies.insert(url.to_string(), body.to_vec());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl Fetch for MockFetch {
        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.bodies.get(url).cloned().ok_or_else(|| {
                FetchError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no mock body for {}", url),
                ))
            })
        }
    }

    fn config(root: &std::path::Path) -> FetchConfig {
        FetchConfig {
            source_url: PAGE_URL.to_string(),
            output_root: root.to_path_buf(),
            ..FetchConfig::default()
        }
    }

    fn score_page() -> String {
        fixture(
            r#"{"name":"Test/Piece","thumbnailUrl":"http://x/a.png"}"#,
            "http://x/a.svg",
        )
    }

    #[tokio::test]
    async fn stores_png_and_svg_under_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data").join("test");
        let transport = MockFetch::default()
            .with(PAGE_URL, score_page().as_bytes())
            .with("http://x/a.png", b"\x89PNG mock")
            .with("http://x/a.svg", b"<svg>mock</svg>");

        let outcome = fetch_and_store(&config(&root), &transport).await.unwrap();

        let pair = match outcome {
            FetchOutcome::Stored(pair) => pair,
            other => panic!("expected a stored pair, got {:?}", other),
        };
        assert_eq!(pair.name, "TestPiece");
        assert_eq!(
            fs::read(root.join("TestPiece").join("TestPiece.png")).unwrap(),
            b"\x89PNG mock"
        );
        assert_eq!(
            fs::read(root.join("TestPiece").join("TestPiece.svg")).unwrap(),
            b"<svg>mock</svg>"
        );
    }

    #[tokio::test]
    async fn populated_directory_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..50 {
            fs::create_dir(dir.path().join(format!("score{i}"))).unwrap();
        }
        let transport = MockFetch::default().with(PAGE_URL, score_page().as_bytes());

        let outcome = fetch_and_store(&config(dir.path()), &transport)
            .await
            .unwrap();

        assert!(matches!(outcome, FetchOutcome::AlreadyPopulated { count: 50 }));
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn guard_only_matches_the_exact_count() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            fs::create_dir(dir.path().join(format!("score{i}"))).unwrap();
        }
        let transport = MockFetch::default();
        let config = FetchConfig {
            target_count: 2,
            ..config(dir.path())
        };

        let outcome = fetch_and_store(&config, &transport).await.unwrap();

        assert!(matches!(outcome, FetchOutcome::PageUnavailable { .. }));
        assert_eq!(transport.requested(), vec![PAGE_URL.to_string()]);
    }

    #[tokio::test]
    async fn page_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockFetch::default();

        let outcome = fetch_and_store(&config(dir.path()), &transport)
            .await
            .unwrap();

        assert!(matches!(outcome, FetchOutcome::PageUnavailable { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn jpeg_thumbnail_is_not_a_pair() {
        let dir = tempfile::tempdir().unwrap();
        let page = fixture(
            r#"{"name":"Piece","thumbnailUrl":"http://x/a.jpg"}"#,
            "http://x/a.svg",
        );
        let transport = MockFetch::default().with(PAGE_URL, page.as_bytes());

        let outcome = fetch_and_store(&config(dir.path()), &transport)
            .await
            .unwrap();

        assert!(matches!(outcome, FetchOutcome::NoPair));
        assert_eq!(transport.requested(), vec![PAGE_URL.to_string()]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn page_without_payload_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let transport =
            MockFetch::default().with(PAGE_URL, b"<html><script>1</script></html>");

        let result = fetch_and_store(&config(dir.path()), &transport).await;

        assert!(matches!(result, Err(FetchError::PayloadNotFound)));
    }

    #[tokio::test]
    async fn asset_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockFetch::default()
            .with(PAGE_URL, score_page().as_bytes())
            .with("http://x/a.svg", b"<svg/>");

        let result = fetch_and_store(&config(dir.path()), &transport).await;

        assert!(result.is_err());
        assert!(!dir.path().join("TestPiece").exists());
    }

    #[tokio::test]
    async fn fully_illegal_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let page = fixture(
            r#"{"name":"???","thumbnailUrl":"http://x/a.png"}"#,
            "http://x/a.svg",
        );
        let transport = MockFetch::default().with(PAGE_URL, page.as_bytes());

        let result = fetch_and_store(&config(dir.path()), &transport).await;

        assert!(matches!(result, Err(FetchError::EmptyName)));
    }
}
