use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://musescore.com/classicman/scores/105780";
pub const DEFAULT_OUTPUT_ROOT: &str = "data/test";
pub const DEFAULT_TARGET_COUNT: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_SCALE_FACTOR: f64 = 2.0;
pub const DEFAULT_SHARPEN_AMOUNT: f32 = 0.5;
pub const DEFAULT_SHARPEN_RADIUS: f32 = 3.0;
pub const DEFAULT_NOISE_STD_DEV: f32 = 10.0;

/// Settings for a single scrape of the score page
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub source_url: String,
    /// Directory that receives one `<name>/` folder per score
    pub output_root: PathBuf,
    /// Entry count at which the output root counts as already populated
    pub target_count: usize,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            target_count: DEFAULT_TARGET_COUNT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
