use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid element selector `{css}`: {reason}")]
    Selector { css: &'static str, reason: String },

    #[error("No script on the page carries a score payload with `name` and `thumbnailUrl`")]
    PayloadNotFound,

    #[error("Score name is empty after removing illegal path characters")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum DegradeError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Scale factor must be finite and positive, got {0}")]
    InvalidScale(f64),

    #[error("Downscale ratio must be in (0, 1], got {0}")]
    InvalidRatio(f64),

    #[error("Blur sigma must be finite and positive, got {0}")]
    InvalidSigma(f32),

    #[error("Noise standard deviation must be finite and non-negative, got {0}")]
    InvalidNoise(f32),

    #[error("Target size {width}x{height} has no pixels")]
    EmptyTarget { width: u32, height: u32 },

    #[error("Target size {width}x{height} exceeds the largest supported dimension")]
    TargetTooLarge { width: f64, height: f64 },

    #[error("Noise distribution error: {0}")]
    Noise(#[from] rand_distr::NormalError),
}
