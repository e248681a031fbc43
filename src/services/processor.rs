use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads product images and re-encodes them as JPEG at a fixed quality.
pub struct ImageProcessor {
    client: reqwest::Client,
    quality: u8,
}

impl ImageProcessor {
    pub fn new(quality: u8) -> Result<Self, ProcessError> {
        if !(1..=100).contains(&quality) {
            return Err(ProcessError::InvalidQuality(quality));
        }

        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;

        Ok(Self { client, quality })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Fetch the source image bytes.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, ProcessError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Decode any supported format and write it back as a baseline JPEG.
    pub fn reencode(&self, source: &[u8]) -> Result<Vec<u8>, ProcessError> {
        let decoded = image::load_from_memory(source)?;
        let rgb = decoded.to_rgb8();

        let mut output = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);
            encoder.encode_image(&rgb)?;
        }
        Ok(output)
    }

    /// Download and re-encode in one step.
    pub async fn process(&self, url: &str) -> Result<Vec<u8>, ProcessError> {
        let source = self.download(url).await?;
        self.reencode(&source)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("JPEG quality must be within 1..=100, got {0}")]
    InvalidQuality(u8),

    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
