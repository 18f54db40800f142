use crate::clients::MediaLocator;
use crate::config::FeedConfig;

/// Public object URLs for a storage bucket
#[derive(Debug, Clone)]
pub struct PublicStorageLocator {
    base_url: String,
    bucket: String,
}

impl PublicStorageLocator {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            bucket: bucket.into(),
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.backend.url.clone(), config.media.bucket.clone())
    }
}

impl MediaLocator for PublicStorageLocator {
    fn public_url(&self, media_path: &str) -> Option<String> {
        let segments: Vec<String> = media_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        if segments.is_empty() {
            return None;
        }

        Some(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            urlencoding::encode(&self.bucket),
            segments.join("/")
        ))
    }
}
