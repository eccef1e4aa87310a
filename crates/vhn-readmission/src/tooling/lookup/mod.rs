//! Rate-limited code-description lookup that never fails its caller.

mod http;
mod page;

pub use http::HttpDescriptionSource;

use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Returned whenever a description cannot be obtained.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid lookup url {0}")]
    InvalidUrl(String),
    #[error("no description found for code {0}")]
    NotFound(String),
}

/// Backend answering a single code. Implementations may fail; the
/// [`DescriptionLookup`] wrapper absorbs the failure.
pub trait DescriptionSource: Send + Sync {
    fn describe(&self, code: &str) -> impl Future<Output = Result<String, LookupError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeDescription {
    pub code: String,
    pub description: String,
}

/// Waits `delay` before every request and substitutes [`UNKNOWN_DESCRIPTION`]
/// for any error, logging the reason.
pub struct DescriptionLookup<S> {
    source: S,
    delay: Duration,
}

impl<S: DescriptionSource> DescriptionLookup<S> {
    pub fn new(source: S, delay: Duration) -> Self {
        Self { source, delay }
    }

    pub async fn describe(&self, code: &str) -> String {
        tokio::time::sleep(self.delay).await;
        let code = code.trim();

        match self.source.describe(code).await {
            Ok(description) if !description.trim().is_empty() => description,
            Ok(_) => UNKNOWN_DESCRIPTION.to_string(),
            Err(error) => {
                tracing::warn!(code, %error, "code description lookup failed");
                UNKNOWN_DESCRIPTION.to_string()
            }
        }
    }

    /// Looks up each distinct code once, preserving first-seen order.
    pub async fn describe_many<I, T>(&self, codes: I) -> Vec<CodeDescription>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut distinct: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim();
            if !code.is_empty() && !distinct.iter().any(|known| known == code) {
                distinct.push(code.to_string());
            }
        }

        let mut described = Vec::with_capacity(distinct.len());
        for code in distinct {
            let description = self.describe(&code).await;
            described.push(CodeDescription { code, description });
        }
        described
    }
}
