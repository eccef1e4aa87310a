use super::{DescriptionSource, LookupError};
use crate::config::LookupConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};

const USER_AGENT: &str = "Mozilla/5.0 (Educational Research Project)";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Fetches code pages over HTTP and parses the description out of the markup.
#[derive(Debug, Clone)]
pub struct HttpDescriptionSource {
    client: Client,
    base_url: String,
}

impl HttpDescriptionSource {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url_for(&self, code: &str) -> Result<Url, LookupError> {
        Url::parse_with_params(&self.base_url, &[("icd9", code)])
            .map_err(|err| LookupError::InvalidUrl(format!("{}: {err}", self.base_url)))
    }
}

impl DescriptionSource for HttpDescriptionSource {
    async fn describe(&self, code: &str) -> Result<String, LookupError> {
        let url = self.url_for(code)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;

        super::page::extract_description(&html, code)
            .ok_or_else(|| LookupError::NotFound(code.to_string()))
    }
}
