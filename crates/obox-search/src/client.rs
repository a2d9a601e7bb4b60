use async_trait::async_trait;
use obox_persist::Section;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};

pub const DEFAULT_SEARCH_BASE: &str = "http://localhost:8000";

/// Anything that can turn a query into ranked sections
#[async_trait]
pub trait SectionSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Section>>;
}

/// Client for `GET <base>/search/?q=<query>`
#[derive(Clone)]
pub struct SearchClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/search/", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SectionSource for SearchClient {
    async fn search(&self, query: &str) -> Result<Vec<Section>> {
        debug!("Searching sections for {:?}", query);

        let response = self
            .http_client
            .get(self.endpoint())
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Search endpoint returned {}", status);
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let sections: Vec<Section> = serde_json::from_str(&body)?;
        debug!("Search returned {} sections", sections.len());
        Ok(sections)
    }
}
