use crate::config::FeedConfig;
use crate::error::{Result, ScraperError};
use crate::types::{Modality, NoticeFeed, PageOutcome, RawNotice};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

pub const PNCP_FEED: &str = "pncp";

/// Client for the PNCP "contratações por data de publicação" endpoint
pub struct PncpFeed {
    client: reqwest::Client,
    base_url: String,
    uf: String,
    start_date: String,
    end_date: String,
}

impl PncpFeed {
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            uf: config.uf.clone(),
            start_date: config.start_date.clone(),
            end_date: config.resolved_end_date(),
        })
    }

    pub fn page_url(&self, modality: &Modality, page: u32) -> Result<Url> {
        let page = page.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("dataInicial", self.start_date.as_str()),
                ("dataFinal", self.end_date.as_str()),
                ("codigoModalidadeContratacao", modality.code.as_str()),
                ("uf", self.uf.as_str()),
                ("pagina", page.as_str()),
            ],
        )
        .map_err(|e| ScraperError::Config(format!("invalid feed base_url '{}': {}", self.base_url, e)))
    }
}

#[async_trait::async_trait]
impl NoticeFeed for PncpFeed {
    fn feed_name(&self) -> &'static str {
        PNCP_FEED
    }

    #[instrument(skip(self, modality), fields(modality = %modality.label))]
    async fn fetch_page(&self, modality: &Modality, page: u32) -> Result<PageOutcome> {
        let url = self.page_url(modality, page)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(PageOutcome::Empty);
        }
        if !status.is_success() {
            return Ok(PageOutcome::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(PageOutcome::Empty);
        }
        let payload: Value = serde_json::from_slice(&body)?;
        Ok(parse_page(payload))
    }
}

/// Extracts the `data` array of a page; anything else ends pagination.
pub fn parse_page(payload: Value) -> PageOutcome {
    match payload {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) if !items.is_empty() => {
                PageOutcome::Notices(items.into_iter().map(RawNotice::new).collect())
            }
            _ => PageOutcome::Empty,
        },
        _ => PageOutcome::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_url_carries_all_query_parameters() {
        let config = FeedConfig {
            end_date: Some("20260131".to_string()),
            ..FeedConfig::default()
        };
        let feed = PncpFeed::from_config(&config).unwrap();
        let url = feed.page_url(&Modality::new("6", "Pregão"), 3).unwrap();
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            query,
            vec![
                ("dataInicial".to_string(), "20260101".to_string()),
                ("dataFinal".to_string(), "20260131".to_string()),
                ("codigoModalidadeContratacao".to_string(), "6".to_string()),
                ("uf".to_string(), "RN".to_string()),
                ("pagina".to_string(), "3".to_string()),
            ]
        );
        assert!(url.as_str().starts_with("https://pncp.gov.br/api/consulta/v1/contratacoes/publicacao?"));
    }

    #[test]
    fn data_array_becomes_notices() {
        let outcome = parse_page(json!({
            "data": [{ "objetoCompra": "a" }, { "objetoCompra": "b" }],
            "totalPaginas": 4
        }));
        match outcome {
            PageOutcome::Notices(notices) => {
                assert_eq!(notices.len(), 2);
                assert_eq!(notices[1].description(), Some("b"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn empty_or_missing_data_ends_pagination() {
        assert_eq!(parse_page(json!({ "data": [] })), PageOutcome::Empty);
        assert_eq!(parse_page(json!({ "total": 0 })), PageOutcome::Empty);
        assert_eq!(parse_page(json!({ "data": null })), PageOutcome::Empty);
        assert_eq!(parse_page(json!([1, 2, 3])), PageOutcome::Empty);
    }
}
