use async_trait::async_trait;
use lesenne_types::Passage;
use serde::Deserialize;

use crate::error::RetrievalError;
use crate::retriever::Retriever;

/// HTTP adapter to the vector-search service.
///
/// Posts `{query, top_k}` to the configured endpoint and decodes the ranked
/// passages from its response.
pub struct HttpRetriever {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpRetriever {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    passages: Vec<Passage>,
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let payload = serde_json::json!({
            "query": query,
            "top_k": top_k,
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Backend { status, body });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Decode(e.to_string()))?;

        tracing::debug!(query, passages = parsed.passages.len(), "passages retrieved");
        Ok(parsed.passages)
    }
}
