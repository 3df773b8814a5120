use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use sonozen_core::{AnalyzeRequest, AnalyzeResponse, SleepAnalysisRecord, GENERIC_FAILURE_MESSAGE};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 服务端返回 `{ success: false, error }`
    #[error("{0}")]
    Rejected(String),

    #[error("Could not reach the SonoZen server: {0}")]
    Network(String),
}

/// 提交页使用的分析后端
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, message: &str) -> Result<SleepAnalysisRecord, ClientError>;
}

/// `POST /api/analyze-sleep` 的 HTTP 客户端
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    base_url: String,
    client: Client,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn analyze(&self, message: &str) -> Result<SleepAnalysisRecord, ClientError> {
        let url = format!("{}{}", self.base_url, sonozen_core::ANALYZE_PATH);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest::new(message))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Response: {}", status);

        // 非 JSON 响应体按通用失败处理
        let body: AnalyzeResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Unreadable response body: {}", e);
                return Err(ClientError::Rejected(GENERIC_FAILURE_MESSAGE.to_string()));
            }
        };

        if !status.is_success() && body.success {
            return Err(ClientError::Rejected(GENERIC_FAILURE_MESSAGE.to_string()));
        }

        body.into_result().map_err(ClientError::Rejected)
    }
}
