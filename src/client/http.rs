//! HTTP implementation of [`RunClient`] over the agent service REST API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::AgentRunConfig;
use crate::error::{AgentRunError, ErrorDetails};
use crate::types::{
    Agent, CreateAgentRequest, CreateMessageRequest, CreateRunRequest, ListSortOrder, Run,
    RunStep, Thread, ThreadMessage, ToolApproval,
};

use super::RunClient;

const PAGE_LIMIT: &str = "100";
const REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Agent service client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRunClient {
    client: reqwest::Client,
    endpoint: String,
    api_version: String,
    api_token: Option<String>,
}

#[derive(Deserialize)]
struct ListPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    last_id: Option<String>,
    #[serde(default)]
    has_more: bool,
}

impl HttpRunClient {
    pub fn new(config: &AgentRunConfig) -> Result<Self, AgentRunError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| AgentRunError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.endpoint, path.trim_start_matches('/'));
        debug!(%method, %url, "agent service request");
        self.client
            .request(method, url)
            .headers(self.headers())
            .query(&[("api-version", self.api_version.as_str())])
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(val) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            headers.insert(REQUEST_ID_HEADER, val);
        }
        if let Some(token) = &self.api_token {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, AgentRunError> {
        let resp = checked(request.send().await?).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_discarding(&self, request: RequestBuilder) -> Result<(), AgentRunError> {
        checked(request.send().await?).await?;
        Ok(())
    }

    /// Follow `after` cursors until the service reports no more pages.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AgentRunError> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut request = self
                .request(Method::GET, path)
                .query(&[("limit", PAGE_LIMIT)])
                .query(query);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor.as_str())]);
            }

            let page: ListPage<T> = self.send_json(request).await?;
            let fetched = page.data.len();
            items.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more && fetched > 0 => after = Some(last_id),
                _ => break,
            }
        }
        Ok(items)
    }
}

async fn checked(resp: Response) -> Result<Response, AgentRunError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let retry_after_ms = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000));
    let body = resp.text().await.unwrap_or_default();
    Err(status_to_error(status.as_u16(), &body, retry_after_ms))
}

/// Map a non-success status and body to an error.
pub fn status_to_error(status: u16, body: &str, retry_after_ms: Option<u64>) -> AgentRunError {
    let details = ErrorDetails::from_body(body);
    let message = details
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => AgentRunError::Authentication(message),
        404 => AgentRunError::NotFound(message),
        429 => AgentRunError::RateLimited { retry_after_ms },
        _ => match details {
            Some(details) => AgentRunError::api_with_details(status, message, details),
            None => AgentRunError::api(status, message),
        },
    }
}

#[async_trait]
impl RunClient for HttpRunClient {
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, AgentRunError> {
        self.send_json(self.request(Method::POST, "assistants").json(request))
            .await
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), AgentRunError> {
        self.send_discarding(self.request(Method::DELETE, &format!("assistants/{agent_id}")))
            .await
    }

    async fn create_thread(&self) -> Result<Thread, AgentRunError> {
        self.send_json(
            self.request(Method::POST, "threads")
                .json(&serde_json::json!({})),
        )
        .await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage, AgentRunError> {
        self.send_json(
            self.request(Method::POST, &format!("threads/{thread_id}/messages"))
                .json(request),
        )
        .await
    }

    async fn create_run(
        &self,
        thread_id: &str,
        request: &CreateRunRequest,
    ) -> Result<Run, AgentRunError> {
        self.send_json(
            self.request(Method::POST, &format!("threads/{thread_id}/runs"))
                .json(request),
        )
        .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AgentRunError> {
        self.send_json(self.request(Method::GET, &format!("threads/{thread_id}/runs/{run_id}")))
            .await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), AgentRunError> {
        self.send_discarding(
            self.request(
                Method::POST,
                &format!("threads/{thread_id}/runs/{run_id}/cancel"),
            ),
        )
        .await
    }

    async fn submit_tool_approvals(
        &self,
        thread_id: &str,
        run_id: &str,
        approvals: &[ToolApproval],
    ) -> Result<(), AgentRunError> {
        self.send_discarding(
            self.request(
                Method::POST,
                &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            )
            .json(&serde_json::json!({ "tool_approvals": approvals })),
        )
        .await
    }

    async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<RunStep>, AgentRunError> {
        self.list_all(
            &format!("threads/{thread_id}/runs/{run_id}/steps"),
            &[("order", ListSortOrder::Asc.to_string())],
        )
        .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListSortOrder,
    ) -> Result<Vec<ThreadMessage>, AgentRunError> {
        self.list_all(
            &format!("threads/{thread_id}/messages"),
            &[("order", order.to_string())],
        )
        .await
    }
}
