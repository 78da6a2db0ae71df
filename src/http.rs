// HTTP client abstraction so provider adapters can be exercised against
// canned responses in tests.

use async_trait::async_trait;

use crate::error::TransportError;

const USER_AGENT: &str = "day-planner/0.1";

/// Raw upstream reply: status plus body text. Adapters decide what a
/// non-success status or unparsable body means; the client layer only
/// distinguishes transport faults.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, or `None` when the upstream sent garbage.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// GET-with-query client used by every adapter. Only transport-level faults
/// (connect/DNS/read errors) are `Err`; any HTTP status comes back as a
/// normal `FetchResponse`.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<FetchResponse, TransportError>;
}

/// Production client backed by reqwest with a shared connection pool.
///
/// Note: no per-request timeout is set here; the orchestrator's isolation
/// wrapper owns deadlines so that one policy covers every upstream.
#[derive(Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<FetchResponse, TransportError> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock client returning a scripted sequence of responses (the last one
    /// repeats). Records every URL it was asked for.
    pub struct MockFetch {
        responses: Mutex<Vec<Result<FetchResponse, TransportError>>>,
        pub calls: AtomicUsize,
        pub urls: Mutex<Vec<String>>,
        pub queries: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl MockFetch {
        pub fn new(responses: Vec<Result<FetchResponse, TransportError>>) -> Self {
            assert!(!responses.is_empty(), "mock needs at least one response");
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(body: &str) -> Self {
            Self::new(vec![Ok(FetchResponse {
                status: 200,
                body: body.to_string(),
            })])
        }

        pub fn status(status: u16, body: &str) -> Self {
            Self::new(vec![Ok(FetchResponse {
                status,
                body: body.to_string(),
            })])
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpFetch for MockFetch {
        async fn get(
            &self,
            url: &str,
            query: &[(&str, String)],
            _headers: &[(&str, String)],
        ) -> Result<FetchResponse, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            self.queries.lock().unwrap().push(
                query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            );
            let responses = self.responses.lock().unwrap();
            let index = call.min(responses.len() - 1);
            responses[index].clone()
        }
    }

    #[tokio::test]
    async fn mock_replays_sequence_then_repeats_last() {
        let mock = MockFetch::new(vec![
            Ok(FetchResponse {
                status: 429,
                body: String::new(),
            }),
            Ok(FetchResponse {
                status: 200,
                body: "{}".to_string(),
            }),
        ]);

        assert_eq!(mock.get("http://x", &[], &[]).await.unwrap().status, 429);
        assert_eq!(mock.get("http://x", &[], &[]).await.unwrap().status, 200);
        assert_eq!(mock.get("http://x", &[], &[]).await.unwrap().status, 200);
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn garbage_body_parses_to_none() {
        let resp = FetchResponse {
            status: 200,
            body: "<html>not json</html>".to_string(),
        };
        assert!(resp.json().is_none());
        assert!(resp.is_success());
    }
}
