//! Scripted in-memory upstream for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;

use crate::proxy::{OutboundRequest, Upstream, UpstreamError, UpstreamResponse};

/// One scripted answer.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Status(u16, &'static str),
    Fail,
    Hang,
}

/// Records every request and answers from a queue (200 when empty).
#[derive(Debug, Default)]
pub(crate) struct MockUpstream {
    calls: Mutex<Vec<OutboundRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl MockUpstream {
    pub(crate) fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Upstream for MockUpstream {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>> {
        let origin = request.url.origin().ascii_serialization();
        let served_by = HeaderValue::from_str(request.url.as_str()).unwrap();
        self.calls.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Status(200, "ok"));

        Box::pin(async move {
            match reply {
                Reply::Status(code, body) => {
                    let mut headers = HeaderMap::new();
                    headers.insert("x-served-by", served_by);
                    Ok(UpstreamResponse {
                        status: StatusCode::from_u16(code).unwrap(),
                        headers,
                        body: Body::from(body),
                    })
                }
                Reply::Fail => Err(UpstreamError::Unreachable {
                    origin,
                    source: "connection refused".into(),
                }),
                Reply::Hang => futures_util::future::pending().await,
            }
        })
    }
}
