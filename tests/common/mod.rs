//! Shared fixtures for the integration tests: a scripted HTTP transport
//! and canned Alma payloads.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value, json};

use leganto::AdminConfig;
use leganto::api::{HttpResponse, HttpTransport, TransportError, TransportRequest};

/// A transport that replays a fixed queue of responses and records every
/// request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn push_json(&self, value: &Value) {
        self.push_status(200, &value.to_string());
    }

    pub fn push_failure(&self, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError(reason.to_string())));
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn get(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response left".to_string())))
    }
}

/// A transport that routes every request through a closure.
pub struct RoutedTransport<F>(pub F);

impl<F> HttpTransport for RoutedTransport<F>
where
    F: Fn(&TransportRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    async fn get(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        (self.0)(&request)
    }
}

/// JSON helper for routed transports.
pub fn ok_json(value: &Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        body: value.to_string(),
    })
}

/// A minimal working configuration.
pub fn configured() -> AdminConfig {
    AdminConfig {
        api_url: "https://api-test.example.com".to_string(),
        api_key: "secret-key".to_string(),
        ..AdminConfig::default()
    }
}

pub const COURSE_ID: &str = "1111111111111111";
pub const LIST_ID: &str = "2222222222222222";
pub const SECTION_A: &str = "3333333333333333";
pub const SECTION_B: &str = "9999999999999999";
pub const CITATION_1: &str = "4444444444444444";
pub const CITATION_2: &str = "5555555555555555";
pub const CITATION_3: &str = "6666666666666666";

/// A reading list with two citations in section A and one in section B,
/// contiguous per section as Alma guarantees.
pub fn list_payload() -> Value {
    json!({
        "id": LIST_ID,
        "name": "Week 1 Readings",
        "citations": {
            "citation": [
                {
                    "id": CITATION_1,
                    "metadata": {
                        "title": "The  Selfish   Gene",
                        "author": "Dawkins, Richard",
                        "publisher": "OUP",
                        "publication_date": "1976"
                    },
                    "secondary_type": {"value": "BK", "desc": "Book"},
                    "section_info": {
                        "id": SECTION_A,
                        "name": "Core  Reading",
                        "description": "Read before the first seminar."
                    }
                },
                {
                    "id": CITATION_2,
                    "metadata": {"title": "On the Origin of Species", "author": "Darwin, Charles"},
                    "section_info": {"id": SECTION_A, "name": "Core  Reading"}
                },
                {
                    "id": CITATION_3,
                    "metadata": {"article_title": "A Fly's Eye View", "source": "https://example.com/fly"},
                    "section_info": {"id": SECTION_B, "name": "Further Reading"}
                }
            ]
        }
    })
}

/// The stored selection picking citations 1 and 3.
pub fn stored_selection() -> String {
    format!(
        "{{\"course-{COURSE_ID}\":{{\"list-{LIST_ID}\":{{\"section-{SECTION_A}\":[\"citation-{CITATION_1}\"],\"section-{SECTION_B}\":[\"citation-{CITATION_3}\"]}}}}}}"
    )
}
