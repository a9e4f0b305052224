//! Per-request summary logging.
//!
//! # Responsibilities
//! - Parse the configured log template once at startup
//! - After the inner chain finishes, render one line per request
//!
//! # Template Fields
//! - `${remote_ip}`: client address (forwarding headers first)
//! - `${account_name}`: session account name, or `None`
//! - `${uri}`: path and query as requested
//! - `${method}`: HTTP method
//! - `${status}`: final numeric status
//!
//! Unknown fields render as an empty string. An unterminated `${` is kept
//! as literal text.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response};

use crate::http::request::client_ip;
use crate::pipeline::Interceptor;
use crate::session::Session;

const OPEN_TAG: &str = "${";
const CLOSE_TAG: char = '}';

/// Rendered in place of the account name for anonymous requests.
pub const ANONYMOUS: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    RemoteIp,
    AccountName,
    Uri,
    Method,
    Status,
    Unknown,
}

impl Field {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "remote_ip" => Field::RemoteIp,
            "account_name" => Field::AccountName,
            "uri" => Field::Uri,
            "method" => Field::Method,
            "status" => Field::Status,
            _ => Field::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Values available to the template for one finished request.
#[derive(Debug, Clone, Default)]
pub struct RequestSummary {
    pub remote_ip: String,
    pub account_name: Option<String>,
    pub uri: String,
    pub method: String,
    pub status: u16,
}

/// A parsed `${field}` template.
#[derive(Debug, Clone)]
pub struct LogTemplate {
    segments: Vec<Segment>,
}

impl LogTemplate {
    pub fn parse(format: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = format;

        while let Some(start) = rest.find(OPEN_TAG) {
            let after = &rest[start + OPEN_TAG.len()..];
            let Some(end) = after.find(CLOSE_TAG) else {
                break;
            };
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            segments.push(Segment::Field(Field::from_tag(&after[..end])));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Self { segments }
    }

    pub fn render(&self, summary: &RequestSummary) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field(Field::RemoteIp) => line.push_str(&summary.remote_ip),
                Segment::Field(Field::AccountName) => {
                    line.push_str(summary.account_name.as_deref().unwrap_or(ANONYMOUS))
                }
                Segment::Field(Field::Uri) => line.push_str(&summary.uri),
                Segment::Field(Field::Method) => line.push_str(&summary.method),
                Segment::Field(Field::Status) => line.push_str(&summary.status.to_string()),
                Segment::Field(Field::Unknown) => {}
            }
        }
        line
    }
}

/// Pipeline stage writing one summary line per request.
#[derive(Debug)]
pub struct RequestLogger {
    template: LogTemplate,
}

impl RequestLogger {
    pub fn new(template: LogTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl Interceptor for RequestLogger {
    fn name(&self) -> &'static str {
        "request_log"
    }

    async fn intercept(&self, request: Request, next: Next) -> Response {
        let remote_ip = client_ip(&request).map(|ip| ip.to_string()).unwrap_or_default();
        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        let method = request.method().to_string();

        let response = next.run(request).await;

        let account_name = match response.extensions().get::<Session>() {
            Some(session) => session.current_account().await.map(|account| account.name),
            None => None,
        };
        let summary = RequestSummary {
            remote_ip,
            account_name,
            uri,
            method,
            status: response.status().as_u16(),
        };
        tracing::info!("{}", self.template.render(&summary));
        response
    }
}
