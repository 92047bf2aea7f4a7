//! The hand-off point to whatever executes resolved bootstrap scripts.

use crate::context::{RequestContext, DOCUMENT_ROOT};
use hyper::body::Bytes;
use hyper::StatusCode;
use serde_json::json;
use std::path::Path;

/// Response produced by a [`ScriptHandler`].
#[derive(Debug, Clone)]
pub struct ScriptResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ScriptResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Executes a resolved front controller.
///
/// Called from a blocking task, so implementations may block (e.g. on a FastCGI
/// round trip).
pub trait ScriptHandler: Send + Sync {
    fn handle(&self, script: &Path, context: &RequestContext) -> anyhow::Result<ScriptResponse>;
}

/// Answers every script request with a JSON description of what would run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescribeHandler;

impl ScriptHandler for DescribeHandler {
    fn handle(&self, script: &Path, context: &RequestContext) -> anyhow::Result<ScriptResponse> {
        let body = json!({
            "script": script.to_string_lossy(),
            "document_root": context.server(DOCUMENT_ROOT),
            "context": context,
        });

        Ok(ScriptResponse::new(StatusCode::OK, serde_json::to_vec_pretty(&body)?)
            .with_header("Content-Type", "application/json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_handler_reports_script_and_context() {
        let mut ctx = RequestContext::new("app.test", "GET", "/users");
        ctx.set_script(Path::new("/srv/app/public/index.php"), Path::new("/srv/app/public"));
        ctx.set_env("APP_ENV", "local");

        let response = DescribeHandler
            .handle(Path::new("/srv/app/public/index.php"), &ctx)
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(value["script"], "/srv/app/public/index.php");
        assert_eq!(value["document_root"], "/srv/app/public");
        assert_eq!(value["context"]["env"]["APP_ENV"], "local");
        assert_eq!(value["context"]["method"], "GET");
    }
}
