//! # JSON-RPC 1.1 Envelopes
//!
//! The request and response shapes spoken by KBase-style JSON-RPC services.
//!
//! These services predate JSON-RPC 2.0: requests carry a `version` member set to `"1.1"`,
//! positional parameters are always a JSON array and errors come back with a `name`
//! alongside the usual `code` and `message`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version sent in every request.
pub const JSON_RPC_VERSION: &str = "1.1";

/// An outgoing JSON-RPC request.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P: ?Sized> {
    pub version: &'static str,
    pub method: &'a str,
    pub params: &'a P,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a RpcContext>,
}

impl<'a, P: Serialize + ?Sized> JsonRpcRequest<'a, P> {
    pub fn new(method: &'a str, params: &'a P, id: String) -> Self {
        Self {
            version: JSON_RPC_VERSION,
            method,
            params,
            id,
            context: None,
        }
    }

    pub fn with_context(mut self, context: Option<&'a RpcContext>) -> Self {
        self.context = context;
        self
    }
}

/// An incoming JSON-RPC response.
///
/// Some servers put the result list under `params` instead of `result`, both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, alias = "params")]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ServerError>,
}

/// An error reported by the server inside a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Deserialize, thiserror::Error)]
#[error("{name} (code {code}): {message}")]
pub struct ServerError {
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Extra detail, usually a server-side stack trace.
    #[serde(default, rename = "error", alias = "data")]
    pub data: Option<Value>,
}

impl ServerError {
    /// Builds the error used when a server fails without a parsable error body.
    pub fn unknown(body: String) -> Self {
        Self {
            name: unknown_name(),
            code: 0,
            message: "An unknown server error occurred".to_string(),
            data: Some(Value::String(body)),
        }
    }
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

/// Call context forwarded to the server with a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcContext {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_stack: Vec<MethodCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

/// One frame of an [`RpcContext`] call stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_envelope_without_context() {
        let params = ("ws1", "contigset_42");
        let request = JsonRpcRequest::new("svc.method", &params, "7".to_string());

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "version": "1.1",
                "method": "svc.method",
                "params": ["ws1", "contigset_42"],
                "id": "7"
            })
        );
    }

    #[test]
    fn test_request_envelope_with_context() {
        let context = RpcContext {
            call_stack: vec![MethodCall {
                method: "caller.run".to_string(),
                time: None,
                job_id: Some("job-1".to_string()),
            }],
            run_id: Some("run-9".to_string()),
        };
        let params = ["a"];
        let request =
            JsonRpcRequest::new("svc.method", &params, "1".to_string()).with_context(Some(&context));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["context"],
            json!({
                "call_stack": [{ "method": "caller.run", "job_id": "job-1" }],
                "run_id": "run-9"
            })
        );
    }

    #[test]
    fn test_response_accepts_params_alias() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({ "params": [{ "contig_count": 7 }] })).unwrap();

        assert_eq!(response.result, Some(json!([{ "contig_count": 7 }])));
        assert!(response.error.is_none());
        assert!(response.id.is_none());
    }

    #[test]
    fn test_server_error_fields() {
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "version": "1.1",
            "error": {
                "name": "JSONRPCError",
                "code": -32601,
                "message": "Method not found",
                "error": "Traceback..."
            }
        }))
        .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.name, "JSONRPCError");
        assert_eq!(error.code, -32601);
        assert_eq!(error.data, Some(json!("Traceback...")));
        assert_eq!(
            error.to_string(),
            "JSONRPCError (code -32601): Method not found"
        );
    }

    #[test]
    fn test_server_error_defaults() {
        let error: ServerError = serde_json::from_value(json!({ "message": "boom" })).unwrap();

        assert_eq!(error.name, "Unknown");
        assert_eq!(error.code, 0);
        assert_eq!(error.data, None);
    }
}
