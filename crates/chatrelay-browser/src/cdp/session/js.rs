//! `Runtime.evaluate` wrappers.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::RemoteObject;

use super::core::PageSession;

/// Quote a Rust string as a JavaScript string literal.
pub(crate) fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// The thrown value's description if there is one, else the summary line.
pub(super) fn exception_message(details: &Value) -> String {
    details["exception"]["description"]
        .as_str()
        .or_else(|| details["text"].as_str())
        .unwrap_or("uncaught exception")
        .to_string()
}

impl PageSession {
    async fn runtime_evaluate(&self, expression: &str, by_value: bool) -> Result<Value, CdpError> {
        let mut result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": by_value,
                    "awaitPromise": true,
                })),
            )
            .await?;

        match result.get("exceptionDetails") {
            Some(details) => Err(CdpError::JavaScript(exception_message(details))),
            None => Ok(result["result"].take()),
        }
    }

    /// Evaluate an expression and return its JSON value (`null` for `undefined`).
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let mut object = self.runtime_evaluate(expression, true).await?;
        Ok(object["value"].take())
    }

    /// Evaluate an expression and keep the result as a remote object.
    pub async fn evaluate_handle(&self, expression: &str) -> Result<RemoteObject, CdpError> {
        let object = self.runtime_evaluate(expression, false).await?;
        Ok(serde_json::from_value(object)?)
    }
}
