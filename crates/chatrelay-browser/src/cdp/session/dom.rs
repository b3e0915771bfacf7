//! DOM operations for CDP page session.
//!
//! Reads go through `Runtime.evaluate` so a selector that matches nothing is
//! simply `null`; clicks resolve a box model and dispatch real mouse events.

use std::path::PathBuf;

use serde_json::json;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{BoxModel, DomNode};

use super::core::PageSession;
use super::js::js_string;

/// Expression finding the first button, link or `role=button` element whose
/// visible text or aria-label equals the given label.
fn find_button_expr(label: &str) -> String {
    format!(
        r#"(() => {{
            const label = {label};
            const candidates = document.querySelectorAll('button, a, [role="button"]');
            for (const el of candidates) {{
                const text = (el.innerText || el.textContent || '').trim();
                if (text === label || el.getAttribute('aria-label') === label) {{
                    return el;
                }}
            }}
            return null;
        }})()"#,
        label = js_string(label)
    )
}

impl PageSession {
    /// Get document root node.
    pub async fn get_document(&self) -> Result<DomNode, CdpError> {
        let result = self
            .call("DOM.getDocument", Some(json!({"depth": 0})))
            .await?;

        let root: DomNode = serde_json::from_value(result["root"].clone())?;
        Ok(root)
    }

    /// Query selector.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, CdpError> {
        let doc = self.get_document().await?;

        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({
                    "nodeId": doc.node_id,
                    "selector": selector,
                })),
            )
            .await?;

        let node_id = result["nodeId"].as_i64().unwrap_or(0);
        if node_id == 0 { Ok(None) } else { Ok(Some(node_id)) }
    }

    /// Get box model for node. `None` when the node is not rendered.
    pub async fn get_box_model(&self, node_id: i64) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"nodeId": node_id})))
            .await;

        match result {
            Ok(r) => {
                let model: BoxModel = serde_json::from_value(r["model"].clone())?;
                Ok(Some(model))
            }
            Err(e) if e.is_server_error() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Focus element.
    pub async fn focus(&self, node_id: i64) -> Result<(), CdpError> {
        self.call("DOM.focus", Some(json!({"nodeId": node_id})))
            .await?;
        Ok(())
    }

    pub async fn exists(&self, selector: &str) -> Result<bool, CdpError> {
        let expr = format!("document.querySelector({}) !== null", js_string(selector));
        Ok(self.evaluate(&expr).await?.as_bool().unwrap_or(false))
    }

    /// Trimmed `textContent` of the first match.
    pub async fn text_content(&self, selector: &str) -> Result<Option<String>, CdpError> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({}); return el ? (el.textContent || '').trim() : null; }})()",
            js_string(selector)
        );
        Ok(self.evaluate(&expr).await?.as_str().map(str::to_string))
    }

    pub async fn inner_html(&self, selector: &str) -> Result<Option<String>, CdpError> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.innerHTML : null; }})()",
            js_string(selector)
        );
        Ok(self.evaluate(&expr).await?.as_str().map(str::to_string))
    }

    /// Non-empty values of `attribute` across all matches, in document order.
    pub async fn attribute_values(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>, CdpError> {
        let expr = format!(
            "Array.from(document.querySelectorAll({})).map(el => el.getAttribute({})).filter(v => !!v)",
            js_string(selector),
            js_string(attribute)
        );
        let value = self.evaluate(&expr).await?;
        Ok(value
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default())
    }

    /// Click on element by selector.
    pub async fn click_selector(&self, selector: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;

        let box_model = self
            .get_box_model(node_id)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(format!("{} (not visible)", selector)))?;

        let (x, y) = Self::quad_center(&box_model.content);
        self.click(x, y).await
    }

    /// Fill input by selector, replacing its current value.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;

        self.focus(node_id).await?;
        self.press_key_combo("Control+a").await?;
        self.type_text(value).await
    }

    /// Focus a contenteditable editor and delete its content.
    pub async fn clear_editor(&self, selector: &str) -> Result<(), CdpError> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.focus();
                document.execCommand('selectAll', false, null);
                document.execCommand('delete', false, null);
                return true;
            }})()"#,
            js_string(selector)
        );
        if self.evaluate(&expr).await?.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(CdpError::ElementNotFound(selector.to_string()))
        }
    }

    pub async fn has_button(&self, label: &str) -> Result<bool, CdpError> {
        let expr = format!("{} !== null", find_button_expr(label));
        Ok(self.evaluate(&expr).await?.as_bool().unwrap_or(false))
    }

    /// Click a button by label. `Ok(false)` when none matches.
    pub async fn click_button(&self, label: &str) -> Result<bool, CdpError> {
        let expr = format!(
            r#"(() => {{
                const el = {};
                if (!el) return null;
                el.scrollIntoView({{ block: 'center' }});
                const r = el.getBoundingClientRect();
                return {{ x: r.left + r.width / 2, y: r.top + r.height / 2 }};
            }})()"#,
            find_button_expr(label)
        );
        let point = self.evaluate(&expr).await?;
        match (point["x"].as_f64(), point["y"].as_f64()) {
            (Some(x), Some(y)) => {
                self.click(x, y).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Attach files to a file input via `DOM.setFileInputFiles`.
    ///
    /// The element is resolved with `Runtime.evaluate` so hidden inputs work.
    pub async fn set_input_files(&self, selector: &str, files: &[PathBuf]) -> Result<(), CdpError> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (el && el.type === 'file') return el;
                return document.querySelector('input[type="file"]');
            }})()"#,
            js_string(selector)
        );
        let handle = self.evaluate_handle(&expr).await?;
        let object_id = handle
            .live_object_id()
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;

        let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        self.call(
            "DOM.setFileInputFiles",
            Some(json!({
                "objectId": object_id,
                "files": files,
            })),
        )
        .await?;
        Ok(())
    }

    /// Calculate center point of a quad.
    pub(super) fn quad_center(quad: &[f64]) -> (f64, f64) {
        if quad.len() >= 8 {
            let x = (quad[0] + quad[2] + quad[4] + quad[6]) / 4.0;
            let y = (quad[1] + quad[3] + quad[5] + quad[7]) / 4.0;
            (x, y)
        } else {
            (0.0, 0.0)
        }
    }
}

#[cfg(test)]
pub(super) fn button_expr_for_tests(label: &str) -> String {
    find_button_expr(label)
}
