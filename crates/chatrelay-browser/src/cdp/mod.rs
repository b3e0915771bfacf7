//! Chrome DevTools Protocol (CDP) client implementation.
//!
//! Connects to Chrome over WebSocket and speaks the CDP JSON-RPC protocol.
//! Each tab gets its own flattened session multiplexed over the browser
//! connection.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://127.0.0.1:9222").await?;
//! let page = client.new_page(None).await?;
//! page.navigate("https://chatgpt.com", Duration::from_secs(120)).await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
