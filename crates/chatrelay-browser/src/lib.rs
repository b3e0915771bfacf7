//! # chatrelay browser
//!
//! A small Chrome DevTools Protocol client and the session manager that owns
//! the shared browser connection.
//!
//! [`BrowserManager`] launches or attaches to Chrome, injects cookies, and
//! hands out one isolated tab per prompt through the
//! [`chatrelay_core::PageSource`] seam.

pub mod cdp;
pub mod manager;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use manager::{BrowserError, BrowserManager, PageLease};
