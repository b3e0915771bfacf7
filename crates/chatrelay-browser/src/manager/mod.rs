//! Browser session manager.
//!
//! Owns the single Chrome connection shared by all requests. Chrome is
//! launched with a persistent profile when nothing is listening on the debug
//! port, and every prompt gets a fresh tab through [`PageLease`].

mod manager_core;
mod manager_pages;
mod manager_types;

pub use manager_core::BrowserManager;
pub use manager_pages::PageLease;
pub use manager_types::BrowserError;

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
