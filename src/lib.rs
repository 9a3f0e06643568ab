//! Album-art gallery lightbox.
//!
//! [`GalleryModalController`] owns the modal state and the fixed binding table of a
//! gallery page. It is written against the [`ModalHost`] seam and runs on two hosts:
//!
//! - [`Harness`]: a deterministic in-memory page parsed from an HTML string, used by
//!   tests and by anything that wants to drive the widget without a browser.
//! - `web::install` (wasm32 only): the real browser DOM, publishing the programmatic
//!   handle as `window.__albumModal`.

use std::error::Error as StdError;
use std::fmt;

mod config;
mod dom;
mod events;
mod gallery;
mod harness;
mod host;
mod html;
mod modal;
mod selector;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::ModalConfig;
pub use events::{Binding, BindingTarget, DispatchOutcome, EventKind, EventOutcome, ModalEvent, Trigger};
pub use gallery::{GalleryIndex, GalleryItem, wrap_index};
pub use harness::{Harness, ModalHandle};
pub use host::ModalHost;
pub use modal::{GalleryModalController, ModalState};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    InvalidConfig(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests;
