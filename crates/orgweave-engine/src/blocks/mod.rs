//! # Block Extraction
//!
//! Finds `#+begin_src` / `#+end_src` blocks in org text and describes each
//! one as a [`BlockInfo`].
//!
//! - **`markers`**: regex line scan for begin/end markers and `#+name:` directives
//! - **`params`**: header argument grammar (`:key value`, `:flag`)
//! - **`info`**: `BlockInfo` and `BlockId`
//! - **`extract`**: `Extractor`, pairing scanned markers with parser nodes

pub mod extract;
pub mod info;
pub mod markers;
pub mod params;

pub use extract::{ExtractError, ExtractOptions, Extractor, SELECTOR_PARAMETER, extract};
pub use info::{BlockId, BlockInfo};
pub use params::Parameters;
