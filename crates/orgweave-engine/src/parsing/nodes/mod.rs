//! # Node Parsing
//!
//! Two-phase parsing of org documents into a flat list of [`DocNode`]s.
//!
//! 1. **Line Classification** (`classify`): each line is classified into a
//!    `LineClass` from local facts only (markers, headings, keywords, blanks).
//! 2. **Node Construction** (`builder`): a `NodeBuilder` state machine folds
//!    classified lines into nodes.
//!
//! ## Key Invariants
//!
//! - Source blocks are raw zones: nothing inside them is classified further
//! - The first `#+end_src` closes the open block; blocks never nest
//! - Source block nodes are emitted in document order
//! - All nodes store byte spans into the rope

pub mod builder;
pub mod classify;
pub mod kinds;
pub mod types;

pub use builder::NodeBuilder;
pub use classify::{LineClass, LineKind, OrgLineClassifier};
pub use types::{DocNode, SrcBlockNode};
