pub mod address;
pub mod blocks;
pub mod cache;
pub mod engine;
pub mod io;
pub mod manifest;
pub mod parsing;
pub mod position;
pub mod resolve;


// Re-export key types for easier usage
pub use address::{BlockTarget, ExtensionTable, VirtualAddress, is_virtual_address};
pub use blocks::{BlockId, BlockInfo, ExtractError, ExtractOptions, Extractor, Parameters};
pub use cache::{BlockCache, CacheKey, ContentHash, ExtractMemo};
pub use engine::{
    BlockEngine, ChangeOutcome, DocumentChange, EmbeddedLanguageService, EngineOptions,
    VirtualDocument,
};
pub use io::{DocumentFilter, IoError};
pub use manifest::{BlockManifest, DocumentError, ManifestBuilder};
pub use parsing::{DocumentParser, OrgParser, ParseError};
pub use position::{Location, LocationTarget, Position, Range};
pub use resolve::{ReferenceContext, ResolveError, ResolvedBlock, resolve};
