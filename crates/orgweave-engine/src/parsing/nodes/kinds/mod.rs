pub mod heading;
pub mod keyword;
pub mod src_block;

pub use heading::Heading;
pub use keyword::Keyword;
pub use src_block::{SrcBlock, SrcOpen};
