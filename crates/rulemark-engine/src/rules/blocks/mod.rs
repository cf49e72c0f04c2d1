//! Block-scope rules.

pub mod block_quote;
pub mod code_block;
pub mod definition;
pub mod heading;
pub mod list;
pub mod paragraph;
pub mod table;
pub mod thematic_break;

pub use block_quote::block_quote;
pub use code_block::{code_block, fence};
pub use definition::definition;
pub use heading::{heading, lheading};
pub use list::list;
pub use paragraph::{newline, paragraph};
pub use table::{nptable, table};
pub use thematic_break::hr;
