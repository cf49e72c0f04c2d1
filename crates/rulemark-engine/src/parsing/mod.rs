pub mod capture;
pub mod cursor;
pub mod node;
pub mod parser;
pub mod references;
pub mod state;

pub use capture::Capture;
pub use cursor::Cursor;
pub use node::{Node, NodeData, Parsed, Value};
pub use parser::Parser;
pub use references::{Definition, RefId, ReferenceTable, normalize_label};
pub use state::State;
