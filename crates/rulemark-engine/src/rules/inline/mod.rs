//! Inline-scope rules.

pub mod autolink;
pub mod code_span;
pub mod emphasis;
pub mod link;
pub mod text;

pub use autolink::{autolink, mailto, url};
pub use code_span::inline_code;
pub use emphasis::{del, em, strong, u};
pub use link::{image, link, refimage, reflink};
pub use text::{br, escape, text};
