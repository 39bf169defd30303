//! Content Rendering
//!
//! Turns CMS block documents into HTML:
//! - [`types`]: block and inline-text model, decoded from CMS JSON
//! - [`text`]: inline text-run formatting
//! - [`render`]: block dispatch and recursive toggle rendering
//! - [`article`]: full article pages

pub mod article;
pub mod markup;
pub mod render;
pub mod text;
pub mod types;

pub use article::{
    format_date, is_valid_date_format, render_article, Article, ArticleSummary,
    DEFAULT_DATE_FORMAT,
};
pub use markup::{escape, Markup};
pub use render::{render_block, render_blocks, RenderOptions, Renderer};
pub use text::render_text;
pub use types::{
    Annotations, BlockKind, ContentBlock, ImageSource, RichText, TextBlock, ToggleBlock,
};
