//! # Folio
//!
//! Personal blog engine - renders CMS block documents to HTML and tracks
//! reader reactions and page views.
//!
//! ## Features
//!
//! - **Block rendering**: Paragraphs, headings, lists, to-dos, collapsible
//!   sections, images, code, callouts and embeds, with inline formatting
//! - **CMS loading**: Published-post filtering, slug resolution and
//!   paginated block fetching
//! - **Reactions**: Per-device "already reacted" flags merged with server
//!   counters, optimistic updates and periodic refresh
//! - **Page views**: Fire-and-forget view registration
//!
//! ## Modules
//!
//! - [`content`]: Block model and HTML rendering
//! - [`cms`]: Document API client and page loader
//! - [`counter`]: Reaction and view counter service client
//! - [`reactions`]: Reaction state tracking and local flag storage
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio::cms::{NotionClient, PageLoader};
//! use folio::config::Config;
//! use folio::content::{render_article, Renderer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!
//!     let client = NotionClient::new(config.cms.notion_config())?;
//!     let loader = PageLoader::new(Arc::new(client), config.cms.filter());
//!
//!     let article = loader.load("hello-world").await?;
//!     let renderer = Renderer::new(config.render.render_options());
//!     println!("{}", render_article(&article, &renderer, &config.render.date_format));
//!
//!     Ok(())
//! }
//! ```

pub mod cms;
pub mod config;
pub mod content;
pub mod counter;
pub mod reactions;
pub mod slug;
pub mod views;

pub use config::Config;
pub use slug::slugify;
