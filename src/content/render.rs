//! Block renderer
//!
//! Maps content blocks to HTML. Rendering is pure and total: every block
//! produces markup, and kinds outside the supported set produce a visible
//! placeholder naming the type. Toggle blocks recurse into their children,
//! up to a configurable depth.

use super::markup::Markup;
use super::text::render_text;
use super::types::{BlockKind, ContentBlock, EmbedBlock, ImageBlock, TextBlock};
use crate::slug::slugify;

/// Default cap on toggle nesting
pub const DEFAULT_MAX_DEPTH: usize = 8;

const EMBED_HOST: &str = "https://codepen.io";

/// Rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Toggle children deeper than this are not rendered
    pub max_depth: usize,
    /// CodePen user for embed frames; derived from the embed URL when unset
    pub embed_user: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            embed_user: None,
        }
    }
}

/// Renders block trees to HTML
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    fn of(block: &ContentBlock) -> Option<Self> {
        match block.kind {
            BlockKind::BulletedListItem(_) => Some(ListKind::Bulleted),
            BlockKind::NumberedListItem(_) => Some(ListKind::Numbered),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ListKind::Bulleted => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a single block. List items come out as bare `<li>` entries.
    pub fn render(&self, block: &ContentBlock) -> Markup {
        self.render_at(block, 0)
    }

    /// Render a sequence of blocks in order, wrapping runs of consecutive
    /// list items in their `<ul>`/`<ol>` container.
    pub fn render_all(&self, blocks: &[ContentBlock]) -> Markup {
        self.render_sequence(blocks, 0)
    }

    fn render_sequence(&self, blocks: &[ContentBlock], depth: usize) -> Markup {
        let mut out = Markup::new();
        let mut open: Option<ListKind> = None;

        for block in blocks {
            let list = ListKind::of(block);
            if open != list {
                if let Some(kind) = open {
                    out.push_raw(&format!("</{}>", kind.tag()));
                }
                if let Some(kind) = list {
                    out.push_raw(&format!("<{}>", kind.tag()));
                }
                open = list;
            }
            out.push(self.render_at(block, depth));
        }

        if let Some(kind) = open {
            out.push_raw(&format!("</{}>", kind.tag()));
        }
        out
    }

    fn render_at(&self, block: &ContentBlock, depth: usize) -> Markup {
        let mut out = Markup::new();

        match &block.kind {
            BlockKind::Paragraph(text) => {
                out.push_element("p", &[], render_text(text.rich_text.as_deref()));
            }
            BlockKind::Heading1(text) => out.push(heading("h1", text)),
            BlockKind::Heading2(text) => out.push(heading("h2", text)),
            BlockKind::Heading3(text) => out.push(heading("h3", text)),
            BlockKind::BulletedListItem(text) | BlockKind::NumberedListItem(text) => {
                out.push_element("li", &[], render_text(text.rich_text.as_deref()));
            }
            BlockKind::ToDo(todo) => {
                let mut label = Markup::new();
                label.push_raw(&format!(
                    "<input type=\"checkbox\" id=\"{}\"{} /> ",
                    super::markup::escape(&block.id),
                    if todo.checked { " checked" } else { "" }
                ));
                label.push(render_text(todo.rich_text.as_deref()));

                let mut wrapper = Markup::new();
                wrapper.push_element("label", &[("for", block.id.as_str())], label);
                out.push_element("div", &[], wrapper);
            }
            BlockKind::Toggle(toggle) => {
                let mut body = Markup::new();
                body.push_element("summary", &[], render_text(toggle.rich_text.as_deref()));

                if depth + 1 > self.options.max_depth {
                    tracing::warn!(block = %block.id, depth, "Toggle nesting exceeds render depth");
                    body.push_element("p", &[], Markup::text("Nested content omitted"));
                } else {
                    body.push(self.render_sequence(&toggle.children, depth + 1));
                }
                out.push_element("details", &[], body);
            }
            BlockKind::ChildPage(page) => {
                out.push_element("p", &[], Markup::text(&page.title));
            }
            BlockKind::Image(image) => out.push(figure(image)),
            BlockKind::Code(code) => {
                let content = code
                    .rich_text
                    .as_deref()
                    .and_then(|runs| runs.first())
                    .map(|run| run.content())
                    .unwrap_or_default();
                let class = code
                    .language
                    .as_deref()
                    .map(|lang| format!("language-{}", lang.replace(' ', "-")));

                let mut code_el = Markup::new();
                match &class {
                    Some(class) => code_el.push_element("code", &[("class", class.as_str())], Markup::text(content)),
                    None => code_el.push_element("code", &[], Markup::text(content)),
                }
                let mut pre = Markup::new();
                pre.push_element("pre", &[], code_el);
                out.push_element("div", &[], pre);
            }
            BlockKind::Callout(callout) => {
                let mut inner = Markup::new();
                if let Some(emoji) = callout.icon.as_ref().and_then(|icon| icon.emoji.as_deref()) {
                    inner.push_element("span", &[], Markup::text(emoji));
                }
                inner.push(render_text(callout.rich_text.as_deref()));
                out.push_element("div", &[("class", "flex flex-start space-x-4")], inner);
            }
            BlockKind::Embed(embed) => out.push(self.embed(embed)),
            BlockKind::TableOfContents => {
                out.push_element("div", &[], Markup::text("TOC"));
            }
            BlockKind::Unsupported(kind) => {
                out.push_text(&unsupported_placeholder(kind));
            }
        }

        out
    }

    fn embed(&self, embed: &EmbedBlock) -> Markup {
        let key = embed_key(&embed.url);
        let user = self
            .options
            .embed_user
            .clone()
            .or_else(|| embed_user_from_url(&embed.url));
        let src = match user {
            Some(user) => format!("{}/{}/embed/preview/{}?default-tab=result", EMBED_HOST, user, key),
            None => format!("{}/embed/preview/{}?default-tab=result", EMBED_HOST, key),
        };

        let mut fallback = Markup::text("See the Pen ");
        fallback.push_element("a", &[("href", embed.url.as_str())], Markup::text(key));
        fallback.push_text(" on ");
        fallback.push_element("a", &[("href", EMBED_HOST)], Markup::text("CodePen"));
        fallback.push_text(".");

        let mut frame = Markup::new();
        frame.push_element(
            "iframe",
            &[
                ("height", "600"),
                ("class", "w-full"),
                ("scrolling", "no"),
                ("title", key),
                ("src", src.as_str()),
                ("frameborder", "no"),
                ("loading", "lazy"),
                ("allowtransparency", "true"),
                ("allowfullscreen", "true"),
            ],
            fallback,
        );

        let mut out = Markup::new();
        out.push_element("div", &[], frame);
        out
    }
}

/// Render one block with default options
pub fn render_block(block: &ContentBlock) -> Markup {
    Renderer::default().render(block)
}

/// Render a block sequence with default options
pub fn render_blocks(blocks: &[ContentBlock]) -> Markup {
    Renderer::default().render_all(blocks)
}

/// Placeholder text shown for block kinds the renderer does not handle
pub fn unsupported_placeholder(kind: &str) -> String {
    let detail = if kind == "unsupported" {
        "unsupported by the CMS API"
    } else {
        kind
    };
    format!("\u{274c} Unsupported block ({})", detail)
}

/// Preview identifier of an embed: everything after the last `/`
pub fn embed_key(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

fn embed_user_from_url(url: &str) -> Option<String> {
    let rest = url.split_once("codepen.io/")?.1;
    rest.split('/')
        .next()
        .filter(|user| !user.is_empty())
        .map(str::to_string)
}

fn heading(tag: &str, text: &TextBlock) -> Markup {
    let mut out = Markup::new();
    let content = render_text(text.rich_text.as_deref());

    match text.first_text().map(slugify).filter(|anchor| !anchor.is_empty()) {
        Some(anchor) => {
            let mut link = Markup::new();
            let href = format!("#{}", anchor);
            link.push_element("a", &[("href", href.as_str())], content);
            out.push_element(tag, &[("id", anchor.as_str())], link);
        }
        None => out.push_element(tag, &[], content),
    }
    out
}

fn figure(image: &ImageBlock) -> Markup {
    let mut inner = Markup::raw(format!(
        "<img class=\"rounded-lg\" src=\"{}\" />",
        super::markup::escape(image.source.url())
    ));
    if let Some(caption) = image.caption_text() {
        inner.push_element("figcaption", &[("class", "text-center")], Markup::text(caption));
    }

    let mut out = Markup::new();
    out.push_element("figure", &[("class", "rounded-lg")], inner);
    out
}
