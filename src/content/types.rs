//! Content block model
//!
//! Blocks arrive from the CMS as JSON objects tagged by `type`, with the
//! payload stored under a key of the same name:
//!
//! ```json
//! { "id": "b1", "type": "paragraph", "has_children": false,
//!   "paragraph": { "rich_text": [ ... ] } }
//! ```
//!
//! Decoding is best-effort. A block whose type is unknown, or whose payload
//! does not have the expected shape, becomes [`BlockKind::Unsupported`]
//! instead of failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One block of a document, with a stable id used as its render key
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub id: String,
    pub has_children: bool,
    pub kind: BlockKind,
}

/// The fixed set of block kinds the renderer understands
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Toggle(ToggleBlock),
    ChildPage(ChildPageBlock),
    Image(ImageBlock),
    Code(CodeBlock),
    Callout(CalloutBlock),
    Embed(EmbedBlock),
    TableOfContents,
    /// Anything else, carrying the type tag as received
    Unsupported(String),
}

impl ContentBlock {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            kind,
        }
    }

    /// The CMS type tag for this block
    pub fn kind_name(&self) -> &str {
        self.kind.name()
    }

    /// Children of a container block, if it is one
    pub fn children(&self) -> Option<&[ContentBlock]> {
        match &self.kind {
            BlockKind::Toggle(toggle) => Some(&toggle.children),
            _ => None,
        }
    }

    /// Mutable access to the children of a container block
    pub fn children_mut(&mut self) -> Option<&mut Vec<ContentBlock>> {
        match &mut self.kind {
            BlockKind::Toggle(toggle) => Some(&mut toggle.children),
            _ => None,
        }
    }
}

impl BlockKind {
    pub fn name(&self) -> &str {
        match self {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading1(_) => "heading_1",
            BlockKind::Heading2(_) => "heading_2",
            BlockKind::Heading3(_) => "heading_3",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::ToDo(_) => "to_do",
            BlockKind::Toggle(_) => "toggle",
            BlockKind::ChildPage(_) => "child_page",
            BlockKind::Image(_) => "image",
            BlockKind::Code(_) => "code",
            BlockKind::Callout(_) => "callout",
            BlockKind::Embed(_) => "embed",
            BlockKind::TableOfContents => "table_of_contents",
            BlockKind::Unsupported(kind) => kind,
        }
    }

    fn decode(kind: &str, payload: Value) -> BlockKind {
        fn parse<T: DeserializeOwned>(payload: Value) -> Option<T> {
            serde_json::from_value(payload).ok()
        }

        let decoded = match kind {
            "paragraph" => parse(payload).map(BlockKind::Paragraph),
            "heading_1" => parse(payload).map(BlockKind::Heading1),
            "heading_2" => parse(payload).map(BlockKind::Heading2),
            "heading_3" => parse(payload).map(BlockKind::Heading3),
            "bulleted_list_item" => parse(payload).map(BlockKind::BulletedListItem),
            "numbered_list_item" => parse(payload).map(BlockKind::NumberedListItem),
            "to_do" => parse(payload).map(BlockKind::ToDo),
            "toggle" => parse(payload).map(BlockKind::Toggle),
            "child_page" => parse(payload).map(BlockKind::ChildPage),
            "image" => parse(payload).map(BlockKind::Image),
            "code" => parse(payload).map(BlockKind::Code),
            "callout" => parse(payload).map(BlockKind::Callout),
            "embed" => parse(payload).map(BlockKind::Embed),
            "table_of_contents" => Some(BlockKind::TableOfContents),
            _ => None,
        };

        decoded.unwrap_or_else(|| {
            tracing::debug!(kind, "Block decoded as unsupported");
            BlockKind::Unsupported(kind.to_string())
        })
    }
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = RawBlock::deserialize(deserializer)?;
        let payload = raw.rest.remove(&raw.kind).unwrap_or(Value::Null);

        Ok(ContentBlock {
            kind: BlockKind::decode(&raw.kind, payload),
            id: raw.id,
            has_children: raw.has_children,
        })
    }
}

// ============================================
// Payloads
// ============================================

/// Paragraphs, headings and list items: just a text run
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Option<Vec<RichText>>,
}

impl TextBlock {
    pub fn new(runs: Vec<RichText>) -> Self {
        Self {
            rich_text: Some(runs),
        }
    }

    /// Literal content of the first span, used for heading anchors
    pub fn first_text(&self) -> Option<&str> {
        self.rich_text
            .as_deref()
            .and_then(|runs| runs.first())
            .map(RichText::content)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToDoBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Option<Vec<RichText>>,
    #[serde(default)]
    pub checked: bool,
}

/// Collapsible section owning an ordered list of child blocks
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToggleBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Option<Vec<RichText>>,
    #[serde(default)]
    pub children: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChildPageBlock {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageBlock {
    #[serde(flatten)]
    pub source: ImageSource,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

/// Where an image lives: uploaded to the CMS, or linked from elsewhere
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    External { external: FileUrl },
    File { file: FileUrl },
}

impl ImageSource {
    pub fn url(&self) -> &str {
        match self {
            ImageSource::External { external } => &external.url,
            ImageSource::File { file } => &file.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

impl ImageBlock {
    /// Caption text, only when a non-empty first caption span exists
    pub fn caption_text(&self) -> Option<&str> {
        self.caption
            .first()
            .map(|run| run.plain_text.as_str())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Option<Vec<RichText>>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalloutBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Option<Vec<RichText>>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

/// Callout icon; only emoji icons are rendered
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Icon {
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmbedBlock {
    #[serde(default)]
    pub url: String,
}

// ============================================
// Inline text
// ============================================

/// One inline span of a text run
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    pub url: String,
}

/// Independent, combinable formatting flags of a span
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default)]
    pub color: Option<String>,
}

impl RichText {
    /// Unformatted span
    pub fn plain(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            plain_text: content.clone(),
            text: Some(TextContent {
                content,
                link: None,
            }),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.annotations.strikethrough = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.annotations.underline = true;
        self
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.href = Some(url.clone());
        if let Some(text) = self.text.as_mut() {
            text.link = Some(Link { url });
        }
        self
    }

    /// Literal content; mentions and equations only carry `plain_text`
    pub fn content(&self) -> &str {
        match &self.text {
            Some(text) => &text.content,
            None => &self.plain_text,
        }
    }

    /// Hyperlink target, if the span carries one
    pub fn link(&self) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(|text| text.link.as_ref())
            .map(|link| link.url.as_str())
            .or(self.href.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> ContentBlock {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_paragraph() {
        let block = decode(json!({
            "object": "block",
            "id": "p1",
            "type": "paragraph",
            "has_children": false,
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "plain_text": "Hello",
                    "text": { "content": "Hello", "link": null },
                    "annotations": { "bold": true, "italic": false, "strikethrough": false,
                                     "underline": false, "code": false, "color": "default" },
                    "href": null
                }]
            }
        }));

        assert_eq!(block.id, "p1");
        match block.kind {
            BlockKind::Paragraph(text) => {
                let runs = text.rich_text.unwrap();
                assert_eq!(runs.len(), 1);
                assert_eq!(runs[0].content(), "Hello");
                assert!(runs[0].annotations.bold);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_decode_legacy_text_field() {
        let block = decode(json!({
            "id": "h1",
            "type": "heading_2",
            "heading_2": { "text": [{ "plain_text": "Intro", "text": { "content": "Intro" } }] }
        }));

        match block.kind {
            BlockKind::Heading2(text) => assert_eq!(text.first_text(), Some("Intro")),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_decode_image_sources() {
        let external = decode(json!({
            "id": "i1",
            "type": "image",
            "image": { "type": "external", "external": { "url": "https://example.com/a.png" }, "caption": [] }
        }));
        let hosted = decode(json!({
            "id": "i2",
            "type": "image",
            "image": { "type": "file", "file": { "url": "https://files.example.com/b.png", "expiry_time": "2024-01-01T00:00:00Z" },
                       "caption": [{ "plain_text": "A cat" }] }
        }));

        match (external.kind, hosted.kind) {
            (BlockKind::Image(a), BlockKind::Image(b)) => {
                assert_eq!(a.source.url(), "https://example.com/a.png");
                assert_eq!(a.caption_text(), None);
                assert_eq!(b.source.url(), "https://files.example.com/b.png");
                assert_eq!(b.caption_text(), Some("A cat"));
            }
            other => panic!("unexpected kinds {:?}", other),
        }
    }

    #[test]
    fn test_decode_toggle_with_children() {
        let block = decode(json!({
            "id": "t1",
            "type": "toggle",
            "has_children": true,
            "toggle": {
                "rich_text": [{ "plain_text": "More", "text": { "content": "More" } }],
                "children": [
                    { "id": "c1", "type": "paragraph", "paragraph": { "rich_text": [] } },
                    { "id": "c2", "type": "divider", "divider": {} }
                ]
            }
        }));

        let children = block.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind_name(), "paragraph");
        assert_eq!(children[1].kind, BlockKind::Unsupported("divider".to_string()));
    }

    #[test]
    fn test_decode_unknown_and_malformed() {
        let unknown = decode(json!({ "id": "u1", "type": "unsupported", "unsupported": {} }));
        assert_eq!(unknown.kind, BlockKind::Unsupported("unsupported".to_string()));

        // An image with neither source shape degrades rather than failing
        let malformed = decode(json!({ "id": "u2", "type": "image", "image": { "caption": [] } }));
        assert_eq!(malformed.kind, BlockKind::Unsupported("image".to_string()));
        assert_eq!(malformed.kind_name(), "image");
    }

    #[test]
    fn test_rich_text_link_sources() {
        let run = RichText::plain("docs").with_link("https://docs.rs");
        assert_eq!(run.link(), Some("https://docs.rs"));

        let mention: RichText = serde_json::from_value(json!({
            "type": "mention",
            "plain_text": "@someone",
            "href": "https://example.com/u"
        }))
        .unwrap();
        assert_eq!(mention.content(), "@someone");
        assert_eq!(mention.link(), Some("https://example.com/u"));
    }
}
