//! Markup primitives
//!
//! `HtmlWriter` is the buffer every widget renders into; `Node` is the small
//! tree used for content regions. Text and attribute values are escaped on the
//! way in, raw fragments are written as-is.

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode named (`amp`, `lt`, `gt`, `quot`, `apos`, `nbsp`) and numeric
/// character references. Anything that does not parse is kept literally.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .get(1..)
            .and_then(|body| body.find(';').filter(|&end| end <= 10).map(|end| (body, end)))
            .and_then(|(body, end)| decode_reference(&body[..end]).map(|ch| (ch, end + 2)));

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Canonical form of a markup fragment carried in an option value.
///
/// A fragment holding raw tags is already markup and is kept verbatim. A
/// fragment with no raw `<` but with escaped tags (`&lt;div&gt;`) is an
/// encoded fragment and is decoded exactly once. Defaults and overrides go
/// through the same function, so the same fragment never ends up escaped
/// twice or not at all.
pub fn normalize_fragment(fragment: &str) -> String {
    if fragment.contains('<') || !fragment.to_ascii_lowercase().contains("&lt;") {
        return fragment.to_string();
    }
    decode_entities(fragment)
}

/// An id usable both as an element `id` and as a `#fragment` target
pub fn is_valid_element_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// An attribute name that cannot break out of the begin tag
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// A tag name such as `div`, `h2` or `my-panel`
pub fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Buffered markup writer
#[derive(Debug, Default)]
pub struct HtmlWriter {
    buf: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<tag` without the closing `>`, so attributes can follow
    pub fn write_begin_tag(&mut self, tag: &str) {
        self.buf.push('<');
        self.buf.push_str(tag);
    }

    /// ` name="value"`; names that are not valid attribute names are skipped
    pub fn write_attribute(&mut self, name: &str, value: &str) {
        if !is_valid_attribute_name(name) {
            tracing::warn!(attribute = %name, "Skipping invalid attribute name");
            return;
        }
        self.buf.push(' ');
        self.buf.push_str(name);
        self.buf.push_str("=\"");
        self.buf.push_str(&escape_html(value));
        self.buf.push('"');
    }

    pub fn close_begin_tag(&mut self) {
        self.buf.push('>');
    }

    /// `<tag>`
    pub fn write_full_begin_tag(&mut self, tag: &str) {
        self.write_begin_tag(tag);
        self.close_begin_tag();
    }

    pub fn write_end_tag(&mut self, tag: &str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    pub fn write_text(&mut self, text: &str) {
        self.buf.push_str(&escape_html(text));
    }

    pub fn write_raw(&mut self, markup: &str) {
        self.buf.push_str(markup);
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

/// Content tree for a page's body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Escaped text
    Text(String),
    /// Trusted markup, written verbatim
    Raw(String),
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn raw(markup: impl Into<String>) -> Self {
        Node::Raw(markup.into())
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute; ignored on text and raw nodes, and dropped when the
    /// name is not a valid attribute name
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if !is_valid_attribute_name(&name) {
            tracing::warn!(attribute = %name, "Dropping invalid attribute name");
            return self;
        }
        if let Node::Element { attributes, .. } = &mut self {
            attributes.push((name, value.into()));
        }
        self
    }

    /// Append a child; ignored on text and raw nodes
    pub fn with_child(mut self, child: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn render(&self, writer: &mut HtmlWriter) {
        match self {
            Node::Text(text) => writer.write_text(text),
            Node::Raw(markup) => writer.write_raw(markup),
            Node::Element {
                tag,
                attributes,
                children,
            } => {
                // An unusable tag contributes only its children
                if !is_valid_tag_name(tag) {
                    tracing::warn!(tag = %tag, "Rendering children of element with invalid tag");
                    for child in children {
                        child.render(writer);
                    }
                    return;
                }

                writer.write_begin_tag(tag);
                for (name, value) in attributes {
                    writer.write_attribute(name, value);
                }
                writer.close_begin_tag();

                if VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str()) {
                    return;
                }

                for child in children {
                    child.render(writer);
                }
                writer.write_end_tag(tag);
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut writer = HtmlWriter::new();
        self.render(&mut writer);
        writer.into_string()
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::text(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}
