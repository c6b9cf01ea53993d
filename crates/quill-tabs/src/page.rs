//! Tab page
//!
//! One page is one navigation entry plus one content panel. The panel's root
//! element carries the page id, and the navigation anchor points at it.

use quill_core::markup::is_valid_element_id;
use quill_core::{HtmlWriter, Node, WidgetError};
use uuid::Uuid;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabPage {
    /// Element id of the content panel; fixed for the page's lifetime
    id: String,
    /// Navigation label
    pub title: String,
    /// Content rendered inside the panel
    pub content: Vec<Node>,
}

impl TabPage {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !is_valid_element_id(&id) {
            return Err(WidgetError::InvalidElementId(id).into());
        }

        Ok(Self {
            id,
            title: title.into(),
            content: Vec::new(),
        })
    }

    /// Page with a generated id
    pub fn generated(title: impl Into<String>) -> Self {
        Self {
            id: format!("tab-{}", Uuid::new_v4().simple()),
            title: title.into(),
            content: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_content(mut self, node: impl Into<Node>) -> Self {
        self.content.push(node.into());
        self
    }

    pub fn push_content(&mut self, node: impl Into<Node>) {
        self.content.push(node.into());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// `<a href="#id">title</a>`
    pub(crate) fn render_anchor(&self, writer: &mut HtmlWriter) {
        writer.write_begin_tag("a");
        writer.write_attribute("href", &format!("#{}", self.id));
        writer.close_begin_tag();
        writer.write_text(&self.title);
        writer.write_end_tag("a");
    }

    /// `<div id="id">content</div>`
    pub(crate) fn render_panel(&self, writer: &mut HtmlWriter) {
        writer.write_begin_tag("div");
        writer.write_attribute("id", &self.id);
        writer.close_begin_tag();
        for node in &self.content {
            node.render(writer);
        }
        writer.write_end_tag("div");
    }
}
