//! Tab set widget
//!
//! Owns the ordered page collection, the instance's option values and its
//! postback binding. The host drives it through `compose` and `render` once
//! per request cycle.

use serde_json::Value;
use std::any::Any;
use std::fmt;

use quill_core::markup::{is_valid_attribute_name, is_valid_element_id};
use quill_core::{
    Disabled, EventRegistry, HtmlWriter, InitScript, Lifecycle, Notification, OptionRegistry,
    OptionSet, OptionValue, PostbackBinder, RoundTrip, Widget, WidgetError, WidgetState,
};

use crate::descriptors::{TABS_EVENTS, TABS_OPTIONS};
use crate::error::TabsError;
use crate::page::TabPage;
use crate::Result;

const WIDGET_NAME: &str = "tabs";

pub struct Tabs {
    /// Root element id and postback target
    id: String,
    css_class: Option<String>,
    /// Extra container attributes, in insertion order
    attributes: Vec<(String, String)>,
    /// Live page collection
    pages: Vec<TabPage>,
    /// Children rebuilt from `pages` by the last `compose`
    composed: Vec<TabPage>,
    options: OptionSet,
    binder: PostbackBinder,
    lifecycle: Lifecycle,
}

impl Tabs {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !is_valid_element_id(&id) {
            return Err(WidgetError::InvalidElementId(id).into());
        }

        tracing::debug!(widget_id = %id, "Constructed tab set");

        Ok(Self {
            options: OptionSet::new(OptionRegistry::new(TABS_OPTIONS)),
            binder: PostbackBinder::new(id.clone(), EventRegistry::new(TABS_EVENTS)),
            lifecycle: Lifecycle::new(id.clone()),
            id,
            css_class: None,
            attributes: Vec::new(),
            pages: Vec::new(),
            composed: Vec::new(),
        })
    }

    // ── Pages ────────────────────────────────────────────────────────────

    pub fn pages(&self) -> &[TabPage] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, page_id: &str) -> Option<&TabPage> {
        self.pages.iter().find(|p| p.id() == page_id)
    }

    /// Mutable access to the first page with `page_id`. Only a successful
    /// lookup invalidates the composition.
    pub fn page_mut(&mut self, page_id: &str) -> Result<&mut TabPage> {
        let index = self
            .pages
            .iter()
            .position(|p| p.id() == page_id)
            .ok_or_else(|| TabsError::PageNotFound(page_id.to_string()))?;

        self.lifecycle.invalidate();
        Ok(&mut self.pages[index])
    }

    /// Append a page. Ids are not deduplicated.
    pub fn add_page(&mut self, page: TabPage) {
        tracing::debug!(widget_id = %self.id, page_id = %page.id(), "Added tab page");
        self.pages.push(page);
        self.lifecycle.invalidate();
    }

    /// Insert a page at `index`, clamped to the end of the collection
    pub fn insert_page(&mut self, index: usize, page: TabPage) {
        let index = index.min(self.pages.len());
        tracing::debug!(widget_id = %self.id, page_id = %page.id(), index, "Inserted tab page");
        self.pages.insert(index, page);
        self.lifecycle.invalidate();
    }

    /// Remove the first page with `page_id`
    pub fn remove_page(&mut self, page_id: &str) -> Result<TabPage> {
        let index = self
            .pages
            .iter()
            .position(|p| p.id() == page_id)
            .ok_or_else(|| TabsError::PageNotFound(page_id.to_string()))?;

        let page = self.pages.remove(index);
        self.lifecycle.invalidate();

        tracing::debug!(widget_id = %self.id, page_id = %page_id, "Removed tab page");
        Ok(page)
    }

    pub fn clear_pages(&mut self) {
        self.pages.clear();
        self.lifecycle.invalidate();
    }

    // ── Container ────────────────────────────────────────────────────────

    pub fn set_css_class(&mut self, class: impl Into<String>) {
        self.css_class = Some(class.into());
    }

    /// Set an extra container attribute, replacing any earlier value. `id`
    /// and `class` are owned by the widget and cannot be set here; invalid
    /// attribute names are dropped.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if name.eq_ignore_ascii_case("id") || name.eq_ignore_ascii_case("class") {
            tracing::warn!(widget_id = %self.id, attribute = %name, "Ignoring reserved attribute");
            return;
        }
        if !is_valid_attribute_name(&name) {
            tracing::warn!(
                widget_id = %self.id,
                attribute = %name,
                "Ignoring invalid attribute name"
            );
            return;
        }

        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    // ── Options ──────────────────────────────────────────────────────────

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Set an option by wire or property name from an untyped value
    pub fn set_option(&mut self, name: &str, value: Value) -> Result<()> {
        Ok(self.options.set_json(name, value)?)
    }

    pub fn clear_option(&mut self, name: &str) -> Result<()> {
        self.options.clear(name)?;
        Ok(())
    }

    pub fn set_ajax_options(&mut self, ajax_options: Value) -> Result<()> {
        Ok(self.options.set("ajaxOptions", OptionValue::Json(ajax_options))?)
    }

    pub fn set_cache(&mut self, cache: bool) -> Result<()> {
        Ok(self.options.set("cache", OptionValue::Bool(cache))?)
    }

    pub fn set_collapsible(&mut self, collapsible: bool) -> Result<()> {
        Ok(self.options.set("collapsible", OptionValue::Bool(collapsible))?)
    }

    pub fn set_cookie(&mut self, cookie: Value) -> Result<()> {
        Ok(self.options.set("cookie", OptionValue::Json(cookie))?)
    }

    /// `true`/`false` for the whole set, or indices of the tabs to disable
    pub fn set_disabled(&mut self, disabled: impl Into<Disabled>) -> Result<()> {
        Ok(self
            .options
            .set("disabled", OptionValue::Disabled(disabled.into()))?)
    }

    pub fn set_event(&mut self, event: impl Into<String>) -> Result<()> {
        Ok(self.options.set("event", OptionValue::Text(event.into()))?)
    }

    pub fn set_fx(&mut self, fx: Value) -> Result<()> {
        Ok(self.options.set("fx", OptionValue::Json(fx))?)
    }

    pub fn set_id_prefix(&mut self, prefix: impl Into<String>) -> Result<()> {
        Ok(self.options.set("idPrefix", OptionValue::Text(prefix.into()))?)
    }

    pub fn set_panel_template(&mut self, template: impl Into<String>) -> Result<()> {
        Ok(self
            .options
            .set("panelTemplate", OptionValue::Text(template.into()))?)
    }

    /// Zero-based index of the initially selected tab; -1 selects none
    pub fn set_selected(&mut self, index: i64) -> Result<()> {
        Ok(self.options.set("selected", OptionValue::Int(index))?)
    }

    pub fn set_spinner(&mut self, spinner: impl Into<String>) -> Result<()> {
        Ok(self.options.set("spinner", OptionValue::Text(spinner.into()))?)
    }

    pub fn set_tab_template(&mut self, template: impl Into<String>) -> Result<()> {
        Ok(self
            .options
            .set("tabTemplate", OptionValue::Text(template.into()))?)
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// Handler for every postback notification raised by this tab set
    pub fn on_notification<F>(&mut self, handler: F)
    where
        F: FnMut(&Notification) + 'static,
    {
        self.binder.on_notification(handler);
    }

    /// Handler for `SelectedTabChanged`, raised when a client `select` posts back
    pub fn on_selected_tab_changed<F>(&mut self, handler: F)
    where
        F: FnMut(&Notification) + 'static,
    {
        self.binder.on_event("select", handler);
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Discard the composed children and rebuild them from `pages`
    pub fn compose(&mut self) -> quill_core::Result<()> {
        self.composed.clear();
        self.composed.extend(self.pages.iter().cloned());
        self.lifecycle.composed()?;

        tracing::debug!(
            widget_id = %self.id,
            page_count = self.composed.len(),
            "Composed tab pages"
        );
        Ok(())
    }

    /// Render into a fresh string
    pub fn render_to_string(&mut self) -> quill_core::Result<String> {
        let mut out = String::new();
        Widget::render(self, &mut out)?;
        Ok(out)
    }

    fn write_markup(&self, writer: &mut HtmlWriter) {
        writer.write_begin_tag("div");
        writer.write_attribute("id", &self.id);
        if let Some(class) = &self.css_class {
            writer.write_attribute("class", class);
        }
        for (name, value) in &self.attributes {
            writer.write_attribute(name, value);
        }
        writer.close_begin_tag();

        // Entry i and panel i come from the same composed page
        writer.write_full_begin_tag("ul");
        for page in &self.composed {
            writer.write_full_begin_tag("li");
            page.render_anchor(writer);
            writer.write_end_tag("li");
        }
        writer.write_end_tag("ul");

        for page in &self.composed {
            page.render_panel(writer);
        }

        writer.write_end_tag("div");
    }

    /// After a `select` round trip, keep the chosen tab selected on the
    /// re-rendered page.
    fn track_selection(&mut self, notifications: &[Notification]) {
        let index = notifications
            .iter()
            .filter(|n| n.event == "select")
            .find_map(|n| n.argument.as_deref()?.parse::<i64>().ok());

        if let Some(index) = index {
            if let Err(e) = self.set_selected(index) {
                tracing::warn!(widget_id = %self.id, error = %e, "Failed to track selected tab");
            }
        }
    }
}

impl Widget for Tabs {
    fn id(&self) -> &str {
        &self.id
    }

    fn widget_name(&self) -> &'static str {
        WIDGET_NAME
    }

    fn state(&self) -> WidgetState {
        self.lifecycle.state()
    }

    fn compose(&mut self) -> quill_core::Result<()> {
        Tabs::compose(self)
    }

    fn render(&mut self, sink: &mut dyn fmt::Write) -> quill_core::Result<()> {
        self.lifecycle.begin_render()?;

        let mut writer = HtmlWriter::new();
        self.write_markup(&mut writer);
        sink.write_str(writer.as_str())?;
        Ok(())
    }

    fn init_script(&self) -> quill_core::Result<InitScript> {
        Ok(InitScript {
            widget: WIDGET_NAME,
            element_id: self.id.clone(),
            payload: self.options.encode()?,
            postback_events: self.binder.bound_events().into_iter().copied().collect(),
        })
    }

    fn deliver(&mut self, round_trip: &RoundTrip) -> Vec<Notification> {
        let notifications = self.binder.deliver(round_trip);
        self.track_selection(&notifications);
        notifications
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Debug for Tabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tabs")
            .field("id", &self.id)
            .field("pages", &self.pages.len())
            .field("state", &self.lifecycle.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_pages() -> Tabs {
        let mut tabs = Tabs::new("tabs1").unwrap();
        tabs.add_page(TabPage::new("p1", "One").unwrap());
        tabs.add_page(TabPage::new("p2", "Two").unwrap());
        tabs
    }

    #[test]
    fn test_render_two_pages() {
        let mut tabs = two_pages();
        tabs.compose().unwrap();

        assert_eq!(
            tabs.render_to_string().unwrap(),
            "<div id=\"tabs1\"><ul>\
             <li><a href=\"#p1\">One</a></li>\
             <li><a href=\"#p2\">Two</a></li>\
             </ul><div id=\"p1\"></div><div id=\"p2\"></div></div>"
        );
        assert!(tabs.init_script().unwrap().payload.is_empty());
    }

    #[test]
    fn test_render_before_compose_writes_nothing() {
        let mut tabs = two_pages();
        let mut out = String::new();
        let err = Widget::render(&mut tabs, &mut out).unwrap_err();
        assert!(matches!(err, WidgetError::RenderBeforeCompose(id) if id == "tabs1"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_mutation_invalidates_composition() {
        let mut tabs = two_pages();
        tabs.compose().unwrap();
        tabs.add_page(TabPage::new("p3", "Three").unwrap());
        assert_eq!(tabs.state(), WidgetState::Initialized);
        assert!(tabs.render_to_string().is_err());

        tabs.compose().unwrap();
        assert!(tabs.render_to_string().unwrap().contains("href=\"#p3\""));
    }

    #[test]
    fn test_remove_page() {
        let mut tabs = two_pages();
        let removed = tabs.remove_page("p1").unwrap();
        assert_eq!(removed.title, "One");
        assert_eq!(tabs.len(), 1);

        assert!(matches!(
            tabs.remove_page("p1"),
            Err(TabsError::PageNotFound(id)) if id == "p1"
        ));
    }

    #[test]
    fn test_duplicate_ids_kept() {
        let mut tabs = Tabs::new("tabs1").unwrap();
        tabs.add_page(TabPage::new("p1", "First").unwrap());
        tabs.add_page(TabPage::new("p1", "Second").unwrap());
        tabs.compose().unwrap();

        let html = tabs.render_to_string().unwrap();
        assert_eq!(html.matches("href=\"#p1\"").count(), 2);

        // Removal takes the first match only
        assert_eq!(tabs.remove_page("p1").unwrap().title, "First");
        assert_eq!(tabs.pages()[0].title, "Second");
    }

    #[test]
    fn test_insert_page_clamps() {
        let mut tabs = two_pages();
        tabs.insert_page(0, TabPage::new("p0", "Zero").unwrap());
        tabs.insert_page(99, TabPage::new("p9", "Last").unwrap());

        let ids: Vec<_> = tabs.pages().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p9"]);
    }

    #[test]
    fn test_page_mut() {
        let mut tabs = two_pages();
        tabs.compose().unwrap();
        tabs.page_mut("p2").unwrap().set_title("Deux");
        assert_eq!(tabs.state(), WidgetState::Initialized);

        tabs.compose().unwrap();
        assert!(tabs.render_to_string().unwrap().contains(">Deux</a>"));
        assert!(matches!(tabs.page_mut("zz"), Err(TabsError::PageNotFound(_))));
    }

    #[test]
    fn test_container_attributes() {
        let mut tabs = Tabs::new("tabs1").unwrap();
        tabs.set_css_class("main-tabs");
        tabs.set_attribute("data-role", "nav");
        tabs.set_attribute("data-role", "tabs");
        tabs.set_attribute("id", "hijack");
        tabs.compose().unwrap();

        let html = tabs.render_to_string().unwrap();
        assert!(html.starts_with(
            "<div id=\"tabs1\" class=\"main-tabs\" data-role=\"tabs\"><ul></ul>"
        ));
        assert!(!html.contains("hijack"));
    }

    #[test]
    fn test_invalid_attribute_name_dropped() {
        let mut tabs = Tabs::new("tabs1").unwrap();
        tabs.set_attribute("x><script>alert(1)</script><i", "v");
        tabs.set_attribute("data role", "nav");
        tabs.compose().unwrap();

        let html = tabs.render_to_string().unwrap();
        assert_eq!(html, "<div id=\"tabs1\"><ul></ul></div>");
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_page_mut_missing_keeps_composition() {
        let mut tabs = two_pages();
        tabs.compose().unwrap();

        assert!(matches!(
            tabs.page_mut("zz"),
            Err(TabsError::PageNotFound(id)) if id == "zz"
        ));
        assert_eq!(tabs.state(), WidgetState::ChildrenComposed);
        assert!(tabs.render_to_string().is_ok());
    }

    #[test]
    fn test_collapsible_and_selected_payload() {
        let mut tabs = two_pages();
        tabs.set_collapsible(true).unwrap();
        tabs.set_selected(-1).unwrap();

        let payload = tabs.init_script().unwrap().payload;
        assert_eq!(payload.to_json(), json!({"collapsible": true, "selected": -1}));
    }

    #[test]
    fn test_disabled_option() {
        let mut tabs = two_pages();

        tabs.set_disabled(true).unwrap();
        assert_eq!(tabs.init_script().unwrap().payload.get("disabled"), Some(&json!(true)));

        tabs.set_disabled(vec![0, 2]).unwrap();
        assert_eq!(tabs.init_script().unwrap().payload.get("disabled"), Some(&json!([0, 2])));

        let err = tabs.set_option("Disabled", json!("all")).unwrap_err();
        assert!(matches!(
            err,
            TabsError::Widget(WidgetError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn test_spinner_escaping_consistent() {
        let mut tabs = Tabs::new("tabs1").unwrap();
        tabs.set_spinner("&lt;em&gt;Loading&amp;#8230;&lt;/em&gt;").unwrap();

        let payload = tabs.init_script().unwrap().payload;
        assert_eq!(payload.get("spinner"), Some(&json!("<em>Loading&#8230;</em>")));
    }

    #[test]
    fn test_select_postback() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let changes = Rc::new(RefCell::new(Vec::new()));
        let mut tabs = two_pages();
        let sink = Rc::clone(&changes);
        tabs.on_selected_tab_changed(move |n| sink.borrow_mut().push(n.argument.clone()));

        let trip = RoundTrip::parse("tabs1", "select:1;select:1;select:0");
        let raised = Widget::deliver(&mut tabs, &trip);

        assert_eq!(raised.len(), 1);
        assert_eq!(*changes.borrow(), vec![Some("1".to_string())]);
        assert_eq!(tabs.option("selected"), Some(&OptionValue::Int(1)));
    }

    #[test]
    fn test_init_script_binds_select() {
        let tabs = two_pages();
        let script = tabs.init_script().unwrap();
        let bound: Vec<_> = script.postback_events.iter().map(|e| e.wire_name).collect();
        assert_eq!(bound, vec!["select"]);
        assert_eq!(script.widget, "tabs");
        assert_eq!(script.element_id, "tabs1");
    }
}
