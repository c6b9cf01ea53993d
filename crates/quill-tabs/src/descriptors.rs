//! Option and event tables for the tab set
//!
//! Wire names and defaults follow the client-side `tabs` widget.

use quill_core::{DefaultValue, EventDescriptor, OptionDescriptor, OptionKind};

pub static TABS_OPTIONS: &[OptionDescriptor] = &[
    // Additional Ajax options used when loading remote tab content
    OptionDescriptor::new("AjaxOptions", "ajaxOptions", OptionKind::Json, DefaultValue::Null),
    // Cache remote content after the first load
    OptionDescriptor::new("Cache", "cache", OptionKind::Bool, DefaultValue::Bool(false)),
    // Allow the selected tab to be unselected by clicking it again
    OptionDescriptor::new(
        "Collapsible",
        "collapsible",
        OptionKind::Bool,
        DefaultValue::Bool(false),
    ),
    // Cookie plugin options for remembering the last selected tab
    OptionDescriptor::new("Cookie", "cookie", OptionKind::Json, DefaultValue::Null),
    OptionDescriptor::new(
        "Disabled",
        "disabled",
        OptionKind::BoolOrIndexList,
        DefaultValue::Bool(false),
    ),
    // Client event that selects a tab
    OptionDescriptor::new("Event", "event", OptionKind::Text, DefaultValue::Str("click")),
    // Show/hide animation
    OptionDescriptor::new("Fx", "fx", OptionKind::Json, DefaultValue::Null),
    OptionDescriptor::new("IdPrefix", "idPrefix", OptionKind::Text, DefaultValue::Str("ui-tabs-")),
    OptionDescriptor::new(
        "PanelTemplate",
        "panelTemplate",
        OptionKind::Text,
        DefaultValue::Str("<div></div>"),
    )
    .html_encoded(),
    // -1 leaves every tab unselected
    OptionDescriptor::new("Selected", "selected", OptionKind::Int, DefaultValue::Int(0)),
    OptionDescriptor::new(
        "Spinner",
        "spinner",
        OptionKind::Text,
        DefaultValue::Str("<em>Loading&#8230;</em>"),
    )
    .html_encoded(),
    OptionDescriptor::new(
        "TabTemplate",
        "tabTemplate",
        OptionKind::Text,
        DefaultValue::Str("<li><a href=\"#{href}\"><span>#{label}</span></a></li>"),
    )
    .html_encoded(),
];

pub static TABS_EVENTS: &[EventDescriptor] = &[
    EventDescriptor::new("create"),
    EventDescriptor::new("select")
        .postback("SelectedTabChanged")
        .with_argument("ui.index"),
    EventDescriptor::new("show"),
    EventDescriptor::new("load"),
    EventDescriptor::new("add"),
    EventDescriptor::new("remove"),
    EventDescriptor::new("enable"),
    EventDescriptor::new("disable"),
];
