use quill_core::{Node, Widget};
use quill_tabs::{TabPage, Tabs};

/// Values of `attr="..."` in document order
fn attribute_values(html: &str, attr: &str) -> Vec<String> {
    let needle = format!("{}=\"", attr);
    html.match_indices(&needle)
        .filter_map(|(start, _)| {
            let from = start + needle.len();
            html[from..].find('"').map(|end| html[from..from + end].to_string())
        })
        .collect()
}

fn nav_targets(html: &str) -> Vec<String> {
    attribute_values(html, "href")
        .into_iter()
        .map(|href| href.trim_start_matches('#').to_string())
        .collect()
}

fn panel_ids(html: &str) -> Vec<String> {
    // The first id is the container
    attribute_values(html, "id").into_iter().skip(1).collect()
}

#[test]
fn test_navigation_matches_panels_after_mutations() {
    let mut tabs = Tabs::new("tabs1").unwrap();
    let mut expected: Vec<String> = Vec::new();

    // Deterministic mix of appends and removals
    for step in 0..40usize {
        if step % 3 == 2 && !expected.is_empty() {
            let victim = expected.remove((step * 7) % expected.len());
            tabs.remove_page(&victim).unwrap();
        } else {
            let id = format!("p{}", step);
            let body = Node::element("p").with_child(Node::text(format!("Body {}", step)));
            tabs.add_page(
                TabPage::new(id.clone(), format!("Page {}", step))
                    .unwrap()
                    .with_content(body),
            );
            expected.push(id);
        }

        tabs.compose().unwrap();
        let html = tabs.render_to_string().unwrap();

        assert_eq!(nav_targets(&html), expected);
        assert_eq!(panel_ids(&html), expected);
    }
}

#[test]
fn test_rendering_is_idempotent() {
    let mut tabs = Tabs::new("tabs1").unwrap();
    tabs.add_page(TabPage::new("a", "Alpha <1>").unwrap().with_content("text & more"));
    tabs.add_page(TabPage::generated("Generated"));
    tabs.set_css_class("tabset");

    tabs.compose().unwrap();
    let first = tabs.render_to_string().unwrap();
    tabs.compose().unwrap();
    let second = tabs.render_to_string().unwrap();

    assert_eq!(first, second);
    assert!(first.contains("Alpha &lt;1&gt;"));
    assert!(first.contains("text &amp; more"));
}

#[test]
fn test_render_reflects_current_pages_only() {
    let mut tabs = Tabs::new("tabs1").unwrap();
    tabs.add_page(TabPage::new("old", "Old").unwrap());
    tabs.compose().unwrap();
    let before = tabs.render_to_string().unwrap();
    assert!(before.contains("#old"));

    tabs.clear_pages();
    tabs.add_page(TabPage::new("new", "New").unwrap());
    tabs.compose().unwrap();
    let after = tabs.render_to_string().unwrap();

    assert!(!after.contains("old"));
    assert_eq!(nav_targets(&after), vec!["new"]);
}

#[test]
fn test_init_script_for_tabs() {
    let mut tabs = Tabs::new("tabs1").unwrap();
    tabs.set_collapsible(true).unwrap();

    let script = Widget::init_script(&tabs)
        .unwrap()
        .to_script(&Default::default())
        .unwrap();

    assert!(script.contains(r#".tabs({"collapsible":true})"#));
    assert!(script.contains(r#"__doPostBack("tabs1", "select" + ":" + ui.index)"#));
}
