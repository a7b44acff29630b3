use std::cell::{Cell, RefCell};

/// The dom boundary. Everything the pipelines do to the surrounding page
/// goes through this, so tests can substitute a recording double.
///
/// Methods take `&self`: the pipelines hold the page across timers that run
/// concurrently on one thread, so implementations keep their state behind
/// interior mutability.
pub trait Page {
    /// Point the download anchor at `url`, as both its `href` and its
    /// `download` attribute.
    fn set_download(&self, url: &str);
    /// Activate the anchor, starting the file download.
    fn click_download(&self);
    /// Unhide the manual-click fallback link. The fallback is the anchor
    /// itself unless the implementation designates a separate element.
    fn reveal_fallback(&self);
    /// Append one changelog entry: a heading with the tag name, then the
    /// already rendered body html.
    fn append_release(&self, tag_name: &str, html: &str);
}

/// An in-memory page that renders to a static html document.
#[derive(Debug, Default)]
pub struct HtmlDocument {
    download_url: RefCell<Option<String>>,
    clicked: Cell<bool>,
    fallback_visible: Cell<bool>,
    changelog: RefCell<String>,
}

impl HtmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The url the download anchor points at, if one was ever set.
    pub fn download_url(&self) -> Option<String> {
        self.download_url.borrow().clone()
    }

    /// Whether the anchor was activated.
    pub fn clicked(&self) -> bool {
        self.clicked.get()
    }

    pub fn fallback_visible(&self) -> bool {
        self.fallback_visible.get()
    }

    /// The accumulated changelog markup.
    pub fn changelog_html(&self) -> String {
        self.changelog.borrow().clone()
    }

    /// Render the whole page.
    pub fn render(&self) -> String {
        let mut out = String::from(
            "<!doctype html>\n<html>\n<body>\n<p>Your download should begin shortly.</p>\n",
        );
        if let Some(url) = self.download_url() {
            let url = escape(&url);
            let hidden = if self.fallback_visible.get() {
                ""
            } else {
                " hidden"
            };
            out.push_str(&format!(
                "<p{hidden}>If it does not, <a href=\"{url}\" download=\"{url}\">click here</a>.</p>\n"
            ));
        }
        out.push_str("<div>\n");
        out.push_str(&self.changelog.borrow());
        out.push_str("</div>\n</body>\n</html>\n");
        out
    }
}

impl Page for HtmlDocument {
    fn set_download(&self, url: &str) {
        *self.download_url.borrow_mut() = Some(url.to_string());
    }

    fn click_download(&self) {
        self.clicked.set(true);
    }

    fn reveal_fallback(&self) {
        self.fallback_visible.set(true);
    }

    fn append_release(&self, tag_name: &str, html: &str) {
        let mut changelog = self.changelog.borrow_mut();
        changelog.push_str(&format!("<h2><b>{}</b></h2>\n", escape(tag_name)));
        changelog.push_str(&format!("<div>{html}</div>\n"));
    }
}

// Rendered bodies come back from the render endpoint as html and are
// inserted verbatim; everything else we interpolate gets escaped.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_release_writes_heading_then_body() {
        let page = HtmlDocument::new();
        page.append_release("v1", "<p>hello</p>");
        assert_eq!(
            page.changelog_html(),
            "<h2><b>v1</b></h2>\n<div><p>hello</p></div>\n"
        );
    }

    #[test]
    fn entries_accumulate_in_append_order() {
        let page = HtmlDocument::new();
        page.append_release("v2", "<p>two</p>");
        page.append_release("v1", "<p>one</p>");
        let changelog = page.changelog_html();
        assert!(changelog.find("v2").unwrap() < changelog.find("v1").unwrap());
    }

    #[test]
    fn tag_names_are_escaped_rendered_bodies_are_not() {
        let page = HtmlDocument::new();
        page.append_release("v1<script>", "<p>fine</p>");
        let changelog = page.changelog_html();
        assert!(changelog.contains("v1&lt;script&gt;"));
        assert!(changelog.contains("<p>fine</p>"));
    }

    #[test]
    fn fallback_stays_hidden_until_revealed() {
        let page = HtmlDocument::new();
        page.set_download("https://example.com/app.zip");
        assert!(page.render().contains("<p hidden>"));

        page.reveal_fallback();
        let rendered = page.render();
        assert!(!rendered.contains("<p hidden>"));
        assert!(rendered.contains(r#"href="https://example.com/app.zip""#));
        assert!(rendered.contains(r#"download="https://example.com/app.zip""#));
    }

    #[test]
    fn page_without_download_has_no_anchor() {
        let page = HtmlDocument::new();
        assert!(!page.render().contains("<a "));
        assert!(!page.clicked());
        assert!(!page.fallback_visible());
    }
}
