//! Markdown rendering for user content.
//!
//! Text is rendered with CommonMark plus tables. Raw HTML in the source is
//! escaped rather than passed through, and the resulting HTML goes through an
//! allow-list sanitizer before it leaves this module.

use ammonia::Builder;
use pulldown_cmark::{html, Event, Options, Parser};

/// Class list applied to rendered tables in posts and threads.
pub const TABLE_CLASSES: &str = "table table-striped table-bordered table-sm";

/// Class list applied to rendered images in threads.
pub const IMAGE_CLASSES: &str = "img-fluid img-thumbnail";

/// Which kind of content is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderProfile {
    /// Board descriptions and bodies. No extra classes.
    Board,
    /// Posts and comments. Tables are styled.
    Post,
    /// Thread bodies. Tables and images are styled.
    Thread,
}

impl RenderProfile {
    fn style_tables(self) -> bool {
        matches!(self, RenderProfile::Post | RenderProfile::Thread)
    }

    fn style_images(self) -> bool {
        matches!(self, RenderProfile::Thread)
    }
}

/// Render markdown to sanitized HTML.
///
/// # Examples
///
/// ```
/// use agora::markdown::{render_to_html, RenderProfile};
///
/// let html = render_to_html("**hi** <script>x()</script>", RenderProfile::Post);
/// assert!(html.contains("<strong>hi</strong>"));
/// assert!(!html.contains("<script"));
/// ```
pub fn render_to_html(text: &str, profile: RenderProfile) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut rendered = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut rendered, parser);

    sanitizer(profile).clean(&rendered).to_string()
}

fn sanitizer(profile: RenderProfile) -> Builder<'static> {
    let mut builder = Builder::default();
    if profile.style_tables() {
        builder.set_tag_attribute_value("table", "class", TABLE_CLASSES);
    }
    if profile.style_images() {
        builder.set_tag_attribute_value("img", "class", IMAGE_CLASSES);
    }
    builder
}
