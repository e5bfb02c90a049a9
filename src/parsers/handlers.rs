use crate::providers::{MediaType, Metadata, Params};

/// Renders markup for a resolved URL
///
/// Closures with the same shape implement this trait, so callers can pass a
/// one-off renderer without declaring a type.
pub trait Handler: Send + Sync {
    fn render(&self, url: &str, metadata: &Metadata, params: &Params) -> String;
}

impl<F> Handler for F
where
    F: Fn(&str, &Metadata, &Params) -> String + Send + Sync,
{
    fn render(&self, url: &str, metadata: &Metadata, params: &Params) -> String {
        self(url, metadata, params)
    }
}

/// Richest representation: anchor for links, linked image for photos, the
/// provider's `html` for everything else
#[derive(Debug, Clone, Copy, Default)]
pub struct FullHandler;

impl Handler for FullHandler {
    fn render(&self, url: &str, metadata: &Metadata, params: &Params) -> String {
        match metadata.media_type() {
            Some(MediaType::Link) => anchor(metadata),
            Some(MediaType::Photo) => {
                let (href, title) = (metadata.url(), metadata.title());
                format!(
                    "<a href=\"{href}\" title=\"{title}\"><img alt=\"{title}\" src=\"{href}\" /></a>"
                )
            }
            _ => match metadata.html() {
                Some(html) => html,
                None => InlineHandler.render(url, metadata, params),
            },
        }
    }
}

/// Compact anchor regardless of resource type
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineHandler;

impl Handler for InlineHandler {
    fn render(&self, _url: &str, metadata: &Metadata, _params: &Params) -> String {
        anchor(metadata)
    }
}

fn anchor(metadata: &Metadata) -> String {
    let (href, title) = (metadata.url(), metadata.title());
    format!("<a href=\"{href}\" title=\"{title}\">{title}</a>")
}

/// Plain hyperlink for a URL without metadata
///
/// `href` defaults to the URL; attributes render sorted by name.
pub fn urlize(url: &str, attributes: &Params) -> String {
    let mut attributes = attributes.clone();
    attributes
        .entry("href".to_string())
        .or_insert_with(|| url.to_string());

    let rendered: Vec<String> = attributes
        .iter()
        .map(|(key, value)| format!("{key}=\"{value}\""))
        .collect();
    format!("<a {}>{url}</a>", rendered.join(" "))
}
