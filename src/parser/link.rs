//! Cross-reference classification.
//!
//! Anchors in the corpus point either at another documented page/member
//! (`foo.html#v:bar`) or at the outside world. A link whose display text is
//! just the referenced name is a type link; anything else is kept as an
//! external link with a fully resolved URL.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::model::{Link, LinkKind};

const CORPUS_BASE: &str = "https://tweaked.cc";

static RE_CORPUS_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/?([^/]+)\.html(?:#(v|ty):(.+))?").unwrap());

/// Classify `href`/`display` into a type link or an external link.
///
/// `base_path` is the page's subdirectory within the corpus (`module`,
/// `peripheral`), used to resolve relative hrefs.
pub fn resolve(base_path: &str, href: &str, display: &str) -> Link {
    let display = display.replace(':', ".");

    if let Some(caps) = RE_CORPUS_HREF.captures(href) {
        let mut target = caps[1].to_string();
        let member = caps.get(3).map(|m| m.as_str().replace(':', "."));

        if let Some(ref member) = member {
            target.push('.');
            target.push_str(member);
        }

        let names_the_target = display.eq_ignore_ascii_case(&target)
            || member
                .as_deref()
                .is_some_and(|m| display.eq_ignore_ascii_case(m));

        if names_the_target {
            return Link {
                kind: LinkKind::TypeLink,
                target,
                display,
            };
        }
    }

    Link {
        kind: LinkKind::ExternalLink,
        target: absolute_url(base_path, href),
        display,
    }
}

fn absolute_url(base_path: &str, href: &str) -> String {
    if let Ok(url) = Url::parse(href) {
        return url.to_string();
    }

    Url::parse(CORPUS_BASE)
        .and_then(|base| base.join(&format!("{base_path}/")))
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        // CORPUS_BASE is well-formed; a join failure leaves the raw href
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_anchor_with_matching_display_is_a_type_link() {
        let link = resolve("module", "foo.html#v:bar", "foo.bar");
        assert_eq!(link.kind, LinkKind::TypeLink);
        assert_eq!(link.target, "foo.bar");
        assert_eq!(link.display, "foo.bar");
    }

    #[test]
    fn member_only_display_is_a_type_link() {
        let link = resolve("module", "foo.html#v:bar", "bar");
        assert_eq!(link.kind, LinkKind::TypeLink);
        assert_eq!(link.target, "foo.bar");
    }

    #[test]
    fn colon_display_is_normalized() {
        let link = resolve("module", "turtle.html#ty:Turtle:forward", "Turtle:forward");
        assert_eq!(link.kind, LinkKind::TypeLink);
        assert_eq!(link.target, "turtle.Turtle.forward");
        assert_eq!(link.display, "Turtle.forward");
    }

    #[test]
    fn page_link_without_member() {
        let link = resolve("module", "redstone.html", "redstone");
        assert_eq!(link.kind, LinkKind::TypeLink);
        assert_eq!(link.target, "redstone");
    }

    #[test]
    fn absolute_href_with_prose_display_is_external() {
        let link = resolve("module", "https://example.com/x", "Example");
        assert_eq!(link.kind, LinkKind::ExternalLink);
        assert_eq!(link.target, "https://example.com/x");
        assert_eq!(link.display, "Example");
    }

    #[test]
    fn relative_href_resolves_against_corpus_base() {
        let link = resolve("module", "../guide/speaker.html", "the speaker guide");
        assert_eq!(link.kind, LinkKind::ExternalLink);
        assert_eq!(link.target, "https://tweaked.cc/guide/speaker.html");
    }

    #[test]
    fn corpus_page_with_prose_display_is_external() {
        let link = resolve("module", "os.html#v:pullEvent", "the event loop");
        assert_eq!(link.kind, LinkKind::ExternalLink);
        assert_eq!(link.target, "https://tweaked.cc/module/os.html#v:pullEvent");
    }
}
