//! Reconstructs the prose tree from a run of description-shaped markup
//! nodes: paragraphs, lists, admonitions, inline code, links and styled
//! text runs.
//!
//! The walk is one-shot over the given cursor; nested containers are
//! recursed into via fresh cursors over their own children, so sibling
//! parses can never advance each other's position.

use markup5ever_rcdom::Handle;

use crate::dom::{self, Cursor};
use crate::error::{Error, Result};
use crate::model::{AdmonitionKind, DescriptionNode, ParagraphKind, TextStyle};
use crate::parser::link;

/// Whether `node` belongs to a description run. Parsing stops at the first
/// node outside this set — section headings and definition lists terminate
/// prose without consuming it.
pub fn is_description_node(node: &Handle) -> bool {
    match dom::node_name(node) {
        "#text" | "code" | "a" | "span" | "p" | "pre" | "h2" | "ul" | "ol" | "strong" | "em" => {
            true
        }
        "div" => dom::has_class(node, "admonition") || dom::has_class(node, "recipe-container"),
        "table" => dom::classes(node).is_empty(),
        _ => false,
    }
}

/// Parse description nodes starting at the cursor's current position,
/// leaving the cursor on the first non-description node (or exhausted).
pub fn parse_description(cursor: &mut Cursor, base_path: &str) -> Result<Vec<DescriptionNode>> {
    let mut nodes = Vec::new();

    while let Some(node) = cursor.current() {
        if !is_description_node(node) {
            break;
        }
        let node = node.clone();

        match dom::node_name(&node) {
            "#text" => nodes.push(DescriptionNode::Text {
                style: TextStyle::Normal,
                content: dom::inner_text(&node),
            }),
            "code" => nodes.push(DescriptionNode::Code(dom::inner_text(&node))),
            "a" => nodes.push(DescriptionNode::Link(parse_link(&node, base_path)?)),
            "span" => nodes.push(DescriptionNode::Text {
                style: TextStyle::Normal,
                content: dom::inner_text(&node).trim().to_string(),
            }),
            "p" => nodes.push(DescriptionNode::Paragraph {
                kind: ParagraphKind::Default,
                children: parse_children(&node, base_path)?,
            }),
            "pre" => nodes.push(DescriptionNode::Paragraph {
                kind: ParagraphKind::Formatted,
                children: parse_children(&node, base_path)?,
            }),
            "h2" => nodes.push(styled_text(&node, TextStyle::Header)),
            "strong" => nodes.push(styled_text(&node, TextStyle::Bold)),
            "em" => nodes.push(styled_text(&node, TextStyle::Italic)),
            "ul" | "ol" => nodes.push(parse_list(&node, base_path)?),
            "div" => {
                if dom::has_class(&node, "admonition") {
                    nodes.push(parse_admonition(&node, base_path)?);
                }
                // recipe widgets have no stub representation
            }
            "table" => {
                // data tables have no stub representation
            }
            other => {
                return Err(Error::UnexpectedElement {
                    expected: "a description node",
                    found: other.to_string(),
                })
            }
        }

        if !cursor.advance() {
            break;
        }
    }

    Ok(nodes)
}

/// Recurse into a container's own children with a fresh cursor.
fn parse_children(node: &Handle, base_path: &str) -> Result<Vec<DescriptionNode>> {
    let mut cursor = Cursor::over_children(node);
    cursor.advance();
    parse_description(&mut cursor, base_path)
}

fn styled_text(node: &Handle, style: TextStyle) -> DescriptionNode {
    DescriptionNode::Text {
        style,
        content: dom::inner_text(node).trim().to_string(),
    }
}

fn parse_link(node: &Handle, base_path: &str) -> Result<crate::model::Link> {
    let display = dom::inner_text(node);
    let href = dom::attribute(node, "href").ok_or(Error::MissingHref {
        text: display.clone(),
    })?;
    Ok(link::resolve(base_path, &href, &display))
}

fn parse_list(node: &Handle, base_path: &str) -> Result<DescriptionNode> {
    let mut items = Vec::new();

    for child in dom::children(node) {
        match dom::node_name(&child) {
            "#text" => continue,
            "li" => items.push(parse_children(&child, base_path)?),
            other => {
                return Err(Error::UnexpectedElement {
                    expected: "a list item",
                    found: other.to_string(),
                })
            }
        }
    }

    Ok(DescriptionNode::List(items))
}

fn parse_admonition(node: &Handle, base_path: &str) -> Result<DescriptionNode> {
    // Second class carries the kind: `admonition admonition-note`.
    let classes = dom::classes(node);
    let modifier = classes.get(1).cloned().unwrap_or_default();
    let kind_name = modifier.split_once('-').map(|(_, k)| k).unwrap_or("");

    let kind = match kind_name {
        "tip" => AdmonitionKind::Tip,
        "note" => AdmonitionKind::Note,
        "caution" => AdmonitionKind::Caution,
        "info" => AdmonitionKind::Info,
        _ => {
            return Err(Error::UnexpectedElement {
                expected: "an admonition kind class",
                found: modifier,
            })
        }
    };

    let mut cursor = Cursor::over_children(node);
    if !cursor.advance_tagged() {
        return Err(Error::UnexpectedEnd {
            context: "an admonition body",
        });
    }
    let Some(heading) = cursor.current() else {
        return Err(Error::UnexpectedEnd {
            context: "an admonition body",
        });
    };
    if dom::classes(heading) != ["admonition-heading"] {
        return Err(Error::UnexpectedElement {
            expected: "the admonition heading",
            found: dom::node_name(heading).to_string(),
        });
    }
    if !cursor.advance_tagged() {
        return Err(Error::UnexpectedEnd {
            context: "an admonition body",
        });
    }

    Ok(DescriptionNode::Admonition {
        kind,
        children: parse_description(&mut cursor, base_path)?,
    })
}
