//! Page-level drive: one `h1` base module, then optionally a "Types"
//! heading introducing one nested type module per `h3` sub-heading, each
//! with the same description/see/definition-list shape.

use crate::dom::{self, Cursor};
use crate::error::{Error, Result};
use crate::model::{Definition, Module, ModuleKind};
use crate::parser::definitions::{parse_definitions, parse_module_sections};
use crate::parser::description::parse_description;

/// Parse a whole documentation page into its base module followed by its
/// type modules.
pub fn parse_page(html: &str, base_path: &str) -> Result<Vec<Module>> {
    let document = dom::parse(html);
    let content = dom::find_by_id(&document, "content").ok_or(Error::UnexpectedEnd {
        context: "the #content container",
    })?;

    let mut cursor = Cursor::over_children(&content);
    if !cursor.advance_tagged() {
        return Err(Error::UnexpectedEnd {
            context: "the page body",
        });
    }

    let mut modules = Vec::new();

    let heading = expect(&cursor, "h1")?;
    let name = dom::inner_text(&heading).trim().to_string();
    modules.push(parse_module(&mut cursor, name, ModuleKind::Module, base_path)?);

    if cursor.advance_tagged() {
        let types = expect(&cursor, "h3")?;
        if dom::inner_text(&types).trim() != "Types" {
            return Err(Error::UnexpectedElement {
                expected: "the Types heading",
                found: dom::inner_text(&types).trim().to_string(),
            });
        }

        while cursor.advance_tagged() {
            let heading = expect(&cursor, "h3")?;
            let span = dom::find_child_element(&heading, "span").ok_or(Error::UnexpectedEnd {
                context: "a type module name",
            })?;
            let name = dom::inner_text(&span).trim().to_string();
            modules.push(parse_module(&mut cursor, name, ModuleKind::Type, base_path)?);
        }
    }

    Ok(modules)
}

fn parse_module(
    cursor: &mut Cursor,
    name: String,
    kind: ModuleKind,
    base_path: &str,
) -> Result<Module> {
    if !cursor.advance_tagged() {
        return Err(Error::UnexpectedEnd {
            context: "a module description",
        });
    }

    let description = parse_description(cursor, base_path)?;
    let see = parse_module_sections(cursor, base_path)?;
    let definitions = parse_definition_list(cursor, &name, base_path)?;

    Ok(Module {
        name,
        kind,
        description,
        see,
        source: None,
        definitions,
    })
}

fn parse_definition_list(
    cursor: &mut Cursor,
    module_name: &str,
    base_path: &str,
) -> Result<Vec<Definition>> {
    // Some pages wrap the list in a summary table first.
    if let Some(node) = cursor.current() {
        if dom::node_name(node) == "table" && dom::classes(node) == ["definition-list"] {
            if !cursor.advance_tagged() {
                return Err(Error::UnexpectedEnd {
                    context: "a definition list",
                });
            }
        }
    }

    let dl = expect(cursor, "dl")?;
    if dom::classes(&dl) != ["definition"] {
        return Err(Error::UnexpectedElement {
            expected: "the definition list",
            found: dom::classes(&dl).join(" "),
        });
    }

    let mut entries = Cursor::over_children(&dl);
    if !entries.advance_tagged() {
        return Ok(Vec::new());
    }
    parse_definitions(&mut entries, module_name, base_path)
}

fn expect(cursor: &Cursor, tag: &'static str) -> Result<markup5ever_rcdom::Handle> {
    match cursor.current() {
        Some(node) if dom::node_name(node) == tag => Ok(node.clone()),
        Some(node) => Err(Error::UnexpectedElement {
            expected: tag,
            found: dom::node_name(node).to_string(),
        }),
        None => Err(Error::UnexpectedEnd { context: "an element" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body><div id="content">
<h1>turtle</h1>
<p>Turtles are robots that move about the world.</p>
<table class="definition-list"><tr><td>summary</td></tr></table>
<dl class="definition">
<dt><span class="definition-name">turtle.forward()</span></dt>
<dd><p>Move forward.</p>
<h3>Returns</h3>
<ol class="return-list">
<li><span class="type">boolean</span> Whether it moved.</li>
</ol>
</dd>
</dl>
<h3>Types</h3>
<h3><span>Completion</span></h3>
<p>A pending completion.</p>
<dl class="definition">
<dt><span class="definition-name">Completion:await()</span></dt>
<dd><p>Wait for the result.</p></dd>
</dl>
</div></body></html>"#;

    #[test]
    fn page_yields_base_then_type_modules() {
        let modules = parse_page(PAGE, "module").unwrap();
        assert_eq!(modules.len(), 2);

        assert_eq!(modules[0].name, "turtle");
        assert_eq!(modules[0].kind, ModuleKind::Module);
        assert_eq!(modules[0].definitions.len(), 1);
        assert_eq!(modules[0].definitions[0].name(), "forward");

        assert_eq!(modules[1].name, "Completion");
        assert_eq!(modules[1].kind, ModuleKind::Type);
        let Definition::Function(f) = &modules[1].definitions[0] else {
            panic!("expected a function");
        };
        assert!(f.needs_self);
    }

    #[test]
    fn missing_content_container_is_an_error() {
        assert!(parse_page("<html><body><p>x</p></body></html>", "module").is_err());
    }

    #[test]
    fn stray_heading_instead_of_types_is_an_error() {
        let page = r#"<div id="content">
<h1>m</h1><p>d.</p>
<dl class="definition">
<dt><span class="definition-name">m.f()</span></dt><dd><p>x.</p></dd>
</dl>
<h3>Events</h3>
</div>"#;
        assert!(matches!(
            parse_page(page, "module"),
            Err(Error::UnexpectedElement { .. })
        ));
    }
}
