//! Reconstructs Function and Variable definitions from a module's
//! definition list: alternating `dt`/`dd` pairs, where the `dd` carries
//! leading prose followed by `h3`-delimited sections (Parameters, Returns,
//! See also, and the informational sections that stubs have no use for).
//!
//! A literal `Or` heading repeats the previous section kind, appending a
//! parallel overload to the same group rather than opening a new section.

use regex::Regex;
use std::sync::LazyLock;

use markup5ever_rcdom::Handle;

use crate::dom::{self, Cursor};
use crate::error::{Error, Result};
use crate::model::{Definition, Function, Parameter, Return, See, Variable};
use crate::parser::description::parse_description;
use crate::parser::link;

static RE_VARIABLE_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z_0-9]+)\s*=\s*(.+)").unwrap());

static RE_FUNCTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z_0-9]+)\(").unwrap());

/// Parse every `dt`/`dd` pair the cursor is positioned on.
pub fn parse_definitions(
    cursor: &mut Cursor,
    module_name: &str,
    base_path: &str,
) -> Result<Vec<Definition>> {
    let mut definitions = Vec::new();

    loop {
        definitions.push(parse_definition(cursor, module_name, base_path)?);
        if !cursor.advance_tagged() {
            break;
        }
    }

    Ok(definitions)
}

fn parse_definition(
    cursor: &mut Cursor,
    module_name: &str,
    base_path: &str,
) -> Result<Definition> {
    let dt = expect_element(cursor, "dt")?;

    let name_node = dom::find_by_class(&dt, "definition-name").ok_or(Error::UnexpectedEnd {
        context: "a definition name",
    })?;
    let mut name = dom::inner_text(&name_node).trim().to_string();

    let mut needs_self = false;
    if let Some(stripped) = name.strip_prefix(&format!("{module_name}.")) {
        name = stripped.to_string();
    } else if let Some(stripped) = name.strip_prefix(&format!("{module_name}:")) {
        name = stripped.to_string();
        needs_self = true;
    }

    let source = dom::find_by_class(&dt, "source-link").and_then(|n| dom::attribute(&n, "href"));

    if !cursor.advance_tagged() {
        return Err(Error::UnexpectedEnd {
            context: "a definition body",
        });
    }
    let dd = expect_element(cursor, "dd")?;

    let mut body = Cursor::over_children(&dd);
    body.advance_tagged();

    if let Some(caps) = RE_VARIABLE_ASSIGN.captures(&name) {
        let variable_name = caps[1].to_string();
        let value = caps[2].to_string();
        return parse_variable(&mut body, variable_name, Some(value), source, base_path);
    }

    if let Some(caps) = RE_FUNCTION_NAME.captures(&name) {
        let function_name = caps[1].to_string();
        return parse_function(&mut body, function_name, needs_self, source, base_path);
    }

    parse_variable(&mut body, name, None, source, base_path)
}

fn parse_variable(
    body: &mut Cursor,
    name: String,
    value: Option<String>,
    source: Option<String>,
    base_path: &str,
) -> Result<Definition> {
    let description = parse_description(body, base_path)?;

    let mut see = Vec::new();
    for section in parse_sections(body, base_path)? {
        match section {
            Section::SeeAlso(entries) => see = entries,
            Section::Parameters(_) | Section::Returns(_) => {
                return Err(Error::UnexpectedElement {
                    expected: "no call signature on a variable",
                    found: "a Parameters/Returns section".to_string(),
                })
            }
        }
    }

    Ok(Definition::Variable(Variable {
        name,
        value,
        description,
        see,
        source,
    }))
}

fn parse_function(
    body: &mut Cursor,
    name: String,
    needs_self: bool,
    source: Option<String>,
    base_path: &str,
) -> Result<Definition> {
    let description = parse_description(body, base_path)?;

    let mut parameter_overloads = Vec::new();
    let mut return_overloads = Vec::new();
    let mut see = Vec::new();

    for section in parse_sections(body, base_path)? {
        match section {
            Section::Parameters(items) => {
                if !items.is_empty() {
                    parameter_overloads.push(items);
                }
            }
            Section::Returns(items) => {
                if !items.is_empty() {
                    return_overloads.push(items);
                }
            }
            Section::SeeAlso(entries) => see = entries,
        }
    }

    Ok(Definition::Function(Function {
        name,
        needs_self,
        description,
        see,
        source,
        parameter_overloads,
        return_overloads,
    }))
}

/// Module-level section scan. The only section a module block may carry is
/// "See also"; a call-signature section outside a definition body is a
/// template violation.
pub fn parse_module_sections(cursor: &mut Cursor, base_path: &str) -> Result<Vec<See>> {
    let mut see = Vec::new();

    for section in parse_sections(cursor, base_path)? {
        match section {
            Section::SeeAlso(entries) => see = entries,
            Section::Parameters(_) | Section::Returns(_) => {
                return Err(Error::UnexpectedElement {
                    expected: "a See also section",
                    found: "a Parameters/Returns section".to_string(),
                })
            }
        }
    }

    Ok(see)
}

// -- Section scanning ---------------------------------------------------------

enum Section {
    Parameters(Vec<Parameter>),
    Returns(Vec<Return>),
    SeeAlso(Vec<See>),
}

/// Scan `h3` headings from the cursor's position, dispatching on the fixed
/// heading vocabulary. A non-heading node ends the scan without being
/// consumed; an unknown heading after a recognized section is a hard error.
fn parse_sections(cursor: &mut Cursor, base_path: &str) -> Result<Vec<Section>> {
    let mut sections = Vec::new();
    let mut current: Option<String> = None;

    while let Some(node) = cursor.current() {
        if dom::node_name(node) != "h3" {
            break;
        }
        let heading = dom::inner_text(node).trim().to_string();

        if heading != "Or" {
            current = Some(heading.clone());
        }
        let Some(section) = current.clone() else {
            return Err(Error::UnrecognizedSection { heading });
        };

        match section.as_str() {
            "Parameters" => sections.push(Section::Parameters(parse_parameter_list(
                cursor, base_path,
            )?)),
            "Returns" => sections.push(Section::Returns(parse_return_list(cursor, base_path)?)),
            "See also" => sections.push(Section::SeeAlso(parse_see_list(cursor, base_path)?)),
            "Changes" | "Usage" | "Throws" => {
                // informational only; consume the body container and move on
                if !cursor.advance_tagged() {
                    return Err(Error::UnexpectedEnd {
                        context: "an informational section body",
                    });
                }
            }
            // "Types" opens the next page region, never a definition section
            "Types" => break,
            _ => {
                if sections.is_empty() {
                    break;
                }
                return Err(Error::UnrecognizedSection { heading });
            }
        }

        if !cursor.advance_tagged() {
            break;
        }
    }

    Ok(sections)
}

fn parse_parameter_list(cursor: &mut Cursor, base_path: &str) -> Result<Vec<Parameter>> {
    let list = expect_section_body(cursor, "ol", Some("parameter-list"))?;
    parse_items(&list, |item| parse_parameter(item, base_path))
}

fn parse_return_list(cursor: &mut Cursor, base_path: &str) -> Result<Vec<Return>> {
    let list = expect_section_body(cursor, "ol", Some("return-list"))?;
    parse_items(&list, |item| parse_return(item, base_path))
}

fn parse_see_list(cursor: &mut Cursor, base_path: &str) -> Result<Vec<See>> {
    let list = expect_section_body(cursor, "ul", None)?;
    parse_items(&list, |item| parse_see(item, base_path))
}

/// Advance to the section's body element and check its shape.
fn expect_section_body(cursor: &mut Cursor, tag: &'static str, class: Option<&str>) -> Result<Handle> {
    if !cursor.advance_tagged() {
        return Err(Error::UnexpectedEnd {
            context: "a section body",
        });
    }
    let node = expect_element(cursor, tag)?;
    if let Some(class) = class {
        if dom::classes(&node) != [class] {
            return Err(Error::UnexpectedElement {
                expected: tag,
                found: format!("{tag} without class {class}"),
            });
        }
    }
    Ok(node)
}

/// Parse each `li` of a list element with a fresh cursor per item.
fn parse_items<T>(
    list: &Handle,
    mut parse_item: impl FnMut(&mut Cursor) -> Result<T>,
) -> Result<Vec<T>> {
    let mut items = Vec::new();

    for child in dom::children(list) {
        match dom::node_name(&child) {
            "#text" => continue,
            "li" => {
                let mut item = Cursor::over_children(&child);
                item.advance();
                items.push(parse_item(&mut item)?);
            }
            other => {
                return Err(Error::UnexpectedElement {
                    expected: "a list item",
                    found: other.to_string(),
                })
            }
        }
    }

    Ok(items)
}

/// One parameter item: `span.parameter` (name + optional marker), then an
/// optional `span.type`, an optional `span.default-value`, then prose.
fn parse_parameter(item: &mut Cursor, base_path: &str) -> Result<Parameter> {
    skip_blank_text(item);

    let span = expect_element(item, "span")?;
    if dom::classes(&span) != ["parameter"] {
        return Err(Error::UnexpectedElement {
            expected: "a parameter span",
            found: dom::classes(&span).join(" "),
        });
    }

    let name = dom::children(&span)
        .first()
        .map(|n| dom::inner_text(n).trim().to_string())
        .ok_or(Error::UnexpectedEnd {
            context: "a parameter name",
        })?;
    let optional = dom::find_by_class(&span, "optional").is_some();

    item.advance();
    skip_blank_text(item);

    let mut ty = String::new();
    if let Some(node) = current_span_with_class(item, "type") {
        ty = dom::inner_text(&node).trim().to_string();
        item.advance();
        skip_blank_text(item);
    }

    let mut default_value = None;
    if let Some(node) = current_span_with_class(item, "default-value") {
        // second child: the literal, wrapped by label text on either side
        let literal = dom::children(&node).get(1).map(|n| dom::inner_text(n));
        default_value = Some(literal.ok_or(Error::UnexpectedEnd {
            context: "a default value literal",
        })?);
        item.advance();
    }

    let description = parse_description(item, base_path)?;

    Ok(Parameter {
        name,
        optional,
        ty,
        description,
        default_value,
    })
}

/// One return item: an optional `span.type`, then prose.
fn parse_return(item: &mut Cursor, base_path: &str) -> Result<Return> {
    skip_blank_text(item);

    let mut ty = String::new();
    if let Some(node) = current_span_with_class(item, "type") {
        ty = dom::inner_text(&node).trim().to_string();
        item.advance();
    }

    let description = parse_description(item, base_path)?;

    Ok(Return { ty, description })
}

/// One cross-reference item: a `strong` wrapping exactly one anchor, then
/// prose. An entry that is nothing but the anchor uses the display name as
/// its description.
fn parse_see(item: &mut Cursor, base_path: &str) -> Result<See> {
    skip_blank_text(item);

    let strong = expect_element(item, "strong")?;
    let children = dom::children(&strong);
    let [anchor] = children.as_slice() else {
        return Err(Error::UnexpectedElement {
            expected: "a single cross-reference anchor",
            found: format!("{} children", children.len()),
        });
    };

    let display = dom::inner_text(anchor);
    let href = dom::attribute(anchor, "href").ok_or(Error::MissingHref {
        text: display.clone(),
    })?;
    let link = link::resolve(base_path, &href, &display);

    let description = if item.advance() {
        parse_description(item, base_path)?
    } else {
        vec![crate::model::DescriptionNode::Text {
            style: crate::model::TextStyle::Normal,
            content: link.display.clone(),
        }]
    };

    Ok(See { link, description })
}

// -- Cursor helpers -----------------------------------------------------------

fn expect_element(cursor: &Cursor, tag: &'static str) -> Result<Handle> {
    match cursor.current() {
        Some(node) if dom::node_name(node) == tag => Ok(node.clone()),
        Some(node) => Err(Error::UnexpectedElement {
            expected: tag,
            found: dom::node_name(node).to_string(),
        }),
        None => Err(Error::UnexpectedEnd { context: "an element" }),
    }
}

/// Step over whitespace-only text nodes without consuming anything else.
fn skip_blank_text(cursor: &mut Cursor) {
    while let Some(node) = cursor.current() {
        if dom::node_name(node) == "#text" && dom::inner_text(node).trim().is_empty() {
            if !cursor.advance() {
                return;
            }
        } else {
            return;
        }
    }
}

fn current_span_with_class(cursor: &Cursor, class: &str) -> Option<Handle> {
    match cursor.current() {
        Some(node) if dom::node_name(node) == "span" && dom::classes(node) == [class] => {
            Some(node.clone())
        }
        _ => None,
    }
}
