//! TypeScript ambient declaration emitter.
//!
//! The base module becomes a `declare namespace`, each type module a
//! `declare interface`. Every cross-product overload is its own
//! declaration; multi-value returns are wrapped in `LuaMultiReturn`.
//! Member names that collide with TypeScript keywords are declared with an
//! underscore prefix and re-exported under the real name, and a small set
//! of members that shadow host globals is suppressed outright.

use crate::error::Result;
use crate::model::{Definition, Function, Module, ModuleKind, Parameter, See, Variable};
use crate::overload::{combine_overloads, merge_parameters};
use crate::render::text::{inline_text, Flattener, LinkStyle, StubWriter, TsWriter};
use crate::render::Emitter;
use crate::types;

/// Members that would collide with the host environment's globals.
const SUPPRESSED: &[(&str, &str)] = &[
    ("io", "stdin"),
    ("io", "stdout"),
    ("io", "stderr"),
];

/// Identifiers that cannot be declared directly inside a namespace.
const RESERVED: &[&str] = &["delete", "default", "new"];

pub struct TsEmitter;

impl Emitter for TsEmitter {
    fn emit(&self, modules: &[Module]) -> Result<String> {
        let mut writer = TsWriter::new();

        let Some((base, types)) = modules.split_first() else {
            return Ok(String::new());
        };

        write_namespace(&mut writer, base)?;
        for module in types {
            write_interface(&mut writer, module)?;
        }

        Ok(writer.into_string())
    }

    fn file_extension(&self) -> &'static str {
        "d.ts"
    }

    fn output_dir(&self) -> &'static str {
        "cc_libs_ts"
    }
}

fn write_namespace(writer: &mut TsWriter, module: &Module) -> Result<()> {
    write_jsdoc(writer, &module.description, &[], &module.see)?;
    writer.write_line(&format!("declare namespace {} {{", module.name));
    writer.increase_indent();

    for definition in &module.definitions {
        if SUPPRESSED.contains(&(module.name.as_str(), definition.name())) {
            continue;
        }
        match definition {
            Definition::Function(function) => write_function(writer, function, true)?,
            Definition::Variable(variable) => write_variable(writer, variable, true)?,
        }
    }

    writer.decrease_indent();
    writer.write_line("}");
    writer.write_line("");
    Ok(())
}

fn write_interface(writer: &mut TsWriter, module: &Module) -> Result<()> {
    debug_assert_eq!(module.kind, ModuleKind::Type);

    write_jsdoc(writer, &module.description, &[], &module.see)?;
    writer.write_line(&format!("declare interface {} {{", module.name));
    writer.increase_indent();

    for definition in &module.definitions {
        match definition {
            Definition::Function(function) => write_function(writer, function, false)?,
            Definition::Variable(variable) => write_variable(writer, variable, false)?,
        }
    }

    writer.decrease_indent();
    writer.write_line("}");
    writer.write_line("");
    Ok(())
}

fn write_variable(writer: &mut TsWriter, variable: &Variable, in_namespace: bool) -> Result<()> {
    write_jsdoc(writer, &variable.description, &[], &variable.see)?;

    let ty = value_type(variable.value.as_deref());
    if in_namespace {
        let (name, reexport) = declared_name(&variable.name);
        writer.write_line(&format!("const {name}: {ty};"));
        if let Some(line) = reexport {
            writer.write_line(&line);
        }
    } else {
        writer.write_line(&format!("{}: {};", variable.name, ty));
    }
    Ok(())
}

fn write_function(writer: &mut TsWriter, function: &Function, in_namespace: bool) -> Result<()> {
    let parameters = merge_parameters(function)?;
    write_jsdoc(writer, &function.description, &parameters, &function.see)?;

    let (name, reexport) = if in_namespace {
        declared_name(&function.name)
    } else {
        (function.name.clone(), None)
    };

    for overload in combine_overloads(function) {
        let params = overload
            .parameters
            .iter()
            .map(parameter_declaration)
            .collect::<Result<Vec<_>>>()?;

        let returns = overload
            .returns
            .iter()
            .map(|r| types::to_ts(&r.ty))
            .collect::<Result<Vec<_>>>()?;
        let ret = match returns.as_slice() {
            [] => "void".to_string(),
            [only] => only.clone(),
            _ => format!("LuaMultiReturn<[{}]>", returns.join(", ")),
        };

        if in_namespace {
            writer.write_line(&format!("function {}({}): {};", name, params.join(", "), ret));
        } else {
            writer.write_line(&format!("{}({}): {};", name, params.join(", "), ret));
        }
    }

    if let Some(line) = reexport {
        writer.write_line(&line);
    }
    Ok(())
}

fn parameter_declaration(parameter: &Parameter) -> Result<String> {
    // variadic parameters are literally named `...` in the docs
    if parameter.name == "..." {
        let element = parameter.ty.strip_suffix("...").unwrap_or(&parameter.ty);
        return Ok(format!("...rest: {}[]", types::to_ts(element)?));
    }

    let marker = if parameter.optional { "?" } else { "" };
    Ok(format!(
        "{}{}: {}",
        parameter.name,
        marker,
        types::to_ts(&parameter.ty)?
    ))
}

/// Rename reserved member names for declaration, with the re-export line
/// restoring the public name.
fn declared_name(name: &str) -> (String, Option<String>) {
    if RESERVED.contains(&name) {
        let declared = format!("_{name}");
        let reexport = format!("export {{ {declared} as {name} }};");
        (declared, Some(reexport))
    } else {
        (name.to_string(), None)
    }
}

/// The declaration grammar has no initializers; degrade a literal to a
/// primitive type when its shape is obvious.
fn value_type(value: Option<&str>) -> &'static str {
    let Some(value) = value.map(str::trim) else {
        return "any";
    };
    if value == "true" || value == "false" {
        "boolean"
    } else if value.starts_with('"') || value.starts_with('\'') {
        "string"
    } else if value.parse::<f64>().is_ok()
        || value
            .strip_prefix("0x")
            .is_some_and(|hex| u64::from_str_radix(hex, 16).is_ok())
    {
        "number"
    } else {
        "any"
    }
}

fn write_jsdoc(
    writer: &mut TsWriter,
    description: &[crate::model::DescriptionNode],
    parameters: &[Parameter],
    see: &[See],
) -> Result<()> {
    if description.is_empty() && parameters.is_empty() && see.is_empty() {
        return Ok(());
    }

    writer.enter_comment();

    if !description.is_empty() {
        Flattener::block(writer, LinkStyle::Ts).write_description(description);
        writer.write_line("");
    }

    for parameter in parameters {
        let mut line = format!("@param {}", parameter.name);
        if let Some(default) = &parameter.default_value {
            line.push_str(&format!(" Default: `{default}`."));
        }
        let text = inline_text(&parameter.description, LinkStyle::Ts);
        if !text.trim().is_empty() {
            line.push(' ');
            line.push_str(text.trim());
        }
        writer.write_line(&line);
    }

    for entry in see {
        let mut line = format!(
            "@see {{@link {} {}}}",
            entry.link.target, entry.link.display
        );
        let text = inline_text(&entry.description, LinkStyle::Ts);
        if !text.trim().is_empty() {
            line.push(' ');
            line.push_str(text.trim());
        }
        writer.write_line(&line);
    }

    writer.exit_comment();
    Ok(())
}
