//! Lua annotation stub emitter.
//!
//! One declaration per function: merged parameters become `@param` lines,
//! positionally-aligned returns become `@return` lines whose type is the
//! union of that slot across overloads, and every parameter overload past
//! the first becomes an `@overload` annotation.

use crate::error::Result;
use crate::model::{Definition, Function, Module, ModuleKind, Return, See, Variable};
use crate::overload::{combine_merged, merge_parameters, MergedOverload};
use crate::render::text::{inline_text, Flattener, LinkStyle, LuaWriter, StubWriter};
use crate::render::Emitter;
use crate::types;

pub struct LuaEmitter;

impl Emitter for LuaEmitter {
    fn emit(&self, modules: &[Module]) -> Result<String> {
        let mut writer = LuaWriter::new();

        let Some((base, types)) = modules.split_first() else {
            return Ok(String::new());
        };

        write_base_module(&mut writer, base)?;
        for module in types {
            write_type_module(&mut writer, base, module)?;
        }

        Ok(writer.into_string())
    }

    fn file_extension(&self) -> &'static str {
        "lua"
    }

    fn output_dir(&self) -> &'static str {
        "cc_libs_lua"
    }
}

fn write_base_module(writer: &mut LuaWriter, module: &Module) -> Result<()> {
    writer.write_line("---@meta");
    writer.write_line("");

    write_docs(writer, &module.description, module.source.as_deref(), &module.see);
    writer.write_line(&format!("---@class {}lib", module.name));
    writer.write_line(&format!("{} = {{}}", module.name));
    writer.write_line("");

    write_definitions(writer, module)
}

fn write_type_module(writer: &mut LuaWriter, base: &Module, module: &Module) -> Result<()> {
    debug_assert_eq!(module.kind, ModuleKind::Type);

    write_docs(writer, &module.description, module.source.as_deref(), &module.see);
    writer.write_line(&format!("---@class {}", module.name));
    writer.write_line(&format!("local {} = {{}}", module.name));
    writer.write_line("");
    // alias so cross-page references like `base.Type` resolve
    writer.write_line(&format!(
        "---@alias {}.{} {}",
        base.name, module.name, module.name
    ));
    writer.write_line("");

    write_definitions(writer, module)
}

fn write_definitions(writer: &mut LuaWriter, module: &Module) -> Result<()> {
    for definition in &module.definitions {
        match definition {
            Definition::Function(function) => write_function(writer, module, function)?,
            Definition::Variable(variable) => write_variable(writer, module, variable),
        }
    }
    Ok(())
}

fn write_variable(writer: &mut LuaWriter, module: &Module, variable: &Variable) {
    write_docs(writer, &variable.description, variable.source.as_deref(), &variable.see);

    let value = variable.value.as_deref().unwrap_or("{}");
    writer.write_line(&format!("{}.{} = {}", module.name, variable.name, value));
    writer.write_line("");
}

fn write_function(writer: &mut LuaWriter, module: &Module, function: &Function) -> Result<()> {
    write_docs(writer, &function.description, function.source.as_deref(), &function.see);

    let overloads = combine_merged(function);
    let primary = &overloads[0];
    let slots = return_slots(&primary.returns)?;

    for overload in &overloads[1..] {
        write_overload_line(writer, overload, &slots)?;
    }

    for parameter in merge_parameters(function)? {
        let mut line = format!(
            "---@param {} {}",
            parameter_name(&parameter.name, parameter.optional),
            types::to_lua(&parameter.ty)?
        );
        if let Some(default) = &parameter.default_value {
            line.push_str(&format!(" Default: `{default}`."));
        }
        let description = inline_text(&parameter.description, LinkStyle::Lua);
        if !description.trim().is_empty() {
            line.push(' ');
            line.push_str(description.trim());
        }
        writer.write_line(&line);
    }

    for (ty, description) in &slots {
        let mut line = format!("---@return {ty} .");
        if !description.is_empty() {
            line.push(' ');
            line.push_str(description);
        }
        writer.write_line(&line);
    }

    let separator = if function.needs_self { ':' } else { '.' };
    let names: Vec<&str> = primary
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    writer.write_line(&format!(
        "function {}{}{}({}) end",
        module.name,
        separator,
        function.name,
        names.join(", ")
    ));
    writer.write_line("");

    Ok(())
}

fn write_overload_line(
    writer: &mut LuaWriter,
    overload: &MergedOverload,
    slots: &[(String, String)],
) -> Result<()> {
    let mut params = Vec::new();
    for parameter in &overload.parameters {
        params.push(format!(
            "{} : {}",
            parameter_name(&parameter.name, parameter.optional),
            types::to_lua(&parameter.ty)?
        ));
    }

    let mut line = format!("---@overload fun({})", params.join(", "));
    if !slots.is_empty() {
        line.push_str(" : ");
        line.push_str(
            &slots
                .iter()
                .map(|(ty, _)| ty.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    writer.write_line(&line);
    Ok(())
}

fn parameter_name(name: &str, optional: bool) -> String {
    if optional {
        format!("{name}?")
    } else {
        name.to_string()
    }
}

/// Per return slot: the `|`-union of the slot's distinct transpiled types
/// across overloads, and its description. With several overloads, blank
/// descriptions show as `<nothing>` so the alternatives stay aligned.
fn return_slots(returns: &[Vec<Return>]) -> Result<Vec<(String, String)>> {
    let slot_count = returns.first().map_or(0, Vec::len);
    let mut slots = Vec::with_capacity(slot_count);

    for i in 0..slot_count {
        let mut slot_types: Vec<String> = Vec::new();
        let mut descriptions: Vec<String> = Vec::new();

        for overload in returns {
            let ret = &overload[i];
            let ty = types::to_lua(&ret.ty)?;
            if !slot_types.contains(&ty) {
                slot_types.push(ty);
            }
            descriptions.push(inline_text(&ret.description, LinkStyle::Lua).trim().to_string());
        }

        let description = match descriptions.as_slice() {
            [only] => only.clone(),
            _ => descriptions
                .iter()
                .map(|d| if d.is_empty() { "<nothing>" } else { d.as_str() })
                .collect::<Vec<_>>()
                .join(" **or** "),
        };

        slots.push((slot_types.join("|"), description));
    }

    Ok(slots)
}

fn write_docs(writer: &mut LuaWriter, description: &[crate::model::DescriptionNode], source: Option<&str>, see: &[See]) {
    if !description.is_empty() {
        writer.enter_comment();
        Flattener::block(writer, LinkStyle::Lua).write_description(description);
        writer.write_line("");
        writer.exit_comment();
        writer.write_line("---");
    }

    if let Some(source) = source {
        writer.write_line(&format!("---[View source]({source})"));
        writer.write_line("---");
    }

    if !see.is_empty() {
        for entry in see {
            let mut line = format!("---@see {}", entry.link.target);
            let description = inline_text(&entry.description, LinkStyle::Lua);
            if !description.trim().is_empty() {
                line.push(' ');
                line.push_str(description.trim());
            }
            writer.write_line(&line);
        }
        writer.write_line("---");
    }
}
