use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_ccstub")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn generates_stub_trees_for_all_pages() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture_path("docs"))
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();

    assert!(dir.path().join("cc_libs_lua/turtle.lua").exists());
    assert!(dir.path().join("cc_libs_lua/monitor.lua").exists());
    assert!(dir.path().join("cc_libs_ts/turtle.d.ts").exists());
    assert!(dir.path().join("cc_libs_ts/monitor.d.ts").exists());
}

#[test]
fn lua_stub_has_meta_class_and_return_annotations() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture_path("docs"))
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let lua = std::fs::read_to_string(dir.path().join("cc_libs_lua/turtle.lua")).unwrap();
    assert!(lua.starts_with("---@meta\n"));
    assert!(lua.contains("---@class turtlelib\nturtle = {}\n"));
    assert!(lua.contains("---@return boolean . Whether the turtle could successfully move.\n"));
    assert!(lua.contains("---@return string? . The reason the turtle could not move.\n"));
    assert!(lua.contains("function turtle.forward() end\n"));
    // variable without an initializer
    assert!(lua.contains("turtle.native = {}\n"));
    // module-level cross reference
    assert!(lua.contains("---@see os.pullEvent To wait for turtle events.\n"));
    // type module aliased under the base module
    assert!(lua.contains("---@class Command\nlocal Command = {}\n"));
    assert!(lua.contains("---@alias turtle.Command Command\n"));
    assert!(lua.contains("function Command:await() end\n"));
}

#[test]
fn ts_declarations_wrap_multi_returns() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture_path("docs"))
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let ts = std::fs::read_to_string(dir.path().join("cc_libs_ts/turtle.d.ts")).unwrap();
    assert!(ts.contains("declare namespace turtle {\n"));
    assert!(ts.contains("  function forward(): LuaMultiReturn<[boolean, string?]>;\n"));
    assert!(ts.contains("declare interface Command {\n"));
    assert!(ts.contains("  await(): boolean;\n"));
}

#[test]
fn parallel_return_overloads_become_distinct_ts_declarations() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture_path("docs"))
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let ts = std::fs::read_to_string(dir.path().join("cc_libs_ts/monitor.d.ts")).unwrap();
    assert!(ts.contains("  function getSize(): number;\n"));
    assert!(ts.contains("  function getSize(): LuaMultiReturn<[number, number]>;\n"));
    assert!(ts.contains("  function setTextScale(scale: number): void;\n"));

    let lua = std::fs::read_to_string(dir.path().join("cc_libs_lua/monitor.lua")).unwrap();
    assert!(lua.contains("---@param scale number The monitor's scale, between 0.5 and 5.\n"));
    // the shorter overload's missing slot is padded with nil
    assert!(lua.contains("---@return nil|number . <nothing> **or** The height.\n"));
}

#[test]
fn index_manifest_references_every_declaration_file() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture_path("docs"))
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let index = std::fs::read_to_string(dir.path().join("cc_libs_ts/index.d.ts")).unwrap();
    assert!(index.contains("/// <reference path=\"turtle.d.ts\" />\n"));
    assert!(index.contains("/// <reference path=\"monitor.d.ts\" />\n"));
}

#[test]
fn template_violations_abort_the_whole_run() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(fixture_path("bad"))
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"))
        .stderr(predicate::str::contains("Caveats"));
}

#[test]
fn missing_input_directory_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(dir.path().join("nowhere"))
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no documentation pages"));
}
