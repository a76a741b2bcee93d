//! ccstub — generate Lua annotation stubs and TypeScript ambient
//! declarations from the HTML API reference produced by the upstream
//! documentation generator.
//!
//! The input directory holds per-page documents under `module/` and
//! `peripheral/`; the output directory receives `cc_libs_lua/*.lua`,
//! `cc_libs_ts/*.d.ts` and a `cc_libs_ts/index.d.ts` reference manifest.
//! Any page that deviates from the documentation template aborts the whole
//! run — partially-correct stubs are worse than none.

mod dom;
mod error;
mod model;
mod overload;
mod parser;
mod render;
mod types;

use anyhow::{bail, Context, Result};
use clap::Parser;
use render::Emitter;
use std::fs;
use std::path::{Path, PathBuf};

/// Page subdirectories recognized inside the input directory.
const PAGE_TREES: &[&str] = &["module", "peripheral"];

#[derive(Parser)]
#[command(
    name = "ccstub",
    about = "Generate Lua annotation stubs and TypeScript declarations from an HTML API reference"
)]
struct Cli {
    /// Input directory containing module/ and peripheral/ page trees
    input: PathBuf,

    /// Directory to create the output trees in
    #[arg(short = 'o', long, default_value = ".")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let pages = collect_pages(&cli.input)?;
    if pages.is_empty() {
        bail!(
            "no documentation pages found under {}",
            cli.input.display()
        );
    }

    let emitters = render::emitters();
    for emitter in &emitters {
        fs::create_dir_all(cli.output.join(emitter.output_dir())).with_context(|| {
            format!("failed to create output directory: {}", emitter.output_dir())
        })?;
    }

    let mut declaration_files = Vec::new();

    for (tree, path) in &pages {
        let html = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let modules = parser::parse_page(&html, tree)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("unusable file name: {}", path.display()))?;

        for emitter in &emitters {
            let text = emitter
                .emit(&modules)
                .with_context(|| format!("failed to emit stubs for {}", path.display()))?;

            let file_name = format!("{}.{}", name, emitter.file_extension());
            let out_path = cli.output.join(emitter.output_dir()).join(&file_name);
            fs::write(&out_path, text)
                .with_context(|| format!("failed to write {}", out_path.display()))?;

            if emitter.file_extension() == "d.ts" {
                declaration_files.push(file_name);
            }
        }
    }

    write_manifest(&cli.output, &declaration_files)?;

    Ok(())
}

/// Find every page document, tagged with the tree it lives in (which is
/// also the base path links resolve against). Sorted for deterministic
/// output.
fn collect_pages(input: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut pages = Vec::new();

    for tree in PAGE_TREES {
        let pattern = input.join(tree).join("*.html");
        let matches: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .with_context(|| format!("invalid glob pattern: {}", pattern.display()))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();

        if matches.is_empty() {
            eprintln!("warning: no pages under {}", input.join(tree).display());
        }

        for path in matches {
            pages.push((tree.to_string(), path));
        }
    }

    pages.sort();
    Ok(pages)
}

/// `index.d.ts` referencing every emitted declaration file.
fn write_manifest(output: &Path, declaration_files: &[String]) -> Result<()> {
    let mut manifest = String::new();
    for file in declaration_files {
        manifest.push_str(&format!("/// <reference path=\"{file}\" />\n"));
    }

    let path = output.join("cc_libs_ts").join("index.d.ts");
    fs::write(&path, manifest).with_context(|| format!("failed to write {}", path.display()))
}
