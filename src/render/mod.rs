//! Emitter module — one renderer per output language behind a shared trait.

pub mod lua;
pub mod text;
pub mod ts;

use crate::error::Result;
use crate::model::Module;

/// Renders a page's modules into one target language.
pub trait Emitter {
    fn emit(&self, modules: &[Module]) -> Result<String>;
    fn file_extension(&self) -> &'static str;
    /// Output tree this emitter's files belong to.
    fn output_dir(&self) -> &'static str;
}

/// Both emitters, in output order.
pub fn emitters() -> Vec<Box<dyn Emitter>> {
    vec![Box::new(lua::LuaEmitter), Box::new(ts::TsEmitter)]
}
