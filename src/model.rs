//! Data model for parsed documentation pages — format-agnostic.
//!
//! One page yields a base module followed by zero or more type modules
//! (the objects documented under its "Types" heading). Everything here is
//! built once by the parser and read by the emitters; nothing is mutated
//! after construction.

/// A documented module: either the page's base module or a nested type.
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub kind: ModuleKind,
    pub description: Vec<DescriptionNode>,
    pub see: Vec<See>,
    pub source: Option<String>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// The page's top-level module (always first).
    Module,
    /// A sub-type declared under the "Types" heading.
    Type,
}

/// A single member of a module's definition list.
#[derive(Debug)]
pub enum Definition {
    Function(Function),
    Variable(Variable),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Function(f) => &f.name,
            Definition::Variable(v) => &v.name,
        }
    }
}

/// A documented function with its independently-documented overload groups.
///
/// `parameter_overloads` and `return_overloads` are parallel collections of
/// call signatures and return signatures; how they combine is up to the
/// emission strategy (see `overload`).
#[derive(Debug)]
pub struct Function {
    pub name: String,
    /// Invoked with `:` (instance method) rather than `.`.
    pub needs_self: bool,
    pub description: Vec<DescriptionNode>,
    pub see: Vec<See>,
    pub source: Option<String>,
    pub parameter_overloads: Vec<Vec<Parameter>>,
    pub return_overloads: Vec<Vec<Return>>,
}

/// A documented variable. A missing `value` means the docs declare the name
/// without an initializer.
#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub value: Option<String>,
    pub description: Vec<DescriptionNode>,
    pub see: Vec<See>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub optional: bool,
    /// Raw type string in the source grammar; emitters transpile it.
    pub ty: String,
    pub description: Vec<DescriptionNode>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Return {
    pub ty: String,
    pub description: Vec<DescriptionNode>,
}

impl Return {
    /// Filler for overloads shorter than the longest when returns are
    /// aligned positionally.
    pub fn nil() -> Self {
        Return {
            ty: "nil".to_string(),
            description: Vec::new(),
        }
    }
}

/// A cross-reference entry from a "See also" section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct See {
    pub link: Link,
    pub description: Vec<DescriptionNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    /// `page[.member]` for type links, an absolute URL otherwise.
    pub target: String,
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Reference to another documented module or member in the corpus.
    TypeLink,
    ExternalLink,
}

/// One node of the prose tree attached to modules, definitions, parameters
/// and returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionNode {
    Text {
        style: TextStyle,
        content: String,
    },
    Code(String),
    Link(Link),
    /// Each item is itself a description run.
    List(Vec<Vec<DescriptionNode>>),
    Paragraph {
        kind: ParagraphKind,
        children: Vec<DescriptionNode>,
    },
    Admonition {
        kind: AdmonitionKind,
        children: Vec<DescriptionNode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Normal,
    Bold,
    Italic,
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    Default,
    /// Preformatted block — emitted fenced, with link markup suppressed.
    Formatted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmonitionKind {
    Tip,
    Note,
    Caution,
    Info,
}

impl AdmonitionKind {
    pub fn label(self) -> &'static str {
        match self {
            AdmonitionKind::Tip => "Tip",
            AdmonitionKind::Note => "Note",
            AdmonitionKind::Caution => "Caution",
            AdmonitionKind::Info => "Info",
        }
    }
}
