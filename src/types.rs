//! Type-string rewriting between the documentation's ad-hoc Lua-like type
//! grammar and the two target grammars (Lua annotations, TypeScript).
//!
//! Constructs are resolved outside-in with explicit bracket-depth scanning;
//! nested generics make naive pattern replacement a non-starter. Unbalanced
//! input is a hard error, never a silent truncation.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Lua,
    Ts,
}

/// Rewrite a raw type string into the Lua annotation grammar.
///
/// Running the rewrite on its own output is a no-op.
pub fn to_lua(raw: &str) -> Result<String> {
    convert(raw, Target::Lua).map_err(|_| Error::UnbalancedType(raw.to_string()))
}

/// Rewrite a raw type string into the TypeScript grammar.
pub fn to_ts(raw: &str) -> Result<String> {
    convert(raw, Target::Ts).map_err(|_| Error::UnbalancedType(raw.to_string()))
}

/// Internal marker for any depth-scan failure; rewrapped with the original
/// input at the public boundary.
struct Unbalanced;

type Scan<T> = std::result::Result<T, Unbalanced>;

fn convert(raw: &str, target: Target) -> Scan<String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok("any".to_string());
    }

    // Unions bind loosest; resolve each alternative independently.
    let alternatives = split_top_level(s, '|')?;
    if alternatives.len() > 1 {
        let parts = alternatives
            .iter()
            .map(|&a| convert(a, target))
            .collect::<Scan<Vec<_>>>()?;
        return Ok(parts.join(" | "));
    }

    let intersections = split_top_level(s, '&')?;
    if intersections.len() > 1 {
        let parts = intersections
            .iter()
            .map(|&a| convert(a, target))
            .collect::<Scan<Vec<_>>>()?;
        return Ok(parts.join(" & "));
    }

    convert_single(s, target)
}

fn convert_single(s: &str, target: Target) -> Scan<String> {
    // Trailing ellipsis variadic: `T...`
    if let Some(base) = s.strip_suffix("...") {
        if !base.trim_end().is_empty() {
            let inner = convert(base, target)?;
            return Ok(match target {
                Target::Lua => format!("{inner}..."),
                Target::Ts => format!("LuaMultiReturn<{inner}[]>"),
            });
        }
    }

    if let Some(rest) = function_head(s) {
        return convert_function(rest, target);
    }

    if s.starts_with('{') {
        return convert_table(s, target);
    }

    if s.starts_with('(') {
        let close = matching_bracket(s, '(', ')')?;
        let inner = convert(&s[1..close], target)?;
        let suffix = s[close + 1..].trim();
        return Ok(format!("({inner}){suffix}"));
    }

    Ok(convert_name(s, target))
}

/// If `s` opens a function signature (`function(` or the already-rewritten
/// `fun(`), return the remainder starting at the parenthesis.
fn function_head(s: &str) -> Option<&str> {
    for keyword in ["function", "fun"] {
        if let Some(rest) = s.strip_prefix(keyword) {
            let rest = rest.trim_start();
            if rest.starts_with('(') {
                return Some(rest);
            }
        }
    }
    None
}

/// `rest` starts at the `(` of a function signature.
fn convert_function(rest: &str, target: Target) -> Scan<String> {
    let close = matching_bracket(rest, '(', ')')?;
    let params_raw = &rest[1..close];
    let after = rest[close + 1..].trim_start();
    let returns_raw = after.strip_prefix(':').map(str::trim);

    let mut params = Vec::new();
    for (i, piece) in split_top_level(params_raw, ',')?
        .iter()
        .copied()
        .filter(|p| !p.trim().is_empty())
        .enumerate()
    {
        params.push(convert_param(piece, i, target)?);
    }

    let returns = match returns_raw {
        Some(r) if !r.is_empty() => split_top_level(r, ',')?
            .iter()
            .map(|&r| convert(r, target))
            .collect::<Scan<Vec<_>>>()?,
        _ => Vec::new(),
    };

    Ok(match target {
        Target::Lua => {
            let mut out = format!("fun({})", params.join(", "));
            if !returns.is_empty() {
                out.push_str(": ");
                out.push_str(&returns.join(", "));
            }
            out
        }
        Target::Ts => {
            let ret = match returns.len() {
                0 => "void".to_string(),
                1 => returns.into_iter().next().expect("one return"),
                _ => format!("LuaMultiReturn<[{}]>", returns.join(", ")),
            };
            format!("({}) => {}", params.join(", "), ret)
        }
    })
}

/// One `name: type` (or bare-type) entry of a function parameter list.
fn convert_param(piece: &str, index: usize, target: Target) -> Scan<String> {
    let piece = piece.trim();
    if let Some(colon) = find_top_level(piece, ':')? {
        let name = piece[..colon].trim();
        let ty = convert(&piece[colon + 1..], target)?;
        return Ok(format!("{name}: {ty}"));
    }
    // No annotation: the Lua grammar allows a bare type, TypeScript needs a
    // parameter name to hang it on.
    Ok(match target {
        Target::Lua => piece.to_string(),
        Target::Ts => format!("arg{}: {}", index, convert(piece, target)?),
    })
}

/// Brace-delimited shorthand: array `{ T }`, variadic `{ T... }`, keyed
/// `{ [K] = V }`, record `{ a = T, b? = T2 }`, and their already-rewritten
/// colon forms.
fn convert_table(s: &str, target: Target) -> Scan<String> {
    let close = matching_bracket(s, '{', '}')?;
    if !s[close + 1..].trim().is_empty() {
        // Content after the brace is outside the template grammar.
        return Err(Unbalanced);
    }
    let inner = s[1..close].trim();

    let fields = split_top_level(inner, ',')?;

    // `{ T... }` — a sequence table.
    if fields.len() == 1 {
        if let Some(base) = inner.strip_suffix("...") {
            if !base.trim().is_empty() {
                let element = convert(base, target)?;
                return Ok(match target {
                    Target::Lua => format!("{{ [number]: {element} }}"),
                    Target::Ts => format!("{element}[]"),
                });
            }
        }
    }

    let parsed = fields
        .iter()
        .map(|&f| parse_field(f))
        .collect::<Scan<Vec<_>>>()?;

    // `{ T }` — array shorthand, only when the single entry is a plain type.
    if let &[Field::Plain(ty)] = parsed.as_slice() {
        let element = convert(ty, target)?;
        return Ok(match target {
            Target::Lua => format!("({element})[]"),
            Target::Ts => format!("{element}[]"),
        });
    }

    // Keyed tables and records; a brace group of plain types is a tuple.
    if parsed.iter().all(|f| matches!(f, Field::Plain(_))) {
        let tys = parsed
            .iter()
            .map(|&f| match f {
                Field::Plain(ty) => convert(ty, target),
                _ => unreachable!(),
            })
            .collect::<Scan<Vec<_>>>()?;
        return Ok(match target {
            Target::Lua => format!("{{ {} }}", tys.join(", ")),
            Target::Ts => format!("[{}]", tys.join(", ")),
        });
    }

    let mut out = Vec::new();
    for &field in &parsed {
        out.push(match field {
            Field::Keyed { key, value } => {
                let key = convert(key, target)?;
                let value = convert(value, target)?;
                match target {
                    Target::Lua => format!("[{key}]: {value}"),
                    Target::Ts => format!("[key: {key}]: {value}"),
                }
            }
            Field::Named { name, value } => {
                format!("{}: {}", name, convert(value, target)?)
            }
            Field::Plain(ty) => convert(ty, target)?,
        });
    }

    Ok(match target {
        Target::Lua => format!("{{ {} }}", out.join(", ")),
        Target::Ts => format!("{{ {} }}", out.join("; ")),
    })
}

#[derive(Clone, Copy)]
enum Field<'a> {
    /// `[K] = V` or `[K]: V`
    Keyed { key: &'a str, value: &'a str },
    /// `name = V`, `name? = V` or the colon forms
    Named { name: &'a str, value: &'a str },
    Plain(&'a str),
}

fn parse_field(f: &str) -> Scan<Field<'_>> {
    let f = f.trim();

    if f.starts_with('[') {
        let close = matching_bracket(f, '[', ']')?;
        let key = f[1..close].trim();
        let rest = f[close + 1..].trim_start();
        if let Some(value) = rest.strip_prefix('=').or_else(|| rest.strip_prefix(':')) {
            return Ok(Field::Keyed {
                key,
                value: value.trim(),
            });
        }
        return Err(Unbalanced);
    }

    if let Some(eq) = find_top_level(f, '=')? {
        return Ok(Field::Named {
            name: f[..eq].trim(),
            value: f[eq + 1..].trim(),
        });
    }
    if let Some(colon) = find_top_level(f, ':')? {
        return Ok(Field::Named {
            name: f[..colon].trim(),
            value: f[colon + 1..].trim(),
        });
    }

    Ok(Field::Plain(f))
}

/// Plain identifier, possibly dotted, possibly with `?`/`[]` suffixes.
fn convert_name(s: &str, target: Target) -> String {
    let (base, suffix) = match s.find(|c: char| c == '?' || c == '[') {
        Some(pos) => (&s[..pos], &s[pos..]),
        None => (s, ""),
    };
    let base = base.trim();

    let renamed = match target {
        Target::Lua => base,
        Target::Ts => match base {
            "nil" => "null",
            "table" => "LuaTable",
            "function" => return format!("(...args: any[]) => any{suffix}"),
            other => other,
        },
    };

    format!("{renamed}{suffix}")
}

// -- Depth-aware scanning -----------------------------------------------------

fn bracket_delta(c: char) -> i32 {
    match c {
        '(' | '{' | '[' => 1,
        ')' | '}' | ']' => -1,
        _ => 0,
    }
}

/// Byte index of the bracket matching the opener `s` starts with.
fn matching_bracket(s: &str, open: char, close: char) -> Scan<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
    }
    Err(Unbalanced)
}

/// Split on `sep` occurring outside any bracket pair. Errors on unbalanced
/// nesting so malformed input surfaces instead of truncating.
fn split_top_level(s: &str, sep: char) -> Scan<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        depth += bracket_delta(c);
        if depth < 0 {
            return Err(Unbalanced);
        }
        if c == sep && depth == 0 {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    if depth != 0 {
        return Err(Unbalanced);
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Position of the first top-level occurrence of `sep`.
fn find_top_level(s: &str, sep: char) -> Scan<Option<usize>> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        depth += bracket_delta(c);
        if depth < 0 {
            return Err(Unbalanced);
        }
        if c == sep && depth == 0 {
            return Ok(Some(i));
        }
    }
    if depth != 0 {
        return Err(Unbalanced);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_defaults_to_any() {
        assert_eq!(to_lua("").unwrap(), "any");
        assert_eq!(to_ts("   ").unwrap(), "any");
    }

    #[test]
    fn sequence_table() {
        assert_eq!(to_lua("{ string... }").unwrap(), "{ [number]: string }");
        assert_eq!(to_ts("{ string... }").unwrap(), "string[]");
    }

    #[test]
    fn array_shorthand() {
        assert_eq!(to_lua("{ string }").unwrap(), "(string)[]");
        assert_eq!(to_ts("{ string }").unwrap(), "string[]");
    }

    #[test]
    fn keyed_table() {
        assert_eq!(
            to_lua("{ [string] = string }").unwrap(),
            "{ [string]: string }"
        );
        assert_eq!(
            to_ts("{ [string] = string }").unwrap(),
            "{ [key: string]: string }"
        );
    }

    #[test]
    fn record() {
        assert_eq!(
            to_lua("{ url = string, headers? = { [string] = string } }").unwrap(),
            "{ url: string, headers?: { [string]: string } }"
        );
        assert_eq!(
            to_ts("{ url = string, headers? = { [string] = string } }").unwrap(),
            "{ url: string; headers?: { [key: string]: string } }"
        );
    }

    #[test]
    fn function_type() {
        assert_eq!(
            to_lua("function(partial: string):{ string... } | nil").unwrap(),
            "fun(partial: string): { [number]: string } | nil"
        );
        assert_eq!(
            to_ts("function(partial: string):{ string... } | nil").unwrap(),
            "(partial: string) => string[] | null"
        );
    }

    #[test]
    fn function_without_returns() {
        assert_eq!(to_lua("function(a: number)").unwrap(), "fun(a: number)");
        assert_eq!(to_ts("function(a: number)").unwrap(), "(a: number) => void");
    }

    #[test]
    fn bare_names() {
        assert_eq!(to_ts("nil").unwrap(), "null");
        assert_eq!(to_ts("table").unwrap(), "LuaTable");
        assert_eq!(to_ts("string?").unwrap(), "string?");
        assert_eq!(to_lua("Completion.buffer").unwrap(), "Completion.buffer");
    }

    #[test]
    fn variadic() {
        assert_eq!(to_lua("string...").unwrap(), "string...");
        assert_eq!(to_ts("string...").unwrap(), "LuaMultiReturn<string[]>");
    }

    #[test]
    fn union_resolves_each_side() {
        assert_eq!(to_ts("string | nil").unwrap(), "string | null");
        assert_eq!(to_lua("string | { number }").unwrap(), "string | (number)[]");
    }

    #[test]
    fn lua_rewrite_is_idempotent() {
        for raw in [
            "function(partial: string):{ string... } | nil",
            "{ url = string, headers? = { [string] = string } }",
            "{ string... }",
            "{ string }",
            "string...",
            "string | nil",
            "fun(a: number): boolean",
            "",
        ] {
            let once = to_lua(raw).unwrap();
            let twice = to_lua(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn unbalanced_is_an_error() {
        assert!(to_lua("{ string").is_err());
        assert!(to_ts("function(a: string").is_err());
        assert!(to_lua("a } b").is_err());
    }

    #[test]
    fn nested_generics_resolve_inner_types() {
        assert_eq!(
            to_ts("{ [string] = { handler = function(ev: string): nil } }").unwrap(),
            "{ [key: string]: { handler: (ev: string) => null } }"
        );
    }
}
