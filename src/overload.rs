//! Combining a function's independently-documented parameter and return
//! overload groups into the shapes the emitters consume.
//!
//! Two strategies exist side by side: the full cross product (one distinct
//! declaration per combination, used for TypeScript) and merged-returns
//! alignment (a single declaration whose return slots union the overloads,
//! used for Lua annotations).

use crate::error::{Error, Result};
use crate::model::{Function, Parameter, Return};

/// One fully-resolved call signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    pub parameters: Vec<Parameter>,
    pub returns: Vec<Return>,
}

/// One call signature whose returns are aligned across all return
/// overloads: `returns[overload][slot]`, every inner list padded to the
/// longest with `nil` fillers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedOverload {
    pub parameters: Vec<Parameter>,
    pub returns: Vec<Vec<Return>>,
}

/// Full cross product of parameter and return overloads. Always yields at
/// least one overload; a function documented with neither group gets a
/// single empty signature.
pub fn combine_overloads(function: &Function) -> Vec<Overload> {
    let mut combined = Vec::new();

    if !function.parameter_overloads.is_empty() {
        for parameters in &function.parameter_overloads {
            if function.return_overloads.is_empty() {
                combined.push(Overload {
                    parameters: parameters.clone(),
                    returns: Vec::new(),
                });
            } else {
                for returns in &function.return_overloads {
                    combined.push(Overload {
                        parameters: parameters.clone(),
                        returns: returns.clone(),
                    });
                }
            }
        }
    } else if !function.return_overloads.is_empty() {
        for returns in &function.return_overloads {
            combined.push(Overload {
                parameters: Vec::new(),
                returns: returns.clone(),
            });
        }
    } else {
        combined.push(Overload {
            parameters: Vec::new(),
            returns: Vec::new(),
        });
    }

    combined
}

/// Cross product with the return side pre-aligned, one entry per parameter
/// overload (or a single parameterless entry).
pub fn combine_merged(function: &Function) -> Vec<MergedOverload> {
    let returns = align_returns(&function.return_overloads);
    let mut combined = Vec::new();

    if !function.parameter_overloads.is_empty() {
        for parameters in &function.parameter_overloads {
            combined.push(MergedOverload {
                parameters: parameters.clone(),
                returns: returns.clone(),
            });
        }
    } else {
        combined.push(MergedOverload {
            parameters: Vec::new(),
            returns,
        });
    }

    combined
}

/// Pad every return overload to the length of the longest so slot `i` lines
/// up across overloads.
fn align_returns(return_overloads: &[Vec<Return>]) -> Vec<Vec<Return>> {
    let max_len = return_overloads.iter().map(Vec::len).max().unwrap_or(0);

    return_overloads
        .iter()
        .map(|returns| {
            let mut aligned = returns.clone();
            aligned.resize(max_len, Return::nil());
            aligned
        })
        .collect()
}

/// All parameters across every overload, deduplicated by name. Two
/// parameters sharing a name must agree on type, optionality and
/// description; disagreement makes the whole function ambiguous.
pub fn merge_parameters(function: &Function) -> Result<Vec<Parameter>> {
    let mut merged: Vec<Parameter> = Vec::new();

    for overload in &function.parameter_overloads {
        for parameter in overload {
            match merged.iter().find(|p| p.name == parameter.name) {
                Some(existing) => {
                    if existing.ty != parameter.ty
                        || existing.optional != parameter.optional
                        || existing.description != parameter.description
                    {
                        return Err(Error::AmbiguousParameter {
                            name: parameter.name.clone(),
                        });
                    }
                }
                None => merged.push(parameter.clone()),
            }
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DescriptionNode;
    use crate::model::TextStyle;

    fn param(name: &str, ty: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            optional: false,
            ty: ty.to_string(),
            description: Vec::new(),
            default_value: None,
        }
    }

    fn ret(ty: &str) -> Return {
        Return {
            ty: ty.to_string(),
            description: Vec::new(),
        }
    }

    fn function(parameter_overloads: Vec<Vec<Parameter>>, return_overloads: Vec<Vec<Return>>) -> Function {
        Function {
            name: "f".to_string(),
            needs_self: false,
            description: Vec::new(),
            see: Vec::new(),
            source: None,
            parameter_overloads,
            return_overloads,
        }
    }

    #[test]
    fn cross_product_counts() {
        let f = function(
            vec![vec![param("a", "string"), param("b", "number")]],
            vec![vec![ret("boolean")], vec![ret("number"), ret("string")]],
        );
        let combined = combine_overloads(&f);
        assert_eq!(combined.len(), 2);
        for overload in &combined {
            assert_eq!(overload.parameters.len(), 2);
        }
        assert_eq!(combined[0].returns.len(), 1);
        assert_eq!(combined[1].returns.len(), 2);
    }

    #[test]
    fn returns_only_yields_one_per_overload() {
        let f = function(vec![], vec![vec![ret("boolean")], vec![ret("string")]]);
        let combined = combine_overloads(&f);
        assert_eq!(combined.len(), 2);
        assert!(combined.iter().all(|o| o.parameters.is_empty()));
    }

    #[test]
    fn no_overloads_yields_one_empty() {
        let combined = combine_overloads(&function(vec![], vec![]));
        assert_eq!(combined.len(), 1);
        assert!(combined[0].parameters.is_empty());
        assert!(combined[0].returns.is_empty());
    }

    #[test]
    fn merged_returns_pad_short_overloads_with_nil() {
        let f = function(
            vec![vec![param("a", "string"), param("b", "number")]],
            vec![vec![ret("r1")], vec![ret("r2"), ret("r3")]],
        );
        let merged = combine_merged(&f);
        assert_eq!(merged.len(), 1);
        let returns = &merged[0].returns;
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].len(), 2);
        assert_eq!(returns[0][0].ty, "r1");
        assert_eq!(returns[0][1], Return::nil());
        assert_eq!(returns[1].len(), 2);
        assert_eq!(returns[1][0].ty, "r2");
        assert_eq!(returns[1][1].ty, "r3");
    }

    #[test]
    fn identical_parameters_merge_silently() {
        let f = function(
            vec![
                vec![param("x", "string")],
                vec![param("x", "string"), param("y", "number")],
            ],
            vec![],
        );
        let merged = merge_parameters(&f).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "x");
        assert_eq!(merged[1].name, "y");
    }

    #[test]
    fn conflicting_parameters_are_ambiguous() {
        let f = function(
            vec![vec![param("x", "string")], vec![param("x", "number")]],
            vec![],
        );
        assert!(matches!(
            merge_parameters(&f),
            Err(Error::AmbiguousParameter { name }) if name == "x"
        ));
    }

    #[test]
    fn differing_descriptions_are_ambiguous() {
        let mut a = param("x", "string");
        a.description = vec![DescriptionNode::Text {
            style: TextStyle::Normal,
            content: "one".to_string(),
        }];
        let b = param("x", "string");
        let f = function(vec![vec![a], vec![b]], vec![]);
        assert!(merge_parameters(&f).is_err());
    }
}
