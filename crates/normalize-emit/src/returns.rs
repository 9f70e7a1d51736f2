//! Return conventions: how declared results become a target signature.

use crate::ast::Func;
use crate::error::EmitError;
use crate::output::upper_first;
use crate::path::NodePath;
use crate::render::FileCx;
use crate::traits::{ReturnConvention, Returns, Signature};

/// Results map one-to-one onto a native result list.
///
/// More than one result, or any named result, becomes a tuple.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiReturn;

impl ReturnConvention for MultiReturn {
    fn signature(
        &self,
        cx: &mut FileCx<'_>,
        func: &Func,
        at: &NodePath,
    ) -> Result<Signature, EmitError> {
        let mut parts = Vec::with_capacity(func.results.len());
        for result in &func.results {
            let ty = cx.type_expr(&result.ty, at)?;
            parts.push(if result.name.is_empty() {
                ty
            } else {
                format!("{} {}", result.name, ty)
            });
        }
        let named = func.results.iter().any(|r| !r.name.is_empty());
        let returns = match parts.len() {
            0 => Returns::Nothing,
            1 if !named => Returns::Single(parts.remove(0)),
            _ => Returns::Tuple(parts),
        };
        Ok(Signature {
            returns,
            throws: None,
        })
    }
}

/// A trailing failure result becomes a checked-exception clause; the rest
/// is returned as a single value, or bundled into a wrapper record.
#[derive(Debug, Clone, Copy)]
pub struct ThrowsWrapper {
    /// Type named in the throws clause.
    pub failure: &'static str,
    /// Appended to the method name to name the wrapper.
    pub wrapper_suffix: &'static str,
}

impl ThrowsWrapper {
    /// Name of the record bundling the values of `func_name`.
    pub fn wrapper_name(&self, func_name: &str) -> String {
        format!("{}{}", upper_first(func_name), self.wrapper_suffix)
    }

    /// Record component for the result at `index`; unnamed results are
    /// numbered from one.
    pub fn component_name(&self, index: usize, name: &str) -> String {
        if name.is_empty() {
            format!("value{}", index + 1)
        } else {
            name.to_string()
        }
    }
}

impl Default for ThrowsWrapper {
    fn default() -> Self {
        Self {
            failure: "Exception",
            wrapper_suffix: "Result",
        }
    }
}

impl ReturnConvention for ThrowsWrapper {
    fn signature(
        &self,
        cx: &mut FileCx<'_>,
        func: &Func,
        at: &NodePath,
    ) -> Result<Signature, EmitError> {
        let (values, throws) = match func.results.split_last() {
            Some((last, rest)) if last.ty.is_failure() => (rest, Some(self.failure.to_string())),
            _ => (func.results.as_slice(), None),
        };

        let returns = match values {
            [] => Returns::Nothing,
            [single] => Returns::Single(cx.type_expr(&single.ty, at)?),
            many => {
                let mut components = Vec::with_capacity(many.len());
                for (i, result) in many.iter().enumerate() {
                    let name = self.component_name(i, &result.name);
                    components.push((name, cx.type_expr(&result.ty, at)?));
                }
                Returns::Wrapper {
                    name: self.wrapper_name(&func.name),
                    components,
                }
            }
        };
        Ok(Signature { returns, throws })
    }
}
