//! Traits for target-language bundles and their pluggable strategies.

use crate::ast::{
    Ast, Block, Func, FuncId, Macro, MacroKind, Module, Package, Statement, TypeDecl, TypeDef, TypeId,
    Visibility,
};
use crate::error::EmitError;
use crate::imports::{Disambiguation, ImportSet};
use crate::path::{NodeKind, NodePath};
use crate::render::FileCx;
use crate::symbol::Reference;
use crate::writer::CodeWriter;
use std::collections::HashSet;

/// A target language: layout, naming, import rules and file emission.
///
/// The renderer owns the walk (modules, packages, files, the two import
/// passes and macro dispatch); a bundle decides how each piece is spelled.
pub trait Language: Send + Sync {
    /// Language tag matched against `Module::language` (e.g. "go").
    fn tag(&self) -> &'static str;

    /// File extension for output (e.g. "go").
    fn extension(&self) -> &'static str;

    /// MIME type of rendered leaves.
    fn media_type(&self) -> &'static str;

    /// Default indentation unit.
    fn indent(&self) -> &'static str;

    /// Statement terminator appended by `Statement::Terminator`.
    fn terminator(&self) -> &'static str;

    /// Whether fields carry inline metadata tags.
    fn supports_tags(&self) -> bool;

    fn line_comment(&self) -> &'static str {
        "//"
    }

    fn open_block(&self, header: Option<&str>) -> String {
        match header {
            Some(header) => format!("{} {{", header),
            None => "{".to_string(),
        }
    }

    fn close_block(&self) -> &'static str {
        "}"
    }

    // --- layout -------------------------------------------------------------

    /// Directory segments of a module, relative to the artifact root.
    fn module_dir(&self, module: &Module) -> Vec<String> {
        module
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Directory segments of a package, relative to its module directory.
    fn package_dir(&self, module: &Module, package: &Package) -> Vec<String>;

    /// Leaf name for a file unit.
    fn file_name(&self, ast: &Ast, unit: &FileUnit<'_>) -> String;

    /// Leaf name of the synthesised package documentation file.
    fn package_doc_file(&self) -> &'static str;

    /// Whether a file's own doc comment is written on its package clause.
    /// When false, every package-level doc goes to the synthesised file.
    fn doc_on_file_clause(&self) -> bool;

    // --- naming -------------------------------------------------------------

    /// Declared name of a type in this language.
    fn type_name(&self, def: &TypeDef) -> String;

    /// Identifier printed for a declaration of `kind` (`Struct`,
    /// `Interface`, `Field`, `Method` or `Func`). Sibling uniqueness is
    /// checked on these, so two tree names that print the same collide.
    fn declared_name(&self, kind: NodeKind, name: &str, visibility: Visibility) -> String {
        let _ = (kind, visibility);
        name.to_string()
    }

    /// Name of a type declared in another file of the current package.
    fn sibling_type_name(&self, ast: &Ast, id: TypeId) -> String {
        self.type_name(ast.type_def(id))
    }

    /// Reference to a type declared in another package of the same module.
    fn declared_reference(&self, ast: &Ast, id: TypeId) -> Reference;

    // --- imports ------------------------------------------------------------

    fn disambiguate(&self, local: &str, taken: &HashSet<String>) -> Disambiguation;

    fn write_imports(&self, imports: &ImportSet, w: &mut CodeWriter);

    // --- emission -----------------------------------------------------------

    fn write_package_clause(
        &self,
        cx: &mut FileCx<'_>,
        doc: Option<&str>,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError>;

    /// Write the file's types, then its funcs, in declaration order.
    fn write_decls(&self, cx: &mut FileCx<'_>, w: &mut CodeWriter) -> Result<(), EmitError> {
        let unit = cx.unit();
        let (types, funcs) = (unit.types, unit.funcs);
        for id in types {
            w.blank();
            self.write_type(cx, *id, w)?;
        }
        for id in funcs {
            w.blank();
            self.write_func(cx, *id, w)?;
        }
        Ok(())
    }

    fn write_type(&self, cx: &mut FileCx<'_>, id: TypeId, w: &mut CodeWriter) -> Result<(), EmitError>;

    fn write_func(
        &self,
        cx: &mut FileCx<'_>,
        id: FuncId,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError>;

    /// Spell a type expression, recording the imports it needs.
    fn type_expr(
        &self,
        cx: &mut FileCx<'_>,
        decl: &TypeDecl,
        at: &NodePath,
    ) -> Result<String, EmitError>;

    /// How declared results map onto this language's signatures.
    fn returns(&self) -> &dyn ReturnConvention;

    /// Macro expansions registered with the bundle.
    fn macros(&self) -> &'static [&'static dyn MacroStrategy];
}

/// One output file as seen by a language bundle.
#[derive(Debug, Clone)]
pub struct FileUnit<'a> {
    pub name: &'a str,
    pub types: &'a [TypeId],
    pub funcs: &'a [FuncId],
    /// Package documentation carried by this unit.
    pub doc: Option<&'a str>,
    pub preamble: Option<&'a str>,
}

/// Context handed to a macro expansion.
#[derive(Debug)]
pub struct MacroScope<'a> {
    /// Enclosing func; its results drive failure propagation.
    pub func: &'a Func,
    pub block: &'a Block,
    pub language: &'static str,
    pub path: NodePath,
}

impl MacroScope<'_> {
    /// Fail unless the enclosing func declares a trailing failure result.
    pub fn require_failure_channel(&self, kind: MacroKind) -> Result<(), EmitError> {
        if self.func.has_failure_result() {
            Ok(())
        } else {
            Err(EmitError::MacroContext {
                path: self.path.clone(),
                kind,
                message: format!(
                    "func `{}` does not declare a trailing failure result",
                    self.func.name
                ),
            })
        }
    }

    pub fn expansion_error(&self, kind: MacroKind, message: impl Into<String>) -> EmitError {
        EmitError::MacroExpansion {
            path: self.path.clone(),
            kind,
            message: message.into(),
        }
    }
}

/// Expands one macro kind for one language.
pub trait MacroStrategy: Send + Sync {
    fn kind(&self) -> MacroKind;

    fn expand(
        &self,
        mac: &Macro,
        cx: &mut FileCx<'_>,
        scope: &MacroScope<'_>,
    ) -> Result<Vec<Statement>, EmitError>;
}

/// Signature shape produced by a [`ReturnConvention`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub returns: Returns,
    /// Checked-failure clause, for exception-based targets.
    pub throws: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Returns {
    Nothing,
    Single(String),
    /// Multiple return values, each already spelled (`name type` or `type`).
    Tuple(Vec<String>),
    /// A synthesised result type with `(name, type)` components.
    Wrapper {
        name: String,
        components: Vec<(String, String)>,
    },
}

/// Maps a func's declared results onto a target signature.
pub trait ReturnConvention: Send + Sync {
    fn signature(
        &self,
        cx: &mut FileCx<'_>,
        func: &Func,
        at: &NodePath,
    ) -> Result<Signature, EmitError>;
}
