//! The generic tree walk.
//!
//! [`Renderer::render`] validates the tree, plans one output unit per file
//! (plus synthesised package-doc and package-func files), renders every
//! unit independently and merges the results in declaration order.
//!
//! Each unit is rendered twice through a [`FileCx`]: the collect pass
//! records every reference the file needs, the emit pass writes the file
//! against the finished [`ImportSet`]. Macro expansion happens in both
//! passes, so imports introduced by expansions are always accounted for.

use crate::artifact::{Artifact, Leaf, MediaType};
use crate::ast::{
    Ast, Block, Code, Func, Module, ModuleId, NodeRef, Package, PackageId, Segment, Statement,
    TypeDecl, TypeId, TypeKind,
};
use crate::comments::{FuncDoc, ResultDoc, doc_lines, role_text};
use crate::error::EmitError;
use crate::imports::ImportSet;
use crate::options::RenderOptions;
use crate::path::{NodeKind, NodePath};
use crate::registry::Registry;
use crate::symbol::{Reference, Symbol, SymbolResolver};
use crate::traits::{FileUnit, Language, MacroScope};
use crate::validate::{self, DocSource};
use crate::writer::CodeWriter;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Upper bound on macros expanding into further macros.
const MAX_EXPANSION_DEPTH: usize = 64;

/// What a symbol names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTarget {
    /// A type declared in the tree.
    Declared(TypeId),
    /// Something the resolver knows about.
    External(Reference),
}

enum Pass {
    Collect(BTreeMap<String, String>),
    Emit(ImportSet),
}

/// Per-file rendering state handed to language bundles and macro
/// expansions.
pub struct FileCx<'a> {
    ast: &'a Ast,
    registry: &'a Registry,
    resolver: &'a dyn SymbolResolver,
    lang: &'static dyn Language,
    module: ModuleId,
    package: PackageId,
    unit: FileUnit<'a>,
    path: NodePath,
    indent: String,
    pass: Pass,
    cache: HashMap<String, Option<Reference>>,
    depth: usize,
}

impl<'a> FileCx<'a> {
    #[allow(clippy::too_many_arguments)]
    fn new(
        ast: &'a Ast,
        registry: &'a Registry,
        resolver: &'a dyn SymbolResolver,
        lang: &'static dyn Language,
        module: ModuleId,
        package: PackageId,
        unit: FileUnit<'a>,
        path: NodePath,
        indent: String,
    ) -> Self {
        Self {
            ast,
            registry,
            resolver,
            lang,
            module,
            package,
            unit,
            path,
            indent,
            pass: Pass::Collect(BTreeMap::new()),
            cache: HashMap::new(),
            depth: 0,
        }
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn module(&self) -> &'a Module {
        self.ast.module(self.module)
    }

    pub fn package(&self) -> &'a Package {
        self.ast.package(self.package)
    }

    pub fn package_id(&self) -> PackageId {
        self.package
    }

    pub fn unit(&self) -> &FileUnit<'a> {
        &self.unit
    }

    /// Path of the file being rendered.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn language(&self) -> &'static dyn Language {
        self.lang
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent
    }

    /// The finished import set; `None` during the collect pass.
    pub fn imports(&self) -> Option<&ImportSet> {
        match &self.pass {
            Pass::Collect(_) => None,
            Pass::Emit(imports) => Some(imports),
        }
    }

    /// A fresh writer using this file's indentation.
    pub fn writer(&self) -> CodeWriter {
        CodeWriter::new(self.indent.as_str())
    }

    /// Spell a reference, recording its import.
    pub fn reference(&mut self, reference: &Reference) -> String {
        match &mut self.pass {
            Pass::Collect(recorded) => {
                if let Some(import) = &reference.import {
                    recorded
                        .entry(import.clone())
                        .or_insert_with(|| reference.local.clone());
                }
                match &reference.member {
                    Some(member) => format!("{}.{}", reference.local, member),
                    None => reference.local.clone(),
                }
            }
            Pass::Emit(imports) => imports.spell(reference),
        }
    }

    /// Find what a symbol names: a type in this package, then
    /// `"<package path>.<Type>"` in a sibling package, then the resolver.
    pub fn resolve_type(&mut self, symbol: &Symbol, at: &NodePath) -> Result<TypeTarget, EmitError> {
        let name = symbol.as_str();
        if let Some(id) = self.ast.find_type(self.package, name) {
            return Ok(TypeTarget::Declared(id));
        }
        if let Some((pkg_path, ty)) = name.rsplit_once('.')
            && let Some(pkg) = self.ast.find_package(self.module, pkg_path)
            && let Some(id) = self.ast.find_type(pkg, ty)
        {
            return Ok(TypeTarget::Declared(id));
        }

        let (resolver, tag) = (self.resolver, self.lang.tag());
        self.cache
            .entry(name.to_string())
            .or_insert_with(|| resolver.resolve(symbol, tag))
            .clone()
            .map(TypeTarget::External)
            .ok_or_else(|| EmitError::UnresolvedSymbol {
                path: at.clone(),
                symbol: name.to_string(),
                language: tag.to_string(),
            })
    }

    /// Resolve and spell a symbol.
    pub fn symbol(&mut self, symbol: &Symbol, at: &NodePath) -> Result<String, EmitError> {
        match self.resolve_type(symbol, at)? {
            TypeTarget::Declared(id) => Ok(self.declared_type_name(id)),
            TypeTarget::External(reference) => Ok(self.reference(&reference)),
        }
    }

    /// Spell a declared type as seen from this file.
    pub fn declared_type_name(&mut self, id: TypeId) -> String {
        let lang = self.lang;
        let def = self.ast.type_def(id);
        if self.unit.types.contains(&id) {
            lang.type_name(def)
        } else if self.ast.type_package(id) == self.package {
            lang.sibling_type_name(self.ast, id)
        } else {
            let reference = lang.declared_reference(self.ast, id);
            self.reference(&reference)
        }
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        self.ast.type_def(id).kind == TypeKind::Struct
    }

    pub fn type_expr(&mut self, decl: &TypeDecl, at: &NodePath) -> Result<String, EmitError> {
        let lang = self.lang;
        lang.type_expr(self, decl, at)
    }

    /// Render a code template.
    pub fn code(&mut self, code: &Code, at: &NodePath) -> Result<String, EmitError> {
        let mut out = String::new();
        for segment in &code.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Symbol(symbol) => out.push_str(&self.symbol(symbol, at)?),
                Segment::Ref(reference) => out.push_str(&self.reference(reference)),
            }
        }
        Ok(out)
    }

    /// Write a func body: its doc as line comments, then its statements.
    pub fn write_body(
        &mut self,
        w: &mut CodeWriter,
        func: &Func,
        at: &NodePath,
    ) -> Result<(), EmitError> {
        self.block_doc(w, &func.body);
        self.write_block(w, func, &func.body, at)
    }

    fn block_doc(&self, w: &mut CodeWriter, block: &Block) {
        for line in doc_lines("", block.doc.as_deref()) {
            w.line(&format!("{} {}", self.lang.line_comment(), line.trim_start()));
        }
    }

    /// Write the statements of `block` (without its braces).
    fn write_block(
        &mut self,
        w: &mut CodeWriter,
        func: &Func,
        block: &Block,
        at: &NodePath,
    ) -> Result<(), EmitError> {
        self.write_statements(w, func, block, &block.statements, at)
    }

    fn write_statements(
        &mut self,
        w: &mut CodeWriter,
        func: &Func,
        block: &Block,
        statements: &[Statement],
        at: &NodePath,
    ) -> Result<(), EmitError> {
        let lang = self.lang;
        for (i, statement) in statements.iter().enumerate() {
            match statement {
                Statement::Code(code) => {
                    let text = self.code(code, at)?;
                    w.line(&text);
                }
                Statement::Terminator => w.append(lang.terminator()),
                Statement::Block(inner) => {
                    let inner_at = at.child(NodeKind::Block, i.to_string());
                    self.write_nested(w, func, inner, &inner_at)?;
                }
                Statement::Macro(mac) => {
                    let kind = mac.kind();
                    let mac_at = at.child(NodeKind::Macro, kind.to_string());
                    let strategy = self.registry.macro_strategy(lang.tag(), kind).ok_or_else(|| {
                        EmitError::UnsupportedMacro {
                            path: mac_at.clone(),
                            kind,
                            language: lang.tag().to_string(),
                        }
                    })?;
                    if self.depth >= MAX_EXPANSION_DEPTH {
                        return Err(EmitError::MacroExpansion {
                            path: mac_at,
                            kind,
                            message: format!("expansion nested deeper than {}", MAX_EXPANSION_DEPTH),
                        });
                    }
                    let scope = MacroScope {
                        func,
                        block,
                        language: lang.tag(),
                        path: mac_at.clone(),
                    };
                    let expanded = strategy.expand(mac, self, &scope)?;
                    tracing::trace!(at = %mac_at, statements = expanded.len(), "expanded macro");

                    self.depth += 1;
                    let result = self.write_statements(w, func, block, &expanded, &mac_at);
                    self.depth -= 1;
                    result?;
                }
            }
        }
        Ok(())
    }

    fn write_nested(
        &mut self,
        w: &mut CodeWriter,
        func: &Func,
        block: &Block,
        at: &NodePath,
    ) -> Result<(), EmitError> {
        let lang = self.lang;
        self.block_doc(w, block);
        let header = match &block.header {
            Some(header) => Some(self.code(header, at)?),
            None => None,
        };
        w.line(&lang.open_block(header.as_deref()));
        w.indent();
        self.write_block(w, func, block, at)?;
        w.dedent();
        w.line(lang.close_block());

        let mut next = block.chained.as_deref();
        while let Some(clause) = next {
            let header = match &clause.header {
                Some(header) => Some(self.code(header, at)?),
                None => None,
            };
            w.append(" ");
            w.append(&lang.open_block(header.as_deref()));
            w.indent();
            self.block_doc(w, clause);
            self.write_block(w, func, clause, at)?;
            w.dedent();
            w.line(lang.close_block());
            next = clause.chained.as_deref();
        }
        Ok(())
    }

    /// Collect a func's comment and role sub-entries.
    pub fn func_doc(&mut self, func: &Func, subject: &str, at: &NodePath) -> Result<FuncDoc, EmitError> {
        let mut doc = FuncDoc {
            summary: doc_lines(subject, func.doc.as_deref()),
            ..FuncDoc::default()
        };
        for param in &func.params {
            if let Some(text) = param.doc.as_deref().and_then(role_text) {
                doc.params.push((param.name.clone(), text));
            }
        }
        for result in &func.results {
            let Some(text) = result.doc.as_deref().and_then(role_text) else {
                continue;
            };
            let label = if result.name.is_empty() {
                self.type_expr(&result.ty, at)?
            } else {
                result.name.clone()
            };
            doc.results.push(ResultDoc {
                label,
                text,
                failure: result.ty.is_failure(),
            });
        }
        Ok(doc)
    }

    fn write_file(&mut self, w: &mut CodeWriter) -> Result<(), EmitError> {
        let lang = self.lang;
        if let Some(preamble) = self.unit.preamble.filter(|p| !p.trim().is_empty()) {
            w.raw(preamble);
            w.blank();
        }
        let doc = self.unit.doc;
        lang.write_package_clause(self, doc, w)?;
        if let Pass::Emit(imports) = &self.pass
            && imports.imported().next().is_some()
        {
            w.blank();
            lang.write_imports(imports, w);
        }
        lang.write_decls(self, w)
    }

    fn finish_collect(&mut self) {
        let lang = self.lang;
        if let Pass::Collect(recorded) = &self.pass {
            let imports = ImportSet::build(recorded, |local, taken| lang.disambiguate(local, taken));
            self.pass = Pass::Emit(imports);
        }
    }
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub artifact: Artifact,
    /// Files dropped in diagnostic mode, in declaration order.
    pub diagnostics: Vec<EmitError>,
}

/// One planned output file.
struct Unit<'a> {
    lang: &'static dyn Language,
    module: ModuleId,
    package: PackageId,
    module_dir: Vec<String>,
    dir: Vec<String>,
    leaf: String,
    file: FileUnit<'a>,
    path: NodePath,
}

/// Renders a tree with a registry of language bundles.
pub struct Renderer<'r> {
    registry: &'r Registry,
    resolver: &'r dyn SymbolResolver,
    options: RenderOptions,
}

impl<'r> Renderer<'r> {
    pub fn new(registry: &'r Registry, resolver: &'r dyn SymbolResolver) -> Self {
        Self {
            registry,
            resolver,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render the whole project. Either every file renders (or, in
    /// diagnostic mode, is reported) or nothing is returned.
    pub fn render(&self, ast: &Ast) -> Result<RenderOutput, EmitError> {
        validate::project(ast)?;

        let mut units = Vec::new();
        for &module_id in &ast.project().modules {
            let module = ast.module(module_id);
            let module_path = ast.path(NodeRef::Module(module_id));
            tracing::debug!(module = %module_path, language = %module.language, "planning module");

            let lang = self.registry.language(&module.language).ok_or_else(|| {
                EmitError::UnsupportedLanguage {
                    path: module_path.clone(),
                    language: module.language.clone(),
                }
            })?;
            validate::module(ast, module_id)?;

            let module_dir = lang.module_dir(module);
            for &package_id in &module.packages {
                self.check_cancel()?;
                self.plan_package(ast, lang, module_id, package_id, &module_dir, &mut units)?;
            }
        }

        let rendered: Vec<Result<String, EmitError>> = if self.options.parallel {
            units.par_iter().map(|unit| self.render_unit(ast, unit)).collect()
        } else {
            units.iter().map(|unit| self.render_unit(ast, unit)).collect()
        };
        self.check_cancel()?;

        let mut artifact = Artifact::new();
        let mut diagnostics = Vec::new();
        for (unit, result) in units.iter().zip(rendered) {
            let collision = |occupied: crate::artifact::Occupied| EmitError::DuplicateName {
                path: unit.path.clone(),
                scope: "artifact",
                name: occupied.0,
            };
            artifact
                .ensure_dir(&unit.module_dir, MediaType::ModuleDirectory)
                .map_err(collision)?;
            artifact
                .ensure_dir(&unit.dir, MediaType::Directory)
                .map_err(collision)?;

            let content = match result {
                Ok(content) => content,
                Err(EmitError::Cancelled) => return Err(EmitError::Cancelled),
                Err(err) if self.options.diagnostic_mode => {
                    tracing::warn!(file = %unit.path, error = %err, "dropping file");
                    diagnostics.push(err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let leaf = Leaf {
                media_type: MediaType::Source(unit.lang.media_type().to_string()),
                content,
            };
            artifact
                .insert_leaf(&unit.dir, &unit.leaf, leaf)
                .map_err(collision)?;
        }

        tracing::debug!(
            files = units.len() - diagnostics.len(),
            dropped = diagnostics.len(),
            "render finished"
        );
        Ok(RenderOutput {
            artifact,
            diagnostics,
        })
    }

    fn check_cancel(&self) -> Result<(), EmitError> {
        if self.options.cancel.is_cancelled() {
            Err(EmitError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn plan_package<'a>(
        &self,
        ast: &'a Ast,
        lang: &'static dyn Language,
        module_id: ModuleId,
        package_id: PackageId,
        module_dir: &[String],
        units: &mut Vec<Unit<'a>>,
    ) -> Result<(), EmitError> {
        let module = ast.module(module_id);
        let pkg = ast.package(package_id);
        let pkg_path = ast.path(NodeRef::Package(package_id));
        tracing::debug!(package = %pkg_path, files = pkg.files.len(), "planning package");

        let doc = validate::package(ast, lang, package_id)?;
        let mut dir = module_dir.to_vec();
        dir.extend(lang.package_dir(module, pkg));

        // Package docs land on the contributing file's clause when the
        // language allows it, otherwise in a synthesised file.
        let (standalone_doc, file_doc) = match doc {
            None => (None, None),
            Some(doc) => match doc.source {
                DocSource::File(file) if lang.doc_on_file_clause() => (None, Some((file, doc.text))),
                _ => (Some(doc.text), None),
            },
        };
        let pkg_preamble = pkg.preamble.as_deref();

        let mut push = |file: FileUnit<'a>, path: NodePath, leaf: String| {
            units.push(Unit {
                lang,
                module: module_id,
                package: package_id,
                module_dir: module_dir.to_vec(),
                dir: dir.clone(),
                leaf,
                file,
                path,
            });
        };

        if let Some(text) = standalone_doc {
            let name = lang.package_doc_file();
            let unit = FileUnit {
                name,
                types: &[],
                funcs: &[],
                doc: Some(text),
                preamble: pkg_preamble,
            };
            push(unit, pkg_path.child(NodeKind::File, name), name.to_string());
        }

        for &file_id in &pkg.files {
            self.check_cancel()?;
            let file = ast.file(file_id);
            let unit = FileUnit {
                name: &file.name,
                types: &file.types,
                funcs: &file.funcs,
                doc: file_doc.filter(|(id, _)| *id == file_id).map(|(_, text)| text),
                preamble: file.preamble.as_deref().or(pkg_preamble),
            };
            let leaf = lang.file_name(ast, &unit);
            push(unit, ast.path(NodeRef::File(file_id)), leaf);
        }

        if !pkg.funcs.is_empty() {
            let unit = FileUnit {
                name: &pkg.name,
                types: &[],
                funcs: &pkg.funcs,
                doc: None,
                preamble: pkg_preamble,
            };
            let leaf = lang.file_name(ast, &unit);
            push(unit, pkg_path.child(NodeKind::File, &pkg.name), leaf);
        }
        Ok(())
    }

    fn render_unit(&self, ast: &Ast, unit: &Unit<'_>) -> Result<String, EmitError> {
        self.check_cancel()?;
        tracing::debug!(file = %unit.path, "rendering file");
        let lang = unit.lang;
        validate::file_decls(ast, lang, unit.file.types, unit.file.funcs)?;
        let indent = self
            .options
            .language(lang.tag())
            .and_then(|l| l.indent.clone())
            .unwrap_or_else(|| lang.indent().to_string());
        let mut cx = FileCx::new(
            ast,
            self.registry,
            self.resolver,
            lang,
            unit.module,
            unit.package,
            unit.file.clone(),
            unit.path.clone(),
            indent,
        );

        let mut scratch = cx.writer();
        cx.write_file(&mut scratch)?;
        cx.finish_collect();

        let mut w = cx.writer();
        cx.write_file(&mut w)?;
        Ok(w.finish())
    }
}
