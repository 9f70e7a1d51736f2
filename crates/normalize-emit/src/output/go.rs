//! Go bundle.
//!
//! Emits gofmt-formatted Go: tab indentation, tabwriter-style column
//! alignment inside struct bodies, struct tags from annotations, pointer
//! receivers and multi-value returns. Failures propagate as `error`
//! values.

use crate::ast::{
    Annotation, Ast, Block, Code, FuncId, FuncOwner, Macro, MacroKind, Module, NodeRef, Package,
    Statement, TypeDecl, TypeDef, TypeId, TypeKind, Visibility,
};
use crate::comments::{FuncDoc, doc_lines};
use crate::error::EmitError;
use crate::imports::{Disambiguation, ImportSet, numbered_alias};
use crate::output::{lower_first, quote, upper_first};
use crate::path::{NodeKind, NodePath};
use crate::render::{FileCx, TypeTarget};
use crate::returns::MultiReturn;
use crate::symbol::Reference;
use crate::traits::{FileUnit, Language, MacroScope, MacroStrategy, ReturnConvention, Returns};
use crate::writer::CodeWriter;
use std::collections::HashSet;

/// Static instance of the Go bundle for the registry.
pub static GO: Go = Go;

static GO_MACROS: &[&dyn MacroStrategy] = &[&GoTerminator, &GoTryDefine, &GoFail];

pub struct Go;

/// Identifier spelled for its visibility: exported names start upper case.
fn exported(name: &str, visibility: Visibility) -> String {
    match visibility {
        Visibility::Public => upper_first(name),
        Visibility::Private => lower_first(name),
    }
}

fn comment(w: &mut CodeWriter, lines: &[String]) {
    for line in lines {
        if line.is_empty() {
            w.line("//");
        } else {
            w.line(&format!("// {}", line));
        }
    }
}

fn tag_segment(annotation: &Annotation) -> String {
    let mut value = annotation.value.clone().unwrap_or_default();
    for (key, param) in &annotation.params {
        value.push(',');
        value.push_str(key);
        if !param.is_empty() {
            value.push('=');
            value.push_str(param);
        }
    }
    format!("{}:\"{}\"", annotation.name, value)
}

/// Lay out rows of cells the way gofmt's tabwriter does.
///
/// Every cell but the last in a row is terminated. A column is aligned
/// over each run of consecutive rows that terminate a cell in it, padded
/// to the widest cell plus one space.
fn align(rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths: Vec<Vec<usize>> = rows.iter().map(|r| vec![0; r.len()]).collect();
    for column in 0..columns.saturating_sub(1) {
        let mut i = 0;
        while i < rows.len() {
            if rows[i].len() <= column + 1 {
                i += 1;
                continue;
            }
            let start = i;
            while i < rows.len() && rows[i].len() > column + 1 {
                i += 1;
            }
            let width = rows[start..i]
                .iter()
                .map(|r| r[column].chars().count())
                .max()
                .unwrap_or(0)
                + 1;
            for row in &mut widths[start..i] {
                row[column] = width;
            }
        }
    }

    rows.iter()
        .zip(widths)
        .map(|(row, widths)| {
            let mut line = String::new();
            for (column, cell) in row.iter().enumerate() {
                if column + 1 == row.len() {
                    line.push_str(cell);
                } else {
                    line.push_str(&format!("{:<width$}", cell, width = widths[column]));
                }
            }
            line
        })
        .collect()
}

/// One line of a struct or interface body.
struct Row {
    doc: Vec<String>,
    cells: Vec<String>,
}

/// Write body rows; a doc comment ends the current alignment run.
fn write_rows(w: &mut CodeWriter, rows: &[Row]) {
    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        while end < rows.len() && rows[end].doc.is_empty() {
            end += 1;
        }
        comment(w, &rows[start].doc);
        let cells: Vec<Vec<String>> = rows[start..end].iter().map(|r| r.cells.clone()).collect();
        for line in align(&cells) {
            w.line(&line);
        }
        start = end;
    }
}

impl Go {
    fn write_func_doc(&self, w: &mut CodeWriter, doc: &FuncDoc) {
        comment(w, &doc.summary);
        let roles: Vec<String> = doc
            .params
            .iter()
            .map(|(name, text)| format!("parameter `{}` {}", name, text))
            .chain(
                doc.results
                    .iter()
                    .map(|r| format!("result `{}` {}", r.label, r.text)),
            )
            .map(|line| line.trim_end().to_string())
            .collect();
        comment(w, &roles);
    }

    /// `(params) results` of a func or interface method.
    fn signature(
        &self,
        cx: &mut FileCx<'_>,
        id: FuncId,
        at: &NodePath,
    ) -> Result<String, EmitError> {
        let func = cx.ast().func(id);
        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            params.push(format!("{} {}", param.name, cx.type_expr(&param.ty, at)?));
        }
        let results = match self.returns().signature(cx, func, at)?.returns {
            Returns::Nothing => String::new(),
            Returns::Single(ty) => format!(" {}", ty),
            Returns::Tuple(parts) => format!(" ({})", parts.join(", ")),
            Returns::Wrapper { name, .. } => format!(" {}", name),
        };
        Ok(format!("({}){}", params.join(", "), results))
    }

    fn write_struct(
        &self,
        cx: &mut FileCx<'_>,
        def: &TypeDef,
        name: &str,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError> {
        if def.fields.is_empty() {
            w.line(&format!("type {} struct{{}}", name));
            return Ok(());
        }
        let ast = cx.ast();
        let mut rows = Vec::with_capacity(def.fields.len());
        for &field_id in &def.fields {
            let field = ast.field(field_id);
            let at = ast.path(NodeRef::Field(field_id));
            let field_name = exported(&field.name, field.visibility);
            let mut cells = vec![field_name.clone(), cx.type_expr(&field.ty, &at)?];
            if !field.annotations.is_empty() {
                let tags: Vec<String> = field.annotations.iter().map(tag_segment).collect();
                cells.push(format!("`{}`", tags.join(" ")));
            }
            rows.push(Row {
                doc: doc_lines(&field_name, field.doc.as_deref()),
                cells,
            });
        }
        w.line(&format!("type {} struct {{", name));
        w.indent();
        write_rows(w, &rows);
        w.dedent();
        w.line("}");
        Ok(())
    }

    fn write_interface(
        &self,
        cx: &mut FileCx<'_>,
        def: &TypeDef,
        name: &str,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError> {
        if def.methods.is_empty() {
            w.line(&format!("type {} interface{{}}", name));
            return Ok(());
        }
        w.line(&format!("type {} interface {{", name));
        w.indent();
        for &method in &def.methods {
            let ast = cx.ast();
            let func = ast.func(method);
            let at = ast.path(NodeRef::Func(method));
            let method_name = exported(&func.name, func.visibility);
            let doc = cx.func_doc(func, &method_name, &at)?;
            self.write_func_doc(w, &doc);
            let signature = self.signature(cx, method, &at)?;
            w.line(&format!("{}{}", method_name, signature));
        }
        w.dedent();
        w.line("}");
        Ok(())
    }
}

impl Language for Go {
    fn tag(&self) -> &'static str {
        "go"
    }

    fn extension(&self) -> &'static str {
        "go"
    }

    fn media_type(&self) -> &'static str {
        "text/x-go"
    }

    fn indent(&self) -> &'static str {
        "\t"
    }

    fn terminator(&self) -> &'static str {
        ""
    }

    fn supports_tags(&self) -> bool {
        true
    }

    fn package_dir(&self, _module: &Module, package: &Package) -> Vec<String> {
        package
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    fn file_name(&self, _ast: &Ast, unit: &FileUnit<'_>) -> String {
        format!("{}.{}", unit.name, self.extension())
    }

    fn package_doc_file(&self) -> &'static str {
        "doc.go"
    }

    fn doc_on_file_clause(&self) -> bool {
        true
    }

    fn type_name(&self, def: &TypeDef) -> String {
        exported(&def.name, def.visibility)
    }

    fn declared_name(&self, _kind: NodeKind, name: &str, visibility: Visibility) -> String {
        exported(name, visibility)
    }

    fn declared_reference(&self, ast: &Ast, id: TypeId) -> Reference {
        let package = ast.package(ast.type_package(id));
        let module = ast.module(package.module);
        let import = if package.path.is_empty() {
            module.path.clone()
        } else {
            format!("{}/{}", module.path, package.path)
        };
        Reference::member(import, package.name.clone(), self.type_name(ast.type_def(id)))
    }

    fn disambiguate(&self, local: &str, taken: &HashSet<String>) -> Disambiguation {
        Disambiguation::Alias(numbered_alias(local, taken))
    }

    fn write_imports(&self, imports: &ImportSet, w: &mut CodeWriter) {
        let specs: Vec<String> = imports
            .imported()
            .map(|entry| match &entry.alias {
                Some(alias) => format!("{} {}", alias, quote(&entry.path)),
                None => quote(&entry.path),
            })
            .collect();
        match specs.as_slice() {
            [] => {}
            [single] => w.line(&format!("import {}", single)),
            many => {
                w.line("import (");
                w.indent();
                for spec in many {
                    w.line(spec);
                }
                w.dedent();
                w.line(")");
            }
        }
    }

    fn write_package_clause(
        &self,
        cx: &mut FileCx<'_>,
        doc: Option<&str>,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError> {
        let name = &cx.package().name;
        comment(w, &doc_lines(&format!("Package {}", name), doc));
        w.line(&format!("package {}", name));
        Ok(())
    }

    fn write_type(&self, cx: &mut FileCx<'_>, id: TypeId, w: &mut CodeWriter) -> Result<(), EmitError> {
        let def = cx.ast().type_def(id);
        let name = self.type_name(def);
        comment(w, &doc_lines(&name, def.doc.as_deref()));
        match def.kind {
            TypeKind::Struct => {
                self.write_struct(cx, def, &name, w)?;
                for &method in &def.methods {
                    w.blank();
                    self.write_func(cx, method, w)?;
                }
            }
            TypeKind::Interface => self.write_interface(cx, def, &name, w)?,
        }
        Ok(())
    }

    fn write_func(&self, cx: &mut FileCx<'_>, id: FuncId, w: &mut CodeWriter) -> Result<(), EmitError> {
        let ast = cx.ast();
        let func = ast.func(id);
        let at = ast.path(NodeRef::Func(id));
        let name = exported(&func.name, func.visibility);

        let receiver = match ast.func_owner(id) {
            FuncOwner::Type(owner) => {
                let type_name = cx.declared_type_name(owner);
                let binding = func
                    .receiver
                    .clone()
                    .unwrap_or_else(|| lower_first(&ast.type_def(owner).name).chars().take(1).collect());
                format!("({} *{}) ", binding, type_name)
            }
            FuncOwner::File(_) | FuncOwner::Package(_) => String::new(),
        };

        let doc = cx.func_doc(func, &name, &at)?;
        self.write_func_doc(w, &doc);
        let signature = self.signature(cx, id, &at)?;
        w.line(&format!("func {}{}{} {{", receiver, name, signature));
        w.indent();
        cx.write_body(w, func, &at)?;
        w.dedent();
        w.line("}");
        Ok(())
    }

    fn type_expr(
        &self,
        cx: &mut FileCx<'_>,
        decl: &TypeDecl,
        at: &NodePath,
    ) -> Result<String, EmitError> {
        Ok(match decl {
            TypeDecl::Simple(symbol) => cx.symbol(symbol, at)?,
            TypeDecl::Slice(element) => format!("[]{}", self.type_expr(cx, element, at)?),
            TypeDecl::Map(key, value) => format!(
                "map[{}]{}",
                self.type_expr(cx, key, at)?,
                self.type_expr(cx, value, at)?
            ),
            TypeDecl::Pointer(element) => format!("*{}", self.type_expr(cx, element, at)?),
            TypeDecl::Failure => "error".to_string(),
        })
    }

    fn returns(&self) -> &dyn ReturnConvention {
        &MultiReturn
    }

    fn macros(&self) -> &'static [&'static dyn MacroStrategy] {
        GO_MACROS
    }
}

// ============================================================================
// Macros
// ============================================================================

/// Zero value of a declared result, used when returning early.
fn zero_value(cx: &mut FileCx<'_>, decl: &TypeDecl, at: &NodePath) -> Result<String, EmitError> {
    let symbol = match decl {
        TypeDecl::Slice(_) | TypeDecl::Map(..) | TypeDecl::Pointer(_) | TypeDecl::Failure => {
            return Ok("nil".to_string());
        }
        TypeDecl::Simple(symbol) => symbol,
    };
    Ok(match cx.resolve_type(symbol, at)? {
        TypeTarget::Declared(id) if cx.is_struct(id) => format!("{}{{}}", cx.declared_type_name(id)),
        TypeTarget::Declared(_) => "nil".to_string(),
        TypeTarget::External(reference) => {
            let builtin = reference.import.is_none() && reference.member.is_none();
            match reference.local.as_str() {
                "string" if builtin => "\"\"".to_string(),
                "bool" if builtin => "false".to_string(),
                "any" | "error" if builtin => "nil".to_string(),
                "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
                | "uint32" | "uint64" | "uintptr" | "float32" | "float64" | "complex64"
                | "complex128" | "byte" | "rune"
                    if builtin =>
                {
                    "0".to_string()
                }
                _ => format!("*new({})", cx.reference(&reference)),
            }
        }
    })
}

/// `return <zeros>, <failure>` for the enclosing func.
fn failure_return(cx: &mut FileCx<'_>, scope: &MacroScope<'_>, failure: Code) -> Result<Statement, EmitError> {
    let leading = &scope.func.results[..scope.func.results.len().saturating_sub(1)];
    let mut code = Code::new().text("return ");
    for result in leading {
        code = code.text(format!("{}, ", zero_value(cx, &result.ty, &scope.path)?));
    }
    code.segments.extend(failure.segments);
    Ok(Statement::Code(code))
}

struct GoTerminator;

impl MacroStrategy for GoTerminator {
    fn kind(&self) -> MacroKind {
        MacroKind::Terminator
    }

    fn expand(&self, _: &Macro, _: &mut FileCx<'_>, _: &MacroScope<'_>) -> Result<Vec<Statement>, EmitError> {
        Ok(Vec::new())
    }
}

struct GoTryDefine;

impl MacroStrategy for GoTryDefine {
    fn kind(&self) -> MacroKind {
        MacroKind::TryDefine
    }

    fn expand(
        &self,
        mac: &Macro,
        cx: &mut FileCx<'_>,
        scope: &MacroScope<'_>,
    ) -> Result<Vec<Statement>, EmitError> {
        let Macro::TryDefine(op) = mac else {
            return Err(scope.expansion_error(self.kind(), "operands do not match the macro kind"));
        };
        scope.require_failure_channel(self.kind())?;

        let message = quote(&format!("{}: %w", op.message.replace('%', "%%")));
        let wrap = Code::new()
            .reference(Reference::member("fmt", "fmt", "Errorf"))
            .text(format!("({}, err)", message));
        let on_failure = failure_return(cx, scope, wrap)?;

        if op.idents.is_empty() {
            let mut header = Code::new().text("if err := ");
            header.segments.extend(op.call.segments.iter().cloned());
            let header = header.text("; err != nil");
            return Ok(vec![Statement::Block(
                Block::new().with_header(header).push(on_failure),
            )]);
        }

        let mut bind = Code::new().text(format!("{}, err := ", op.idents.join(", ")));
        bind.segments.extend(op.call.segments.iter().cloned());
        Ok(vec![
            Statement::Code(bind),
            Statement::Block(Block::new().with_header("if err != nil").push(on_failure)),
        ])
    }
}

struct GoFail;

impl MacroStrategy for GoFail {
    fn kind(&self) -> MacroKind {
        MacroKind::Fail
    }

    fn expand(
        &self,
        mac: &Macro,
        cx: &mut FileCx<'_>,
        scope: &MacroScope<'_>,
    ) -> Result<Vec<Statement>, EmitError> {
        let Macro::Fail(message) = mac else {
            return Err(scope.expansion_error(self.kind(), "operands do not match the macro kind"));
        };
        scope.require_failure_channel(self.kind())?;
        let failure = Code::new()
            .reference(Reference::member("errors", "errors", "New"))
            .text(format!("({})", quote(message)));
        Ok(vec![failure_return(cx, scope, failure)?])
    }
}
