//! Java bundle.
//!
//! Single-return plus checked exceptions: a trailing failure result
//! becomes `throws Exception` and several remaining results are bundled
//! into a record declared next to the method. Java has no tag concept, so
//! field annotations are omitted.
//!
//! A file holding exactly one type and no funcs becomes that type's
//! top-level class. Anything else is wrapped in a `final` holder class
//! named after the file, with nested static types and static methods.

use crate::ast::{
    Ast, Block, Code, FuncId, FuncOwner, Macro, MacroKind, Module, NodeRef, Package, Statement,
    TypeDecl, TypeDef, TypeId, TypeKind, Visibility,
};
use crate::comments::{FuncDoc, doc_lines};
use crate::error::EmitError;
use crate::imports::{Disambiguation, ImportSet};
use crate::output::{lower_first, pascal_case, quote, upper_first};
use crate::path::{NodeKind, NodePath};
use crate::render::FileCx;
use crate::returns::ThrowsWrapper;
use crate::symbol::Reference;
use crate::traits::{FileUnit, Language, MacroScope, MacroStrategy, ReturnConvention, Returns};
use crate::writer::CodeWriter;
use std::collections::HashSet;

/// Static instance of the Java bundle for the registry.
pub static JAVA: Java = Java;

static JAVA_MACROS: &[&dyn MacroStrategy] = &[&JavaTerminator, &JavaTryDefine, &JavaFail];

static THROWS_WRAPPER: ThrowsWrapper = ThrowsWrapper {
    failure: "Exception",
    wrapper_suffix: "Result",
};

pub struct Java;

/// How a method is declared.
#[derive(Clone, Copy, PartialEq)]
enum MethodKind {
    Instance,
    Static,
    /// Interface member: no modifiers, no body.
    Abstract,
}

/// Whether a file renders its single type as the top-level class.
fn is_top_level(types: &[TypeId], funcs: &[FuncId]) -> bool {
    types.len() == 1 && funcs.is_empty()
}

fn holder_name(file: &str) -> String {
    pascal_case(file)
}

/// Dotted package name: module path then package path.
fn package_name(module: &Module, package: &Package) -> String {
    module
        .path
        .split(['/', '.'])
        .chain(package.path.split(['/', '.']))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

fn boxed(ty: String) -> String {
    match ty.as_str() {
        "int" => "Integer".to_string(),
        "long" => "Long".to_string(),
        "double" => "Double".to_string(),
        "float" => "Float".to_string(),
        "boolean" => "Boolean".to_string(),
        "byte" => "Byte".to_string(),
        "short" => "Short".to_string(),
        "char" => "Character".to_string(),
        _ => ty,
    }
}

fn modifier(visibility: Visibility, top_level: bool) -> &'static str {
    match visibility {
        Visibility::Public => "public ",
        // Top-level classes cannot be private.
        Visibility::Private if top_level => "",
        Visibility::Private => "private ",
    }
}

fn javadoc(w: &mut CodeWriter, lines: &[String]) {
    match lines {
        [] => {}
        [single] => w.line(&format!("/** {} */", single)),
        many => {
            w.line("/**");
            for line in many {
                if line.is_empty() {
                    w.line(" *");
                } else {
                    w.line(&format!(" * {}", line));
                }
            }
            w.line(" */");
        }
    }
}

fn func_javadoc(doc: &FuncDoc, failure: &str) -> Vec<String> {
    let mut lines = doc.summary.clone();
    if doc.has_roles() && !lines.is_empty() {
        lines.push(String::new());
    }
    for (name, text) in &doc.params {
        lines.push(format!("@param {} {}", name, text).trim_end().to_string());
    }
    let values: Vec<_> = doc.results.iter().filter(|r| !r.failure).collect();
    match values.as_slice() {
        [single] => lines.push(format!("@return {}", single.text).trim_end().to_string()),
        many => {
            for result in many {
                lines.push(format!("@return {{@code {}}} {}", result.label, result.text).trim_end().to_string());
            }
        }
    }
    for result in doc.results.iter().filter(|r| r.failure) {
        lines.push(format!("@throws {} {}", failure, result.text).trim_end().to_string());
    }
    lines
}

impl Java {
    fn write_method(
        &self,
        cx: &mut FileCx<'_>,
        id: FuncId,
        kind: MethodKind,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError> {
        let ast = cx.ast();
        let func = ast.func(id);
        let at = ast.path(NodeRef::Func(id));
        let name = lower_first(&func.name);

        let signature = self.returns().signature(cx, func, &at)?;
        let (vis, static_kw) = match kind {
            MethodKind::Abstract => ("", ""),
            MethodKind::Instance => (modifier(func.visibility, false), ""),
            MethodKind::Static => (modifier(func.visibility, false), "static "),
        };

        let (return_type, record) = match signature.returns {
            Returns::Nothing => ("void".to_string(), None),
            Returns::Single(ty) => (ty, None),
            Returns::Tuple(parts) => {
                let components: Vec<(String, String)> = parts
                    .into_iter()
                    .enumerate()
                    .map(|(i, ty)| (THROWS_WRAPPER.component_name(i, ""), ty))
                    .collect();
                let record = THROWS_WRAPPER.wrapper_name(&func.name);
                (record.clone(), Some((record, components)))
            }
            Returns::Wrapper { name, components } => (name.clone(), Some((name, components))),
        };
        if let Some((record, components)) = record {
            if self.enclosing_classes(cx, id).contains(&record) {
                return Err(EmitError::DuplicateName {
                    path: at,
                    scope: "class",
                    name: record,
                });
            }
            self.write_record(w, kind, &record, &components);
        }

        let doc = cx.func_doc(func, &name, &at)?;
        javadoc(w, &func_javadoc(&doc, THROWS_WRAPPER.failure));

        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            params.push(format!("{} {}", cx.type_expr(&param.ty, &at)?, param.name));
        }
        let throws = signature
            .throws
            .map(|t| format!(" throws {}", t))
            .unwrap_or_default();
        let head = format!(
            "{}{}{} {}({}){}",
            vis,
            static_kw,
            return_type,
            name,
            params.join(", "),
            throws
        );

        if kind == MethodKind::Abstract {
            w.line(&format!("{};", head));
            return Ok(());
        }

        w.line(&format!("{} {{", head));
        w.indent();
        if let (Some(receiver), FuncOwner::Type(owner)) = (&func.receiver, ast.func_owner(id)) {
            let owner_name = cx.declared_type_name(owner);
            w.line(&format!("final {} {} = this;", owner_name, receiver));
        }
        cx.write_body(w, func, &at)?;
        w.dedent();
        w.line("}");
        Ok(())
    }

    /// Class names visible where the result record of `id` is declared:
    /// the classes enclosing it and the types nested beside it.
    fn enclosing_classes(&self, cx: &FileCx<'_>, id: FuncId) -> Vec<String> {
        let ast = cx.ast();
        let unit = cx.unit();
        let mut names = Vec::new();
        if !is_top_level(unit.types, unit.funcs) {
            names.push(holder_name(unit.name));
        }
        match ast.func_owner(id) {
            FuncOwner::Type(owner) => names.push(self.type_name(ast.type_def(owner))),
            FuncOwner::File(_) | FuncOwner::Package(_) => names.extend(
                unit.types.iter().map(|t| self.type_name(ast.type_def(*t))),
            ),
        }
        names
    }

    fn write_record(
        &self,
        w: &mut CodeWriter,
        kind: MethodKind,
        name: &str,
        components: &[(String, String)],
    ) {
        let vis = if kind == MethodKind::Abstract { "" } else { "public " };
        let components: Vec<String> = components
            .iter()
            .map(|(name, ty)| format!("{} {}", ty, name))
            .collect();
        w.line(&format!("{}record {}({}) {{}}", vis, name, components.join(", ")));
        w.blank();
    }

    fn write_members(
        &self,
        cx: &mut FileCx<'_>,
        def: &TypeDef,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError> {
        let ast = cx.ast();
        let fields: &[_] = match def.kind {
            TypeKind::Struct => def.fields.as_slice(),
            TypeKind::Interface => &[],
        };
        for &field_id in fields {
            let field = ast.field(field_id);
            let at = ast.path(NodeRef::Field(field_id));
            let name = lower_first(&field.name);
            javadoc(w, &doc_lines(&name, field.doc.as_deref()));
            let ty = cx.type_expr(&field.ty, &at)?;
            w.line(&format!("{}{} {};", modifier(field.visibility, false), ty, name));
        }
        let kind = match def.kind {
            TypeKind::Struct => MethodKind::Instance,
            TypeKind::Interface => MethodKind::Abstract,
        };
        for (i, &method) in def.methods.iter().enumerate() {
            if i > 0 || !fields.is_empty() {
                w.blank();
            }
            self.write_method(cx, method, kind, w)?;
        }
        Ok(())
    }
}

impl Language for Java {
    fn tag(&self) -> &'static str {
        "java"
    }

    fn extension(&self) -> &'static str {
        "java"
    }

    fn media_type(&self) -> &'static str {
        "text/x-java"
    }

    fn indent(&self) -> &'static str {
        "    "
    }

    fn terminator(&self) -> &'static str {
        ";"
    }

    fn supports_tags(&self) -> bool {
        false
    }

    fn package_dir(&self, module: &Module, package: &Package) -> Vec<String> {
        package_name(module, package)
            .split('.')
            .map(String::from)
            .collect()
    }

    fn file_name(&self, ast: &Ast, unit: &FileUnit<'_>) -> String {
        let stem = if is_top_level(unit.types, unit.funcs) {
            self.type_name(ast.type_def(unit.types[0]))
        } else {
            holder_name(unit.name)
        };
        format!("{}.{}", stem, self.extension())
    }

    fn package_doc_file(&self) -> &'static str {
        "package-info.java"
    }

    fn doc_on_file_clause(&self) -> bool {
        false
    }

    fn type_name(&self, def: &TypeDef) -> String {
        upper_first(&def.name)
    }

    fn declared_name(&self, kind: NodeKind, name: &str, _visibility: Visibility) -> String {
        match kind {
            NodeKind::Struct | NodeKind::Interface => upper_first(name),
            _ => lower_first(name),
        }
    }

    fn sibling_type_name(&self, ast: &Ast, id: TypeId) -> String {
        let def = ast.type_def(id);
        let file = ast.file(def.file);
        if is_top_level(&file.types, &file.funcs) {
            self.type_name(def)
        } else {
            format!("{}.{}", holder_name(&file.name), self.type_name(def))
        }
    }

    fn declared_reference(&self, ast: &Ast, id: TypeId) -> Reference {
        let def = ast.type_def(id);
        let file = ast.file(def.file);
        let package = ast.package(file.package);
        let qualified = package_name(ast.module(package.module), package);
        if is_top_level(&file.types, &file.funcs) {
            let name = self.type_name(def);
            Reference::imported(format!("{}.{}", qualified, name), name)
        } else {
            let holder = holder_name(&file.name);
            Reference::member(format!("{}.{}", qualified, holder), holder, self.type_name(def))
        }
    }

    fn disambiguate(&self, _local: &str, _taken: &HashSet<String>) -> Disambiguation {
        Disambiguation::Qualify
    }

    fn write_imports(&self, imports: &ImportSet, w: &mut CodeWriter) {
        for entry in imports.imported() {
            w.line(&format!("import {};", entry.path));
        }
    }

    fn write_package_clause(
        &self,
        cx: &mut FileCx<'_>,
        doc: Option<&str>,
        w: &mut CodeWriter,
    ) -> Result<(), EmitError> {
        let package = cx.package();
        javadoc(w, &doc_lines(&package.name, doc));
        w.line(&format!("package {};", package_name(cx.module(), package)));
        Ok(())
    }

    fn write_decls(&self, cx: &mut FileCx<'_>, w: &mut CodeWriter) -> Result<(), EmitError> {
        let unit = cx.unit();
        let (name, types, funcs) = (unit.name, unit.types, unit.funcs);
        if types.is_empty() && funcs.is_empty() {
            return Ok(());
        }
        if is_top_level(types, funcs) {
            w.blank();
            return self.write_type(cx, types[0], w);
        }

        let ast = cx.ast();
        let holder = holder_name(name);
        for &id in types {
            if self.type_name(ast.type_def(id)) == holder {
                return Err(EmitError::DuplicateName {
                    path: ast.path(NodeRef::Type(id)),
                    scope: "class",
                    name: holder,
                });
            }
        }

        w.blank();
        w.line(&format!("public final class {} {{", holder));
        w.indent();
        let mut first = true;
        for &id in types {
            if !first {
                w.blank();
            }
            first = false;
            self.write_type(cx, id, w)?;
        }
        for &id in funcs {
            if !first {
                w.blank();
            }
            first = false;
            self.write_func(cx, id, w)?;
        }
        w.dedent();
        w.line("}");
        Ok(())
    }

    fn write_type(&self, cx: &mut FileCx<'_>, id: TypeId, w: &mut CodeWriter) -> Result<(), EmitError> {
        let unit = cx.unit();
        let top_level = is_top_level(unit.types, unit.funcs);
        let def = cx.ast().type_def(id);
        let name = self.type_name(def);
        javadoc(w, &doc_lines(&name, def.doc.as_deref()));

        let static_kw = if top_level { "" } else { "static " };
        let keyword = match def.kind {
            TypeKind::Struct => "class",
            TypeKind::Interface => "interface",
        };
        let head = format!(
            "{}{}{} {}",
            modifier(def.visibility, top_level),
            static_kw,
            keyword,
            name
        );

        let body_empty =
            def.methods.is_empty() && (def.fields.is_empty() || def.kind == TypeKind::Interface);
        if body_empty {
            w.line(&format!("{} {{}}", head));
            return Ok(());
        }
        w.line(&format!("{} {{", head));
        w.indent();
        self.write_members(cx, def, w)?;
        w.dedent();
        w.line("}");
        Ok(())
    }

    fn write_func(&self, cx: &mut FileCx<'_>, id: FuncId, w: &mut CodeWriter) -> Result<(), EmitError> {
        let kind = match cx.ast().func_owner(id) {
            FuncOwner::Type(_) => MethodKind::Instance,
            FuncOwner::File(_) | FuncOwner::Package(_) => MethodKind::Static,
        };
        self.write_method(cx, id, kind, w)
    }

    fn type_expr(
        &self,
        cx: &mut FileCx<'_>,
        decl: &TypeDecl,
        at: &NodePath,
    ) -> Result<String, EmitError> {
        Ok(match decl {
            TypeDecl::Simple(symbol) => cx.symbol(symbol, at)?,
            TypeDecl::Slice(element) => {
                let list = cx.reference(&Reference::imported("java.util.List", "List"));
                format!("{}<{}>", list, boxed(self.type_expr(cx, element, at)?))
            }
            TypeDecl::Map(key, value) => {
                let map = cx.reference(&Reference::imported("java.util.Map", "Map"));
                format!(
                    "{}<{}, {}>",
                    map,
                    boxed(self.type_expr(cx, key, at)?),
                    boxed(self.type_expr(cx, value, at)?)
                )
            }
            TypeDecl::Pointer(element) => boxed(self.type_expr(cx, element, at)?),
            TypeDecl::Failure => THROWS_WRAPPER.failure.to_string(),
        })
    }

    fn returns(&self) -> &dyn ReturnConvention {
        &THROWS_WRAPPER
    }

    fn macros(&self) -> &'static [&'static dyn MacroStrategy] {
        JAVA_MACROS
    }
}

// ============================================================================
// Macros
// ============================================================================

struct JavaTerminator;

impl MacroStrategy for JavaTerminator {
    fn kind(&self) -> MacroKind {
        MacroKind::Terminator
    }

    fn expand(&self, _: &Macro, _: &mut FileCx<'_>, _: &MacroScope<'_>) -> Result<Vec<Statement>, EmitError> {
        Ok(vec![Statement::Terminator])
    }
}

struct JavaTryDefine;

impl MacroStrategy for JavaTryDefine {
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
        if op.idents.len() > 1 {
            return Err(scope.expansion_error(
                self.kind(),
                format!("cannot bind {} identifiers from one call", op.idents.len()),
            ));
        }

        let mut statements = Vec::with_capacity(3);
        let mut call = match op.idents.first() {
            Some(ident) => {
                let binding = op.binding.as_ref().ok_or_else(|| {
                    scope.expansion_error(self.kind(), format!("`{}` has no declared binding type", ident))
                })?;
                let ty = cx.type_expr(binding, &scope.path)?;
                statements.push(Statement::Code(Code::from(format!("{} {}", ty, ident))));
                statements.push(Statement::Terminator);
                Code::new().text(format!("{} = ", ident))
            }
            None => Code::new(),
        };
        call.segments.extend(op.call.segments.iter().cloned());

        let rethrow = Block::new()
            .with_header("catch (Exception e)")
            .code(format!("throw new Exception({}, e)", quote(&op.message)))
            .terminator();
        statements.push(Statement::Block(
            Block::new()
                .with_header("try")
                .code(call)
                .terminator()
                .chain(rethrow),
        ));
        Ok(statements)
    }
}

struct JavaFail;

impl MacroStrategy for JavaFail {
    fn kind(&self) -> MacroKind {
        MacroKind::Fail
    }

    fn expand(&self, mac: &Macro, _: &mut FileCx<'_>, scope: &MacroScope<'_>) -> Result<Vec<Statement>, EmitError> {
        let Macro::Fail(message) = mac else {
            return Err(scope.expansion_error(self.kind(), "operands do not match the macro kind"));
        };
        scope.require_failure_channel(self.kind())?;
        Ok(vec![
            Statement::Code(Code::from(format!("throw new Exception({})", quote(message)))),
            Statement::Terminator,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::ResultDoc;

    #[test]
    fn test_package_name_joins_module_and_package() {
        let mut ast = Ast::new("demo");
        let module = ast.add_module("com.example", "java");
        let pkg = ast.add_package(module, "store/sql", "sql");
        assert_eq!(
            package_name(ast.module(module), ast.package(pkg)),
            "com.example.store.sql"
        );
    }

    #[test]
    fn test_boxing() {
        assert_eq!(boxed("int".into()), "Integer");
        assert_eq!(boxed("String".into()), "String");
    }

    #[test]
    fn test_func_javadoc_roles() {
        let doc = FuncDoc {
            summary: vec!["query runs the query.".into()],
            params: vec![("db".into(), "the connection".into())],
            results: vec![
                ResultDoc {
                    label: "List<Row>".into(),
                    text: "the rows".into(),
                    failure: false,
                },
                ResultDoc {
                    label: "Exception".into(),
                    text: "when the query fails".into(),
                    failure: true,
                },
            ],
        };
        assert_eq!(
            func_javadoc(&doc, "Exception"),
            vec![
                "query runs the query.",
                "",
                "@param db the connection",
                "@return the rows",
                "@throws Exception when the query fails",
            ]
        );
    }
}
