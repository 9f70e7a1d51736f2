//! Structural checks run before anything is rendered.
//!
//! Project, module and package checks are fatal for the whole render.
//! File checks only concern one output file and can be downgraded to
//! diagnostics.

use crate::ast::{
    Ast, FileId, FuncId, FuncOwner, ModuleId, NodeRef, PackageId, TypeDecl, TypeId, TypeKind,
};
use crate::error::EmitError;
use crate::path::{NodeKind, NodePath};
use crate::traits::Language;
use std::collections::{HashMap, HashSet};

/// Where a package's documentation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSource {
    Package,
    File(FileId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDoc<'a> {
    pub text: &'a str,
    pub source: DocSource,
}

/// Fail on the first repeated name, reporting it against `path`.
fn unique<S: AsRef<str>>(
    names: impl IntoIterator<Item = S>,
    path: impl Fn() -> NodePath,
    scope: &'static str,
) -> Result<(), EmitError> {
    let mut seen = HashSet::new();
    for name in names {
        let name = name.as_ref();
        if !seen.insert(name.to_string()) {
            return Err(EmitError::DuplicateName {
                path: path(),
                scope,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn type_kind(kind: TypeKind) -> NodeKind {
    match kind {
        TypeKind::Struct => NodeKind::Struct,
        TypeKind::Interface => NodeKind::Interface,
    }
}

fn named(name: &str, path: impl Fn() -> NodePath, kind: &'static str) -> Result<(), EmitError> {
    if name.trim().is_empty() {
        Err(EmitError::MissingName { path: path(), kind })
    } else {
        Ok(())
    }
}

pub fn project(ast: &Ast) -> Result<(), EmitError> {
    let project = ast.project();
    named(&project.name, || ast.path(NodeRef::Project), "project")?;
    for id in &project.modules {
        named(&ast.module(*id).path, || ast.path(NodeRef::Module(*id)), "module")?;
    }
    unique(
        project.modules.iter().map(|m| ast.module(*m).path.as_str()),
        || ast.path(NodeRef::Project),
        "module",
    )
}

pub fn module(ast: &Ast, id: ModuleId) -> Result<(), EmitError> {
    let module = ast.module(id);
    for pkg in &module.packages {
        named(&ast.package(*pkg).name, || ast.path(NodeRef::Package(*pkg)), "package")?;
    }
    unique(
        module.packages.iter().map(|p| ast.package(*p).path.as_str()),
        || ast.path(NodeRef::Module(id)),
        "package",
    )
}

/// Package-wide checks; returns the package documentation to render.
///
/// Type and func names are compared as `lang` declares them.
pub fn package<'a>(
    ast: &'a Ast,
    lang: &dyn Language,
    id: PackageId,
) -> Result<Option<PackageDoc<'a>>, EmitError> {
    let pkg = ast.package(id);
    let pkg_path = || ast.path(NodeRef::Package(id));

    for file in &pkg.files {
        named(&ast.file(*file).name, || ast.path(NodeRef::File(*file)), "file")?;
    }
    let mut file_names: Vec<&str> = pkg.files.iter().map(|f| ast.file(*f).name.as_str()).collect();
    if !pkg.funcs.is_empty() {
        // Package-owned funcs render into a file named after the package.
        file_names.push(pkg.name.as_str());
    }
    unique(file_names, pkg_path, "file")?;

    unique(
        ast.package_types(id).map(|t| {
            let def = ast.type_def(t);
            lang.declared_name(type_kind(def.kind), &def.name, def.visibility)
        }),
        pkg_path,
        "type",
    )?;
    unique(
        package_funcs(ast, id).map(|f| {
            let func = ast.func(f);
            lang.declared_name(NodeKind::Func, &func.name, func.visibility)
        }),
        pkg_path,
        "func",
    )?;

    value_cycles(ast, id)?;
    package_doc(ast, id)
}

fn package_funcs(ast: &Ast, id: PackageId) -> impl Iterator<Item = FuncId> + '_ {
    let pkg = ast.package(id);
    pkg.files
        .iter()
        .flat_map(move |f| ast.file(*f).funcs.iter().copied())
        .chain(pkg.funcs.iter().copied())
}

fn package_doc(ast: &Ast, id: PackageId) -> Result<Option<PackageDoc<'_>>, EmitError> {
    let pkg = ast.package(id);
    let mut sources: Vec<(DocSource, String, &str)> = Vec::new();
    if let Some(doc) = pkg.doc.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        sources.push((DocSource::Package, format!("package `{}`", pkg.name), doc));
    }
    for file in &pkg.files {
        let f = ast.file(*file);
        if let Some(doc) = f.doc.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            sources.push((DocSource::File(*file), format!("file `{}`", f.name), doc));
        }
    }

    let mut iter = sources.into_iter();
    let Some((source, first_label, text)) = iter.next() else {
        return Ok(None);
    };
    for (_, label, other) in iter {
        if other != text {
            return Err(EmitError::ConflictingPackageDoc {
                path: ast.path(NodeRef::Package(id)),
                first: first_label,
                second: label,
            });
        }
    }
    Ok(Some(PackageDoc { text, source }))
}

/// Reject structs that contain themselves by value.
fn value_cycles(ast: &Ast, id: PackageId) -> Result<(), EmitError> {
    let structs: Vec<TypeId> = ast
        .package_types(id)
        .filter(|t| ast.type_def(*t).kind == TypeKind::Struct)
        .collect();
    let edges: HashMap<TypeId, Vec<TypeId>> = structs
        .iter()
        .map(|t| {
            let targets = ast
                .type_def(*t)
                .fields
                .iter()
                .filter_map(|f| match &ast.field(*f).ty {
                    TypeDecl::Simple(sym) => ast.find_type(id, sym.as_str()),
                    _ => None,
                })
                .filter(|target| ast.type_def(*target).kind == TypeKind::Struct)
                .collect();
            (*t, targets)
        })
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit(
        node: TypeId,
        edges: &HashMap<TypeId, Vec<TypeId>>,
        marks: &mut HashMap<TypeId, Mark>,
        stack: &mut Vec<TypeId>,
    ) -> Option<Vec<TypeId>> {
        match marks.get(&node) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|t| *t == node).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(node);
                return Some(cycle);
            }
            None => {}
        }
        marks.insert(node, Mark::Visiting);
        stack.push(node);
        for next in edges.get(&node).into_iter().flatten() {
            if let Some(cycle) = visit(*next, edges, marks, stack) {
                return Some(cycle);
            }
        }
        stack.pop();
        marks.insert(node, Mark::Done);
        None
    }

    let mut marks = HashMap::new();
    for t in &structs {
        let mut stack = Vec::new();
        if let Some(cycle) = visit(*t, &edges, &mut marks, &mut stack) {
            let names: Vec<&str> = cycle.iter().map(|c| ast.type_def(*c).name.as_str()).collect();
            return Err(EmitError::ValueCycle {
                path: ast.path(NodeRef::Type(cycle[0])),
                cycle: names.join(" -> "),
            });
        }
    }
    Ok(())
}

/// Checks scoped to the declarations of one output file.
pub fn file_decls(
    ast: &Ast,
    lang: &dyn Language,
    types: &[TypeId],
    funcs: &[FuncId],
) -> Result<(), EmitError> {
    for ty in types {
        let def = ast.type_def(*ty);
        let ty_path = || ast.path(NodeRef::Type(*ty));
        named(&def.name, ty_path, "type")?;
        if def.kind == TypeKind::Interface {
            interface(ast, *ty)?;
        }
        for field in &def.fields {
            named(&ast.field(*field).name, || ast.path(NodeRef::Field(*field)), "field")?;
        }
        unique(
            def.fields.iter().map(|f| {
                let field = ast.field(*f);
                lang.declared_name(NodeKind::Field, &field.name, field.visibility)
            }),
            ty_path,
            "field",
        )?;
        unique(
            def.methods.iter().map(|m| {
                let method = ast.func(*m);
                lang.declared_name(NodeKind::Method, &method.name, method.visibility)
            }),
            ty_path,
            "method",
        )?;
        for method in &def.methods {
            func(ast, *method)?;
        }
    }
    for f in funcs {
        func(ast, *f)?;
    }
    Ok(())
}

/// Interfaces declare method signatures only.
fn interface(ast: &Ast, id: TypeId) -> Result<(), EmitError> {
    let def = ast.type_def(id);
    if let Some(field) = def.fields.first() {
        return Err(EmitError::InvalidDecl {
            path: ast.path(NodeRef::Field(*field)),
            message: format!("interface `{}` cannot declare fields", def.name),
        });
    }
    for method in &def.methods {
        let body = &ast.func(*method).body;
        if !body.is_empty() || body.doc.is_some() || body.header.is_some() || body.chained.is_some() {
            return Err(EmitError::InvalidDecl {
                path: ast.path(NodeRef::Func(*method)),
                message: format!("interface method `{}` cannot have a body", ast.func(*method).name),
            });
        }
    }
    Ok(())
}

fn func(ast: &Ast, id: FuncId) -> Result<(), EmitError> {
    let func = ast.func(id);
    let path = || ast.path(NodeRef::Func(id));
    named(&func.name, path, "func")?;
    if let Some(receiver) = &func.receiver
        && !matches!(ast.func_owner(id), FuncOwner::Type(_))
    {
        return Err(EmitError::InvalidDecl {
            path: path(),
            message: format!("receiver `{}` on a func that is not a method", receiver),
        });
    }
    if func.body.header.is_some() || func.body.chained.is_some() {
        return Err(EmitError::InvalidDecl {
            path: path(),
            message: "a func body takes neither a header nor a chained clause".to_string(),
        });
    }
    for (i, param) in func.params.iter().enumerate() {
        named(
            &param.name,
            || path().child(NodeKind::Param, i.to_string()),
            "parameter",
        )?;
    }
    let named_results = func.results.iter().filter(|r| !r.name.is_empty()).count();
    if named_results != 0 && named_results != func.results.len() {
        return Err(EmitError::MixedResultNames { path: path() });
    }
    unique(
        func.params
            .iter()
            .chain(func.results.iter())
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty()),
        path,
        "parameter",
    )
}
