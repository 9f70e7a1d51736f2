//! Language-agnostic declaration tree.
//!
//! Nodes live in per-kind flat arenas owned by [`Ast`]. Children are listed
//! by id on their parent and every node records its parent as an id, so
//! context queries (enclosing type, package, module) never need owning
//! back-pointers. Leaf values (params, blocks, statements, annotations)
//! are plain owned data inside their node.
//!
//! The tree is built once through the `add_*` methods and then handed to
//! the renderer by shared reference.

use crate::path::{NodeKind, NodePath};
use crate::symbol::{Reference, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! node_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(u32);

            impl $name {
                pub fn index(self) -> usize {
                    self.0 as usize
                }

                fn next(len: usize) -> Self {
                    Self(len as u32)
                }
            }
        )*
    };
}

node_id!(ModuleId, PackageId, FileId, TypeId, FuncId, FieldId);

// ============================================================================
// Leaf values
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDecl {
    /// A symbol, or the name of a type declared elsewhere in the tree.
    Simple(Symbol),
    Slice(Box<TypeDecl>),
    Map(Box<TypeDecl>, Box<TypeDecl>),
    Pointer(Box<TypeDecl>),
    /// The failure channel (`error` / `Exception`).
    Failure,
}

impl TypeDecl {
    pub fn simple(symbol: impl Into<Symbol>) -> Self {
        TypeDecl::Simple(symbol.into())
    }

    pub fn slice(element: TypeDecl) -> Self {
        TypeDecl::Slice(Box::new(element))
    }

    pub fn map(key: TypeDecl, value: TypeDecl) -> Self {
        TypeDecl::Map(Box::new(key), Box::new(value))
    }

    pub fn pointer(element: TypeDecl) -> Self {
        TypeDecl::Pointer(Box::new(element))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TypeDecl::Failure)
    }
}

/// Metadata attached to a field or parameter (`json:"name"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub value: Option<String>,
    pub params: Vec<(String, String)>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            params: Vec::new(),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// A piece of a [`Code`] template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    Text(String),
    /// Resolved through the symbol resolver at render time.
    Symbol(Symbol),
    /// Already target-specific; contributes its import as-is.
    Ref(Reference),
}

/// Raw target-language code with embedded symbol references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub segments: Vec<Segment>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Text(text.into()));
        self
    }

    pub fn symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.segments.push(Segment::Symbol(symbol.into()));
        self
    }

    pub fn reference(mut self, reference: Reference) -> Self {
        self.segments.push(Segment::Ref(reference));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| match s {
            Segment::Text(t) => t.is_empty(),
            _ => false,
        })
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Self {
        Code::new().text(text)
    }
}

impl From<String> for Code {
    fn from(text: String) -> Self {
        Code::new().text(text)
    }
}

/// Operands of the try/propagate macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryDefine {
    /// Identifiers bound to the call's primary result(s).
    pub idents: Vec<String>,
    pub call: Code,
    /// Message wrapped around the original failure.
    pub message: String,
    /// Type of the binding, for targets that cannot infer it.
    pub binding: Option<TypeDecl>,
}

impl TryDefine {
    pub fn new(ident: impl Into<String>, call: impl Into<Code>, message: impl Into<String>) -> Self {
        Self {
            idents: vec![ident.into()],
            call: call.into(),
            message: message.into(),
            binding: None,
        }
    }

    pub fn with_binding(mut self, ty: TypeDecl) -> Self {
        self.binding = Some(ty);
        self
    }
}

/// A target-neutral operation, expanded per language at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Macro {
    /// Statement separator hint.
    Terminator,
    TryDefine(TryDefine),
    /// Return a fresh failure carrying a message.
    Fail(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MacroKind {
    Terminator,
    TryDefine,
    Fail,
}

impl Macro {
    pub fn kind(&self) -> MacroKind {
        match self {
            Macro::Terminator => MacroKind::Terminator,
            Macro::TryDefine(_) => MacroKind::TryDefine,
            Macro::Fail(_) => MacroKind::Fail,
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MacroKind::Terminator => "Terminator",
            MacroKind::TryDefine => "TryDefine",
            MacroKind::Fail => "Fail",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    Code(Code),
    Block(Block),
    Macro(Macro),
    /// Appends the target's statement terminator to the previous line.
    Terminator,
}

/// Ordered statements, optionally introduced by a header (`if x`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub doc: Option<String>,
    pub header: Option<Code>,
    pub statements: Vec<Statement>,
    /// Clause opened on the closing line (`} else {`, `} catch (...) {`).
    pub chained: Option<Box<Block>>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: impl Into<Code>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn push(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn code(self, code: impl Into<Code>) -> Self {
        self.push(Statement::Code(code.into()))
    }

    pub fn invoke(self, mac: Macro) -> Self {
        self.push(Statement::Macro(mac))
    }

    pub fn block(self, block: Block) -> Self {
        self.push(Statement::Block(block))
    }

    pub fn terminator(self) -> Self {
        self.push(Statement::Terminator)
    }

    pub fn chain(mut self, next: Block) -> Self {
        self.chained = Some(Box::new(next));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A parameter or a result. Results may leave `name` empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeDecl,
    pub doc: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeDecl) -> Self {
        Self {
            name: name.into(),
            ty,
            doc: None,
            annotations: Vec::new(),
        }
    }

    pub fn unnamed(ty: TypeDecl) -> Self {
        Self::new("", ty)
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

// ============================================================================
// Arena nodes
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub name: String,
    pub modules: Vec<ModuleId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Module {
    /// Import path, unique within the project.
    pub path: String,
    /// Target-language tag selecting the renderer bundle.
    pub language: String,
    pub packages: Vec<PackageId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub module: ModuleId,
    /// Import path relative to the module, unique within it. Empty for the
    /// module root.
    pub path: String,
    pub name: String,
    pub doc: Option<String>,
    /// License header, used by files that carry none of their own.
    pub preamble: Option<String>,
    pub files: Vec<FileId>,
    /// Funcs not declared in any file.
    pub funcs: Vec<FuncId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct File {
    pub package: PackageId,
    pub name: String,
    pub preamble: Option<String>,
    pub doc: Option<String>,
    pub types: Vec<TypeId>,
    pub funcs: Vec<FuncId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeKind {
    Struct,
    Interface,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDef {
    pub file: FileId,
    pub kind: TypeKind,
    pub name: String,
    pub visibility: Visibility,
    pub doc: Option<String>,
    pub fields: Vec<FieldId>,
    /// Methods of a struct, or method signatures of an interface.
    pub methods: Vec<FuncId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub visibility: Visibility,
    pub ty: TypeDecl,
    pub doc: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeDecl) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            ty,
            doc: None,
            annotations: Vec::new(),
        }
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Where a func is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FuncOwner {
    File(FileId),
    Package(PackageId),
    Type(TypeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Func {
    pub name: String,
    pub visibility: Visibility,
    /// Receiver name; methods only.
    pub receiver: Option<String>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub body: Block,
    pub doc: Option<String>,
}

impl Func {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            receiver: None,
            params: Vec::new(),
            results: Vec::new(),
            body: Block::new(),
            doc: None,
        }
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn with_receiver(mut self, name: impl Into<String>) -> Self {
        self.receiver = Some(name.into());
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn result(mut self, result: Param) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_body(mut self, body: Block) -> Self {
        self.body = body;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Whether the last declared result is the failure channel.
    pub fn has_failure_result(&self) -> bool {
        self.results.last().is_some_and(|r| r.ty.is_failure())
    }
}

/// Reference to any arena node, for path queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Project,
    Module(ModuleId),
    Package(PackageId),
    File(FileId),
    Type(TypeId),
    Func(FuncId),
    Field(FieldId),
}

// ============================================================================
// Arena
// ============================================================================

/// The whole declaration tree.
#[derive(Debug, Clone, Serialize)]
pub struct Ast {
    project: Project,
    modules: Vec<Module>,
    packages: Vec<Package>,
    files: Vec<File>,
    types: Vec<TypeDef>,
    funcs: Vec<Func>,
    func_owners: Vec<FuncOwner>,
    fields: Vec<Field>,
    field_owners: Vec<TypeId>,
}

impl Ast {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: Project {
                name: project.into(),
                modules: Vec::new(),
            },
            modules: Vec::new(),
            packages: Vec::new(),
            files: Vec::new(),
            types: Vec::new(),
            funcs: Vec::new(),
            func_owners: Vec::new(),
            fields: Vec::new(),
            field_owners: Vec::new(),
        }
    }

    // --- construction -------------------------------------------------------

    pub fn add_module(&mut self, path: impl Into<String>, language: impl Into<String>) -> ModuleId {
        let id = ModuleId::next(self.modules.len());
        self.modules.push(Module {
            path: path.into(),
            language: language.into(),
            packages: Vec::new(),
        });
        self.project.modules.push(id);
        id
    }

    pub fn add_package(
        &mut self,
        module: ModuleId,
        path: impl Into<String>,
        name: impl Into<String>,
    ) -> PackageId {
        let id = PackageId::next(self.packages.len());
        self.packages.push(Package {
            module,
            path: path.into(),
            name: name.into(),
            doc: None,
            preamble: None,
            files: Vec::new(),
            funcs: Vec::new(),
        });
        self.modules[module.index()].packages.push(id);
        id
    }

    pub fn add_file(&mut self, package: PackageId, name: impl Into<String>) -> FileId {
        let id = FileId::next(self.files.len());
        self.files.push(File {
            package,
            name: name.into(),
            preamble: None,
            doc: None,
            types: Vec::new(),
            funcs: Vec::new(),
        });
        self.packages[package.index()].files.push(id);
        id
    }

    pub fn add_struct(&mut self, file: FileId, name: impl Into<String>) -> TypeId {
        self.add_type(file, TypeKind::Struct, name.into())
    }

    pub fn add_interface(&mut self, file: FileId, name: impl Into<String>) -> TypeId {
        self.add_type(file, TypeKind::Interface, name.into())
    }

    fn add_type(&mut self, file: FileId, kind: TypeKind, name: String) -> TypeId {
        let id = TypeId::next(self.types.len());
        self.types.push(TypeDef {
            file,
            kind,
            name,
            visibility: Visibility::Public,
            doc: None,
            fields: Vec::new(),
            methods: Vec::new(),
        });
        self.files[file.index()].types.push(id);
        id
    }

    pub fn add_field(&mut self, owner: TypeId, field: Field) -> FieldId {
        let id = FieldId::next(self.fields.len());
        self.fields.push(field);
        self.field_owners.push(owner);
        self.types[owner.index()].fields.push(id);
        id
    }

    /// Add a method to a struct, or a method signature to an interface.
    pub fn add_method(&mut self, owner: TypeId, func: Func) -> FuncId {
        let id = self.push_func(func, FuncOwner::Type(owner));
        self.types[owner.index()].methods.push(id);
        id
    }

    pub fn add_func(&mut self, file: FileId, func: Func) -> FuncId {
        let id = self.push_func(func, FuncOwner::File(file));
        self.files[file.index()].funcs.push(id);
        id
    }

    /// Add a func owned by the package rather than a declared file.
    pub fn add_package_func(&mut self, package: PackageId, func: Func) -> FuncId {
        let id = self.push_func(func, FuncOwner::Package(package));
        self.packages[package.index()].funcs.push(id);
        id
    }

    fn push_func(&mut self, func: Func, owner: FuncOwner) -> FuncId {
        let id = FuncId::next(self.funcs.len());
        self.funcs.push(func);
        self.func_owners.push(owner);
        id
    }

    pub fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.index()]
    }

    pub fn file_mut(&mut self, id: FileId) -> &mut File {
        &mut self.files[id.index()]
    }

    pub fn type_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.types[id.index()]
    }

    // --- queries ------------------------------------------------------------

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    pub fn file(&self, id: FileId) -> &File {
        &self.files[id.index()]
    }

    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.index()]
    }

    pub fn func(&self, id: FuncId) -> &Func {
        &self.funcs[id.index()]
    }

    pub fn func_owner(&self, id: FuncId) -> FuncOwner {
        self.func_owners[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.index()]
    }

    pub fn field_owner(&self, id: FieldId) -> TypeId {
        self.field_owners[id.index()]
    }

    /// Package enclosing a type.
    pub fn type_package(&self, id: TypeId) -> PackageId {
        self.file(self.type_def(id).file).package
    }

    /// All types declared in a package, in file then declaration order.
    pub fn package_types(&self, id: PackageId) -> impl Iterator<Item = TypeId> + '_ {
        self.package(id)
            .files
            .iter()
            .flat_map(move |f| self.file(*f).types.iter().copied())
    }

    pub fn find_type(&self, package: PackageId, name: &str) -> Option<TypeId> {
        self.package_types(package)
            .find(|t| self.type_def(*t).name == name)
    }

    pub fn find_package(&self, module: ModuleId, path: &str) -> Option<PackageId> {
        self.module(module)
            .packages
            .iter()
            .copied()
            .find(|p| self.package(*p).path == path)
    }

    /// Full `{Kind:Name}` path of a node.
    pub fn path(&self, node: NodeRef) -> NodePath {
        match node {
            NodeRef::Project => NodePath::root(&self.project.name),
            NodeRef::Module(id) => self
                .path(NodeRef::Project)
                .child(NodeKind::Module, &self.module(id).path),
            NodeRef::Package(id) => {
                let pkg = self.package(id);
                let label = if pkg.path.is_empty() {
                    pkg.name.as_str()
                } else {
                    pkg.path.as_str()
                };
                self.path(NodeRef::Module(pkg.module))
                    .child(NodeKind::Package, label)
            }
            NodeRef::File(id) => {
                let file = self.file(id);
                self.path(NodeRef::Package(file.package))
                    .child(NodeKind::File, &file.name)
            }
            NodeRef::Type(id) => {
                let ty = self.type_def(id);
                let kind = match ty.kind {
                    TypeKind::Struct => NodeKind::Struct,
                    TypeKind::Interface => NodeKind::Interface,
                };
                self.path(NodeRef::File(ty.file)).child(kind, &ty.name)
            }
            NodeRef::Func(id) => {
                let name = &self.func(id).name;
                match self.func_owner(id) {
                    FuncOwner::File(file) => {
                        self.path(NodeRef::File(file)).child(NodeKind::Func, name)
                    }
                    FuncOwner::Package(pkg) => {
                        self.path(NodeRef::Package(pkg)).child(NodeKind::Func, name)
                    }
                    FuncOwner::Type(ty) => {
                        self.path(NodeRef::Type(ty)).child(NodeKind::Method, name)
                    }
                }
            }
            NodeRef::Field(id) => self
                .path(NodeRef::Type(self.field_owner(id)))
                .child(NodeKind::Field, &self.field(id).name),
        }
    }
}
