//! Cross-language source emission.
//!
//! `normalize-emit` renders a language-agnostic declaration tree (modules,
//! packages, files, types, funcs, statements) into idiomatic, formatted
//! source for a registered target language. It only writes source; it
//! never parses it.
//!
//! # Architecture
//!
//! ```text
//!   Ast (ast.rs)          Renderer (render.rs)           Artifact
//! ────────────────    ─────────────────────────    ──────────────────
//! Project             validate ─> plan units ─┐    module dir
//!  └ Module ──────────────────────────────────┤     └ package dir
//!     └ Package       per file (rayon):       │        └ file leaf
//!        └ File        collect ─> ImportSet   │
//!           ├ Type      ─> emit ──────────────┘
//!           └ Func
//!                  Registry: tag ─> Language bundle (go, java)
//!                            (tag, MacroKind) ─> MacroStrategy
//! ```
//!
//! Language bundles decide layout, naming, imports and how results map
//! onto signatures ([`ReturnConvention`]). Macros such as
//! [`Macro::TryDefine`] are expanded per language while blocks render.
//!
//! # Example
//!
//! ```ignore
//! use normalize_emit::{Annotation, Ast, Field, Registry, Renderer, SymbolTable, TypeDecl};
//!
//! let mut ast = Ast::new("demo");
//! let module = ast.add_module("example.com/app", "go");
//! let pkg = ast.add_package(module, "hello", "hello");
//! let file = ast.add_file(pkg, "hello_world");
//! let ty = ast.add_struct(file, "HelloWorld");
//! ast.add_field(ty, Field::new("World", TypeDecl::simple("string"))
//!     .annotate(Annotation::new("json", "world")));
//!
//! let registry = Registry::with_builtins();
//! let symbols = SymbolTable::builtins();
//! let out = Renderer::new(&registry, &symbols).render(&ast)?;
//! let go = out.artifact.text("example.com/app/hello/hello_world.go");
//! ```

pub mod artifact;
pub mod ast;
pub mod comments;
pub mod config;
pub mod error;
pub mod imports;
pub mod options;
pub mod output;
pub mod path;
pub mod registry;
pub mod render;
pub mod returns;
pub mod symbol;
pub mod traits;
pub mod writer;

mod validate;

// Re-exports: tree
pub use ast::{
    Annotation, Ast, Block, Code, Field, FieldId, FileId, Func, FuncId, FuncOwner, Macro,
    MacroKind, ModuleId, NodeRef, PackageId, Param, Segment, Statement, TryDefine, TypeDecl,
    TypeId, TypeKind, Visibility,
};
pub use path::{NodeKind, NodePath};
pub use symbol::{Reference, Symbol, SymbolResolver, SymbolTable};

// Re-exports: rendering
pub use artifact::{Artifact, Directory, Entry, Leaf, MediaType};
pub use config::{ConfigError, EmitConfig};
pub use error::{EmitError, ErrorKind};
pub use options::{CancelToken, LanguageOptions, RenderOptions};
pub use registry::Registry;
pub use render::{FileCx, RenderOutput, Renderer, TypeTarget};

// Re-exports: extension points
pub use returns::{MultiReturn, ThrowsWrapper};
pub use traits::{FileUnit, Language, MacroScope, MacroStrategy, ReturnConvention, Returns, Signature};

// Re-exports: built-in bundles
#[cfg(feature = "lang-go")]
pub use output::{GO, Go};
#[cfg(feature = "lang-java")]
pub use output::{JAVA, Java};
