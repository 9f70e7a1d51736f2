//! End-to-end rendering tests for the built-in Go and Java bundles.

#![cfg(all(feature = "lang-go", feature = "lang-java"))]

use normalize_emit::{
    Annotation, Ast, Block, CancelToken, Code, EmitError, ErrorKind, Field, FileId, Func, Macro,
    MediaType, NodeKind, PackageId, Param, Reference, Registry, RenderOptions, RenderOutput,
    Renderer, SymbolTable, TryDefine, TypeDecl,
};

fn symbols() -> SymbolTable {
    SymbolTable::builtins()
        .with("go", "sql.query", Reference::member("database/sql", "sql", "Query"))
        .with("go", "rand.int", Reference::member("math/rand", "rand", "Int"))
        .with("go", "crand.read", Reference::member("crypto/rand", "rand", "Read"))
        .with("java", "sql.ResultSet", Reference::imported("java.sql.ResultSet", "ResultSet"))
        .with("java", "awt.List", Reference::imported("java.awt.List", "List"))
}

fn render(ast: &Ast) -> Result<RenderOutput, EmitError> {
    render_with(ast, RenderOptions::default())
}

fn render_with(ast: &Ast, options: RenderOptions) -> Result<RenderOutput, EmitError> {
    let registry = Registry::with_builtins();
    let symbols = symbols();
    Renderer::new(&registry, &symbols)
        .with_options(options)
        .render(ast)
}

fn text(out: &RenderOutput, path: &str) -> String {
    out.artifact
        .text(path)
        .unwrap_or_else(|| panic!("missing {path}; have {:?}", leaf_paths(out)))
        .to_string()
}

fn leaf_paths(out: &RenderOutput) -> Vec<String> {
    out.artifact.leaves().into_iter().map(|(p, _)| p).collect()
}

fn go_package(ast: &mut Ast) -> (PackageId, FileId) {
    let module = ast.add_module("example.com/app", "go");
    let pkg = ast.add_package(module, "hello", "hello");
    let file = ast.add_file(pkg, "hello_world");
    (pkg, file)
}

fn hello_world(ast: &mut Ast, file: FileId) {
    let ty = ast.add_struct(file, "HelloWorld");
    ast.add_field(ty, Field::new("Hello", TypeDecl::simple("string")));
    ast.add_field(
        ty,
        Field::new("World", TypeDecl::simple("string"))
            .annotate(Annotation::new("json", "world"))
            .annotate(Annotation::new("db", "hello_world")),
    );
}

/// `Load() ([]string, int, error)` trying a query first.
fn load_func() -> Func {
    Func::new("Load")
        .result(Param::unnamed(TypeDecl::slice(TypeDecl::simple("string"))))
        .result(Param::unnamed(TypeDecl::simple("int")))
        .result(Param::unnamed(TypeDecl::Failure))
        .with_body(
            Block::new()
                .invoke(Macro::TryDefine(TryDefine::new(
                    "rows",
                    Code::new().symbol("sql.query").text("(\"SELECT 1\")"),
                    "cannot query",
                )))
                .code("return rows, 0, nil"),
        )
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn struct_with_tags() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    hello_world(&mut ast, file);

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/hello/hello_world.go"),
        "package hello\n\
         \n\
         type HelloWorld struct {\n\
         \tHello string\n\
         \tWorld string `json:\"world\" db:\"hello_world\"`\n\
         }\n"
    );
}

#[test]
fn tags_omitted_without_tag_support() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "hello", "hello");
    let file = ast.add_file(pkg, "hello_world");
    hello_world(&mut ast, file);

    let out = render(&ast).unwrap();
    insta::assert_snapshot!(text(&out, "com.example/com/example/hello/HelloWorld.java"), @r"
    package com.example.hello;

    public class HelloWorld {
        public String hello;
        public String world;
    }
    ");
}

#[test]
fn multi_result_method() {
    let query = Func::new("Query")
        .param(Param::new("limit", TypeDecl::simple("int")))
        .result(Param::unnamed(TypeDecl::slice(TypeDecl::simple("string"))))
        .result(Param::unnamed(TypeDecl::simple("int")))
        .result(Param::unnamed(TypeDecl::Failure));

    let mut ast = Ast::new("demo");
    let module = ast.add_module("example.com/app", "go");
    let pkg = ast.add_package(module, "store", "store");
    let file = ast.add_file(pkg, "store");
    let ty = ast.add_struct(file, "Store");
    ast.add_method(ty, query.clone());

    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "store", "store");
    let file = ast.add_file(pkg, "store");
    let ty = ast.add_struct(file, "Store");
    ast.add_method(ty, query);

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/store/store.go"),
        "package store\n\
         \n\
         type Store struct{}\n\
         \n\
         func (s *Store) Query(limit int) ([]string, int, error) {\n\
         }\n"
    );
    insta::assert_snapshot!(text(&out, "com.example/com/example/store/Store.java"), @r"
    package com.example.store;

    import java.util.List;

    public class Store {
        public record QueryResult(List<String> value1, int value2) {}

        public QueryResult query(int limit) throws Exception {
        }
    }
    ");
}

#[test]
fn try_define_expansion() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("example.com/app", "go");
    let pkg = ast.add_package(module, "store", "store");
    let file = ast.add_file(pkg, "load");
    ast.add_func(file, load_func());

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/store/load.go"),
        "package store\n\
         \n\
         import (\n\
         \t\"database/sql\"\n\
         \t\"fmt\"\n\
         )\n\
         \n\
         func Load() ([]string, int, error) {\n\
         \trows, err := sql.Query(\"SELECT 1\")\n\
         \tif err != nil {\n\
         \t\treturn nil, 0, fmt.Errorf(\"cannot query: %w\", err)\n\
         \t}\n\
         \treturn rows, 0, nil\n\
         }\n"
    );
}

#[test]
fn try_define_catch_and_rethrow() {
    let load = Func::new("Load")
        .result(Param::unnamed(TypeDecl::simple("sql.ResultSet")))
        .result(Param::unnamed(TypeDecl::Failure))
        .with_body(
            Block::new()
                .invoke(Macro::TryDefine(
                    TryDefine::new("rows", "db.query(\"SELECT 1\")", "cannot query")
                        .with_binding(TypeDecl::simple("sql.ResultSet")),
                ))
                .code("return rows")
                .invoke(Macro::Terminator),
        );

    let mut ast = Ast::new("demo");
    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "store", "store");
    let file = ast.add_file(pkg, "queries");
    ast.add_func(file, load);

    let out = render(&ast).unwrap();
    insta::assert_snapshot!(text(&out, "com.example/com/example/store/Queries.java"), @r#"
    package com.example.store;

    import java.sql.ResultSet;

    public final class Queries {
        public static ResultSet load() throws Exception {
            ResultSet rows;
            try {
                rows = db.query("SELECT 1");
            } catch (Exception e) {
                throw new Exception("cannot query", e);
            }
            return rows;
        }
    }
    "#);
}

#[test]
fn try_define_without_binding_type_fails_on_java() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "store", "store");
    let file = ast.add_file(pkg, "queries");
    ast.add_func(
        file,
        Func::new("Load")
            .result(Param::unnamed(TypeDecl::Failure))
            .with_body(Block::new().invoke(Macro::TryDefine(TryDefine::new(
                "rows",
                "db.query()",
                "cannot query",
            )))),
    );

    let err = render(&ast).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MacroExpansion);
}

#[test]
fn duplicate_field_name() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    let ty = ast.add_struct(file, "HelloWorld");
    ast.add_field(ty, Field::new("Hello", TypeDecl::simple("string")));
    ast.add_field(ty, Field::new("Hello", TypeDecl::simple("int")));

    let err = render(&ast).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    let message = err.to_string();
    assert!(message.contains("`Hello`"), "{message}");
    assert!(
        message.starts_with(
            "{Project:demo}/{Module:example.com/app}/{Package:hello}/{File:hello_world}/{Struct:HelloWorld}"
        ),
        "{message}"
    );
}

#[test]
fn unregistered_language() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    hello_world(&mut ast, file);
    let module = ast.add_module("example.com/legacy", "cobol");
    ast.add_package(module, "core", "core");

    let err = render(&ast).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedLanguage);
    let path = err.path().unwrap();
    assert!(path.contains(NodeKind::Module, "example.com/legacy"));
}

// ============================================================================
// Properties
// ============================================================================

/// A project with several modules, packages and files.
fn sample_project() -> Ast {
    let mut ast = Ast::new("demo");
    let (pkg, file) = go_package(&mut ast);
    hello_world(&mut ast, file);
    ast.package_mut(pkg).doc = Some("...says hello.".into());
    let store = ast.add_file(pkg, "store");
    ast.add_func(store, load_func());
    for i in 0..8 {
        let file = ast.add_file(pkg, format!("extra_{i}"));
        let ty = ast.add_struct(file, format!("Extra{i}"));
        ast.add_field(ty, Field::new("Value", TypeDecl::simple("int64")));
    }

    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "hello", "hello");
    let file = ast.add_file(pkg, "hello_world");
    hello_world(&mut ast, file);
    ast
}

#[test]
fn rendering_is_idempotent() {
    let ast = sample_project();
    let first = render(&ast).unwrap();
    let second = render(&ast).unwrap();
    assert_eq!(first.artifact, second.artifact);
}

#[test]
fn parallel_matches_sequential() {
    let ast = sample_project();
    let parallel = render_with(&ast, RenderOptions::default()).unwrap();
    let sequential = render_with(&ast, RenderOptions::sequential()).unwrap();
    assert_eq!(parallel.artifact, sequential.artifact);
    assert_eq!(leaf_paths(&parallel), leaf_paths(&sequential));
}

#[test]
fn artifact_layout_follows_declaration_order() {
    let ast = sample_project();
    let out = render(&ast).unwrap();
    let paths = leaf_paths(&out);
    assert_eq!(paths[0], "example.com/app/hello/doc.go");
    assert_eq!(paths[1], "example.com/app/hello/hello_world.go");
    assert_eq!(paths[2], "example.com/app/hello/store.go");
    assert_eq!(paths.last().unwrap(), "com.example/com/example/hello/HelloWorld.java");

    let module = out.artifact.get("example.com/app").unwrap().as_directory().unwrap();
    assert_eq!(module.media_type, MediaType::ModuleDirectory);
    let leaf = out
        .artifact
        .get("example.com/app/hello/doc.go")
        .unwrap()
        .as_leaf()
        .unwrap();
    assert_eq!(leaf.media_type, MediaType::Source("text/x-go".into()));
    assert_eq!(leaf.content, "// Package hello says hello.\npackage hello\n");
}

#[test]
fn colliding_imports_are_aliased() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("example.com/app", "go");
    let pkg = ast.add_package(module, "dice", "dice");
    let file = ast.add_file(pkg, "dice");
    ast.add_func(
        file,
        Func::new("Roll")
            .result(Param::unnamed(TypeDecl::simple("int")))
            .with_body(
                Block::new()
                    .code(Code::new().symbol("crand.read").text("(seed)"))
                    .code(Code::new().text("return ").symbol("rand.int").text("()")),
            ),
    );

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/dice/dice.go"),
        "package dice\n\
         \n\
         import (\n\
         \t\"crypto/rand\"\n\
         \trand2 \"math/rand\"\n\
         )\n\
         \n\
         func Roll() int {\n\
         \trand.Read(seed)\n\
         \treturn rand2.Int()\n\
         }\n"
    );
}

#[test]
fn colliding_java_imports_are_qualified() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "ui", "ui");
    let file = ast.add_file(pkg, "widgets");
    let ty = ast.add_struct(file, "Widgets");
    ast.add_field(ty, Field::new("Items", TypeDecl::slice(TypeDecl::simple("string"))));
    ast.add_field(ty, Field::new("Menu", TypeDecl::simple("awt.List")));

    let out = render(&ast).unwrap();
    insta::assert_snapshot!(text(&out, "com.example/com/example/ui/Widgets.java"), @r"
    package com.example.ui;

    import java.awt.List;

    public class Widgets {
        public java.util.List<String> items;
        public List menu;
    }
    ");
}

#[test]
fn cross_package_types_are_imported() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("example.com/app", "go");
    let models = ast.add_package(module, "models", "models");
    let file = ast.add_file(models, "user");
    let user = ast.add_struct(file, "User");
    ast.add_field(user, Field::new("Name", TypeDecl::simple("string")));

    let api = ast.add_package(module, "api", "api");
    let file = ast.add_file(api, "handler");
    let handler = ast.add_struct(file, "Handler");
    ast.add_field(handler, Field::new("Current", TypeDecl::simple("models.User")));
    ast.add_field(handler, Field::new("Others", TypeDecl::slice(TypeDecl::pointer(TypeDecl::simple("models.User")))));

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/api/handler.go"),
        "package api\n\
         \n\
         import \"example.com/app/models\"\n\
         \n\
         type Handler struct {\n\
         \tCurrent models.User\n\
         \tOthers  []*models.User\n\
         }\n"
    );
}

#[test]
fn comment_placeholder_law() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    let ty = ast.add_struct(file, "Greeter");
    ast.type_mut(ty).doc = Some("...greets people.".into());
    ast.add_field(ty, Field::new("Name", TypeDecl::simple("string")).with_doc("Shown in every greeting."));
    ast.add_method(
        ty,
        Func::new("Greet")
            .with_doc("…returns a greeting.")
            .param(Param::new("loud", TypeDecl::simple("bool")).with_doc("...shouts when set"))
            .result(Param::unnamed(TypeDecl::simple("string")).with_doc("the greeting"))
            .with_body(Block::new().code("return g.Name")),
    );

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/hello/hello_world.go"),
        "package hello\n\
         \n\
         // Greeter greets people.\n\
         type Greeter struct {\n\
         \t// Shown in every greeting.\n\
         \tName string\n\
         }\n\
         \n\
         // Greet returns a greeting.\n\
         // parameter `loud` shouts when set\n\
         // result `string` the greeting\n\
         func (g *Greeter) Greet(loud bool) string {\n\
         \treturn g.Name\n\
         }\n"
    );
}

#[test]
fn named_receiver_binds_this_in_java() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "hello", "hello");
    let file = ast.add_file(pkg, "greeter");
    let ty = ast.add_struct(file, "Greeter");
    ast.add_method(
        ty,
        Func::new("Greet")
            .with_receiver("self")
            .result(Param::unnamed(TypeDecl::simple("string")))
            .with_body(Block::new().code("return self.name").terminator()),
    );

    let out = render(&ast).unwrap();
    insta::assert_snapshot!(text(&out, "com.example/com/example/hello/Greeter.java"), @r"
    package com.example.hello;

    public class Greeter {
        public String greet() {
            final Greeter self = this;
            return self.name;
        }
    }
    ");
}

#[test]
fn macro_context_law() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("example.com/app", "go");
    let pkg = ast.add_package(module, "store", "store");
    let file = ast.add_file(pkg, "load");
    ast.add_func(
        file,
        Func::new("Load")
            .result(Param::unnamed(TypeDecl::simple("int")))
            .with_body(Block::new().invoke(Macro::TryDefine(TryDefine::new(
                "rows",
                Code::new().symbol("sql.query").text("()"),
                "cannot query",
            )))),
    );

    let err = render(&ast).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MacroContext);
    assert!(err.path().unwrap().contains(NodeKind::Func, "Load"));
}

#[test]
fn fail_macro() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("example.com/app", "go");
    let pkg = ast.add_package(module, "store", "store");
    let file = ast.add_file(pkg, "check");
    let ty = ast.add_struct(file, "Config");
    ast.add_field(ty, Field::new("Name", TypeDecl::simple("string")));
    ast.add_func(
        file,
        Func::new("Check")
            .result(Param::unnamed(TypeDecl::simple("Config")))
            .result(Param::unnamed(TypeDecl::Failure))
            .with_body(Block::new().invoke(Macro::Fail("not configured".into()))),
    );

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/store/check.go"),
        "package store\n\
         \n\
         import \"errors\"\n\
         \n\
         type Config struct {\n\
         \tName string\n\
         }\n\
         \n\
         func Check() (Config, error) {\n\
         \treturn Config{}, errors.New(\"not configured\")\n\
         }\n"
    );
}

#[test]
fn unresolved_symbol_reports_path() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    let ty = ast.add_struct(file, "HelloWorld");
    ast.add_field(ty, Field::new("When", TypeDecl::simple("calendar")));

    let err = render(&ast).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedSymbol);
    assert!(err.path().unwrap().contains(NodeKind::Field, "When"));
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn cancelled_render_returns_nothing() {
    let ast = sample_project();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = render_with(&ast, RenderOptions::default().with_cancel(cancel)).unwrap_err();
    assert!(matches!(err, EmitError::Cancelled));
}

#[test]
fn diagnostic_mode_scopes_failures_to_files() {
    let mut ast = Ast::new("demo");
    let (pkg, file) = go_package(&mut ast);
    hello_world(&mut ast, file);
    let broken = ast.add_file(pkg, "broken");
    let ty = ast.add_struct(broken, "Broken");
    ast.add_field(ty, Field::new("When", TypeDecl::simple("calendar")));

    assert!(render(&ast).is_err());

    let options = RenderOptions {
        diagnostic_mode: true,
        ..RenderOptions::default()
    };
    let out = render_with(&ast, options).unwrap();
    assert_eq!(leaf_paths(&out), vec!["example.com/app/hello/hello_world.go"]);
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind(), ErrorKind::UnresolvedSymbol);
}

#[test]
fn language_indent_override() {
    let mut ast = Ast::new("demo");
    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "hello", "hello");
    let file = ast.add_file(pkg, "hello_world");
    hello_world(&mut ast, file);

    let config = normalize_emit::EmitConfig::from_toml_str("[languages.java]\nindent = \"  \"\n").unwrap();
    let out = render_with(&ast, config.render_options()).unwrap();
    assert!(
        text(&out, "com.example/com/example/hello/HelloWorld.java").contains("\n  public String hello;\n")
    );
}

// ============================================================================
// Declaration checks
// ============================================================================

fn java_package(ast: &mut Ast, file: &str) -> (PackageId, FileId) {
    let module = ast.add_module("com.example", "java");
    let pkg = ast.add_package(module, "hello", "hello");
    let file = ast.add_file(pkg, file);
    (pkg, file)
}

#[test]
fn go_fields_clash_once_exported() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    let ty = ast.add_struct(file, "T");
    ast.add_field(ty, Field::new("hello", TypeDecl::simple("string")));
    ast.add_field(ty, Field::new("Hello", TypeDecl::simple("int")));

    match render(&ast).unwrap_err() {
        EmitError::DuplicateName { path, scope, name } => {
            assert_eq!(scope, "field");
            assert_eq!(name, "Hello");
            assert!(path.contains(NodeKind::Struct, "T"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn go_types_clash_once_exported() {
    let mut ast = Ast::new("demo");
    let (pkg, file) = go_package(&mut ast);
    ast.add_struct(file, "user");
    let other = ast.add_file(pkg, "other");
    ast.add_struct(other, "User");

    match render(&ast).unwrap_err() {
        EmitError::DuplicateName { path, scope, name } => {
            assert_eq!(scope, "type");
            assert_eq!(name, "User");
            assert!(path.contains(NodeKind::Package, "hello"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn java_fields_clash_once_lowered() {
    let mut ast = Ast::new("demo");
    let (_, file) = java_package(&mut ast, "hello_world");
    let ty = ast.add_struct(file, "HelloWorld");
    ast.add_field(ty, Field::new("Hello", TypeDecl::simple("string")));
    ast.add_field(ty, Field::new("hello", TypeDecl::simple("string")));

    assert!(matches!(
        render(&ast),
        Err(EmitError::DuplicateName { scope: "field", ref name, .. }) if name == "hello"
    ));
}

#[test]
fn interface_fields_are_rejected() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    let store = ast.add_interface(file, "Store");
    ast.add_field(store, Field::new("Lost", TypeDecl::simple("string")));
    ast.add_method(store, Func::new("Load"));

    let err = render(&ast).unwrap_err();
    assert!(matches!(err, EmitError::InvalidDecl { .. }), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(err.path().unwrap().contains(NodeKind::Field, "Lost"));
}

#[test]
fn interface_method_bodies_are_rejected() {
    let mut ast = Ast::new("demo");
    let (_, file) = java_package(&mut ast, "store");
    let store = ast.add_interface(file, "Store");
    ast.add_method(store, Func::new("Load").with_body(Block::new().code("panic(1)")));

    let err = render(&ast).unwrap_err();
    assert!(matches!(err, EmitError::InvalidDecl { .. }), "{err:?}");
    assert!(err.path().unwrap().contains(NodeKind::Method, "Load"));
}

#[test]
fn receiver_on_file_func_is_rejected() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    ast.add_func(file, Func::new("Free").with_receiver("x"));

    let err = render(&ast).unwrap_err();
    assert!(matches!(err, EmitError::InvalidDecl { .. }), "{err:?}");
    assert!(err.path().unwrap().contains(NodeKind::Func, "Free"));
}

#[test]
fn result_record_clashing_with_nested_type() {
    let mut ast = Ast::new("demo");
    let (_, file) = java_package(&mut ast, "queries");
    ast.add_struct(file, "QueryResult");
    ast.add_func(
        file,
        Func::new("Query")
            .result(Param::unnamed(TypeDecl::simple("int")))
            .result(Param::unnamed(TypeDecl::simple("string")))
            .result(Param::unnamed(TypeDecl::Failure)),
    );

    match render(&ast).unwrap_err() {
        EmitError::DuplicateName { path, scope, name } => {
            assert_eq!(scope, "class");
            assert_eq!(name, "QueryResult");
            assert!(path.contains(NodeKind::Func, "Query"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unsupported_macro() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    ast.add_func(file, load_func());

    let mut registry = Registry::with_builtins();
    registry.remove_macro("go", normalize_emit::MacroKind::TryDefine);
    let symbols = symbols();
    let err = Renderer::new(&registry, &symbols).render(&ast).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMacro);
    assert!(err.path().unwrap().contains(NodeKind::Func, "Load"));
    assert!(err.to_string().contains("`go`"), "{err}");
}

// ============================================================================
// Bodies
// ============================================================================

#[test]
fn body_docs_are_written() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    ast.add_func(
        file,
        Func::new("Free").with_body(
            Block::new().with_doc("body doc").block(
                Block::new()
                    .with_header("if ok")
                    .code("a()")
                    .chain(Block::new().with_header("else").with_doc("otherwise").code("b()")),
            ),
        ),
    );

    let out = render(&ast).unwrap();
    assert_eq!(
        text(&out, "example.com/app/hello/hello_world.go"),
        "package hello\n\
         \n\
         func Free() {\n\
         \t// body doc\n\
         \tif ok {\n\
         \t\ta()\n\
         \t} else {\n\
         \t\t// otherwise\n\
         \t\tb()\n\
         \t}\n\
         }\n"
    );
}

// ============================================================================
// Package docs
// ============================================================================

#[test]
fn conflicting_package_docs_fail_the_render() {
    let mut ast = Ast::new("demo");
    let (pkg, file) = go_package(&mut ast);
    hello_world(&mut ast, file);
    ast.package_mut(pkg).doc = Some("...says hello.".into());
    ast.file_mut(file).doc = Some("...says goodbye.".into());

    let err = render(&ast).unwrap_err();
    assert!(matches!(err, EmitError::ConflictingPackageDoc { .. }), "{err:?}");
    assert!(err.path().unwrap().contains(NodeKind::Package, "hello"));
}

#[test]
fn go_file_doc_lands_on_its_package_clause() {
    let mut ast = Ast::new("demo");
    let (_, file) = go_package(&mut ast);
    hello_world(&mut ast, file);
    ast.file_mut(file).doc = Some("...says hello.".into());

    let out = render(&ast).unwrap();
    assert_eq!(leaf_paths(&out), vec!["example.com/app/hello/hello_world.go"]);
    assert!(
        text(&out, "example.com/app/hello/hello_world.go")
            .starts_with("// Package hello says hello.\npackage hello\n\ntype HelloWorld struct {\n")
    );
}

#[test]
fn java_package_doc_goes_to_package_info() {
    let mut ast = Ast::new("demo");
    let (_, file) = java_package(&mut ast, "hello_world");
    hello_world(&mut ast, file);
    ast.file_mut(file).doc = Some("...says hello.".into());

    let out = render(&ast).unwrap();
    assert_eq!(
        leaf_paths(&out),
        vec![
            "com.example/com/example/hello/package-info.java",
            "com.example/com/example/hello/HelloWorld.java",
        ]
    );
    insta::assert_snapshot!(text(&out, "com.example/com/example/hello/package-info.java"), @r"
    /** hello says hello. */
    package com.example.hello;
    ");
    assert!(text(&out, "com.example/com/example/hello/HelloWorld.java").starts_with("package com.example.hello;\n"));
}
