//! Declaration shapes recognized per language.
//!
//! A shape is an ancestor-to-descendant path of node kinds (tree-sitter kind
//! names) plus a signature synthesizer that reads the matched chain. Only the
//! shapes listed here produce skeletons; everything else is walked through.

use crate::language::LanguageId;
use crate::query::{child_after_kind, child_value_of_kind, first_child_of_kind, match_path};
use crate::tree::SyntaxNode;

/// Builds a signature from the nodes matched for each path element.
pub type SignatureFn = for<'t> fn(&[SyntaxNode<'t>]) -> String;

pub struct DeclShape {
    pub name: &'static str,
    pub path: &'static [&'static str],
    /// The shape is skipped when the visited node's parent has one of these kinds.
    pub excluded_ancestors: &'static [&'static str],
    /// A comment directly above this shape at the top of a file documents the
    /// declaration, not the file.
    pub claims_leading_comment: bool,
    pub signature: SignatureFn,
}

impl std::fmt::Debug for DeclShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclShape")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ShapeTable {
    /// Kinds that may stand in front of `path[0]` (e.g. `export_statement`).
    pub wrappers: &'static [&'static str],
    pub shapes: &'static [DeclShape],
}

/// A shape matched at one node.
#[derive(Debug)]
pub struct ShapeMatch<'s, 't> {
    pub shape: &'s DeclShape,
    pub chain: Vec<SyntaxNode<'t>>,
}

impl ShapeMatch<'_, '_> {
    /// The synthesized signature on one line: whitespace runs, newlines
    /// included, collapse to a single space.
    pub fn signature(&self) -> String {
        let raw = (self.shape.signature)(&self.chain);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl ShapeTable {
    fn entry_allowed(&self, shape: &DeclShape, node: SyntaxNode<'_>, parent: Option<SyntaxNode<'_>>) -> bool {
        // Keyword tokens share their kind with the node they introduce (`class`).
        if node.child_count() == 0 {
            return false;
        }
        if parent.is_some_and(|p| shape.excluded_ancestors.contains(&p.kind())) {
            return false;
        }
        shape.path.first() == Some(&node.kind()) || self.wrappers.contains(&node.kind())
    }

    /// First shape that matches `node` visited under `parent`.
    pub fn match_node<'s, 't>(&'s self, node: SyntaxNode<'t>, parent: Option<SyntaxNode<'t>>) -> Option<ShapeMatch<'s, 't>> {
        self.shapes.iter().find_map(|shape| {
            if !self.entry_allowed(shape, node, parent) {
                return None;
            }
            match_path(node, shape.path).map(|chain| ShapeMatch { shape, chain })
        })
    }

    /// True when `node` matches a shape that claims a leading file comment.
    pub fn claims_leading_comment(&self, node: SyntaxNode<'_>, parent: Option<SyntaxNode<'_>>) -> bool {
        self.shapes
            .iter()
            .filter(|s| s.claims_leading_comment)
            .any(|shape| self.entry_allowed(shape, node, parent) && match_path(node, shape.path).is_some())
    }
}

pub fn shape_table(language: LanguageId) -> &'static ShapeTable {
    match language {
        LanguageId::JavaScript | LanguageId::TypeScript | LanguageId::Tsx => &ECMASCRIPT,
        LanguageId::Rust => &RUST,
        LanguageId::Go => &GO,
        LanguageId::Ruby => &RUBY,
        LanguageId::Php => &PHP,
        LanguageId::CSharp => &CSHARP,
        LanguageId::Dart => &DART,
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

const EXPORT: &[&str] = &["export_statement"];

macro_rules! shape {
    ($name:literal, [$($p:literal),+], $excl:expr, $claims:literal, $sig:path) => {
        DeclShape {
            name: $name,
            path: &[$($p),+],
            excluded_ancestors: $excl,
            claims_leading_comment: $claims,
            signature: $sig,
        }
    };
}

static ECMASCRIPT: ShapeTable = ShapeTable {
    wrappers: EXPORT,
    shapes: &[
        shape!("arrow_function", ["lexical_declaration", "variable_declarator", "arrow_function"], EXPORT, true, bound_function),
        shape!("var_arrow_function", ["variable_declaration", "variable_declarator", "arrow_function"], EXPORT, true, bound_function),
        shape!("function_expression", ["lexical_declaration", "variable_declarator", "function_expression"], EXPORT, true, bound_function),
        shape!("var_function_expression", ["variable_declaration", "variable_declarator", "function_expression"], EXPORT, true, bound_function),
        shape!("function_declaration", ["function_declaration"], EXPORT, true, ecma_function),
        shape!("generator_function_declaration", ["generator_function_declaration"], EXPORT, true, ecma_function),
        shape!("method_definition", ["method_definition"], &[], false, ecma_function),
        shape!("type_alias", ["type_alias_declaration"], EXPORT, true, ecma_named),
        shape!("interface_declaration", ["interface_declaration"], EXPORT, false, ecma_named),
        shape!("class_declaration", ["class_declaration"], EXPORT, false, ecma_named),
        shape!("abstract_class_declaration", ["abstract_class_declaration"], EXPORT, false, ecma_named),
    ],
};

static RUST: ShapeTable = ShapeTable {
    wrappers: &[],
    shapes: &[
        shape!("function", ["function_item"], &[], true, rust_function),
        shape!("function_signature", ["function_signature_item"], &[], true, rust_function),
        shape!("type_alias", ["type_item"], &[], true, rust_named),
        shape!("struct", ["struct_item"], &[], false, rust_named),
        shape!("enum", ["enum_item"], &[], false, rust_named),
        shape!("trait", ["trait_item"], &[], false, rust_named),
    ],
};

static GO: ShapeTable = ShapeTable {
    wrappers: &[],
    shapes: &[
        shape!("function", ["function_declaration"], &[], true, go_function),
        shape!("method", ["method_declaration"], &[], true, go_method),
        shape!("type", ["type_declaration", "type_spec"], &[], true, go_type),
    ],
};

static RUBY: ShapeTable = ShapeTable {
    wrappers: &[],
    shapes: &[
        shape!("method", ["method"], &[], true, ruby_method),
        shape!("singleton_method", ["singleton_method"], &[], true, ruby_singleton_method),
        shape!("class", ["class"], &[], false, ruby_named),
        shape!("module", ["module"], &[], false, ruby_named),
    ],
};

static PHP: ShapeTable = ShapeTable {
    wrappers: &[],
    shapes: &[
        shape!("function", ["function_definition"], &[], true, php_function),
        shape!("method", ["method_declaration"], &[], false, php_function),
        shape!("class", ["class_declaration"], &[], false, php_named),
        shape!("interface", ["interface_declaration"], &[], false, php_named),
        shape!("trait", ["trait_declaration"], &[], false, php_named),
        shape!("enum", ["enum_declaration"], &[], false, php_named),
    ],
};

static CSHARP: ShapeTable = ShapeTable {
    wrappers: &[],
    shapes: &[
        shape!("method", ["method_declaration"], &[], true, csharp_callable),
        shape!("local_function", ["local_function_statement"], &[], true, csharp_callable),
        shape!("constructor", ["constructor_declaration"], &[], false, csharp_callable),
        shape!("class", ["class_declaration"], &[], false, csharp_named),
        shape!("struct", ["struct_declaration"], &[], false, csharp_named),
        shape!("interface", ["interface_declaration"], &[], false, csharp_named),
        shape!("record", ["record_declaration"], &[], false, csharp_named),
        shape!("enum", ["enum_declaration"], &[], false, csharp_named),
    ],
};

static DART: ShapeTable = ShapeTable {
    wrappers: &[],
    shapes: &[
        shape!("function", ["function_signature"], &["method_signature"], true, dart_function),
        shape!("method", ["method_signature", "function_signature"], &[], false, dart_function),
        shape!("getter", ["method_signature", "getter_signature"], &[], false, dart_function),
        shape!("type_alias", ["type_alias"], &[], true, dart_named),
        shape!("class", ["class_definition"], &[], false, dart_named),
        shape!("enum", ["enum_declaration"], &[], false, dart_named),
        shape!("mixin", ["mixin_declaration"], &[], false, dart_named),
        shape!("extension", ["extension_declaration"], &[], false, dart_named),
    ],
};

// ---------------------------------------------------------------------------
// Signature synthesis
// ---------------------------------------------------------------------------

fn last<'t>(chain: &[SyntaxNode<'t>]) -> Option<SyntaxNode<'t>> {
    chain.last().copied()
}

/// `name + params` for a function bound to a variable.
///
/// The parameter text is the function's own text up to its body marker
/// (`=>` for arrows, `{` otherwise), starting at the opening parenthesis.
fn bound_function(chain: &[SyntaxNode<'_>]) -> String {
    let [_, declarator, function] = chain else { return String::new() };
    let name = child_value_of_kind(*declarator, &["identifier"]);
    if name.is_empty() {
        return String::new();
    }
    let marker = if function.kind() == "arrow_function" { "=>" } else { "{" };
    let text = function.text();
    let head = text.find(marker).map_or(text, |i| &text[..i]).trim();
    let params = match head.find('(') {
        Some(i) => head[i..].trim().to_string(),
        None => {
            let param = head
                .strip_prefix("async")
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map_or(head, str::trim_start);
            format!("({param})")
        }
    };
    format!("{name}{params}")
}

fn ecma_function(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier", "property_identifier", "private_property_identifier"]);
    if name.is_empty() {
        return String::new();
    }
    let params = child_value_of_kind(node, &["formal_parameters"]);
    let returns = child_value_of_kind(node, &["type_annotation"]);
    format!("{name}{params}{returns}")
}

fn ecma_named(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["type_identifier", "identifier"]);
    if name.is_empty() {
        return String::new();
    }
    format!("{name}{}", child_value_of_kind(node, &["type_parameters"]))
}

fn rust_function(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier", "metavariable"]);
    if name.is_empty() {
        return String::new();
    }
    let generics = child_value_of_kind(node, &["type_parameters"]);
    let params = child_value_of_kind(node, &["parameters"]);
    let returns = child_after_kind(node, &["->"]).map_or(String::new(), |t| format!(" -> {}", t.text()));
    format!("{name}{generics}{params}{returns}")
}

fn rust_named(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["type_identifier"]);
    if name.is_empty() {
        return String::new();
    }
    format!("{name}{}", child_value_of_kind(node, &["type_parameters"]))
}

/// Go result types follow the parameter list unless the body comes first.
fn go_result(node: SyntaxNode<'_>, params: Option<SyntaxNode<'_>>) -> String {
    let Some(params) = params else { return String::new() };
    let idx = node.children().position(|c| c == params);
    match idx.and_then(|i| node.child(i + 1)) {
        Some(next) if next.kind() != "block" => format!(" {}", next.text()),
        _ => String::new(),
    }
}

fn go_function(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier"]);
    if name.is_empty() {
        return String::new();
    }
    let generics = child_value_of_kind(node, &["type_parameter_list"]);
    let params = first_child_of_kind(node, &["parameter_list"]);
    let result = go_result(node, params);
    format!("{name}{generics}{}{result}", params.map_or("", |p| p.text()))
}

fn go_method(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["field_identifier"]);
    if name.is_empty() {
        return String::new();
    }
    let receiver = child_value_of_kind(node, &["parameter_list"]);
    let params = child_after_kind(node, &["field_identifier"]).filter(|p| p.kind() == "parameter_list");
    let result = go_result(node, params);
    let receiver = if receiver.is_empty() { String::new() } else { format!("{receiver} ") };
    format!("{receiver}{name}{}{result}", params.map_or("", |p| p.text()))
}

fn go_type(chain: &[SyntaxNode<'_>]) -> String {
    let Some(type_spec) = last(chain) else { return String::new() };
    let name = child_value_of_kind(type_spec, &["type_identifier"]);
    if name.is_empty() {
        return String::new();
    }
    format!("{name}{}", child_value_of_kind(type_spec, &["type_parameter_list"]))
}

fn ruby_method(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier", "setter", "operator", "constant"]);
    if name.is_empty() {
        return String::new();
    }
    format!("{name}{}", child_value_of_kind(node, &["method_parameters"]))
}

fn ruby_singleton_method(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_after_kind(node, &["."]).map_or("", |n| n.text());
    if name.is_empty() {
        return String::new();
    }
    // `def self.build(...)`: the receiver directly follows `def`.
    let receiver = node.child(1).map_or("", |n| n.text());
    format!("{receiver}.{name}{}", child_value_of_kind(node, &["method_parameters"]))
}

fn ruby_named(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    child_value_of_kind(node, &["constant", "scope_resolution"]).to_string()
}

fn php_function(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["name"]);
    if name.is_empty() {
        return String::new();
    }
    let params = child_value_of_kind(node, &["formal_parameters"]);
    let returns = child_after_kind(node, &[":"]).map_or(String::new(), |t| format!(": {}", t.text()));
    format!("{name}{params}{returns}")
}

fn php_named(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    child_value_of_kind(node, &["name"]).to_string()
}

fn csharp_callable(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier"]);
    if name.is_empty() {
        return String::new();
    }
    let generics = child_value_of_kind(node, &["type_parameter_list"]);
    let params = child_value_of_kind(node, &["parameter_list"]);
    format!("{name}{generics}{params}")
}

fn csharp_named(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier"]);
    if name.is_empty() {
        return String::new();
    }
    format!("{name}{}", child_value_of_kind(node, &["type_parameter_list"]))
}

fn dart_function(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier"]);
    if name.is_empty() {
        return String::new();
    }
    format!("{name}{}", child_value_of_kind(node, &["formal_parameter_list"]))
}

fn dart_named(chain: &[SyntaxNode<'_>]) -> String {
    let Some(node) = last(chain) else { return String::new() };
    let name = child_value_of_kind(node, &["identifier", "type_identifier"]);
    if name.is_empty() {
        return String::new();
    }
    format!("{name}{}", child_value_of_kind(node, &["type_parameters"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SyntaxTree, TreeBuilder};

    fn rust_fn_tree() -> SyntaxTree {
        TreeBuilder::new("pub fn add<T>(a: T, b: T) -> T { a }")
            .open("source_file")
            .open("function_item")
            .leaf("visibility_modifier", "pub")
            .leaf("fn", "fn")
            .leaf("identifier", "add")
            .leaf("type_parameters", "<T>")
            .leaf("parameters", "(a: T, b: T)")
            .leaf("->", "->")
            .leaf("type_identifier", "T")
            .leaf("block", "{ a }")
            .close()
            .close()
            .finish()
            .unwrap()
    }

    #[test]
    fn rust_function_signature_includes_generics_and_return() {
        let tree = rust_fn_tree();
        let func = tree.root().child(0).unwrap();
        let m = shape_table(LanguageId::Rust).match_node(func, Some(tree.root())).unwrap();
        assert_eq!(m.shape.name, "function");
        assert_eq!(m.signature(), "add<T>(a: T, b: T) -> T");
    }

    #[test]
    fn multi_line_parameters_collapse_to_one_line() {
        let src = "fn add(\n    a: i32,\n    b: i32,\n) -> i32 {\n    a + b\n}";
        let tree = TreeBuilder::new(src)
            .open("source_file")
            .open("function_item")
            .leaf("fn", "fn")
            .leaf("identifier", "add")
            .leaf("parameters", "(\n    a: i32,\n    b: i32,\n)")
            .leaf("->", "->")
            .leaf("primitive_type", "i32")
            .leaf("block", "{\n    a + b\n}")
            .close()
            .close()
            .finish()
            .unwrap();
        let func = tree.root().child(0).unwrap();
        let m = shape_table(LanguageId::Rust).match_node(func, Some(tree.root())).unwrap();
        assert_eq!(m.signature(), "add( a: i32, b: i32, ) -> i32");
    }

    #[test]
    fn keyword_leaves_never_match() {
        let tree = TreeBuilder::new("class Foo\nend")
            .open("program")
            .open("class")
            .leaf("class", "class")
            .leaf("constant", "Foo")
            .leaf("end", "end")
            .close()
            .close()
            .finish()
            .unwrap();
        let table = shape_table(LanguageId::Ruby);
        let class = tree.root().child(0).unwrap();
        let keyword = class.child(0).unwrap();
        assert_eq!(table.match_node(class, Some(tree.root())).unwrap().signature(), "Foo");
        assert!(table.match_node(keyword, Some(class)).is_none());
    }

    fn exported_function() -> SyntaxTree {
        TreeBuilder::new("export function greet(name: string): string { return name; }")
            .open("program")
            .open("export_statement")
            .leaf("export", "export")
            .open("function_declaration")
            .leaf("function", "function")
            .leaf("identifier", "greet")
            .leaf("formal_parameters", "(name: string)")
            .leaf("type_annotation", ": string")
            .leaf("statement_block", "{ return name; }")
            .close()
            .close()
            .close()
            .finish()
            .unwrap()
    }

    #[test]
    fn export_wrapper_matches_once() {
        let tree = exported_function();
        let table = shape_table(LanguageId::TypeScript);
        let export = tree.root().child(0).unwrap();
        let inner = export.child(1).unwrap();

        let m = table.match_node(export, Some(tree.root())).unwrap();
        assert_eq!(m.shape.name, "function_declaration");
        assert_eq!(m.signature(), "greet(name: string): string");
        assert!(table.match_node(inner, Some(export)).is_none(), "excluded under export");
        assert!(table.claims_leading_comment(export, Some(tree.root())));
    }

    #[test]
    fn containers_do_not_drill_into_first_declaration() {
        let tree = TreeBuilder::new("class A { run() {} }")
            .open("program")
            .open("class_declaration")
            .leaf("class", "class")
            .leaf("type_identifier", "A")
            .open("class_body")
            .leaf("{", "{")
            .open("method_definition")
            .leaf("property_identifier", "run")
            .leaf("formal_parameters", "()")
            .leaf("statement_block", "{}")
            .close()
            .leaf("}", "}")
            .close()
            .close()
            .close()
            .finish()
            .unwrap();
        let table = shape_table(LanguageId::TypeScript);
        let class = tree.root().child(0).unwrap();
        let body = class.child(2).unwrap();
        let method = body.child(1).unwrap();
        assert_eq!(table.match_node(class, Some(tree.root())).unwrap().signature(), "A");
        assert!(table.match_node(body, Some(class)).is_none());
        assert_eq!(table.match_node(method, Some(body)).unwrap().signature(), "run()");
        assert!(!table.claims_leading_comment(class, Some(tree.root())));
    }

    #[test]
    fn bound_arrow_uses_text_before_marker() {
        let tree = TreeBuilder::new("const add = async (a, b) => a + b;")
            .open("program")
            .open("lexical_declaration")
            .leaf("const", "const")
            .open("variable_declarator")
            .leaf("identifier", "add")
            .leaf("=", "=")
            .open("arrow_function")
            .leaf("async", "async")
            .leaf("formal_parameters", "(a, b)")
            .leaf("=>", "=>")
            .leaf("binary_expression", "a + b")
            .close()
            .close()
            .leaf(";", ";")
            .close()
            .close()
            .finish()
            .unwrap();
        let decl = tree.root().child(0).unwrap();
        let m = shape_table(LanguageId::JavaScript).match_node(decl, Some(tree.root())).unwrap();
        assert_eq!(m.shape.name, "arrow_function");
        assert_eq!(m.signature(), "add(a, b)");
    }

    #[test]
    fn bound_arrow_without_parens_is_wrapped() {
        let tree = TreeBuilder::new("let inc = x => x + 1")
            .open("program")
            .open("lexical_declaration")
            .leaf("let", "let")
            .open("variable_declarator")
            .leaf("identifier", "inc")
            .leaf("=", "=")
            .open("arrow_function")
            .leaf("identifier", "x")
            .leaf("=>", "=>")
            .leaf("binary_expression", "x + 1")
            .close()
            .close()
            .close()
            .close()
            .finish()
            .unwrap();
        let decl = tree.root().child(0).unwrap();
        let m = shape_table(LanguageId::JavaScript).match_node(decl, Some(tree.root())).unwrap();
        assert_eq!(m.signature(), "inc(x)");
    }

    #[test]
    fn bound_async_arrow_drops_the_keyword() {
        let tree = TreeBuilder::new("const load = async id => fetch(id)")
            .open("program")
            .open("lexical_declaration")
            .leaf("const", "const")
            .open("variable_declarator")
            .leaf("identifier", "load")
            .leaf("=", "=")
            .open("arrow_function")
            .leaf("async", "async")
            .leaf("identifier", "id")
            .leaf("=>", "=>")
            .leaf("call_expression", "fetch(id)")
            .close()
            .close()
            .close()
            .close()
            .finish()
            .unwrap();
        let decl = tree.root().child(0).unwrap();
        let m = shape_table(LanguageId::JavaScript).match_node(decl, Some(tree.root())).unwrap();
        assert_eq!(m.signature(), "load(id)");
    }

    #[test]
    fn go_method_includes_receiver_and_result() {
        let tree = TreeBuilder::new("func (s *Server) Start(port int) error { return nil }")
            .open("source_file")
            .open("method_declaration")
            .leaf("func", "func")
            .leaf("parameter_list", "(s *Server)")
            .leaf("field_identifier", "Start")
            .leaf("parameter_list", "(port int)")
            .leaf("type_identifier", "error")
            .leaf("block", "{ return nil }")
            .close()
            .close()
            .finish()
            .unwrap();
        let method = tree.root().child(0).unwrap();
        let m = shape_table(LanguageId::Go).match_node(method, Some(tree.root())).unwrap();
        assert_eq!(m.signature(), "(s *Server) Start(port int) error");
    }

    #[test]
    fn php_function_reads_return_type_after_colon() {
        let tree = TreeBuilder::new("function total(array $items): int { return 0; }")
            .open("program")
            .open("function_definition")
            .leaf("function", "function")
            .leaf("name", "total")
            .leaf("formal_parameters", "(array $items)")
            .leaf(":", ":")
            .leaf("primitive_type", "int")
            .leaf("compound_statement", "{ return 0; }")
            .close()
            .close()
            .finish()
            .unwrap();
        let func = tree.root().child(0).unwrap();
        let m = shape_table(LanguageId::Php).match_node(func, Some(tree.root())).unwrap();
        assert_eq!(m.signature(), "total(array $items): int");
    }

    #[test]
    fn dart_method_signature_is_not_matched_twice() {
        let tree = TreeBuilder::new("class A { void run(int n) {} }")
            .open("program")
            .open("class_definition")
            .leaf("class", "class")
            .leaf("identifier", "A")
            .open("class_body")
            .leaf("{", "{")
            .open("method_signature")
            .open("function_signature")
            .leaf("void_type", "void")
            .leaf("identifier", "run")
            .leaf("formal_parameter_list", "(int n)")
            .close()
            .close()
            .leaf("function_body", "{}")
            .leaf("}", "}")
            .close()
            .close()
            .close()
            .finish()
            .unwrap();
        let table = shape_table(LanguageId::Dart);
        let body = tree.root().child(0).unwrap().child(2).unwrap();
        let method = body.child(1).unwrap();
        let signature = method.child(0).unwrap();
        let m = table.match_node(method, Some(body)).unwrap();
        assert_eq!(m.shape.name, "method");
        assert_eq!(m.signature(), "run(int n)");
        assert!(table.match_node(signature, Some(method)).is_none());
    }
}
