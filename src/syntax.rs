//! Java syntax model built from tree-sitter.
//!
//! The classifier never looks at tree-sitter nodes directly. This module
//! lowers a parsed compilation unit into plain owned values: the package, the
//! top-level type declarations, and for each type its annotations, fields,
//! constructors and methods.

use serde::Serialize;
use thiserror::Error;
use tree_sitter::{Node, Parser};

#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("failed to load the Java grammar: {0}")]
    Language(String),
    #[error("parser produced no syntax tree")]
    NoTree,
    #[error("syntax error at line {line}")]
    Malformed { line: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub package: Option<String>,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub line: usize,
    pub supertypes: Vec<String>,
    pub interfaces: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<FieldDecl>,
    pub constructors: Vec<ConstructorDecl>,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Name as written, possibly qualified (`org.springframework.stereotype.Service`).
    pub name: String,
    pub args: AnnotationArgs,
    /// Full annotation text with whitespace collapsed.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationArgs {
    /// `@Service` or `@GetMapping()`.
    Marker,
    /// `@Scope("prototype")`.
    Single(AnnotationValue),
    /// `@RequestMapping(path = "/a", method = GET)`.
    Named(Vec<(String, AnnotationValue)>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationValue {
    Expr(String),
    Array(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    pub annotations: Vec<Annotation>,
    pub type_name: String,
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorDecl {
    pub annotations: Vec<Annotation>,
    /// Declared parameter types in order; varargs keep the element type.
    pub param_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDecl {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub return_type: String,
    pub line: usize,
}

impl Annotation {
    /// Last dotted segment of the name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn is(&self, names: &[&str]) -> bool {
        names.contains(&self.simple_name())
    }

    pub fn named_arg(&self, key: &str) -> Option<&AnnotationValue> {
        match &self.args {
            AnnotationArgs::Named(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl AnnotationValue {
    /// Every element text; a scalar yields one element.
    pub fn items(&self) -> Vec<&str> {
        match self {
            AnnotationValue::Expr(text) => vec![text.as_str()],
            AnnotationValue::Array(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_expr(&self) -> Option<&str> {
        match self {
            AnnotationValue::Expr(text) => Some(text),
            AnnotationValue::Array(_) => None,
        }
    }
}

impl TypeDecl {
    pub fn has_method_annotated(&self, names: &[&str]) -> bool {
        self.methods
            .iter()
            .any(|m| m.annotations.iter().any(|a| a.is(names)))
    }
}

pub fn parse_source(source: &str) -> Result<SourceFile, SyntaxError> {
    if source.trim().is_empty() {
        return Ok(SourceFile::default());
    }

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| SyntaxError::Language(e.to_string()))?;
    let tree = parser.parse(source, None).ok_or(SyntaxError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(SyntaxError::Malformed {
            line: first_error_line(&root).unwrap_or(1),
        });
    }

    let bytes = source.as_bytes();
    let mut file = SourceFile::default();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        let kind = match child.kind() {
            "package_declaration" => {
                file.package = extract_package(&child, bytes);
                continue;
            }
            "class_declaration" => TypeKind::Class,
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" => TypeKind::Record,
            "annotation_type_declaration" => TypeKind::Annotation,
            _ => continue,
        };
        file.types.push(extract_type(&child, kind, bytes));
    }

    Ok(file)
}

fn first_error_line(node: &Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(line_of(node));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error()
            && let Some(line) = first_error_line(&child)
        {
            return Some(line);
        }
    }
    None
}

fn extract_package(node: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "scoped_identifier" || child.kind() == "identifier" {
            return Some(node_text(&child, source).to_string());
        }
    }
    None
}

fn extract_type(node: &Node, kind: TypeKind, source: &[u8]) -> TypeDecl {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())
        .unwrap_or_default();

    let supertypes = match node.child_by_field_name("superclass") {
        Some(sc) => type_list(&sc, source),
        None => find_child(node, "extends_interfaces")
            .map(|ext| type_list(&ext, source))
            .unwrap_or_default(),
    };
    let interfaces = node
        .child_by_field_name("interfaces")
        .map(|si| type_list(&si, source))
        .unwrap_or_default();

    let mut decl = TypeDecl {
        kind,
        name,
        line: line_of(node),
        supertypes,
        interfaces,
        annotations: annotations_of(node, source),
        fields: Vec::new(),
        constructors: Vec::new(),
        methods: Vec::new(),
    };

    if let Some(body) = node.child_by_field_name("body") {
        extract_members(&body, source, &mut decl);
    }
    decl
}

/// Simple names of every type under a `superclass`, `super_interfaces` or
/// `extends_interfaces` node.
fn type_list(node: &Node, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            out.extend(type_list(&child, source));
        } else {
            out.push(simple_type_name(node_text(&child, source)));
        }
    }
    out
}

fn extract_members(body: &Node, source: &[u8], decl: &mut TypeDecl) {
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        match child.kind() {
            "field_declaration" => decl.fields.push(extract_field(&child, source)),
            "constructor_declaration" | "compact_constructor_declaration" => {
                decl.constructors.push(ConstructorDecl {
                    annotations: annotations_of(&child, source),
                    param_types: extract_param_types(&child, source),
                });
            }
            "method_declaration" => decl.methods.push(MethodDecl {
                annotations: annotations_of(&child, source),
                name: field_text(&child, "name", source),
                return_type: field_text(&child, "type", source),
                line: line_of(&child),
            }),
            "enum_body_declarations" => extract_members(&child, source, decl),
            _ => {}
        }
    }
}

fn extract_field(node: &Node, source: &[u8]) -> FieldDecl {
    let mut variables = Vec::new();
    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        variables.push(field_text(&declarator, "name", source));
    }

    FieldDecl {
        annotations: annotations_of(node, source),
        type_name: element_type(&field_text(node, "type", source)),
        variables,
    }
}

fn extract_param_types(node: &Node, source: &[u8]) -> Vec<String> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "formal_parameter" => out.push(field_text(&param, "type", source)),
            "spread_parameter" => {
                let mut inner = param.walk();
                let element = param
                    .named_children(&mut inner)
                    .find(|part| !matches!(part.kind(), "modifiers" | "variable_declarator"));
                if let Some(ty) = element {
                    out.push(normalize_whitespace(node_text(&ty, source)));
                }
            }
            _ => {}
        }
    }
    out
}

fn annotations_of(node: &Node, source: &[u8]) -> Vec<Annotation> {
    let Some(modifiers) = find_child(node, "modifiers") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = modifiers.walk();
    for child in modifiers.named_children(&mut cursor) {
        if matches!(child.kind(), "marker_annotation" | "annotation") {
            out.push(extract_annotation(&child, source));
        }
    }
    out
}

fn extract_annotation(node: &Node, source: &[u8]) -> Annotation {
    let args = match node.child_by_field_name("arguments") {
        Some(list) => extract_arguments(&list, source),
        None => AnnotationArgs::Marker,
    };

    Annotation {
        name: field_text(node, "name", source),
        args,
        text: normalize_whitespace(node_text(node, source)),
    }
}

fn extract_arguments(list: &Node, source: &[u8]) -> AnnotationArgs {
    let mut pairs = Vec::new();
    let mut single = None;

    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        if child.kind() == "element_value_pair" {
            let key = field_text(&child, "key", source);
            if let Some(value) = child.child_by_field_name("value") {
                pairs.push((key, element_value(&value, source)));
            }
        } else if child.kind() != "comment" {
            single = Some(element_value(&child, source));
        }
    }

    match single {
        Some(value) if pairs.is_empty() => AnnotationArgs::Single(value),
        _ if !pairs.is_empty() => AnnotationArgs::Named(pairs),
        _ => AnnotationArgs::Marker,
    }
}

fn element_value(node: &Node, source: &[u8]) -> AnnotationValue {
    if node.kind() != "element_value_array_initializer" {
        return AnnotationValue::Expr(normalize_whitespace(node_text(node, source)));
    }

    let mut items = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "comment" {
            items.push(normalize_whitespace(node_text(&child, source)));
        }
    }
    AnnotationValue::Array(items)
}

fn find_child<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn field_text(node: &Node, field: &str, source: &[u8]) -> String {
    node.child_by_field_name(field)
        .map(|n| normalize_whitespace(node_text(&n, source)))
        .unwrap_or_default()
}

fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name).trim()
}

/// `java.util.Map<String, Foo>` -> `Map`.
pub fn simple_type_name(raw: &str) -> String {
    let base = raw.split('<').next().unwrap_or(raw).trim();
    simple_name(base).to_string()
}

/// Field element type: array brackets dropped, generics kept.
fn element_type(raw: &str) -> String {
    let mut s = raw.trim();
    while let Some(rest) = s.strip_suffix("[]") {
        s = rest.trim_end();
    }
    s.to_string()
}
