//! Maps one parsed class declaration to a classified bean.
//!
//! Role assignment is a single pass over the class annotations where the last
//! recognized stereotype wins. Everything after that only extracts metadata
//! into the already-admitted bean, except the final `@Scheduled` /
//! `@EventListener` upgrade of plain components.

use std::path::{Path, PathBuf};

use crate::model::{Bean, DEFAULT_SCOPE, FactoryMethod, Role};
use crate::syntax::{Annotation, AnnotationArgs, AnnotationValue, MethodDecl, TypeDecl};

const INJECT_FIELD: &[&str] = &["Autowired", "Inject", "Resource"];
const INJECT_CONSTRUCTOR: &[&str] = &["Autowired", "Inject"];
const FACTORY_METHOD: &[&str] = &["Bean"];
const SCHEDULED: &[&str] = &["Scheduled"];
const EVENT_LISTENER: &[&str] = &["EventListener", "TransactionalEventListener"];

const SCOPE: &str = "Scope";
const MAPPING_MARKER: &str = "Mapping";
const CONDITIONAL_PREFIX: &str = "ConditionalOn";

/// Stereotype annotation (simple name) to role.
pub fn role_for_annotation(simple_name: &str) -> Option<Role> {
    let role = match simple_name {
        "SpringBootApplication" => Role::Application,
        "Configuration" => Role::Configuration,
        "Controller" | "ControllerAdvice" => Role::Controller,
        "RestController" | "RestControllerAdvice" => Role::RestController,
        "Service" => Role::Service,
        "Repository" => Role::Repository,
        "Component" => Role::Component,
        "Entity" => Role::Entity,
        "Aspect" => Role::Aspect,
        _ => return None,
    };
    Some(role)
}

/// Classifies a top-level class. Returns `None` when no stereotype annotation
/// admits it as a bean.
pub fn classify(decl: &TypeDecl, package: &str, file_path: &Path) -> Option<Bean> {
    let mut builder = BeanBuilder::new(decl, package, file_path);

    for annotation in &decl.annotations {
        builder.annotations.push(annotation.name.clone());

        if let Some(role) = role_for_annotation(annotation.simple_name()) {
            builder.role = Some(role);
        }
        if annotation.simple_name() == SCOPE
            && let Some(scope) = class_scope(annotation)
        {
            builder.scope = scope;
        }
        if annotation.simple_name().contains(MAPPING_MARKER) {
            builder.routes.extend(route_fragments(annotation));
        }
    }

    // Annotation presence is the only admission criterion.
    if builder.role.is_none() {
        return None;
    }

    builder.collect_dependencies(decl);
    if builder.role == Some(Role::Configuration) {
        builder.factory_methods = decl.methods.iter().filter_map(factory_method).collect();
    }
    builder.apply_method_upgrades(decl);

    Some(builder.finish())
}

struct BeanBuilder {
    simple_name: String,
    package: String,
    file_path: PathBuf,
    line: usize,
    role: Option<Role>,
    scope: String,
    annotations: Vec<String>,
    routes: Vec<String>,
    dependencies: Vec<String>,
    factory_methods: Vec<FactoryMethod>,
    parent: Option<String>,
    interfaces: Vec<String>,
}

impl BeanBuilder {
    fn new(decl: &TypeDecl, package: &str, file_path: &Path) -> Self {
        let mut interfaces: Vec<String> = Vec::with_capacity(decl.interfaces.len());
        for iface in &decl.interfaces {
            if !interfaces.contains(iface) {
                interfaces.push(iface.clone());
            }
        }

        Self {
            simple_name: decl.name.clone(),
            package: package.to_string(),
            file_path: file_path.to_path_buf(),
            line: decl.line.max(1),
            role: None,
            scope: DEFAULT_SCOPE.to_string(),
            annotations: Vec::new(),
            routes: Vec::new(),
            dependencies: Vec::new(),
            factory_methods: Vec::new(),
            parent: decl.supertypes.first().cloned(),
            interfaces,
        }
    }

    fn collect_dependencies(&mut self, decl: &TypeDecl) {
        for field in &decl.fields {
            if field.annotations.iter().any(|a| a.is(INJECT_FIELD)) {
                for _ in &field.variables {
                    self.dependencies.push(field.type_name.clone());
                }
            }
        }

        // A lone constructor is the injection target even without @Autowired.
        let implicit = decl.constructors.len() == 1;
        for ctor in &decl.constructors {
            if implicit || ctor.annotations.iter().any(|a| a.is(INJECT_CONSTRUCTOR)) {
                self.dependencies
                    .extend(ctor.param_types.iter().cloned());
            }
        }
    }

    /// Scheduled is checked first; event listeners only apply if the role is
    /// still a plain component afterwards.
    fn apply_method_upgrades(&mut self, decl: &TypeDecl) {
        if decl.has_method_annotated(SCHEDULED) && self.role.is_some_and(Role::is_upgradable) {
            self.role = Some(Role::Scheduled);
        }
        if decl.has_method_annotated(EVENT_LISTENER) && self.role.is_some_and(Role::is_upgradable)
        {
            self.role = Some(Role::EventListener);
        }
    }

    fn finish(self) -> Bean {
        let role = self.role.unwrap_or(Role::Unknown);
        let qualified_name = if self.package.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.package, self.simple_name)
        };
        let routes = if role.is_controller() {
            self.routes
        } else {
            Vec::new()
        };

        Bean {
            qualified_name,
            simple_name: self.simple_name,
            package: self.package,
            file_path: self.file_path,
            line: self.line,
            role,
            scope: self.scope,
            annotations: self.annotations,
            routes,
            dependencies: self.dependencies,
            factory_methods: self.factory_methods,
            parent: self.parent,
            interfaces: self.interfaces,
        }
    }
}

fn factory_method(method: &MethodDecl) -> Option<FactoryMethod> {
    if !method.annotations.iter().any(|a| a.is(FACTORY_METHOD)) {
        return None;
    }

    let mut out = FactoryMethod {
        name: method.name.clone(),
        return_type: method.return_type.clone(),
        line: method.line.max(1),
        scope: DEFAULT_SCOPE.to_string(),
        annotations: Vec::new(),
        conditionals: Vec::new(),
    };

    for annotation in &method.annotations {
        out.annotations.push(annotation.name.clone());
        if annotation.simple_name() == SCOPE
            && let AnnotationArgs::Single(value) = &annotation.args
            && let Some(scope) = scope_value(value)
        {
            out.scope = scope;
        }
        if annotation.simple_name().starts_with(CONDITIONAL_PREFIX) {
            out.conditionals.push(annotation.text.clone());
        }
    }
    Some(out)
}

/// `@Scope("x")`, `@Scope(value = "x")` or `@Scope(scopeName = "x")`.
fn class_scope(annotation: &Annotation) -> Option<String> {
    match &annotation.args {
        AnnotationArgs::Single(value) => scope_value(value),
        AnnotationArgs::Named(_) => annotation
            .named_arg("value")
            .or_else(|| annotation.named_arg("scopeName"))
            .and_then(scope_value),
        AnnotationArgs::Marker => None,
    }
}

fn scope_value(value: &AnnotationValue) -> Option<String> {
    let raw = value.as_expr()?.replace('"', "");
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // ConfigurableBeanFactory.SCOPE_PROTOTYPE, WebApplicationContext.SCOPE_REQUEST
    let constant = raw.rsplit('.').next().unwrap_or(raw);
    let scope = constant.strip_prefix("SCOPE_").unwrap_or(raw);
    Some(scope.to_lowercase())
}

fn route_fragments(annotation: &Annotation) -> Vec<String> {
    let value = match &annotation.args {
        AnnotationArgs::Marker => return vec!["/".to_string()],
        AnnotationArgs::Single(value) => Some(value),
        AnnotationArgs::Named(_) => annotation
            .named_arg("value")
            .or_else(|| annotation.named_arg("path")),
    };

    value
        .map(|v| v.items().into_iter().map(clean_route).collect())
        .unwrap_or_default()
}

fn clean_route(raw: &str) -> String {
    raw.replace(['"', '{', '}'], "")
}
