//! Classified beans and the per-run project model.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const DEFAULT_SCOPE: &str = "singleton";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Application,
    Configuration,
    Controller,
    RestController,
    Service,
    Repository,
    Component,
    Entity,
    Aspect,
    EventListener,
    Scheduled,
    BeanMethod,
    Unknown,
}

impl Role {
    pub const ALL: [Role; 13] = [
        Role::Application,
        Role::Configuration,
        Role::Controller,
        Role::RestController,
        Role::Service,
        Role::Repository,
        Role::Component,
        Role::Entity,
        Role::Aspect,
        Role::EventListener,
        Role::Scheduled,
        Role::BeanMethod,
        Role::Unknown,
    ];

    /// Section order used by the report.
    pub const PRESENTATION: [Role; 10] = [
        Role::Configuration,
        Role::RestController,
        Role::Controller,
        Role::Service,
        Role::Repository,
        Role::Component,
        Role::Entity,
        Role::Scheduled,
        Role::EventListener,
        Role::Aspect,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::Application => "SpringBootApplication",
            Role::Configuration => "Configuration",
            Role::Controller => "Controller",
            Role::RestController => "RestController",
            Role::Service => "Service",
            Role::Repository => "Repository",
            Role::Component => "Component",
            Role::Entity => "Entity",
            Role::Aspect => "Aspect",
            Role::EventListener => "EventListener",
            Role::Scheduled => "Scheduled",
            Role::BeanMethod => "Bean",
            Role::Unknown => "Unknown",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Role::Application => "#3fc99a",
            Role::Configuration => "#4a90d9",
            Role::Controller | Role::RestController => "#43D079",
            Role::Service => "#1fd1c1",
            Role::Repository => "#9b59b6",
            Role::Component => "#f39c12",
            Role::Entity => "#e74c3c",
            Role::Aspect => "#8e44ad",
            Role::EventListener => "#16a085",
            Role::Scheduled => "#2980b9",
            Role::BeanMethod => "#7f8c8d",
            Role::Unknown => "#666",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Role::Application => "◉",
            Role::Configuration => "⚙",
            Role::Controller => "▶",
            Role::RestController => "◀▶",
            Role::Service => "●",
            Role::Repository => "◆",
            Role::Component => "■",
            Role::Entity => "◇",
            Role::Aspect => "✦",
            Role::EventListener => "⚡",
            Role::Scheduled => "⏱",
            Role::BeanMethod => "○",
            Role::Unknown => "?",
        }
    }

    pub fn is_controller(self) -> bool {
        matches!(self, Role::Controller | Role::RestController)
    }

    /// Roles a method-level `@Scheduled` or `@EventListener` may replace.
    pub fn is_upgradable(self) -> bool {
        matches!(self, Role::Unknown | Role::Component)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryMethod {
    pub name: String,
    pub return_type: String,
    pub line: usize,
    pub scope: String,
    pub annotations: Vec<String>,
    pub conditionals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bean {
    pub qualified_name: String,
    pub simple_name: String,
    pub package: String,
    pub file_path: PathBuf,
    pub line: usize,
    pub role: Role,
    pub scope: String,
    pub annotations: Vec<String>,
    pub routes: Vec<String>,
    pub dependencies: Vec<String>,
    pub factory_methods: Vec<FactoryMethod>,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
}

impl Bean {
    pub fn relative_path(&self, root: &Path) -> String {
        self.file_path
            .strip_prefix(root)
            .unwrap_or(&self.file_path)
            .to_string_lossy()
            .to_string()
    }

    pub fn has_default_scope(&self) -> bool {
        self.scope == DEFAULT_SCOPE
    }
}

/// A source file that could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

/// Everything classified during one run.
///
/// Beans are kept in insertion order and indexed by role. The first
/// `SpringBootApplication` bean inserted is the entry point; later ones never
/// replace it.
#[derive(Debug, Clone)]
pub struct ProjectModel {
    name: String,
    root: PathBuf,
    beans: Vec<Bean>,
    by_role: HashMap<Role, Vec<usize>>,
    by_name: HashMap<String, usize>,
    /// Insertion sequence per slot; a replacement takes a fresh number.
    inserted: Vec<u64>,
    next_seq: u64,
    entry: Option<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl ProjectModel {
    pub fn new(root: PathBuf) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.to_string_lossy().to_string());
        Self {
            name,
            root,
            beans: Vec::new(),
            by_role: HashMap::new(),
            by_name: HashMap::new(),
            inserted: Vec::new(),
            next_seq: 0,
            entry: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Adds a fully classified bean. A bean whose qualified name is already
    /// present replaces the earlier one in place.
    pub fn insert(&mut self, bean: Bean) {
        if let Some(&idx) = self.by_name.get(&bean.qualified_name) {
            tracing::warn!(
                bean = %bean.qualified_name,
                previous = %self.beans[idx].file_path.display(),
                replacement = %bean.file_path.display(),
                "duplicate qualified name, keeping the later declaration"
            );
            let seq = self.take_seq();
            self.beans[idx] = bean;
            self.inserted[idx] = seq;
            self.rebuild_index();
            return;
        }

        let idx = self.beans.len();
        let seq = self.take_seq();
        self.inserted.push(seq);
        self.by_name.insert(bean.qualified_name.clone(), idx);
        self.by_role.entry(bean.role).or_default().push(idx);
        if bean.role == Role::Application && self.entry.is_none() {
            self.entry = Some(idx);
        }
        self.beans.push(bean);
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// The entry point survives a rebuild while it is still an application
    /// bean; otherwise the earliest inserted application bean takes over.
    fn rebuild_index(&mut self) {
        self.by_role.clear();
        for (idx, bean) in self.beans.iter().enumerate() {
            self.by_role.entry(bean.role).or_default().push(idx);
        }

        let still_entry = self
            .entry
            .is_some_and(|idx| self.beans[idx].role == Role::Application);
        if !still_entry {
            self.entry = self
                .by_role
                .get(&Role::Application)
                .and_then(|idxs| idxs.iter().copied().min_by_key(|&i| self.inserted[i]));
        }
    }

    pub fn record_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn beans(&self) -> &[Bean] {
        &self.beans
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn total(&self) -> usize {
        self.beans.len()
    }

    pub fn entry_point(&self) -> Option<&Bean> {
        self.entry.map(|idx| &self.beans[idx])
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Bean> {
        self.by_name.get(qualified_name).map(|&idx| &self.beans[idx])
    }

    pub fn entities_of(&self, role: Role) -> Vec<&Bean> {
        self.by_role
            .get(&role)
            .map(|idxs| idxs.iter().map(|&i| &self.beans[i]).collect())
            .unwrap_or_default()
    }

    pub fn count_of(&self, role: Role) -> usize {
        self.by_role.get(&role).map_or(0, Vec::len)
    }

    /// Label -> count, for roles holding at least one bean.
    pub fn count_by_label(&self) -> BTreeMap<&'static str, usize> {
        self.by_role
            .iter()
            .filter(|(_, idxs)| !idxs.is_empty())
            .map(|(role, idxs)| (role.label(), idxs.len()))
            .collect()
    }

    /// Non-empty roles with their counts, in [`Role::ALL`] order.
    pub fn counts_in_order(&self) -> Vec<(Role, usize)> {
        Role::ALL
            .iter()
            .map(|&role| (role, self.count_of(role)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    pub fn entities_under_package(&self, prefix: &str) -> Vec<&Bean> {
        self.beans
            .iter()
            .filter(|b| b.package.starts_with(prefix))
            .collect()
    }

    pub fn non_default_scope(&self) -> Vec<&Bean> {
        self.beans
            .iter()
            .filter(|b| !b.has_default_scope())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn bean(qualified_name: &str, role: Role) -> Bean {
        let (package, simple_name) = match qualified_name.rsplit_once('.') {
            Some((pkg, name)) => (pkg.to_string(), name.to_string()),
            None => (String::new(), qualified_name.to_string()),
        };
        Bean {
            qualified_name: qualified_name.to_string(),
            file_path: PathBuf::from(format!("/proj/src/main/java/{simple_name}.java")),
            simple_name,
            package,
            line: 1,
            role,
            scope: DEFAULT_SCOPE.to_string(),
            annotations: vec![role.label().to_string()],
            routes: Vec::new(),
            dependencies: Vec::new(),
            factory_methods: Vec::new(),
            parent: None,
            interfaces: Vec::new(),
        }
    }

    #[test]
    fn count_by_label_only_lists_present_roles() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        for i in 0..3 {
            model.insert(bean(&format!("a.svc.S{i}"), Role::Service));
        }
        for i in 0..2 {
            model.insert(bean(&format!("a.repo.R{i}"), Role::Repository));
        }

        let counts = model.count_by_label();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("Service"), Some(&3));
        assert_eq!(counts.get("Repository"), Some(&2));
        assert_eq!(model.total(), 5);
    }

    #[test]
    fn first_application_bean_stays_entry_point() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        model.insert(bean("a.FirstApp", Role::Application));
        model.insert(bean("b.SecondApp", Role::Application));

        assert_eq!(
            model.entry_point().map(|b| b.qualified_name.as_str()),
            Some("a.FirstApp")
        );
        assert_eq!(model.entities_of(Role::Application).len(), 2);
    }

    #[test]
    fn entities_of_missing_role_is_empty() {
        let model = ProjectModel::new(PathBuf::from("/proj"));
        assert!(model.entities_of(Role::Aspect).is_empty());
        assert!(model.count_by_label().is_empty());
        assert!(model.entry_point().is_none());
    }

    #[test]
    fn entities_under_package_keeps_insertion_order() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        model.insert(bean("com.shop.order.OrderService", Role::Service));
        model.insert(bean("com.other.Thing", Role::Component));
        model.insert(bean("com.shop.cart.CartRepository", Role::Repository));

        let names: Vec<&str> = model
            .entities_under_package("com.shop")
            .iter()
            .map(|b| b.simple_name.as_str())
            .collect();
        assert_eq!(names, vec!["OrderService", "CartRepository"]);
        assert_eq!(model.entities_under_package("").len(), 3);
    }

    #[test]
    fn duplicate_name_replaces_in_place_and_reindexes() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        model.insert(bean("a.Dup", Role::Service));
        model.insert(bean("a.Other", Role::Service));
        model.insert(bean("a.Dup", Role::Repository));

        assert_eq!(model.total(), 2);
        assert_eq!(model.beans()[0].role, Role::Repository);
        assert_eq!(model.entities_of(Role::Service).len(), 1);
        assert_eq!(model.entities_of(Role::Repository).len(), 1);
        assert_eq!(model.get("a.Dup").map(|b| b.role), Some(Role::Repository));
    }

    #[test]
    fn replacement_application_does_not_steal_entry_point() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        model.insert(bean("a.X", Role::Service));
        model.insert(bean("b.FirstApp", Role::Application));
        model.insert(bean("a.X", Role::Application));

        assert_eq!(
            model.entry_point().map(|b| b.qualified_name.as_str()),
            Some("b.FirstApp")
        );
        assert_eq!(model.entities_of(Role::Application).len(), 2);
    }

    #[test]
    fn demoted_entry_point_passes_to_earliest_inserted_application() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        model.insert(bean("a.Main", Role::Application));
        model.insert(bean("c.Late", Role::Service));
        model.insert(bean("b.Second", Role::Application));
        model.insert(bean("c.Late", Role::Application));
        model.insert(bean("a.Main", Role::Component));

        assert_eq!(
            model.entry_point().map(|b| b.qualified_name.as_str()),
            Some("b.Second")
        );
    }

    #[test]
    fn non_default_scope_filters_singletons() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        let mut proto = bean("a.Ctx", Role::Component);
        proto.scope = "prototype".to_string();
        model.insert(proto);
        model.insert(bean("a.Svc", Role::Service));

        let scoped = model.non_default_scope();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].simple_name, "Ctx");
    }

    #[test]
    fn counts_in_order_follow_role_order() {
        let mut model = ProjectModel::new(PathBuf::from("/proj"));
        model.insert(bean("a.Repo", Role::Repository));
        model.insert(bean("a.Config", Role::Configuration));

        assert_eq!(
            model.counts_in_order(),
            vec![(Role::Configuration, 1), (Role::Repository, 1)]
        );
    }

    #[test]
    fn project_name_is_root_directory_name() {
        let model = ProjectModel::new(PathBuf::from("/work/shop-api"));
        assert_eq!(model.name(), "shop-api");
    }
}
