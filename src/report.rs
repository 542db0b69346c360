//! Renders a [`ProjectModel`] as HTML, JSON or plain text.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::model::{Bean, Diagnostic, ProjectModel, Role};

const TITLE: &str = "BOOT//INVENTORY";

/// Roles that get a stat box at the top of the HTML report.
const STAT_ROLES: [Role; 5] = [
    Role::Controller,
    Role::RestController,
    Role::Service,
    Role::Repository,
    Role::Configuration,
];

const CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: #111; color: #3fc99a; font-family: 'Share Tech Mono', monospace; font-size: 14px; line-height: 1.6; }
.container { max-width: 1400px; margin: 0 auto; padding: 20px; }
header { border-bottom: 1px solid #3fc99a33; padding-bottom: 20px; margin-bottom: 30px; }
h1 { font-size: 24px; font-weight: normal; letter-spacing: 2px; }
h1 span.sub { color: #666; font-size: 14px; display: block; margin-top: 5px; }
.meta { color: #666; font-size: 12px; margin-top: 10px; }
.stats { display: flex; gap: 20px; flex-wrap: wrap; margin-bottom: 30px; }
.stat-box { background: #1a1a1a; border: 1px solid #333; padding: 15px 20px; min-width: 120px; }
.stat-box .value { font-size: 28px; }
.stat-box .label { color: #666; font-size: 11px; text-transform: uppercase; letter-spacing: 1px; }
.section { margin-bottom: 40px; }
.section-header { display: flex; align-items: center; gap: 10px; margin-bottom: 15px; padding-bottom: 10px; border-bottom: 1px solid #333; }
.section-header h2 { font-size: 16px; font-weight: normal; }
.section-header .count { color: #666; font-size: 12px; }
table { width: 100%; border-collapse: collapse; font-size: 13px; }
th { text-align: left; color: #666; font-weight: normal; padding: 8px 12px; border-bottom: 1px solid #333; font-size: 11px; text-transform: uppercase; }
td { padding: 10px 12px; border-bottom: 1px solid #222; vertical-align: top; }
tr:hover td { background: #1a1a1a; }
.package { color: #666; font-size: 11px; }
.scope { display: inline-block; padding: 2px 8px; font-size: 10px; border-radius: 2px; text-transform: uppercase; background: #1a1a2a; color: #4a90d9; }
.scope-singleton { background: #1a2a20; color: #3fc99a; }
.scope-prototype { background: #2a2a1a; color: #f39c12; }
.scope-session { background: #2a1a2a; color: #9b59b6; }
.mapping { color: #4a90d9; font-size: 12px; }
.deps { color: #666; font-size: 11px; }
.bean-method { margin: 5px 0; padding: 5px 10px; background: #1a1a1a; border-left: 2px solid #3fc99a33; }
.bean-method .name { color: #43D079; }
.bean-method .return-type, .bean-method .conditional { color: #666; font-size: 11px; }
.main-app { background: #0f1f1a; border: 1px solid #3fc99a33; padding: 20px; margin-bottom: 30px; }
.main-app h3 { font-size: 18px; font-weight: normal; margin-bottom: 10px; }
.diagnostics { color: #e74c3c; font-size: 12px; margin-bottom: 30px; }
a.file { color: #4a90d9; }
footer { margin-top: 50px; padding-top: 20px; border-top: 1px solid #333; color: #444; font-size: 11px; text-align: center; }
"#;

pub fn generated_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
}

fn section_title(role: Role) -> &'static str {
    match role {
        Role::Configuration => "Configuration Classes",
        Role::RestController => "REST Controllers",
        Role::Controller => "Controllers",
        Role::Service => "Services",
        Role::Repository => "Repositories",
        Role::Component => "Components",
        Role::Entity => "Entities",
        Role::Scheduled => "Scheduled Tasks",
        Role::EventListener => "Event Listeners",
        Role::Aspect => "Aspects",
        Role::Application => "Applications",
        Role::BeanMethod => "Bean Methods",
        Role::Unknown => "Unclassified",
    }
}

pub fn render_html(model: &ProjectModel, generated_at: &str) -> String {
    let mut html = String::with_capacity(16 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(
        html,
        "<title>{} - Spring Boot Analysis</title>",
        escape(model.name())
    );
    let _ = writeln!(html, "<style>{CSS}</style>\n</head>\n<body>\n<div class=\"container\">");

    html.push_str("<header>\n");
    let _ = writeln!(
        html,
        "<h1>{TITLE}<span class=\"sub\">Spring Boot Codebase Analysis</span></h1>"
    );
    let _ = writeln!(
        html,
        "<div class=\"meta\">Project: {} | Path: {} | Generated: {}</div>",
        escape(model.name()),
        escape(&model.root().to_string_lossy()),
        escape(generated_at)
    );
    html.push_str("</header>\n");

    html.push_str("<div class=\"stats\">\n");
    html.push_str(&stat_box(model.total(), "Total Beans"));
    for role in STAT_ROLES {
        let count = model.count_of(role);
        if count > 0 {
            html.push_str(&stat_box(count, &format!("{}s", role.label())));
        }
    }
    html.push_str("</div>\n");

    if let Some(main) = model.entry_point() {
        html.push_str("<div class=\"main-app\">\n");
        let _ = writeln!(
            html,
            "<h3>{} {}</h3>",
            main.role.glyph(),
            escape(&main.simple_name)
        );
        let _ = writeln!(html, "<div class=\"package\">{}</div>", escape(&main.package));
        let _ = writeln!(html, "<div class=\"deps\">File: {}</div>", file_link(main, model.root()));
        html.push_str("</div>\n");
    }

    if !model.diagnostics().is_empty() {
        html.push_str("<div class=\"diagnostics\">\n");
        let _ = writeln!(html, "<div>Skipped files ({}):</div>", model.diagnostics().len());
        for d in model.diagnostics() {
            let _ = writeln!(html, "<div>{}</div>", escape(&d.message));
        }
        html.push_str("</div>\n");
    }

    for role in Role::PRESENTATION {
        render_section(&mut html, model, role);
    }

    let _ = writeln!(
        html,
        "<footer>Generated by {TITLE} v{}</footer>",
        env!("CARGO_PKG_VERSION")
    );
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn stat_box(value: usize, label: &str) -> String {
    format!(
        "<div class=\"stat-box\"><div class=\"value\">{value}</div><div class=\"label\">{}</div></div>\n",
        escape(label)
    )
}

fn render_section(html: &mut String, model: &ProjectModel, role: Role) {
    let beans = model.entities_of(role);
    if beans.is_empty() {
        return;
    }

    html.push_str("<div class=\"section\">\n<div class=\"section-header\">\n");
    let _ = writeln!(
        html,
        "<span class=\"icon\" style=\"color:{};\">{}</span>",
        role.color(),
        role.glyph()
    );
    let _ = writeln!(html, "<h2>{}</h2>", section_title(role));
    let _ = writeln!(html, "<span class=\"count\">({})</span>", beans.len());
    html.push_str("</div>\n");

    html.push_str("<table>\n<thead><tr><th>Class</th><th>Scope</th>");
    if role.is_controller() {
        html.push_str("<th>Mappings</th>");
    }
    html.push_str("<th>Dependencies</th>");
    if role == Role::Configuration {
        html.push_str("<th>@Bean Methods</th>");
    }
    html.push_str("<th>File</th></tr></thead>\n<tbody>\n");

    for bean in beans {
        html.push_str("<tr>");
        let _ = write!(
            html,
            "<td><div class=\"class-name\">{}</div><div class=\"package\">{}</div></td>",
            escape(&bean.simple_name),
            escape(&bean.package)
        );
        let _ = write!(html, "<td>{}</td>", scope_badge(&bean.scope));

        if role.is_controller() {
            let routes: Vec<String> = bean.routes.iter().map(|r| escape(r)).collect();
            let _ = write!(html, "<td class=\"mapping\">{}</td>", routes.join("<br>"));
        }

        let deps: Vec<String> = bean.dependencies.iter().map(|d| escape(d)).collect();
        let _ = write!(html, "<td class=\"deps\">{}</td>", deps.join(", "));

        if role == Role::Configuration {
            html.push_str("<td>");
            for method in &bean.factory_methods {
                html.push_str("<div class=\"bean-method\">");
                let _ = write!(
                    html,
                    "<span class=\"name\">{}()</span> <span class=\"return-type\">→ {}</span>",
                    escape(&method.name),
                    escape(&method.return_type)
                );
                if method.scope != crate::model::DEFAULT_SCOPE {
                    let _ = write!(html, " {}", scope_badge(&method.scope));
                }
                for cond in &method.conditionals {
                    let _ = write!(html, "<div class=\"conditional\">{}</div>", escape(cond));
                }
                html.push_str("</div>");
            }
            html.push_str("</td>");
        }

        let _ = write!(html, "<td>{}</td>", file_link(bean, model.root()));
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody></table>\n</div>\n");
}

fn scope_badge(scope: &str) -> String {
    let class: String = scope
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!(
        "<span class=\"scope scope-{class}\">{}</span>",
        escape(scope)
    )
}

fn file_link(bean: &Bean, root: &Path) -> String {
    format!(
        "<a class=\"file\" href=\"file://{}#L{}\" title=\"Line {}\">{}</a>",
        escape(&bean.file_path.to_string_lossy()),
        bean.line,
        bean.line,
        escape(&bean.relative_path(root))
    )
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn error_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Error - {TITLE}</title>
<style>
body {{ background: #111; color: #e74c3c; font-family: 'Share Tech Mono', monospace; padding: 50px; }}
.error {{ border: 1px solid #e74c3c; padding: 20px; max-width: 600px; }}
a {{ color: #3fc99a; }}
</style>
</head>
<body>
<div class="error">
<h2>✗ Error</h2>
<p>{}</p>
<p><a href="/">← Back</a></p>
</div>
</body>
</html>
"#,
        escape(message)
    )
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    project: &'a str,
    root: PathBuf,
    total: usize,
    counts: BTreeMap<&'static str, usize>,
    entry_point: Option<&'a str>,
    beans: &'a [Bean],
    diagnostics: &'a [Diagnostic],
}

pub fn render_json(model: &ProjectModel) -> Result<String> {
    let report = JsonReport {
        project: model.name(),
        root: model.root().to_path_buf(),
        total: model.total(),
        counts: model.count_by_label(),
        entry_point: model.entry_point().map(|b| b.qualified_name.as_str()),
        beans: model.beans(),
        diagnostics: model.diagnostics(),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

pub fn render_text(model: &ProjectModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "project: {}", model.name());
    let _ = writeln!(out, "root: {}", model.root().display());
    out.push_str("beans:\n");
    for bean in model.beans() {
        let _ = writeln!(
            out,
            "  {} {} [{}]",
            bean.role.glyph(),
            bean.qualified_name,
            bean.scope
        );
        for route in &bean.routes {
            let _ = writeln!(out, "      → {route}");
        }
        for method in &bean.factory_methods {
            let _ = writeln!(
                out,
                "      {}() → {} [{}]",
                method.name, method.return_type, method.scope
            );
        }
    }
    out.push_str(&summary(model));
    for d in model.diagnostics() {
        let _ = writeln!(out, "skipped: {}", d.message);
    }
    out
}

/// Total and per-label counts, one per line.
pub fn summary(model: &ProjectModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total beans found: {}", model.total());
    for (role, count) in model.counts_in_order() {
        let _ = writeln!(out, "  {}: {count}", role.label());
    }
    out
}
