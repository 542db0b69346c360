use anyhow::{Context, Result};
use boot_inventory::cli::{Cli, Commands, ReportFormat};
use boot_inventory::config::{AnalyzerConfig, resolve_bind, resolve_output_path};
use boot_inventory::error::validate_project_root;
use boot_inventory::logging;
use boot_inventory::model::ProjectModel;
use boot_inventory::report::{generated_stamp, render_html, render_json, render_text, summary};
use boot_inventory::server;
use boot_inventory::walker::analyze_project;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse_with_implicit_analyze();
    logging::init(cli.verbose);
    let config = AnalyzerConfig::with_threads(cli.threads);

    match cli.command {
        Commands::Analyze {
            project_path,
            output,
            format,
        } => {
            let root = validate_project_root(&project_path)?;
            tracing::info!("Analyzing: {}", root.display());

            let model = analyze_project(&root, &config);
            let output = resolve_output_path(output.as_deref(), &root, format);
            write_report(&model, format, output.as_deref())?;

            if let Some(path) = output.as_deref() {
                println!("✓ Report generated: {}", path.display());
                print!("{}", summary(&model));
            }
        }
        Commands::Serve { bind } => {
            let bind = resolve_bind(bind.as_deref());
            let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
            runtime.block_on(server::serve(&bind, config))?;
        }
    }

    Ok(())
}

fn write_report(model: &ProjectModel, format: ReportFormat, output: Option<&Path>) -> Result<()> {
    let content = match format {
        ReportFormat::Html => render_html(model, &generated_stamp()),
        ReportFormat::Json => render_json(model)?,
        ReportFormat::Text => render_text(model),
    };

    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
