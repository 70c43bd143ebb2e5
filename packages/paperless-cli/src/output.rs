use anyhow::Result;
use colored::Colorize;
use paperless_sync::{CatalogKind, CatalogReport, Document};

pub fn documents(documents: &[Document], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(documents)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("{} document(s)", documents.len()).cyan().bold()
    );
    for doc in documents {
        let id = doc.id().map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let title = doc.title().unwrap_or("(untitled)");
        println!("  {:>6}  {}", id.dimmed(), title);
    }
    Ok(())
}

pub fn catalog(kind: CatalogKind, report: &CatalogReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("{} {}(s)", report.entries.len(), kind.label())
            .cyan()
            .bold()
    );
    for entry in &report.entries {
        println!("  {:>6}  {}", entry.id.to_string().dimmed(), entry.name);
    }

    if !report.failures.is_empty() {
        eprintln!(
            "{}",
            format!("{} unresolved", report.failures.len()).yellow().bold()
        );
        for failure in &report.failures {
            eprintln!("  {} {}", "⚠".yellow(), failure);
        }
    }
    Ok(())
}
