//! Lead management CLI commands: table view and CSV export.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use leadchat_core::service::export::export_file_name;

use super::form::truncate;
use super::spinner;
use crate::state::AppState;

/// List leads, optionally only those of one form.
pub async fn list_leads(state: &AppState, form: Option<String>, json: bool) -> Result<()> {
    let form_filter = match form {
        Some(id_or_slug) => Some(state.form_service.resolve_form(&id_or_slug).await?),
        None => None,
    };
    let leads = state
        .form_service
        .list_leads(form_filter.as_ref().map(|f| &f.id))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&leads)?);
        return Ok(());
    }

    if leads.is_empty() {
        println!();
        println!(
            "  {} No leads captured yet. Share a form with: {}",
            style("i").blue().bold(),
            style("leadchat form publish <slug>").yellow()
        );
        println!();
        return Ok(());
    }

    let slugs: HashMap<_, _> = state
        .form_service
        .list_forms()
        .await?
        .into_iter()
        .map(|f| (f.id, f.slug))
        .collect();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Answer").fg(Color::White),
        Cell::new("Form").fg(Color::White),
        Cell::new("Captured").fg(Color::White),
    ]);

    for lead in &leads {
        let form_slug = slugs
            .get(&lead.form_id)
            .cloned()
            .unwrap_or_else(|| lead.form_id.to_string());

        table.add_row(vec![
            Cell::new(&lead.name).fg(Color::Cyan),
            Cell::new(&lead.email),
            Cell::new(truncate(lead.custom_answer.as_deref().unwrap_or("-"), 40)),
            Cell::new(form_slug).fg(Color::DarkGrey),
            Cell::new(lead.created_at.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    if let Some(form) = &form_filter {
        println!("  {} {}", style("Leads for").dim(), style(&form.title).cyan().bold());
        println!();
    }
    println!("{table}");
    println!();
    println!(
        "  {} lead{}",
        style(leads.len()).bold(),
        if leads.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Export a form's leads as CSV to a file (or stdout).
pub async fn export_leads(
    state: &AppState,
    id_or_slug: &str,
    output: Option<PathBuf>,
    to_stdout: bool,
    json: bool,
) -> Result<()> {
    let form = state.form_service.resolve_form(id_or_slug).await?;
    let csv = state.form_service.export_leads_csv(&form.id).await?;

    if to_stdout {
        println!("{csv}");
        return Ok(());
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(export_file_name(&form.slug, chrono::Utc::now().date_naive()))
    });

    let progress = spinner("cyan", format!("Writing {}...", path.display()))?;
    let written = tokio::fs::write(&path, &csv).await;
    progress.finish_and_clear();
    written?;

    // The header line is always present.
    let rows = csv.lines().count().saturating_sub(1);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "form": form.slug,
                "path": path.display().to_string(),
                "rows": rows,
            })
        );
    } else {
        println!(
            "  {} Exported {} lead{} to {}",
            style("✓").green().bold(),
            style(rows).bold(),
            if rows == 1 { "" } else { "s" },
            style(path.display()).cyan()
        );
    }

    Ok(())
}
