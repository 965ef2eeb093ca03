//! Dashboard and demo-data commands.

use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use console::style;

use leadchat_infra::seed::seed_demo_data;
use leadchat_types::form::conversion_rate;

use super::spinner;
use crate::state::AppState;

/// Display the dashboard: totals and per-form conversion rates.
pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.form_service.dashboard_stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} leadchat v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Totals ──").dim());
    println!("  Forms:       {}", style(stats.total_forms).bold());
    println!("  Published:   {}", style(stats.published_forms).green());
    println!("  Views:       {}", stats.total_views);
    println!("  Conversions: {}", stats.total_conversions);
    println!(
        "  Rate:        {}",
        style(format!(
            "{}%",
            conversion_rate(stats.total_views, stats.total_conversions)
        ))
        .green()
        .bold()
    );
    println!();

    if !stats.forms.is_empty() {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Form").fg(Color::White),
            Cell::new("Views").fg(Color::White),
            Cell::new("Leads").fg(Color::White),
            Cell::new("Rate").fg(Color::White),
        ]);

        for form in &stats.forms {
            let title = if form.published {
                Cell::new(&form.title).fg(Color::Cyan)
            } else {
                Cell::new(format!("{} (draft)", form.title)).fg(Color::DarkGrey)
            };
            table.add_row(vec![
                title,
                Cell::new(form.view_count).set_alignment(CellAlignment::Right),
                Cell::new(form.conversion_count).set_alignment(CellAlignment::Right),
                Cell::new(format!("{}%", form.conversion_rate))
                    .set_alignment(CellAlignment::Right)
                    .fg(Color::Green),
            ]);
        }

        println!("{table}");
        println!();
    }

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!(
        "  Storage:  {}",
        style(state.config.storage.backend).dim()
    );
    println!();

    Ok(())
}

/// Load the demo forms and leads. Forms whose slug already exists are skipped.
pub async fn seed(state: &AppState, json: bool) -> Result<()> {
    let progress = spinner("cyan", "Loading demo data...")?;
    let result = seed_demo_data(
        state.form_service.form_repo(),
        state.form_service.lead_repo(),
    )
    .await;
    progress.finish_and_clear();
    let summary = result?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "forms_created": summary.forms_created,
                "forms_skipped": summary.forms_skipped,
                "leads_created": summary.leads_created,
            })
        );
        return Ok(());
    }

    println!(
        "  {} Seeded {} form(s) and {} lead(s){}",
        style("✓").green().bold(),
        style(summary.forms_created).bold(),
        style(summary.leads_created).bold(),
        if summary.forms_skipped > 0 {
            format!(", {} already present", summary.forms_skipped)
        } else {
            String::new()
        }
    );
    if state.config.storage.backend == leadchat_types::config::StorageBackendKind::Memory {
        println!(
            "  {}",
            style("The memory backend forgets everything when this process exits.").dim()
        );
    }

    Ok(())
}
