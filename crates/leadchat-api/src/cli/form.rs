//! Form editor CLI commands: create, list, show, update, publish, delete.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use leadchat_types::form::{CreateFormRequest, FormDefinition, LeadMagnetInput, UpdateFormRequest};

use super::{FormFields, spinner};
use crate::state::AppState;

/// Create a new form from flags, prompting for whatever is required and missing.
///
/// # Examples
///
/// ```bash
/// # Interactive
/// leadchat form create
///
/// # One-shot
/// leadchat form create --title "Free Ebook" --magnet-title Ebook \
///     --magnet-url https://example.com/ebook.pdf --magnet-kind file --publish
/// ```
pub async fn create_form(
    state: &AppState,
    title: Option<String>,
    fields: FormFields,
    publish: bool,
    json: bool,
) -> Result<()> {
    let title = match title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("Form title")
            .interact_text()?,
    };
    let magnet_title = match fields.magnet_title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("Lead magnet title")
            .default(title.clone())
            .interact_text()?,
    };
    let magnet_url = match fields.magnet_url {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Lead magnet URL")
            .interact_text()?,
    };

    let request = CreateFormRequest {
        title,
        welcome_message: fields.welcome,
        name_label: fields.name_label,
        email_label: fields.email_label,
        custom_question: fields.question,
        thank_you_message: fields.thank_you,
        lead_magnet: LeadMagnetInput {
            title: magnet_title,
            description: fields.magnet_description,
            kind: fields.magnet_kind,
            url: magnet_url,
            cover_image: fields.cover_image,
        },
        published: publish,
    };

    let progress = spinner("cyan", "Creating form...")?;
    let result = state.form_service.create_form(request).await;
    progress.finish_and_clear();
    let form = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&form)?);
        return Ok(());
    }

    println!();
    println!("  {} Form created!", style("✓").green().bold());
    println!();
    println!("  {}   {}", style("Title:").bold(), style(&form.title).cyan());
    println!("  {}    {}", style("Slug:").bold(), &form.slug);
    println!("  {}  {}", style("Status:").bold(), format_published(form.published));
    println!();
    if form.published {
        println!(
            "  Try it: {}",
            style(format!("leadchat chat {}", form.slug)).yellow()
        );
    } else {
        println!(
            "  Preview it: {}   Publish it: {}",
            style(format!("leadchat preview {}", form.slug)).yellow(),
            style(format!("leadchat form publish {}", form.slug)).yellow()
        );
    }
    println!();

    Ok(())
}

/// List all forms in a table.
pub async fn list_forms(state: &AppState, json: bool) -> Result<()> {
    let forms = state.form_service.list_forms().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forms)?);
        return Ok(());
    }

    if forms.is_empty() {
        println!();
        println!(
            "  {} No forms yet. Create one with: {}",
            style("i").blue().bold(),
            style("leadchat form create").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Slug").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Views").fg(Color::White),
        Cell::new("Leads").fg(Color::White),
        Cell::new("Rate").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for form in &forms {
        let status_cell = if form.published {
            Cell::new("● published").fg(Color::Green)
        } else {
            Cell::new("○ draft").fg(Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(truncate(&form.title, 40)).fg(Color::Cyan),
            Cell::new(&form.slug),
            status_cell,
            Cell::new(form.view_count),
            Cell::new(form.conversion_count),
            Cell::new(format!("{}%", form.conversion_rate())),
            Cell::new(form.created_at.format("%Y-%m-%d")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} form{}",
        style(forms.len()).bold(),
        if forms.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show a form's full definition.
pub async fn show_form(state: &AppState, id_or_slug: &str, json: bool) -> Result<()> {
    let form = state.form_service.resolve_form(id_or_slug).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&form)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&form.title).cyan().bold());
    println!("  {}", style(form.id.to_string()).dim());
    println!();

    println!("  {}", style("── Details ──").dim());
    println!("  {}     {}", style("Slug:").bold(), &form.slug);
    println!("  {}   {}", style("Status:").bold(), format_published(form.published));
    println!(
        "  {}  {}",
        style("Created:").bold(),
        form.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();

    println!("  {}", style("── Conversation ──").dim());
    println!("  {}  {}", style("Welcome:").bold(), &form.welcome_message);
    println!("  {}     {}", style("Name:").bold(), &form.name_label);
    println!("  {}    {}", style("Email:").bold(), &form.email_label);
    match &form.custom_question {
        Some(question) => println!("  {} {}", style("Question:").bold(), question),
        None => println!("  {} {}", style("Question:").bold(), style("(none)").dim()),
    }
    println!("  {} {}", style("Thank you:").bold(), &form.thank_you_message);
    println!();

    let magnet = &form.lead_magnet;
    println!("  {}", style("── Lead Magnet ──").dim());
    println!("  {}  {}", style("Title:").bold(), &magnet.title);
    if !magnet.description.is_empty() {
        println!("  {}   {}", style("About:").bold(), &magnet.description);
    }
    println!("  {}   {}", style("Kind:").bold(), magnet.kind);
    println!("  {}    {}", style("URL:").bold(), style(&magnet.url).underlined());
    if let Some(cover) = &magnet.cover_image {
        println!("  {}  {}", style("Cover:").bold(), cover);
    }
    println!();

    println!("  {}", style("── Stats ──").dim());
    println!("  {}        {}", style("Views:").bold(), form.view_count);
    println!("  {}  {}", style("Conversions:").bold(), form.conversion_count);
    println!(
        "  {}         {}",
        style("Rate:").bold(),
        style(format!("{}%", form.conversion_rate())).green()
    );
    println!();

    Ok(())
}

/// Apply the given flags to an existing form.
pub async fn update_form(
    state: &AppState,
    id_or_slug: &str,
    title: Option<String>,
    fields: FormFields,
    no_question: bool,
    json: bool,
) -> Result<()> {
    let form = state.form_service.resolve_form(id_or_slug).await?;

    let lead_magnet = fields
        .touches_magnet()
        .then(|| merged_magnet(&form, &fields));
    let custom_question = if no_question {
        Some(String::new())
    } else {
        fields.question
    };

    let request = UpdateFormRequest {
        title,
        welcome_message: fields.welcome,
        name_label: fields.name_label,
        email_label: fields.email_label,
        custom_question,
        thank_you_message: fields.thank_you,
        lead_magnet,
        published: None,
    };

    let updated = state.form_service.update_form(&form.id, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!(
            "  {} Form '{}' updated.",
            style("✓").green().bold(),
            style(&updated.title).cyan()
        );
        if updated.slug != form.slug {
            println!(
                "  Slug changed: {} → {}",
                style(&form.slug).dim(),
                style(&updated.slug).bold()
            );
        }
    }

    Ok(())
}

/// Publish or unpublish a form.
pub async fn set_published(
    state: &AppState,
    id_or_slug: &str,
    published: bool,
    json: bool,
) -> Result<()> {
    let form = state.form_service.resolve_form(id_or_slug).await?;
    let updated = state.form_service.set_published(&form.id, published).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else if published {
        println!(
            "  {} '{}' is live. Visitors can open it with {}",
            style("✓").green().bold(),
            updated.title,
            style(format!("leadchat chat {}", updated.slug)).yellow()
        );
    } else {
        println!(
            "  {} '{}' is now a draft.",
            style("○").yellow().bold(),
            updated.title
        );
    }

    Ok(())
}

/// Delete a form and its leads with confirmation.
pub async fn delete_form(state: &AppState, id_or_slug: &str, force: bool, json: bool) -> Result<()> {
    let form = state.form_service.resolve_form(id_or_slug).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete form '{}' and its {} lead(s)?",
                style(&form.title).red().bold(),
                form.conversion_count
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let progress = spinner("red", format!("Deleting {}...", form.title))?;
    let result = state.form_service.delete_form(&form.id).await;
    progress.finish_and_clear();
    let deleted = result?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": deleted, "slug": form.slug})
        );
    } else {
        println!("  {} Form '{}' deleted.", style("✓").red().bold(), form.title);
    }

    Ok(())
}

/// The stored magnet with the given flags laid over it.
fn merged_magnet(form: &FormDefinition, fields: &FormFields) -> LeadMagnetInput {
    let current = &form.lead_magnet;
    LeadMagnetInput {
        title: fields
            .magnet_title
            .clone()
            .unwrap_or_else(|| current.title.clone()),
        description: Some(
            fields
                .magnet_description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
        ),
        kind: Some(fields.magnet_kind.unwrap_or(current.kind)),
        url: fields.magnet_url.clone().unwrap_or_else(|| current.url.clone()),
        cover_image: fields
            .cover_image
            .clone()
            .or_else(|| current.cover_image.clone()),
    }
}

fn format_published(published: bool) -> String {
    if published {
        format!("{}", style("● published").green())
    } else {
        format!("{}", style("○ draft").yellow())
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
