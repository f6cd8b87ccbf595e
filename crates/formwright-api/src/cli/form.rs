//! Form library CLI commands: list, show, delete, publish, duplicate,
//! export, import.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use formwright_core::builder::FormPreview;
use formwright_core::repository::SortOrder;
use formwright_core::repository::form::{FormFilter, FormSortField};
use formwright_infra::filesystem::{export_schema, import_schema};
use formwright_types::form::{FormId, FormLibraryEntry, FormStatus};

use crate::state::AppState;

#[derive(Subcommand)]
pub enum FormCommand {
    /// List saved forms.
    #[command(alias = "ls")]
    List {
        /// Filter by status (draft, published).
        #[arg(long)]
        status: Option<String>,

        /// Case-insensitive substring match on the form name.
        #[arg(long)]
        search: Option<String>,

        /// Sort by: name, created_at, updated_at, response_count.
        #[arg(long, default_value = "updated_at")]
        sort: String,

        /// Sort order: asc or desc.
        #[arg(long, default_value = "desc")]
        order: String,

        /// Maximum number of forms to show.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Show a form rendered as a respondent would see it.
    Show {
        /// Form id.
        id: String,
    },

    /// Delete a saved form.
    #[command(alias = "rm")]
    Delete {
        /// Form id.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Mark a form as published.
    Publish {
        /// Form id.
        id: String,
    },

    /// Return a published form to draft.
    Unpublish {
        /// Form id.
        id: String,
    },

    /// Copy a form under a new id.
    Duplicate {
        /// Form id.
        id: String,
    },

    /// Write a form schema to a JSON file.
    Export {
        /// Form id.
        id: String,

        /// Output path (defaults to `<id>.json` in the current directory).
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Save a form schema from a JSON file into the library.
    Import {
        /// Path to a schema JSON file.
        file: PathBuf,
    },
}

/// Dispatch a `fwright form` subcommand.
pub async fn handle_form_command(
    cmd: FormCommand,
    state: &AppState,
    json: bool,
    quiet: bool,
) -> Result<()> {
    match cmd {
        FormCommand::List {
            status,
            search,
            sort,
            order,
            limit,
        } => list_forms(state, status, search, &sort, &order, limit, json).await,
        FormCommand::Show { id } => show_form(state, &id, json).await,
        FormCommand::Delete { id, force } => delete_form(state, &id, force, json, quiet).await,
        FormCommand::Publish { id } => {
            set_status(state, &id, FormStatus::Published, json, quiet).await
        }
        FormCommand::Unpublish { id } => {
            set_status(state, &id, FormStatus::Draft, json, quiet).await
        }
        FormCommand::Duplicate { id } => duplicate_form(state, &id, json, quiet).await,
        FormCommand::Export { id, out } => export_form(state, &id, out, json, quiet).await,
        FormCommand::Import { file } => import_form(state, &file, json, quiet).await,
    }
}

pub(crate) fn parse_form_id(id: &str) -> Result<FormId> {
    id.parse::<FormId>()
        .with_context(|| format!("'{id}' is not a valid form id"))
}

pub(crate) fn parse_sort_order(order: &str) -> SortOrder {
    match order.to_lowercase().as_str() {
        "asc" => SortOrder::Asc,
        _ => SortOrder::Desc,
    }
}

/// List saved forms in a table.
async fn list_forms(
    state: &AppState,
    status: Option<String>,
    search: Option<String>,
    sort: &str,
    order: &str,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let status = match status {
        Some(s) => Some(s.parse::<FormStatus>().map_err(|e| anyhow::anyhow!(e))?),
        None => None,
    };
    let sort_by = sort.parse::<FormSortField>().map_err(|e| anyhow::anyhow!(e))?;

    let filter = FormFilter {
        status,
        search,
        sort_by,
        sort_order: parse_sort_order(order),
        limit,
        offset: None,
    };

    let forms = state.form_library.list_forms(Some(filter)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forms)?);
        return Ok(());
    }

    if forms.is_empty() {
        println!();
        println!(
            "  {} No forms found. Build one with: {}",
            style("i").blue().bold(),
            style("fwright build").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Fields").fg(Color::White),
        Cell::new("Responses").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for entry in &forms {
        let status_cell = match entry.schema.status {
            FormStatus::Published => Cell::new("● published").fg(Color::Green),
            FormStatus::Draft => Cell::new("○ draft").fg(Color::Yellow),
        };

        table.add_row(vec![
            Cell::new(display_name(entry)).fg(Color::Cyan),
            Cell::new(entry.id().to_string()).fg(Color::DarkGrey),
            status_cell,
            Cell::new(entry.schema.fields.len()),
            Cell::new(entry.response_count),
            Cell::new(format_relative_time(&entry.updated_at)).fg(Color::DarkGrey),
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

/// Render a saved form as a preview.
async fn show_form(state: &AppState, id: &str, json: bool) -> Result<()> {
    let entry = state.form_library.get_entry(&parse_form_id(id)?).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!();
    for line in FormPreview::from_schema(&entry.schema).to_string().lines() {
        println!("  {line}");
    }
    println!();
    println!(
        "  {} version {}, {} response{}, updated {}",
        style("·").dim(),
        entry.version,
        entry.response_count,
        if entry.response_count == 1 { "" } else { "s" },
        format_relative_time(&entry.updated_at)
    );
    println!();

    Ok(())
}

async fn delete_form(state: &AppState, id: &str, force: bool, json: bool, quiet: bool) -> Result<()> {
    let form_id = parse_form_id(id)?;
    let entry = state.form_library.get_entry(&form_id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete form '{}'?",
                style(display_name(&entry)).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.form_library.delete_form(&form_id).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": form_id}));
    } else if !quiet {
        println!(
            "  {} Form '{}' deleted.",
            style("✓").red().bold(),
            display_name(&entry)
        );
    }

    Ok(())
}

async fn set_status(
    state: &AppState,
    id: &str,
    status: FormStatus,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let entry = state
        .form_library
        .set_status(&parse_form_id(id)?, status)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else if !quiet {
        println!(
            "  {} '{}' is now {}.",
            style("✓").green().bold(),
            display_name(&entry),
            style(entry.schema.status).cyan()
        );
    }
    Ok(())
}

async fn duplicate_form(state: &AppState, id: &str, json: bool, quiet: bool) -> Result<()> {
    let copy = state
        .form_library
        .duplicate_form(&parse_form_id(id)?)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&copy)?);
    } else if !quiet {
        println!(
            "  {} Created '{}' ({})",
            style("✓").green().bold(),
            style(display_name(&copy)).cyan(),
            style(copy.id()).dim()
        );
    }
    Ok(())
}

async fn export_form(
    state: &AppState,
    id: &str,
    out: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let schema = state.form_library.get_form(&parse_form_id(id)?).await?;
    let path = out.unwrap_or_else(|| PathBuf::from(format!("{}.json", schema.id)));

    export_schema(&path, &schema).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"exported": true, "id": schema.id, "path": path})
        );
    } else if !quiet {
        println!(
            "  {} Exported to {}",
            style("✓").green().bold(),
            style(path.display()).yellow()
        );
    }
    Ok(())
}

async fn import_form(state: &AppState, file: &Path, json: bool, quiet: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Importing {}...", file.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let result = async {
        let schema = import_schema(file).await?;
        Ok::<_, anyhow::Error>(state.form_library.save_form(schema).await?)
    }
    .await;
    spinner.finish_and_clear();
    let entry = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else if !quiet {
        let verb = if entry.version == 1 { "Imported" } else { "Updated" };
        println!(
            "  {} {} '{}' ({} field{})",
            style("✓").green().bold(),
            verb,
            style(display_name(&entry)).cyan(),
            entry.schema.fields.len(),
            if entry.schema.fields.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

pub(crate) fn display_name(entry: &FormLibraryEntry) -> &str {
    if entry.schema.name.trim().is_empty() {
        "Untitled form"
    } else {
        &entry.schema.name
    }
}

fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
