//! Interactive form builder (`fwright build`).
//!
//! Drives a `BuilderSession` from a dialoguer menu loop: add, edit, delete
//! and reorder fields, preview, then save or cancel. A failed save keeps the
//! session open so the user can retry.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use formwright_core::builder::{BuilderSession, SessionOrigin};
use formwright_core::registry::available_types;
use formwright_core::reorder::gesture::MoveDirection;
use formwright_types::field::{Field, FieldId, FieldPatch};
use formwright_types::form::FormStatus;

use crate::cli::form::parse_form_id;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    AddField,
    EditField,
    DeleteField,
    MoveUp,
    MoveDown,
    MoveOnto,
    Details,
    Preview,
    Save,
    Cancel,
}

impl MenuAction {
    const ALL: [MenuAction; 10] = [
        MenuAction::AddField,
        MenuAction::EditField,
        MenuAction::DeleteField,
        MenuAction::MoveUp,
        MenuAction::MoveDown,
        MenuAction::MoveOnto,
        MenuAction::Details,
        MenuAction::Preview,
        MenuAction::Save,
        MenuAction::Cancel,
    ];

    fn label(&self) -> &'static str {
        match self {
            MenuAction::AddField => "Add field",
            MenuAction::EditField => "Edit field",
            MenuAction::DeleteField => "Delete field",
            MenuAction::MoveUp => "Move field up",
            MenuAction::MoveDown => "Move field down",
            MenuAction::MoveOnto => "Drag field onto another",
            MenuAction::Details => "Name, description and status",
            MenuAction::Preview => "Preview",
            MenuAction::Save => "Save",
            MenuAction::Cancel => "Cancel",
        }
    }

    /// Actions that need at least one field to act on.
    fn needs_fields(&self) -> bool {
        matches!(
            self,
            MenuAction::EditField
                | MenuAction::DeleteField
                | MenuAction::MoveUp
                | MenuAction::MoveDown
                | MenuAction::MoveOnto
        )
    }
}

/// Run the builder, either on a blank form or on a copy of `edit`.
pub async fn run_builder(state: &AppState, edit: Option<String>, json: bool) -> Result<()> {
    let mut session = BuilderSession::new();

    match edit {
        Some(id) => {
            let schema = state.form_library.get_form(&parse_form_id(&id)?).await?;
            session.start_edit(&schema)?;
        }
        None => {
            session.start_new()?;
            let name: String = Input::new()
                .with_prompt("Form name")
                .allow_empty(true)
                .interact_text()?;
            session.set_name(name)?;
        }
    }

    println!();
    println!(
        "  {} {}",
        style("*").cyan().bold(),
        match session.origin() {
            SessionOrigin::Existing => "Editing saved form",
            SessionOrigin::New => "New form",
        }
    );

    loop {
        print_fields(&session)?;

        let labels: Vec<&str> = MenuAction::ALL.iter().map(MenuAction::label).collect();
        let choice = Select::new()
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact()?;
        let action = MenuAction::ALL[choice];

        if action.needs_fields() && session.display_fields()?.is_empty() {
            println!("  {}", style("Add a field first.").dim());
            continue;
        }

        match action {
            MenuAction::AddField => {
                let types = available_types();
                let names: Vec<&str> = types.iter().map(|t| t.display_name()).collect();
                let picked = Select::new()
                    .with_prompt("Field type")
                    .items(&names)
                    .default(0)
                    .interact()?;
                session.add_field(types[picked])?;
            }
            MenuAction::EditField => {
                if let Some(id) = pick_field(&session, "Edit which field?")? {
                    let patch = prompt_patch(&session, id)?;
                    session.update_field(id, patch)?;
                }
            }
            MenuAction::DeleteField => {
                if let Some(id) = pick_field(&session, "Delete which field?")? {
                    session.delete_field(id)?;
                }
            }
            MenuAction::MoveUp | MenuAction::MoveDown => {
                let direction = if action == MenuAction::MoveUp {
                    MoveDirection::Up
                } else {
                    MoveDirection::Down
                };
                if let Some(id) = pick_field(&session, "Move which field?")? {
                    session.move_field(id, direction)?;
                }
            }
            MenuAction::MoveOnto => drag_onto(&mut session)?,
            MenuAction::Details => prompt_details(&mut session)?,
            MenuAction::Preview => {
                println!();
                for line in session.preview()?.to_string().lines() {
                    println!("  {line}");
                }
            }
            MenuAction::Save => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.set_message("Saving form...");
                spinner.enable_steady_tick(std::time::Duration::from_millis(80));

                let result = session.save(state.form_library.as_ref()).await;
                spinner.finish_and_clear();

                match result {
                    Ok(entry) => {
                        if json {
                            println!("{}", serde_json::to_string_pretty(&entry)?);
                        } else {
                            println!();
                            println!(
                                "  {} Saved '{}' (version {})",
                                style("✓").green().bold(),
                                style(&entry.schema.name).cyan(),
                                entry.version
                            );
                            println!("  {}", style(entry.id()).dim());
                            println!();
                        }
                        return Ok(());
                    }
                    Err(e) => {
                        println!();
                        println!(
                            "  {} {e}. Your edits are kept; try saving again.",
                            style("!").yellow().bold()
                        );
                    }
                }
            }
            MenuAction::Cancel => {
                if session.is_dirty() {
                    let discard = Confirm::new()
                        .with_prompt("Discard unsaved changes?")
                        .default(false)
                        .interact()?;
                    if !discard {
                        continue;
                    }
                }
                session.cancel();
                println!("  Cancelled.");
                return Ok(());
            }
        }
    }
}

fn print_fields(session: &BuilderSession) -> Result<()> {
    let fields = session.display_fields()?;
    println!();
    if fields.is_empty() {
        println!("  {}", style("(no fields)").dim());
    }
    for (i, field) in fields.iter().enumerate() {
        println!("  {}", field_line(i, field));
    }
    println!();
    Ok(())
}

fn field_line(index: usize, field: &Field) -> String {
    format!(
        "{:>2}. {}{} {}",
        index + 1,
        field.label,
        if field.required { "*" } else { "" },
        style(format!("[{}]", field.field_type.display_name())).dim()
    )
}

fn pick_field(session: &BuilderSession, prompt: &str) -> Result<Option<FieldId>> {
    let fields = session.display_fields()?;
    if fields.is_empty() {
        return Ok(None);
    }
    let items: Vec<String> = fields.iter().enumerate().map(|(i, f)| field_line(i, f)).collect();
    let picked = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(picked.map(|i| fields[i].id))
}

fn prompt_patch(session: &BuilderSession, id: FieldId) -> Result<FieldPatch> {
    let Some(field) = session.schema().and_then(|s| s.fields.iter().find(|f| f.id == id)) else {
        return Ok(FieldPatch::default());
    };

    let label: String = Input::new()
        .with_prompt("Label")
        .default(field.label.clone())
        .interact_text()?;
    let required = Confirm::new()
        .with_prompt("Required?")
        .default(field.required)
        .interact()?;

    let options = if field.field_type.has_options() {
        let current = field.options.clone().unwrap_or_default().join(", ");
        let raw: String = Input::new()
            .with_prompt("Options (comma-separated, in display order)")
            .default(current)
            .interact_text()?;
        Some(split_options(&raw))
    } else {
        None
    };

    Ok(FieldPatch {
        label: Some(label),
        required: Some(required),
        options,
    })
}

fn split_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pointer-style move: pick a source and a drop target, show the preview
/// order, then commit or abandon.
fn drag_onto(session: &mut BuilderSession) -> Result<()> {
    let Some(source) = pick_field(session, "Drag which field?")? else {
        return Ok(());
    };
    session.drag_start(source)?;

    let Some(target) = pick_field(session, "Drop onto which field?")? else {
        session.drag_cancel()?;
        return Ok(());
    };
    let preview = session.drag_over(target)?;

    println!();
    println!("  {}", style("Preview:").bold());
    for (i, field) in preview.iter().enumerate() {
        println!("  {}", field_line(i, field));
    }

    let commit = Confirm::new()
        .with_prompt("Drop here?")
        .default(true)
        .interact()?;
    if commit {
        session.drag_end()?;
    } else {
        session.drag_cancel()?;
    }
    Ok(())
}

fn prompt_details(session: &mut BuilderSession) -> Result<()> {
    let (name, description, status) = match session.schema() {
        Some(s) => (s.name.clone(), s.description.clone(), s.status),
        None => return Ok(()),
    };

    let name: String = Input::new()
        .with_prompt("Name")
        .default(name)
        .allow_empty(true)
        .interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description")
        .default(description)
        .allow_empty(true)
        .interact_text()?;
    let publish = Confirm::new()
        .with_prompt("Published?")
        .default(status == FormStatus::Published)
        .interact()?;

    session.set_name(name)?;
    session.set_description(description)?;
    session.set_status(if publish {
        FormStatus::Published
    } else {
        FormStatus::Draft
    })?;
    Ok(())
}
