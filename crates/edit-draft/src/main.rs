use anyhow::{Context, Result};
use clap::Parser;
use shared::bindings::Key;
use shared::{
    render, Config, DraftEditor, DraftField, Effect, HttpNewsApi, NewsApi, Role, UiEvent,
};
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const TEXT_WIDTH: usize = 80;

#[derive(Parser)]
#[command(name = "edit-draft")]
#[command(about = "Edit the post draft attached to a RADAR news item")]
struct Args {
    /// News item id (prompted for when omitted)
    #[arg(short, long)]
    id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let news_id = match args.id {
        Some(id) => id,
        None => prompt_news_id()?,
    };

    let api: Arc<dyn NewsApi> = Arc::new(HttpNewsApi::new(config.api_url.clone())?);
    let mut editor = DraftEditor::new(api.clone());
    let confirm = |prompt: &str| ask_yes_no(prompt);
    let mut seen = 0;

    println!("📝 Loading draft for {}...", news_id);
    editor.handle(UiEvent::edit(&news_id), &confirm).await;
    print_notifications(&editor, &mut seen);
    if !editor.is_editing() {
        anyhow::bail!("Could not open the editor for {}", news_id);
    }

    print_preview(&editor);
    print_help();

    loop {
        let Some(line) = read_line("> ")? else {
            break;
        };
        let mut words = line.trim().splitn(2, ' ');
        let command = words.next().unwrap_or_default();
        let rest = words.next().unwrap_or_default().trim();

        let effect = match command {
            "" => continue,
            "help" => {
                print_help();
                continue;
            }
            "set" => {
                let field = match rest.parse::<DraftField>() {
                    Ok(field) => field,
                    Err(e) => {
                        println!("⚠ {}", e);
                        continue;
                    }
                };
                let value = read_block(field)?;
                editor.handle(UiEvent::input(field, value), &confirm).await
            }
            "template" => {
                editor
                    .handle(UiEvent::click(Role::UseTemplateButton), &confirm)
                    .await
            }
            "preview" => {
                print_preview(&editor);
                continue;
            }
            "save" => {
                editor
                    .handle(UiEvent::click(Role::SaveDraftButton), &confirm)
                    .await
            }
            "cancel" => {
                editor
                    .handle(UiEvent::click(Role::CancelEditButton), &confirm)
                    .await
            }
            "esc" => editor.handle(UiEvent::KeyDown(Key::Escape), &confirm).await,
            other => {
                println!("Unknown command: {} (type 'help')", other);
                continue;
            }
        };

        print_notifications(&editor, &mut seen);

        if let Effect::ReloadAfter(delay) = effect {
            tokio::time::sleep(delay).await;
            let draft = api
                .fetch_draft(&news_id)
                .await
                .context("Failed to reload the saved draft")?;
            println!("\n📄 Saved draft:");
            println!("{}", render::to_text(&render::draft_preview(&draft), TEXT_WIDTH));
        }

        if !editor.is_editing() {
            break;
        }
    }

    println!("\n✅ Editor closed.");
    Ok(())
}

fn prompt_news_id() -> Result<String> {
    let id = read_line("News id: ")?.unwrap_or_default();
    let id = id.trim();
    if id.is_empty() {
        anyhow::bail!("A news id is required");
    }
    Ok(id.to_string())
}

/// Reads one line; `None` at end of input.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}

/// Collects lines until a lone `.` or end of input.
fn read_block(field: DraftField) -> Result<String> {
    println!("Enter {} (finish with a single '.'):", field);
    let mut lines = Vec::new();
    while let Some(line) = read_line("")? {
        if line == "." {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn ask_yes_no(prompt: &str) -> bool {
    match read_line(&format!("{} [y/N] ", prompt)) {
        Ok(Some(answer)) => matches!(answer.trim(), "y" | "Y" | "yes"),
        _ => false,
    }
}

fn print_preview(editor: &DraftEditor) {
    if let Some(session) = editor.session() {
        println!("\n{}", render::to_text(&session.modal_html(), TEXT_WIDTH));
    }
}

fn print_notifications(editor: &DraftEditor, seen: &mut u64) {
    let center = editor.notifications();
    for notification in center.newer_than(*seen) {
        println!("[{}] {}", notification.kind.as_str(), notification.message);
    }
    *seen = center.last_id();
}

fn print_help() {
    let fields: Vec<&str> = DraftField::ALL.iter().map(|f| f.as_str()).collect();
    println!("\nCommands:");
    println!("  set <field>   replace a field ({})", fields.join(", "));
    println!("  template      fill the form with the stock template");
    println!("  preview       show the editor and live preview");
    println!("  save          save the draft and close");
    println!("  cancel        discard changes (asks first)");
    println!("  esc           same as cancel");
}
