//! Administrative CLI for Leadline.

mod api_client;

use anyhow::{Context, Result};
use api_client::{ApiClient, Attachment, Contact, ContactForm, ContactPage};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

const DEFAULT_SERVER: &str = "http://localhost:8000/api";

#[derive(Parser)]
#[command(name = "leadctl")]
#[command(about = "Administrative CLI for Leadline contact leads")]
#[command(version)]
struct Cli {
    /// Server API URL
    #[arg(long, global = true, env = "LEADCTL_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contacts, newest first
    List {
        /// Page number (10 contacts per page)
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one contact
    Show {
        /// Contact ID
        id: i64,
    },
    /// Submit a new contact lead
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        #[command(flatten)]
        optional: OptionalFields,
    },
    /// Edit a contact; only the given fields change
    Edit {
        /// Contact ID
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[command(flatten)]
        optional: OptionalFields,
    },
    /// Delete a contact and its attachment
    Delete {
        /// Contact ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short, default_value_t = false)]
        force: bool,
    },
    /// Check server health and version
    Health,
}

#[derive(Args, Clone, Default)]
struct OptionalFields {
    /// Phone number (an empty value clears it on edit)
    #[arg(long)]
    phone: Option<String>,
    /// Business name (an empty value clears it on edit)
    #[arg(long)]
    business_name: Option<String>,
    /// File to attach
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        server,
        json,
        command,
    } = Cli::parse();
    let client = ApiClient::new(&server)?;
    tracing::debug!(server = %server, "Using Leadline server");

    match command {
        Commands::List { page } => {
            let page = client.list_contacts(page).await?;
            if json {
                print_json(&page.contacts)?;
            } else {
                print_page(&page);
            }
        }
        Commands::Show { id } => {
            let contact = client.get_contact(id).await?;
            if json {
                print_json(&contact)?;
            } else {
                print_contact(&contact);
            }
        }
        Commands::Submit {
            name,
            email,
            message,
            optional,
        } => {
            let form = ContactForm {
                name: Some(name),
                email: Some(email),
                message: Some(message),
                phone: optional.phone,
                business_name: optional.business_name,
                file: read_attachment(optional.file.as_deref()).await?,
            };
            let contact = client.create_contact(form).await?;
            if json {
                print_json(&contact)?;
            } else {
                println!("Contact submitted successfully!");
                println!("\nContact ID: {}", contact.id);
                if let Some(url) = &contact.file_url {
                    println!("Attachment: {url}");
                }
            }
        }
        Commands::Edit {
            id,
            name,
            email,
            message,
            optional,
        } => {
            let form = ContactForm {
                name,
                email,
                message,
                phone: optional.phone,
                business_name: optional.business_name,
                file: read_attachment(optional.file.as_deref()).await?,
            };
            if form.is_empty() {
                println!("No changes specified.");
                return Ok(());
            }
            let contact = client.update_contact(id, form).await?;
            if json {
                print_json(&contact)?;
            } else {
                println!("Contact updated successfully!\n");
                print_contact(&contact);
            }
        }
        Commands::Delete { id, force } => {
            // Confirm before making any changes
            if !force {
                let contact = client.get_contact(id).await?;
                print!(
                    "\nThis will delete contact {} ({} <{}>) and its attachment.\n\nAre you sure? [y/N]: ",
                    contact.id, contact.name, contact.email
                );
                std::io::stdout().flush()?;

                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }

            let message = client.delete_contact(id).await?;
            println!("✓ {message}");
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("Status: {}", health.status);
            println!("Server version: {}", health.version);
            println!("Client version: {}", env!("CARGO_PKG_VERSION"));

            if health.version != env!("CARGO_PKG_VERSION") {
                eprintln!(
                    "Warning: version mismatch (server: {}, client: {})",
                    health.version,
                    env!("CARGO_PKG_VERSION")
                );
            }
        }
    }
    Ok(())
}

async fn read_attachment(path: Option<&Path>) -> Result<Option<Attachment>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read attachment: {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(Some(Attachment { filename, data }))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_page(page: &ContactPage) {
    if page.contacts.is_empty() {
        println!("No contacts found.");
        return;
    }

    println!(
        "{:<8} {:<24} {:<32} {:<24} {:<6} Received",
        "ID", "Name", "Email", "Business", "File"
    );
    println!("{}", "-".repeat(120));
    for contact in &page.contacts {
        println!(
            "{:<8} {:<24} {:<32} {:<24} {:<6} {}",
            contact.id,
            truncate(&contact.name, 24),
            truncate(&contact.email, 32),
            truncate(contact.business_name.as_deref().unwrap_or("-"), 24),
            if contact.file_path.is_some() { "yes" } else { "-" },
            contact.created_at
        );
    }
    println!(
        "\nPage {} of {} ({} contacts)",
        page.meta.current_page, page.meta.last_page, page.meta.total
    );
}

fn print_contact(contact: &Contact) {
    println!("Contact ID: {}", contact.id);
    println!("Name: {}", contact.name);
    println!("Email: {}", contact.email);
    println!("Phone: {}", contact.phone.as_deref().unwrap_or("-"));
    println!(
        "Business: {}",
        contact.business_name.as_deref().unwrap_or("-")
    );
    if let Some(url) = &contact.file_url {
        println!("Attachment: {url}");
    }
    println!("Created: {}", contact.created_at);
    println!("Updated: {}", contact.updated_at);
    println!("\n{}", contact.message);
}

/// Shorten to `width` characters, marking the cut with an ellipsis.
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cli_parses_edit_with_file() {
        let cli = Cli::try_parse_from([
            "leadctl",
            "--server",
            "http://example.com/api",
            "edit",
            "7",
            "--phone",
            "",
            "--file",
            "brief.pdf",
        ])
        .unwrap();

        assert_eq!(cli.server, "http://example.com/api");
        match cli.command {
            Commands::Edit { id, name, optional, .. } => {
                assert_eq!(id, 7);
                assert!(name.is_none());
                assert_eq!(optional.phone.as_deref(), Some(""));
                assert_eq!(optional.file, Some(PathBuf::from("brief.pdf")));
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn submit_requires_core_fields() {
        assert!(
            Cli::try_parse_from(["leadctl", "submit", "--name", "Ada", "--email", "a@x.com"])
                .is_err()
        );
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[tokio::test]
    async fn read_attachment_uses_file_name() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("notes.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let attachment = read_attachment(Some(&path)).await.unwrap().unwrap();
        assert_eq!(attachment.filename, "notes.txt");
        assert_eq!(attachment.data, b"hello");

        assert!(read_attachment(None).await.unwrap().is_none());
        assert!(
            read_attachment(Some(&temp.path().join("missing.txt")))
                .await
                .is_err()
        );
    }
}
