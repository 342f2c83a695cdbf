//! drafter: SpecDrafter CLI client
//!
//! Project management, chat, and document generation against a SpecDrafter
//! backend.

use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use specdrafter::config::API_URL_ENV;
use specdrafter::document::{self, DocumentRequest, GENERATION_ERROR_DOCUMENT};
use specdrafter::{
    ChatObserver, Config, Conversation, DrafterClient, DrafterError, FailureStage, Message,
    PhaseStatus, Project, ProjectBackend, ProjectUpdate,
};

/// SpecDrafter CLI client
#[derive(Parser)]
#[command(name = "drafter")]
#[command(version = specdrafter::PKG_VERSION)]
#[command(about = "SpecDrafter requirements assistant client")]
struct Args {
    /// Config file (default: ~/.specdrafter/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List projects
    Projects,

    /// Create a new project
    Create,

    /// Show a project's details and conversation
    Show {
        /// Project id
        id: String,
    },

    /// Rename a project
    Rename {
        /// Project id
        id: String,
        /// New name
        name: String,
    },

    /// Delete a project
    Delete {
        /// Project id
        id: String,
    },

    /// Send a chat message and stream the answer
    Chat {
        /// Project id
        id: String,
        /// User message (or omit to read from stdin)
        message: Option<String>,
    },

    /// Generate a PRD and save it
    Prd {
        /// Project id
        id: String,
        /// Tool the PRD is written for (default from config)
        #[arg(short, long)]
        target: Option<String>,
        /// Output directory (default from config, else current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Review the requirements gathered so far
    Review {
        /// Project id
        id: String,
    },

    /// Rewrite the stored requirements following an instruction
    Edit {
        /// Project id
        id: String,
        /// Instruction (or omit to read from stdin)
        instruction: Option<String>,
    },

    /// Show drafting progress
    Phases {
        /// Project id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_api_url_override(args.api_url);
    let client = DrafterClient::from_config(&config.api)?;

    match args.command {
        Command::Projects => {
            let projects = client.list_projects().await?;
            if projects.is_empty() {
                println!("no projects");
            } else {
                for project in projects {
                    println!("{}  {}  [{}]", project.id, project.name, project.current_phase);
                }
            }
        }

        Command::Create => {
            let project = client.create_project().await?;
            println!("created {} ({})", project.id, project.name);
        }

        Command::Show { id } => {
            let project = client.get_project(&id).await?;
            let conversation = Conversation::from_project(&project, config.chat.directive_display);
            print_project(&project);
            for message in conversation.transcript() {
                println!("\n[{:?}]", message.role);
                println!("{}", message.content);
            }
        }

        Command::Rename { id, name } => {
            let project = client
                .update_project(&id, &ProjectUpdate::default().name(name))
                .await?;
            println!("renamed {} to {}", project.id, project.name);
        }

        Command::Delete { id } => {
            client.delete_project(&id).await?;
            println!("deleted {id}");
        }

        Command::Chat { id, message } => {
            let text = resolve_text(message, "chat")?;
            let project = client.get_project(&id).await?;
            let mut conversation =
                Conversation::from_project(&project, config.chat.directive_display);

            let turn = conversation.begin(Message::user(text))?;
            let mut printer = StreamPrinter::default();
            let outcome = turn.run(&client, &mut printer).await;
            println!();

            let Some(settled) = conversation.settle(outcome) else {
                return Ok(());
            };
            if let Some(name) = settled.rename {
                conversation.apply_rename(&client, &name).await?;
                eprintln!("project renamed to {}", conversation.name());
            }
            if settled.phase_advances > 0 {
                eprintln!("phase: {}", conversation.phase());
            }
            if let Some(error) = settled.error {
                return Err(error.into());
            }
        }

        Command::Prd { id, target, out } => {
            let project = client.get_project(&id).await?;
            let target = target.unwrap_or_else(|| config.document.default_target.clone());
            let request = DocumentRequest::prd(target);
            let prd = match stream_document(&client, &id, &request).await {
                Ok(prd) => prd,
                Err(e) => {
                    eprintln!("{GENERATION_ERROR_DOCUMENT}");
                    return Err(e.into());
                }
            };
            let dir = out
                .or(config.document.output_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            let path = document::save(&dir, &project.name, &prd)?;
            eprintln!("saved to {}", path.display());
        }

        Command::Review { id } => {
            stream_document(&client, &id, &DocumentRequest::Review).await?;
        }

        Command::Edit { id, instruction } => {
            let instruction = resolve_text(instruction, "edit")?;
            stream_document(&client, &id, &DocumentRequest::edit(instruction)).await?;
        }

        Command::Phases { id } => {
            let project = client.get_project(&id).await?;
            for (phase, status) in specdrafter::phase::progress(project.current_phase) {
                let mark = match status {
                    PhaseStatus::Done => "x",
                    PhaseStatus::Current => ">",
                    PhaseStatus::Pending => " ",
                };
                println!("[{mark}] {phase}");
            }
        }
    }

    Ok(())
}

/// Prints a streaming answer: content to stdout, reasoning to stderr.
///
/// The observer sees the whole in-progress message on every update, so
/// only the unseen suffix of each buffer is written.
#[derive(Default)]
struct StreamPrinter {
    content_shown: usize,
    reasoning_shown: usize,
}

impl ChatObserver for StreamPrinter {
    fn on_update(&mut self, message: &Message) {
        if let Some(reasoning) = message.reasoning() {
            if let Some(new) = reasoning.get(self.reasoning_shown..) {
                eprint!("{new}");
                self.reasoning_shown = reasoning.len();
            }
        }
        if let Some(new) = message.content.get(self.content_shown..) {
            print!("{new}");
            let _ = io::stdout().flush();
            self.content_shown = message.content.len();
        }
    }

    fn on_phase_advanced(&mut self) {
        eprintln!("\n-- phase complete --");
    }

    fn on_error(&mut self, stage: FailureStage, error: &DrafterError) {
        eprintln!("\n{stage} failure: {error}");
    }
}

async fn stream_document(
    client: &DrafterClient,
    id: &str,
    request: &DocumentRequest,
) -> specdrafter::Result<String> {
    let text = document::generate(client, id, request, |piece| {
        print!("{piece}");
        let _ = io::stdout().flush();
    })
    .await?;
    println!();
    Ok(text)
}

fn print_project(project: &Project) {
    println!("id:          {}", project.id);
    println!("name:        {}", project.name);
    if !project.description.is_empty() {
        println!("description: {}", project.description);
    }
    println!("phase:       {}", project.current_phase);
    if let Some(updated) = &project.updated_at {
        println!("updated:     {updated}");
    }
    println!("messages:    {}", project.conversation_history.len());
}

/// Resolve text input from an optional CLI argument and/or stdin.
///
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg}\n\n{stdin}"`
/// - neither → error
fn resolve_text(arg: Option<String>, command: &str) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_text = if io::stdin().is_terminal() {
        None
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a}\n\n{s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => {
            Err(format!("{command}: no input provided (pass text as argument or via stdin)").into())
        }
    }
}
