//! SpecDrafter - streaming client for the SpecDrafter requirements assistant
//!
//! This crate talks to a SpecDrafter backend: it manages projects, runs
//! chat turns whose answers stream back as server-sent events, and streams
//! generated documents (PRDs, reviews, requirement edits) as plain text.
//! The [`ProjectBackend`] trait is the seam between the client-side state
//! ([`Conversation`], [`document::generate`]) and the transport
//! ([`DrafterClient`]).
//!
//! # Chat Example
//!
//! ```rust,no_run
//! use specdrafter::{
//!     ChatObserver, Conversation, DirectiveDisplay, DrafterClient, Message, ProjectBackend,
//! };
//!
//! struct Printer;
//!
//! impl ChatObserver for Printer {
//!     fn on_update(&mut self, message: &Message) {
//!         println!("{}", message.content);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> specdrafter::Result<()> {
//!     let client = DrafterClient::new("http://localhost:8000")?;
//!     let project = client.create_project().await?;
//!     let mut conversation = Conversation::from_project(&project, DirectiveDisplay::Strip);
//!
//!     let turn = conversation.begin(Message::user("I want to build a habit tracker."))?;
//!     let outcome = turn.run(&client, &mut Printer).await;
//!     conversation.settle(outcome);
//!
//!     for message in conversation.transcript() {
//!         println!("{:?}: {}", message.role, message.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Document Example
//!
//! ```rust,no_run
//! use specdrafter::DrafterClient;
//! use specdrafter::document::{self, DocumentRequest};
//!
//! #[tokio::main]
//! async fn main() -> specdrafter::Result<()> {
//!     let client = DrafterClient::new("http://localhost:8000")?;
//!     let prd = document::generate(
//!         &client,
//!         "65a1f0c2e4b0a1b2c3d4e5f6",
//!         &DocumentRequest::prd("Cursor"),
//!         |piece| print!("{piece}"),
//!     )
//!     .await?;
//!     document::save(std::path::Path::new("."), "Habit Tracker", &prd)?;
//!     Ok(())
//! }
//! ```

pub mod accumulator;
pub mod client;
pub mod config;
pub mod conversation;
pub mod decode;
pub mod directive;
pub mod document;
pub mod error;
pub mod phase;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use accumulator::{Completion, MessageAccumulator, Signal};
pub use client::DrafterClient;
pub use config::Config;
pub use conversation::{
    ChatObserver, Conversation, FailureStage, Settled, Turn, TurnOutcome, TurnResult,
};
pub use directive::DirectiveDisplay;
pub use error::{DrafterError, Result};
pub use phase::{PhaseStatus, SpecPhase};
pub use traits::ProjectBackend;

// Re-export all types
pub use types::{Auxiliary, Chunk, Message, Project, ProjectUpdate, Role};

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
