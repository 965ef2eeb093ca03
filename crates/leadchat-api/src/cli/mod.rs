//! CLI command definitions and dispatch for the `leadchat` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! noun-verb pattern (e.g., `leadchat form create`, `leadchat leads export`).

pub mod chat;
pub mod form;
pub mod lead;
pub mod stats;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

use leadchat_types::config::StorageBackendKind;
use leadchat_types::form::LeadMagnetKind;

/// Conversational lead-capture forms.
#[derive(Parser)]
#[command(name = "leadchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, env = "LEADCHAT_OTEL")]
    pub otel: bool,

    /// Storage backend override (sqlite, memory).
    #[arg(long, global = true, env = "LEADCHAT_BACKEND")]
    pub backend: Option<StorageBackendKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage forms (create, list, show, update, publish, unpublish, delete).
    Form {
        #[command(subcommand)]
        action: FormCommand,
    },

    /// Browse and export captured leads.
    Leads {
        #[command(subcommand)]
        action: LeadsCommand,
    },

    /// Fill in a published form as a visitor would.
    Chat {
        /// Form slug.
        slug: String,
    },

    /// Run a form's conversation without counting a view or storing the lead.
    Preview {
        /// Form slug or ID (published or not).
        form: String,
    },

    /// Dashboard: views, conversions and conversion rate per form.
    Stats,

    /// Load demo forms and leads.
    Seed,

    /// Start the REST API server.
    Serve {
        /// Port to listen on (default from config.toml).
        #[arg(short, long, env = "LEADCHAT_PORT")]
        port: Option<u16>,

        /// Host to bind to (default from config.toml).
        #[arg(long, env = "LEADCHAT_HOST")]
        host: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum FormCommand {
    /// Create a new form (prompts for missing required fields).
    #[command(alias = "new")]
    Create {
        /// Form title.
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: FormFields,

        /// Publish immediately.
        #[arg(long)]
        publish: bool,
    },

    /// List all forms.
    #[command(alias = "ls")]
    List,

    /// Show a form's full definition.
    Show {
        /// Form slug or ID.
        form: String,
    },

    /// Change a form's fields. Omitted flags keep their current value.
    Update {
        /// Form slug or ID.
        form: String,

        /// New title (re-derives the slug).
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: FormFields,

        /// Remove the custom question.
        #[arg(long, conflicts_with = "question")]
        no_question: bool,
    },

    /// Make a form available to visitors.
    Publish {
        /// Form slug or ID.
        form: String,
    },

    /// Take a form offline.
    Unpublish {
        /// Form slug or ID.
        form: String,
    },

    /// Delete a form and all its leads.
    #[command(alias = "rm")]
    Delete {
        /// Form slug or ID.
        form: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

/// Editor fields shared by `form create` and `form update`.
#[derive(Args, Default)]
pub struct FormFields {
    /// Opening bot message.
    #[arg(long)]
    pub welcome: Option<String>,

    /// Prompt asking for the visitor's name.
    #[arg(long)]
    pub name_label: Option<String>,

    /// Prompt asking for the visitor's email.
    #[arg(long)]
    pub email_label: Option<String>,

    /// Optional extra question asked after the email.
    #[arg(long)]
    pub question: Option<String>,

    /// Closing bot message.
    #[arg(long)]
    pub thank_you: Option<String>,

    /// Lead magnet title.
    #[arg(long)]
    pub magnet_title: Option<String>,

    /// Lead magnet URL.
    #[arg(long)]
    pub magnet_url: Option<String>,

    /// Lead magnet description.
    #[arg(long)]
    pub magnet_description: Option<String>,

    /// Lead magnet kind (file, link).
    #[arg(long)]
    pub magnet_kind: Option<LeadMagnetKind>,

    /// Lead magnet cover image URL.
    #[arg(long)]
    pub cover_image: Option<String>,
}

impl FormFields {
    /// Whether any lead magnet flag was given.
    pub fn touches_magnet(&self) -> bool {
        self.magnet_title.is_some()
            || self.magnet_url.is_some()
            || self.magnet_description.is_some()
            || self.magnet_kind.is_some()
            || self.cover_image.is_some()
    }
}

#[derive(Subcommand)]
pub enum LeadsCommand {
    /// List captured leads, newest last.
    #[command(alias = "ls")]
    List {
        /// Only leads of this form (slug or ID).
        #[arg(long)]
        form: Option<String>,
    },

    /// Export a form's leads as CSV.
    Export {
        /// Form slug or ID.
        form: String,

        /// Output file (default: leads_{slug}_{YYYY-MM-DD}.csv).
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<std::path::PathBuf>,

        /// Write the CSV to stdout instead of a file.
        #[arg(long)]
        stdout: bool,
    },
}

/// A ticking spinner in the given color.
pub(crate) fn spinner(color: &str, message: impl Into<String>) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template(&format!("{{spinner:.{color}}} {{msg}}"))?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}
