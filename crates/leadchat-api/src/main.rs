//! leadchat CLI and REST API entry point.
//!
//! Binary name: `leadchat`
//!
//! Parses CLI arguments, initializes storage and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod sessions;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, FormCommand, LeadsCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG still wins when set.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,leadchat=debug",
        _ => "trace",
    };
    leadchat_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "leadchat", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.backend).await?;
    let result = run(state, cli.command, cli.json).await;

    leadchat_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(state: AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Form { action } => match action {
            FormCommand::Create {
                title,
                fields,
                publish,
            } => cli::form::create_form(&state, title, fields, publish, json).await?,
            FormCommand::List => cli::form::list_forms(&state, json).await?,
            FormCommand::Show { form } => cli::form::show_form(&state, &form, json).await?,
            FormCommand::Update {
                form,
                title,
                fields,
                no_question,
            } => cli::form::update_form(&state, &form, title, fields, no_question, json).await?,
            FormCommand::Publish { form } => {
                cli::form::set_published(&state, &form, true, json).await?
            }
            FormCommand::Unpublish { form } => {
                cli::form::set_published(&state, &form, false, json).await?
            }
            FormCommand::Delete { form, force } => {
                cli::form::delete_form(&state, &form, force, json).await?
            }
        },

        Commands::Leads { action } => match action {
            LeadsCommand::List { form } => cli::lead::list_leads(&state, form, json).await?,
            LeadsCommand::Export {
                form,
                output,
                stdout,
            } => cli::lead::export_leads(&state, &form, output, stdout, json).await?,
        },

        Commands::Chat { slug } => cli::chat::loop_runner::run_chat(&state, &slug).await?,

        Commands::Preview { form } => cli::chat::loop_runner::run_preview(&state, &form).await?,

        Commands::Stats => cli::stats::stats(&state, json).await?,

        Commands::Seed => cli::stats::seed(&state, json).await?,

        Commands::Serve { port, host } => {
            // Ensure an API key exists, print it if new
            if let Some(api_key) = state.api_keys.ensure_key().await? {
                println!();
                println!(
                    "  {} API key generated (save this -- it won't be shown again):",
                    console::style("🔑").bold()
                );
                println!();
                println!("  {}", console::style(&api_key).yellow().bold());
                println!();
            }

            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} leadchat API listening on {} ({} storage)",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan(),
                state.config.storage.backend
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let sweeper = sessions::spawn_sweeper(
                &state.sessions,
                state.config.server.session_idle_timeout(),
                sessions::SWEEP_INTERVAL,
            );
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            sweeper.abort();

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
