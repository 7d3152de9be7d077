//! Command execution
//!
//! Dispatches parsed CLI commands: builds the server client from the
//! resolved settings, runs the requested operation, and prints or logs
//! the outcome. The export pipeline lives in [`export`]; everything else
//! is a one-shot request.

pub mod export;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, ConfigCommand, ExportArgs, RolesCommand};
use crate::client::stats::Statistics;
use crate::client::{Credentials, HttpTransport, ServerClient};
use crate::config::Config;
use crate::error::{Result, TriplectlError};

use export::ExportOptions;

/// Execute the parsed command
pub async fn dispatch(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Export(args) => run_export_command(cli, config, args).await,
        Commands::Stats { datastore, format } => {
            let client = build_client(cli, config)?;
            let stats = client.get_stats(datastore.as_deref()).await?;
            print_stats(&stats, format)
        }
        Commands::Compact { datastore } => {
            let client = build_client(cli, config)?;
            let payload = client.compact(datastore).await?;
            info!(response = %payload, "response from server");
            Ok(())
        }
        Commands::ImportAxioms {
            datastore,
            source_graph,
            destination_graph,
        } => {
            let client = build_client(cli, config)?;
            let lines = client
                .import_axioms(datastore, source_graph, destination_graph)
                .await?;
            for line in lines {
                info!(data = %line, "success");
            }
            Ok(())
        }
        Commands::Roles { command } => run_roles_command(cli, config, command).await,
        Commands::Config { command } => run_config_command(config, command),
        Commands::Completion { shell } => {
            crate::cli::completion::generate_completion(*shell);
            Ok(())
        }
        Commands::Version => {
            println!("triplectl {}", crate::VERSION);
            Ok(())
        }
    }
}

/// Build a server client from flags, environment, and config file
fn build_client(cli: &Cli, config: &Config) -> Result<Arc<ServerClient>> {
    let settings = cli.server_settings(config)?;
    let transport = HttpTransport::new(Duration::from_secs(settings.timeout))?;

    Ok(Arc::new(ServerClient::new(
        Arc::new(transport),
        settings.scheme,
        settings.host,
        Credentials::new(settings.role, settings.password),
    )))
}

async fn run_export_command(cli: &Cli, config: &Config, args: &ExportArgs) -> Result<()> {
    let client = build_client(cli, config)?;

    let options = ExportOptions {
        datastore: args.datastore.clone(),
        graph: args.graph.clone(),
        facts: args.facts.parse()?,
        file: args.file.clone(),
        limit: args.limit,
        progress: !args.no_progress,
    };

    // Ctrl+C cancels the pipeline; the export still runs its cleanup
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("interrupt received - stopping export");
                    cancel.cancel();
                }
                Err(error) => {
                    eprintln!("Failed to listen for Ctrl+C: {error}");
                }
            }
        }
    });

    let result = export::run_export(client, options, cancel).await;
    ctrl_c.abort();

    let exported = result?;
    info!(
        triples = exported.triples_exported,
        batches = exported.batches_written,
        bytes = exported.file_size_bytes,
        elapsed_ms = exported.elapsed_ms,
        "export finished"
    );

    Ok(())
}

async fn run_roles_command(cli: &Cli, config: &Config, command: &RolesCommand) -> Result<()> {
    let client = build_client(cli, config)?;

    match command {
        RolesCommand::List => {
            let roles = client.list_roles().await?;
            for role in roles {
                println!("{role}");
            }
        }
        RolesCommand::Create { name, new_password } => {
            if name.is_empty() {
                return Err(TriplectlError::InvalidArgument(
                    "new role name is unset".to_string(),
                ));
            }
            if new_password.is_empty() {
                return Err(TriplectlError::InvalidArgument(
                    "new role password is unset".to_string(),
                ));
            }
            client.create_role(name, new_password).await?;
            info!(role = %name, "role created");
        }
        RolesCommand::Delete { name } => {
            client.delete_role(name).await?;
            info!(role = %name, "role deleted");
        }
        RolesCommand::Grant { name, access_types } => {
            client.grant_datastore_privileges(name, access_types).await?;
            info!(role = %name, "privileges granted");
        }
        RolesCommand::Revoke { name, access_types } => {
            client
                .revoke_datastore_privileges(name, access_types)
                .await?;
            info!(role = %name, "privileges revoked");
        }
        RolesCommand::Info { name } => {
            let privileges = client.list_privileges(name).await?;
            for (resource, access_types) in &privileges {
                println!("{resource}: {}", access_types.join(", "));
            }
        }
    }

    Ok(())
}

fn run_config_command(config: &Config, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init {
            server,
            scheme,
            role,
            password,
            log_level,
            path,
            overwrite,
        } => {
            let mut fresh = Config::default();
            fresh.server.host = server.clone();
            fresh.server.scheme = scheme.clone();
            fresh.server.role = role.clone();
            fresh.server.password = password.clone();
            fresh.logging.level = log_level.parse()?;

            let path = path.clone().unwrap_or_else(Config::default_path);
            fresh.save(&path, *overwrite)?;

            info!(path = %path.display(), "config file written");
            Ok(())
        }
        ConfigCommand::Print => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn print_stats(stats: &Statistics, format: &str) -> Result<()> {
    if format == "json" {
        let rendered = serde_json::to_string(stats)
            .map_err(|e| TriplectlError::Io(std::io::Error::other(e)))?;
        println!("{rendered}");
        return Ok(());
    }

    for (component, properties) in stats {
        print!("{component}");
        for (property, value) in properties {
            print!("\n\t{property}:\t{value}");
        }
        println!();
    }

    Ok(())
}
