use crate::cli::commands::{Cli, Commands, UserCommands};
use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use skinsight::Config;
use skinsight::analysis::AnalysisResult;
use skinsight::auth::{CredentialStore, FileCredentialStore};
use skinsight::records::HistoryEntry;
use skinsight::service::{AnalysisService, ServiceRequest};
use std::path::PathBuf;

const PASSWORD_ENV: &str = "SKINSIGHT_PASSWORD";

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            user,
            password,
            patient,
            zone,
            attempts,
            json,
            images,
        } => {
            let request = ServiceRequest {
                username: user,
                password: resolve_password(password)?,
                entity_id: patient,
                images: read_images(&images).await?,
                body_zone: zone,
                max_attempts: attempts,
            };
            run_analyze(&config, &request, json).await
        }
        Commands::History {
            user,
            password,
            patient,
            json,
        } => run_history(&config, &user, &resolve_password(password)?, &patient, json).await,
        Commands::User { user_command } => match user_command {
            UserCommands::Add { username, password } => {
                let store = FileCredentialStore::new(config.storage.users_path());
                let path = store
                    .create_user(&username, &resolve_password(password)?)
                    .await?;
                println!("Created user {username} at {}", path.display());
                Ok(())
            }
        },
    }
}

async fn run_analyze(config: &Config, request: &ServiceRequest, json: bool) -> Result<()> {
    let service = AnalysisService::from_config(config)?;
    let response = service.handle(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response.outcome.result)?);
    } else {
        println!(
            "Analysis for patient {} ({} attempt(s), recorded at {})",
            request.entity_id, response.outcome.attempts, response.entry.timestamp
        );
        print_result(&response.outcome.result);
    }
    Ok(())
}

async fn run_history(
    config: &Config,
    username: &str,
    password: &str,
    patient: &str,
    json: bool,
) -> Result<()> {
    let credentials = FileCredentialStore::new(config.storage.users_path());
    if !credentials.verify(username, password).await {
        bail!("Invalid credentials for user {username}");
    }

    let service = AnalysisService::from_config(config)?;
    let history = service.merger().history(username, patient).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }
    if history.is_empty() {
        println!("No analyses recorded for patient {patient}.");
        return Ok(());
    }
    for entry in &history {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    println!("── {} ──", entry.timestamp);
    match entry.analysis() {
        Some(result) => print_result(&result),
        None => println!("{}", entry.result),
    }
}

fn print_result(result: &AnalysisResult) {
    for (name, assessment) in result.iter() {
        println!("  {name:<18} {:>3}/100", assessment.value);
        println!("    {}", assessment.description);
        println!("    {}", assessment.evaluation);
        println!("    → {}", assessment.advice);
    }
}

fn resolve_password(flag: Option<String>) -> Result<String> {
    flag.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .with_context(|| format!("Password required: pass --password or set {PASSWORD_ENV}"))
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut encoded = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        encoded.push(STANDARD.encode(bytes));
    }
    Ok(encoded)
}
