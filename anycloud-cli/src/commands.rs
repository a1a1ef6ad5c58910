use std::path::{Path, PathBuf};

use anycloud_client::api;
use anycloud_client::client::CloudClient;
use anycloud_client::session::{
    CredentialSet, load_cookies_from_json, load_session, load_session_from_har,
    load_tokens_from_json, save_session,
};
use anycloud_client::utils::format_bytes;
use serde_json::json;
use tracing::debug;

use crate::cli::{AuthCommands, Commands};
use crate::error::{CliError, Result};

pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Auth { command } => match command {
            AuthCommands::Import {
                cookies,
                tokens,
                from_har,
                out,
            } => auth_import(cookies, tokens, from_har, &out),
        },

        Commands::Quota { json, session } => {
            let client = load_client(&session)?;
            let quota = api::get_quota(&client).await?;
            if json {
                let payload = json!({
                    "total_bytes": quota.total_bytes,
                    "used_bytes": quota.used_bytes,
                    "free_bytes": quota.free_bytes(),
                    "used_percent": quota.used_percent(),
                });
                println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
            } else {
                println!(
                    "Used {} / {} ({:.1}%)",
                    format_bytes(quota.used_bytes),
                    format_bytes(quota.total_bytes),
                    quota.used_percent()
                );
            }
            Ok(())
        }

        Commands::Ls {
            page,
            limit,
            json,
            session,
        } => {
            let client = load_client(&session)?;
            let items = api::list_files(&client, page, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items).unwrap_or_default());
            } else {
                for item in items {
                    println!("{}\t{}\t{}", item.id, item.size_bytes, item.name);
                }
            }
            Ok(())
        }

        Commands::Pull { file_id, session } => {
            let client = load_client(&session)?;
            let url = api::get_download_url(&client, file_id).await?;
            println!("{url}");
            Ok(())
        }

        Commands::Rm { file_id, session } => {
            let client = load_client(&session)?;
            api::delete_files(&client, &[file_id]).await?;
            println!("OK");
            Ok(())
        }
    }
}

fn auth_import(
    cookies: Option<PathBuf>,
    tokens: Option<PathBuf>,
    from_har: Option<PathBuf>,
    out: &Path,
) -> Result<()> {
    if let Some(har) = from_har {
        let credentials = load_session_from_har(&har)?;
        save_session(out, &credentials)?;
        println!("OK: session saved to {} (from HAR)", out.display());
        return Ok(());
    }

    let Some(cookies_path) = cookies else {
        return Err(CliError::Usage(
            "missing --cookies (or use --from-har <path>)".to_string(),
        ));
    };

    let mut credentials = load_cookies_from_json(&cookies_path)?;
    if let Some(tokens_path) = tokens {
        credentials.tokens = load_tokens_from_json(&tokens_path)?;
    }
    save_session(out, &credentials)?;
    println!("OK: session saved to {}", out.display());
    Ok(())
}

/// Build a client from the session file; a missing file just means an
/// anonymous client.
fn load_client(session: &Path) -> Result<CloudClient> {
    let credentials = if session.exists() {
        load_session(session)?
    } else {
        debug!(path = %session.display(), "No session file; starting unauthenticated");
        CredentialSet::new()
    };
    Ok(CloudClient::new(credentials))
}
