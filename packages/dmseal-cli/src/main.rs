//! dmseal
//!
//! Operator tool for at-rest message encryption:
//!
//! 1. **Status**: count encrypted and plaintext messages in a database
//!    without changing anything.
//!
//! 2. **Migrate**: encrypt every legacy plaintext message, in chunks, with a
//!    pause between chunks. Ctrl-C stops the run after the current chunk;
//!    running it again picks up where it left off.
//!
//! 3. **Encrypt / decrypt**: seal or open a single value for a participant
//!    pair, for debugging stored data.

mod output;

use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use tokio::sync::watch;

use dmseal_core::migration::{DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};
use dmseal_core::storage::Database;
use dmseal_core::{MessageCipher, MigrationConfig, MigrationReport, MigrationRunner};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dmseal", version, about = "At-rest encryption for direct messages")]
struct Args {
    /// SQLite database holding conversations and messages
    #[arg(long, global = true, env = "DMSEAL_DATABASE")]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how many messages are still plaintext
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Encrypt every plaintext message in the database
    Migrate {
        /// Messages encrypted concurrently per chunk
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, env = "DMSEAL_BATCH_SIZE")]
        batch_size: usize,

        /// Pause between chunks in milliseconds
        #[arg(long, default_value_t = default_delay_ms(), env = "DMSEAL_BATCH_DELAY_MS")]
        batch_delay_ms: u64,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Encrypt the plaintext messages of one conversation
    MigrateConversation {
        /// Conversation identifier
        id: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Encrypt a single value for a participant pair
    Encrypt {
        /// Participant identifier (give exactly two)
        #[arg(long = "participant", required = true)]
        participants: Vec<String>,

        /// Plaintext to encrypt
        text: String,
    },

    /// Decrypt a single envelope for a participant pair
    Decrypt {
        /// Participant identifier (give exactly two)
        #[arg(long = "participant", required = true)]
        participants: Vec<String>,

        /// Fail instead of printing the placeholder when decryption fails
        #[arg(long)]
        strict: bool,

        /// Envelope (plaintext is echoed back unchanged)
        envelope: String,
    },
}

fn default_delay_ms() -> u64 {
    DEFAULT_BATCH_DELAY.as_millis() as u64
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dmseal=info,dmseal_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("dmseal v{}", dmseal_core::version());

    run(args).await
}

async fn run(args: Args) -> color_eyre::Result<()> {
    match args.command {
        Command::Status { json } => {
            let runner = runner(args.database.as_deref(), MigrationConfig::default()).await?;
            let status = runner.check_status().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!("{}", output::render_status(&status));
            }
        }

        Command::Migrate {
            batch_size,
            batch_delay_ms,
            json,
        } => {
            let config = MigrationConfig::default()
                .with_batch_size(batch_size)
                .with_batch_delay(Duration::from_millis(batch_delay_ms));

            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, stopping after the current chunk");
                    let _ = cancel_tx.send(true);
                }
            });

            let runner = runner(args.database.as_deref(), config)
                .await?
                .with_cancellation(cancel_rx);
            let report = runner.migrate_all().await?;
            print_report(&report, json)?;
        }

        Command::MigrateConversation { id, json } => {
            let runner = runner(args.database.as_deref(), MigrationConfig::default()).await?;
            let report = runner
                .migrate_conversation(&id)
                .await
                .wrap_err_with(|| format!("Failed to migrate conversation {}", id))?;
            print_report(&report, json)?;
        }

        Command::Encrypt { participants, text } => {
            let envelope = MessageCipher::default().encrypt(&text, &participants)?;
            println!("{}", envelope);
        }

        Command::Decrypt {
            participants,
            strict,
            envelope,
        } => {
            let cipher = MessageCipher::default();
            let plaintext = if strict {
                cipher.try_decrypt(&envelope, &participants)?
            } else {
                cipher.decrypt(&envelope, &participants)
            };
            println!("{}", plaintext);
        }
    }

    Ok(())
}

async fn runner(
    database: Option<&str>,
    config: MigrationConfig,
) -> color_eyre::Result<MigrationRunner<Database>> {
    let path = database.ok_or_else(|| eyre!("--database (or DMSEAL_DATABASE) is required"))?;
    let db = Database::open(Some(path))
        .await
        .wrap_err_with(|| format!("Failed to open {}", path))?;

    Ok(MigrationRunner::new(db, MessageCipher::default(), config)?)
}

fn print_report(report: &MigrationReport, json: bool) -> color_eyre::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", output::render_report(report));
    }

    if report.errors > 0 {
        bail!(
            "{} item(s) could not be migrated; fix the cause and run again",
            report.errors
        );
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_migrate_defaults() {
        let args = Args::try_parse_from(["dmseal", "--database", "app.db", "migrate"]).unwrap();
        assert_eq!(args.database.as_deref(), Some("app.db"));
        match args.command {
            Command::Migrate {
                batch_size,
                batch_delay_ms,
                json,
            } => {
                assert_eq!(batch_size, 50);
                assert_eq!(batch_delay_ms, 100);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_migrate_overrides() {
        let args = Args::try_parse_from([
            "dmseal",
            "migrate",
            "--batch-size",
            "10",
            "--batch-delay-ms",
            "0",
            "--json",
            "--database",
            "other.db",
        ])
        .unwrap();
        assert_eq!(args.database.as_deref(), Some("other.db"));
        assert!(matches!(
            args.command,
            Command::Migrate {
                batch_size: 10,
                batch_delay_ms: 0,
                json: true
            }
        ));
    }

    #[test]
    fn test_decrypt_collects_participants() {
        let args = Args::try_parse_from([
            "dmseal",
            "decrypt",
            "--participant",
            "alice",
            "--participant",
            "bob",
            "--strict",
            "ENC:v1:a:b",
        ])
        .unwrap();
        match args.command {
            Command::Decrypt {
                participants,
                strict,
                envelope,
            } => {
                assert_eq!(participants, vec!["alice", "bob"]);
                assert!(strict);
                assert_eq!(envelope, "ENC:v1:a:b");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_encrypt_requires_participants() {
        assert!(Args::try_parse_from(["dmseal", "encrypt", "hello"]).is_err());
    }

    #[test]
    fn test_migrate_conversation_takes_id() {
        let args =
            Args::try_parse_from(["dmseal", "migrate-conversation", "conv-9"]).unwrap();
        assert!(matches!(
            args.command,
            Command::MigrateConversation { ref id, json: false } if id == "conv-9"
        ));
    }

    #[tokio::test]
    async fn test_runner_requires_database() {
        let err = runner(None, MigrationConfig::default()).await.err().unwrap();
        assert!(err.to_string().contains("--database"));
    }

    #[test]
    fn test_print_report_fails_on_errors() {
        let clean = MigrationReport::default();
        assert!(print_report(&clean, true).is_ok());

        let failed = MigrationReport {
            errors: 1,
            ..Default::default()
        };
        assert!(print_report(&failed, true).is_err());
    }
}
