//! Administrative CLI for Gatehouse
//!
//! Thin triggers around the authentication core. Every command selects
//! accounts through the same predicates the login flow uses, so the admin
//! view of "who still has to accept the terms" cannot drift from what users
//! are actually asked to do.
//!
//! # Example Usage
//!
//! ```bash
//! gatehouse-admin --accounts accounts.json acceptance-stats
//! gatehouse-admin --accounts accounts.json force-policy-update 2024-06 --notify
//! gatehouse-admin --accounts accounts.json send-reminders --limit 50
//! gatehouse-admin --accounts accounts.json issue-temp-password ada@example.com --print
//! ```
use anyhow::Context;
use audit_engine::{LoginAttemptAuditor, TracingAuditSink};
use auth_identity::repository::{AccountStore, PolicyVersionStore};
use auth_identity::{Account, AcceptanceStats, AuthenticationStateMachine, DeliveryReport, IdentityConfig, Stores, SystemClock, TermsService};
use clap::{Parser, Subcommand};
use colored::*;
use email_service::{EmailSender, LoggingEmailSender};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "gatehouse-admin")]
#[command(about = "Terms-of-service and account administration for Gatehouse")]
pub struct Cli {
    /// Identity configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "GATEHOUSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Account snapshot (JSON). Changes are written back to it.
    #[arg(short, long, env = "GATEHOUSE_ACCOUNTS")]
    pub accounts: Option<PathBuf>,

    /// Machine-readable output
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Recompute terms acceptance statistics
    AcceptanceStats,

    /// Publish a new policy version; every account must accept it again
    ForcePolicyUpdate {
        version: String,

        /// E-mail every active account about the new version
        #[arg(long)]
        notify: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Remind accounts that have not accepted the current version
    SendReminders {
        /// Maximum number of e-mails; defaults to terms.reminder_batch_size
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Set a random temporary password for an account.
    ///
    /// The admin tool has no mail transport, so the password is only handed
    /// out when `--print` is given.
    IssueTempPassword {
        email: String,

        /// Print the temporary password for the operator to pass on
        #[arg(long)]
        print: bool,
    },
}

/// On-disk account state the CLI operates on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default)]
    pub policy_version: Option<String>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AccountSnapshot {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
    }
}

/// The core wired to in-memory stores seeded from a snapshot
pub struct Runtime {
    pub stores: Stores,
    pub engine: AuthenticationStateMachine,
    pub terms: TermsService,
}

impl Runtime {
    pub async fn from_snapshot(
        config: IdentityConfig,
        snapshot: AccountSnapshot,
        mailer: Arc<dyn EmailSender>,
    ) -> anyhow::Result<Self> {
        let version = snapshot
            .policy_version
            .clone()
            .unwrap_or_else(|| config.terms.initial_version.clone());
        let stores = Stores::in_memory(&version);
        for account in snapshot.accounts {
            stores.accounts.insert(account).await?;
        }

        let clock = Arc::new(SystemClock);
        let auditor = LoginAttemptAuditor::new(Arc::new(TracingAuditSink::new()));
        let terms = TermsService::new(&config, &stores, clock.clone(), auditor.clone(), mailer.clone())?;
        let engine = AuthenticationStateMachine::new(config, &stores, clock, auditor, mailer)?;

        Ok(Self { stores, engine, terms })
    }

    pub async fn snapshot(&self) -> anyhow::Result<AccountSnapshot> {
        Ok(AccountSnapshot {
            policy_version: Some(self.stores.policy_versions.current().await?),
            accounts: self.stores.accounts.list().await?,
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = IdentityConfig::load(cli.config.as_deref())?;
    let snapshot = match &cli.accounts {
        Some(path) => AccountSnapshot::read(path)?,
        None => AccountSnapshot::default(),
    };
    let runtime = Runtime::from_snapshot(config, snapshot, Arc::new(LoggingEmailSender::new())).await?;

    let changed = match &cli.command {
        Command::AcceptanceStats => {
            let stats = runtime.terms.acceptance_stats().await?;
            print_stats(&stats, cli.json)?;
            false
        }
        Command::ForcePolicyUpdate { version, notify, yes } => {
            if !yes && !confirm(&format!("Publish policy version {}? Every account must accept it again.", version))? {
                println!("{}", "Aborted.".yellow());
                return Ok(());
            }
            let report = runtime.terms.force_policy_update(version, *notify).await?;
            print_report(&format!("Policy version {} published", version), &report, cli.json)?;
            true
        }
        Command::SendReminders { limit } => {
            let report = runtime.terms.send_reminder_batch(*limit).await?;
            print_report("Reminder batch sent", &report, cli.json)?;
            false
        }
        Command::IssueTempPassword { email, print } => {
            if !print {
                anyhow::bail!(
                    "no mail transport is configured, so the temporary password could not reach {}; \
                     rerun with --print and hand it over yourself",
                    email
                );
            }
            let temporary = runtime.engine.provision_temporary_password(email).await?;
            println!(
                "{} temporary password for {}: {}",
                "✓".green(),
                email,
                temporary.expose_secret().bold()
            );
            true
        }
    };

    if changed {
        if let Some(path) = &cli.accounts {
            runtime.snapshot().await?.write(path)?;
            tracing::info!(path = %path.display(), "Account snapshot updated");
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(dialoguer::Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn print_stats(stats: &AcceptanceStats, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("{} {}", "Policy version:".bold(), stats.current_version.cyan());
    println!("  accounts            {}", stats.total_accounts);
    println!("  reachable (active)  {}", stats.reachable_accounts);
    println!(
        "  accepted current    {} ({:.1}%)",
        stats.accepted_current.to_string().green(),
        stats.acceptance_rate()
    );
    println!("  pending acceptance  {}", stats.pending_acceptance.to_string().yellow());
    println!("  pending first login {}", stats.pending_first_login);
    println!("  password expired    {}", stats.password_expired);
    Ok(())
}

fn print_report(title: &str, report: &DeliveryReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}", title.bold());
    println!("  sent       {}", report.sent.to_string().green());
    if report.failed > 0 {
        println!("  failed     {}", report.failed.to_string().red());
    }
    if report.remaining > 0 {
        println!("  remaining  {}", report.remaining);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_identity::TermsAcceptance;
    use chrono::Utc;
    use clap::CommandFactory;
    use email_service::OutboxEmailSender;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_force_policy_update() {
        let cli = Cli::try_parse_from([
            "gatehouse-admin",
            "--accounts",
            "accounts.json",
            "force-policy-update",
            "2024-06",
            "--notify",
            "-y",
        ])
        .unwrap();

        assert_eq!(cli.accounts, Some(PathBuf::from("accounts.json")));
        assert_eq!(
            cli.command,
            Command::ForcePolicyUpdate {
                version: "2024-06".to_string(),
                notify: true,
                yes: true,
            }
        );
    }

    #[test]
    fn test_parse_send_reminders_limit() {
        let cli = Cli::try_parse_from(["gatehouse-admin", "send-reminders", "--limit", "25"]).unwrap();
        assert_eq!(cli.command, Command::SendReminders { limit: Some(25) });
        assert!(Cli::try_parse_from(["gatehouse-admin", "issue-temp-password"]).is_err());
    }

    fn snapshot_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gatehouse-admin-{}-{}.json", std::process::id(), name));
        let now = Utc::now();
        let mut account = Account::new("ada@example.com", "original-hash".to_string(), now);
        account.first_login = false;
        AccountSnapshot {
            policy_version: Some("1".to_string()),
            accounts: vec![account],
        }
        .write(&path)
        .unwrap();
        path
    }

    fn issue_cli(path: &Path, print: bool) -> Cli {
        Cli {
            config: None,
            accounts: Some(path.to_path_buf()),
            json: false,
            verbose: false,
            command: Command::IssueTempPassword {
                email: "ada@example.com".to_string(),
                print,
            },
        }
    }

    #[tokio::test]
    async fn test_issue_temp_password_refuses_without_print() {
        let path = snapshot_file("refuse");

        let err = run(issue_cli(&path, false)).await.unwrap_err();
        assert!(err.to_string().contains("--print"));

        let saved = AccountSnapshot::read(&path).unwrap();
        assert_eq!(saved.accounts[0].password_hash, "original-hash");
        assert!(!saved.accounts[0].first_login);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_issue_temp_password_with_print_updates_snapshot() {
        let path = snapshot_file("print");

        run(issue_cli(&path, true)).await.unwrap();

        let saved = AccountSnapshot::read(&path).unwrap();
        assert_ne!(saved.accounts[0].password_hash, "original-hash");
        assert!(saved.accounts[0].first_login);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_drives_stats_and_reminders() {
        let now = Utc::now();
        let mut accepted = Account::new("ada@example.com", String::new(), now);
        accepted.first_login = false;
        accepted.terms = Some(TermsAcceptance {
            version: "3".to_string(),
            accepted_at: now,
        });
        let pending = Account::new("grace@example.com", String::new(), now);

        let snapshot = AccountSnapshot {
            policy_version: Some("3".to_string()),
            accounts: vec![accepted, pending],
        };
        let outbox = Arc::new(OutboxEmailSender::new());
        let runtime = Runtime::from_snapshot(IdentityConfig::default(), snapshot, outbox.clone())
            .await
            .unwrap();

        let stats = runtime.terms.acceptance_stats().await.unwrap();
        assert_eq!(stats.current_version, "3");
        assert_eq!(stats.accepted_current, 1);
        assert_eq!(stats.pending_first_login, 1);

        let report = runtime.terms.send_reminder_batch(None).await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(outbox.sent_to("grace@example.com").len(), 1);

        runtime.terms.force_policy_update("4", false).await.unwrap();
        let saved = runtime.snapshot().await.unwrap();
        assert_eq!(saved.policy_version.as_deref(), Some("4"));
        assert_eq!(saved.accounts.len(), 2);
    }

    #[test]
    fn test_snapshot_accepts_minimal_accounts() {
        let raw = r#"{
            "accounts": [{
                "id": "7d5c2f0e-8a4b-4c1e-9f00-000000000001",
                "email": "ada@example.com",
                "password_hash": "",
                "status": "active",
                "created_at": "2024-01-01T00:00:00Z"
            }]
        }"#;
        let snapshot: AccountSnapshot = serde_json::from_str(raw).unwrap();
        assert!(snapshot.policy_version.is_none());
        assert!(snapshot.accounts[0].roles.is_empty());
        assert!(!snapshot.accounts[0].first_login);
    }
}
