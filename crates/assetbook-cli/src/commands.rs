use std::path::Path;

use anyhow::Context;
use assetbook_contract::{AssetContract, ContractConfig, Operation};
use assetbook_store::{InMemoryWorldState, WorldStateSnapshot};
use assetbook_types::{HistoryEntry, TransType};
use colored::Colorize;
use tracing::info;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Invoke(ref args) => cmd_invoke(&cli, args).await,
        Command::Operations => cmd_operations(),
        Command::Keys => cmd_keys(&cli.state).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ContractConfig> {
    match cli.config.as_deref() {
        Some(path) => ContractConfig::load(path)
            .with_context(|| format!("loading contract config {}", path.display())),
        None if cli.strict => Ok(ContractConfig::strict()),
        None => Ok(ContractConfig::default()),
    }
}

async fn load_state(path: &Path) -> anyhow::Result<InMemoryWorldState> {
    let snapshot = WorldStateSnapshot::load(path)
        .await
        .with_context(|| format!("loading world state {}", path.display()))?;
    Ok(InMemoryWorldState::from_snapshot(snapshot))
}

/// Run one invocation as a single transaction: the state file is rewritten
/// only if the operation writes and succeeds.
async fn cmd_invoke(cli: &Cli, args: &InvokeArgs) -> anyhow::Result<()> {
    let op: Operation = args.operation.parse()?;
    let contract = AssetContract::new(load_config(cli)?);
    let store = load_state(&cli.state).await?;

    let result = contract
        .dispatch(&store, op, args.args.as_slice())
        .await
        .with_context(|| format!("{op} failed"))?;

    if !op.is_read_only() {
        store
            .snapshot()
            .save(&cli.state)
            .await
            .with_context(|| format!("saving world state {}", cli.state.display()))?;
        info!(op = %op, state = %cli.state.display(), "transaction committed");
    }

    print_result(&cli.format, op, &result);
    Ok(())
}

fn print_result(format: &OutputFormat, op: Operation, result: &str) {
    match format {
        OutputFormat::Json => println!("{result}"),
        OutputFormat::Text if op == Operation::GetAssetHistory => {
            match serde_json::from_str::<Vec<HistoryEntry>>(result) {
                Ok(entries) if entries.is_empty() => println!("No history."),
                Ok(entries) => {
                    for line in history_lines(&entries) {
                        println!("{line}");
                    }
                }
                Err(_) => println!("{result}"),
            }
        }
        OutputFormat::Text if op.is_read_only() => {
            match serde_json::from_str::<serde_json::Value>(result)
                .and_then(|v| serde_json::to_string_pretty(&v))
            {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("{result}"),
            }
        }
        OutputFormat::Text => println!("{} {}", "✓".green().bold(), result),
    }
}

/// One line per history entry: commit time, transaction id, and the
/// resulting balance.
fn history_lines(entries: &[HistoryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let record = &entry.value;
            let change = match record.trans_type {
                TransType::Unset => "created".to_string(),
                kind => format!("{kind} {}", record.trans_amount),
            };
            format!(
                "{}  {}  {:<16} balance {}",
                entry.timestamp.to_string().dimmed(),
                entry.tx_id.yellow(),
                change,
                record.balance,
            )
        })
        .collect()
}

fn cmd_operations() -> anyhow::Result<()> {
    for op in Operation::ALL {
        let kind = if op.is_read_only() { "query".cyan() } else { "write".yellow() };
        println!("{:<16} {:<6} {}", op.name().bold(), kind, op.params().join(" "));
    }
    Ok(())
}

async fn cmd_keys(state: &Path) -> anyhow::Result<()> {
    let store = load_state(state).await?;
    if store.is_empty() {
        println!("No assets.");
    }
    for key in store.keys() {
        println!("{key}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const CREATE: &str = "invoke CreateAsset D1 42 1234 10 active";

    /// Run one command line against `state`.
    async fn run(state: &Path, line: &str) -> anyhow::Result<()> {
        let state = state.to_str().unwrap();
        let argv = ["assetbook", "--state", state]
            .into_iter()
            .chain(line.split_whitespace());
        run_command(Cli::try_parse_from(argv).unwrap()).await
    }

    #[tokio::test]
    async fn invoke_persists_writes() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");

        run(&state, CREATE).await.unwrap();
        run(&state, "invoke UpdateBalance 42 4 debit fee").await.unwrap();

        let store = load_state(&state).await.unwrap();
        let record = AssetContract::default().read_asset(&store, "42").await.unwrap();
        assert_eq!(record.balance, 6.0);
        assert_eq!(store.change_log("42").len(), 2);
    }

    #[tokio::test]
    async fn failed_invoke_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");

        run(&state, CREATE).await.unwrap();
        let before = std::fs::read(&state).unwrap();

        assert!(run(&state, "invoke UpdateBalance 42 4 transfer x").await.is_err());
        assert_eq!(std::fs::read(&state).unwrap(), before);
    }

    #[tokio::test]
    async fn queries_do_not_create_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        assert!(run(&state, "invoke QueryAsset 42").await.is_err());
        run(&state, "invoke GetAssetHistory 42").await.unwrap();
        assert!(!state.exists());
    }

    #[tokio::test]
    async fn config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let config = dir.path().join("contract.toml");
        std::fs::write(&config, "create_policy = \"reject-existing\"\n").unwrap();

        let create = format!("--config {} {CREATE}", config.display());
        run(&state, &create).await.unwrap();
        assert!(run(&state, &create).await.is_err());
    }

    #[tokio::test]
    async fn strict_flag_rejects_overdraft() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");

        run(&state, CREATE).await.unwrap();
        let err = run(&state, "--strict invoke UpdateBalance 42 11 debit x")
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("insufficient funds"));
        assert_eq!(load_state(&state).await.unwrap().change_log("42").len(), 1);
    }

    #[tokio::test]
    async fn history_lines_show_commit_time() {
        let store = InMemoryWorldState::new();
        let contract = AssetContract::default();
        contract
            .create_asset(&store, "D1", "42", "1234", "100", "active")
            .await
            .unwrap();
        contract
            .update_balance(&store, "42", "25.5", "debit", "fee")
            .await
            .unwrap();
        let json = contract.get_asset_history(&store, "42").await.unwrap();
        let entries: Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();

        colored::control::set_override(false);
        let lines = history_lines(&entries);
        assert_eq!(lines.len(), 2);
        for (line, entry) in lines.iter().zip(&entries) {
            assert!(line.starts_with(&entry.timestamp.to_string()), "{line}");
            assert!(line.contains(&entry.tx_id));
        }
        assert!(lines[0].contains("created") && lines[0].ends_with("balance 100"));
        assert!(lines[1].contains("debit 25.5") && lines[1].ends_with("balance 74.5"));
    }

    #[tokio::test]
    async fn failed_invoke_reports_error_once() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let err = run(&state, "invoke QueryAsset 42").await.unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "QueryAsset failed: asset 42 does not exist"
        );
    }

    #[tokio::test]
    async fn unknown_operation_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        assert!(run(&state, "invoke Transfer 1").await.is_err());
    }
}
