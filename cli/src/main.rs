//! fanout: generate accounts and fund each one from a controlling account.

mod explorer;
mod operator;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use fanout_client::{Commitment, LedgerClient, RpcLedgerClient};
use fanout_distributor::{
    ControllingAccount, DistributionOutcome, DistributionPlan, Distributor, DistributorConfig,
    OsAccountFactory,
};
use fanout_store::{BatchStore, JsonFileStore};
use fanout_types::Cluster;
use fanout_utils::LogFormat;

use crate::operator::Operator;

/// Exit status for configuration and other fatal errors.
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "fanout", version, about = "Generate accounts and fund them from a controlling account")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "FANOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Cluster: "devnet", "testnet", "mainnet-beta" or "localnet".
    #[arg(long, global = true, env = "FANOUT_CLUSTER")]
    cluster: Option<Cluster>,

    /// JSON-RPC endpoint (defaults to the cluster's public endpoint).
    #[arg(long, global = true, env = "FANOUT_RPC_URL")]
    rpc_url: Option<String>,

    /// Commitment a transfer must reach: "processed", "confirmed", "finalized".
    #[arg(long, global = true, env = "FANOUT_COMMITMENT")]
    commitment: Option<Commitment>,

    /// Batch file path.
    #[arg(long, short, global = true, env = "FANOUT_OUTPUT")]
    output: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "FANOUT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "FANOUT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand (defaults to `distribute`).
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Generate accounts and transfer to each of them.
    Distribute(DistributeArgs),
    /// Re-read balances of a saved batch and repair its records.
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args, Default)]
struct DistributeArgs {
    /// Base58 secret of the controlling account. Prompted for if absent.
    #[arg(long, env = "FANOUT_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Number of accounts to generate.
    #[arg(long, short = 'n', env = "FANOUT_COUNT")]
    count: Option<String>,

    /// Tokens to send to each account.
    #[arg(long, short, env = "FANOUT_AMOUNT")]
    amount: Option<String>,

    /// Verify balances after the transfers (true/false). Prompted for if absent.
    #[arg(long, env = "FANOUT_VERIFY")]
    verify: Option<bool>,

    /// Open explorer links afterwards (true/false). Prompted for if absent.
    #[arg(long, env = "FANOUT_OPEN_EXPLORER")]
    open_explorer: Option<bool>,
}

#[derive(clap::Args)]
struct ReconcileArgs {
    /// Open explorer links afterwards (true/false). Prompted for if absent.
    #[arg(long, env = "FANOUT_OPEN_EXPLORER")]
    open_explorer: Option<bool>,
}

/// Layer CLI flags and env vars over the file config (or defaults).
fn resolve_config(cli: &Cli) -> anyhow::Result<DistributorConfig> {
    let base = match &cli.config {
        Some(path) => DistributorConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DistributorConfig::default(),
    };

    let config = DistributorConfig {
        cluster: cli.cluster.unwrap_or(base.cluster),
        rpc_url: cli.rpc_url.clone().or(base.rpc_url),
        commitment: cli.commitment.unwrap_or(base.commitment),
        output: cli.output.clone().unwrap_or(base.output),
        log_format: cli.log_format.unwrap_or(base.log_format),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        ..base
    };
    config.validate()?;
    Ok(config)
}

fn connect(config: &DistributorConfig) -> anyhow::Result<RpcLedgerClient> {
    Ok(RpcLedgerClient::new(
        config.effective_rpc_url(),
        config.cluster,
        config.commitment,
    )?)
}

async fn distribute(config: DistributorConfig, args: DistributeArgs) -> anyhow::Result<ExitCode> {
    let mut operator = Operator::stdio();

    let secret = operator.ask_unless(
        args.secret_key,
        "Controlling account secret key (base58): ",
    )?;
    let controller = ControllingAccount::from_secret(&secret)?;
    let count = operator.ask_unless(args.count, "How many accounts to create? ")?;
    let amount = operator.ask_unless(args.amount, "Tokens to send to each account? ")?;
    let plan = DistributionPlan::parse(&count, &amount)?;

    tracing::info!(
        controller = %controller.address(),
        cluster = %config.cluster,
        rpc = config.effective_rpc_url(),
        count = plan.count(),
        amount = %plan.amount_per_account(),
        "starting distribution"
    );

    let store = JsonFileStore::new(&config.output);
    let location = store.location();
    let distributor = Distributor::new(connect(&config)?, store, OsAccountFactory, config);

    let started = Instant::now();
    let mut distribution = distributor.distribute(&controller, &plan).await?;
    report::write_distribution(
        &mut std::io::stdout(),
        &distribution,
        &location,
        started.elapsed(),
    )?;

    if distribution.outcome == DistributionOutcome::GlobalDeadlineExceeded {
        return Ok(ExitCode::from(distribution.exit_code()));
    }

    if operator.confirm(args.verify, "Verify account balances now? (y/n) ")? {
        let reconciled = distributor.reconcile(&mut distribution.batch).await;
        report::write_reconcile(&mut std::io::stdout(), &reconciled)?;
    }

    if operator.confirm(args.open_explorer, "Open the accounts in the explorer? (y/n) ")? {
        let urls: Vec<String> = distribution
            .batch
            .iter()
            .map(|r| distributor.client().explorer_url(&r.address))
            .collect();
        explorer::open_all(&urls).await;
    }

    Ok(ExitCode::from(distribution.exit_code()))
}

async fn reconcile(config: DistributorConfig, args: ReconcileArgs) -> anyhow::Result<ExitCode> {
    let store = JsonFileStore::new(&config.output);
    let distributor = Distributor::new(connect(&config)?, store, OsAccountFactory, config);

    let (batch, reconciled) = distributor.reconcile_stored().await?;
    report::write_batch(&mut std::io::stdout(), &batch)?;
    report::write_reconcile(&mut std::io::stdout(), &reconciled)?;

    let mut operator = Operator::stdio();
    if operator.confirm(args.open_explorer, "Open the accounts in the explorer? (y/n) ")? {
        let urls: Vec<String> = reconciled
            .accounts
            .iter()
            .map(|a| a.explorer_url.clone())
            .collect();
        explorer::open_all(&urls).await;
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = resolve_config(&cli)?;
    fanout_utils::init_logging(config.log_format, &config.log_level);

    match cli.command.unwrap_or_else(|| Command::Distribute(DistributeArgs::default())) {
        Command::Distribute(args) => distribute(config, args).await,
        Command::Reconcile(args) => reconcile(config, args).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
