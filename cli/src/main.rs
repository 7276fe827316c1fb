//! `vestlock`: operate a time-locked staking ledger from the command line.

mod config;
mod error;
mod gateway;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use vestlock_governance::GovernanceConfig;
use vestlock_store::StakeStore;
use vestlock_store_lmdb::LmdbEnvironment;
use vestlock_types::{AccountId, Timestamp};
use vestlock_utils::{format_duration, LogFormat};
use vestlock_vesting::{StakePosition, VestingError, VestingLedger};

use crate::config::CliConfig;
use crate::gateway::JournalGateway;

#[derive(Parser)]
#[command(name = "vestlock", about = "Time-locked staking ledger with linear vesting")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "VESTLOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for ledger storage.
    #[arg(long, env = "VESTLOCK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VESTLOCK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VESTLOCK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Evaluate the command at this Unix time instead of the system clock.
    #[arg(long)]
    at: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Stake for the caller's account (or the account it is a delegate of).
    Stake {
        #[arg(long)]
        caller: AccountId,
        amount: u128,
        /// Vesting duration in seconds; the governance default when omitted.
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Stake on behalf of another account with the caller's funds.
    StakeFor {
        #[arg(long)]
        caller: AccountId,
        target: AccountId,
        amount: u128,
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Add to the latest position of the caller's account.
    Extend {
        #[arg(long)]
        caller: AccountId,
        amount: u128,
    },
    /// Add to another account's latest position with the caller's funds.
    ExtendFor {
        #[arg(long)]
        caller: AccountId,
        target: AccountId,
        amount: u128,
    },
    /// Withdraw vested units to the caller.
    Unstake {
        #[arg(long)]
        caller: AccountId,
        amount: u128,
    },
    /// Register a delegate for the caller's account.
    AddDelegate {
        #[arg(long)]
        caller: AccountId,
        delegate: AccountId,
    },
    /// Remove the caller's delegate.
    RemoveDelegate {
        #[arg(long)]
        caller: AccountId,
        delegate: AccountId,
    },
    /// Replace the duration bounds (owner only).
    SetBounds {
        #[arg(long)]
        caller: AccountId,
        min: u64,
        max: u64,
        default: u64,
    },
    /// Replace the name and symbol (owner only).
    SetMetadata {
        #[arg(long)]
        caller: AccountId,
        name: String,
        symbol: String,
    },
    /// Units an account may withdraw now.
    Available { account: AccountId },
    /// Units an account holds across all positions.
    Balance { account: AccountId },
    /// The account's most recent position.
    Snapshot { account: AccountId },
    /// Every position of an account, oldest first.
    Positions { account: AccountId },
    /// Delegation links involving an address.
    Delegation { address: AccountId },
    /// Current governance record.
    Governance,
    /// Total units staked across all accounts.
    Total,
    /// Print the effective configuration as TOML.
    ShowConfig,
}

#[derive(Serialize)]
struct Receipt<'a> {
    op: &'a str,
    account: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<StakePosition>,
    balance: u128,
}

#[derive(Serialize)]
struct AvailableView<'a> {
    account: &'a AccountId,
    at: Timestamp,
    available: u128,
}

#[derive(Serialize)]
struct BalanceView<'a> {
    account: &'a AccountId,
    balance: u128,
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    account: &'a AccountId,
    position: Option<StakePosition>,
    remaining: Option<String>,
}

#[derive(Serialize)]
struct DelegationView<'a> {
    address: &'a AccountId,
    is_delegate: bool,
    acts_for: Option<&'a AccountId>,
    delegate: Option<&'a AccountId>,
}

#[derive(Serialize)]
struct TotalView {
    total_staked: u128,
    accounts: usize,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Attach the stable reason code to a ledger error.
fn reject(err: VestingError) -> anyhow::Error {
    let code = err.code();
    anyhow::Error::new(err).context(code)
}

fn load_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn open_ledger(
    config: &CliConfig,
    store: &dyn StakeStore,
) -> anyhow::Result<VestingLedger> {
    let ledger = match VestingLedger::load_from_store(store).map_err(reject)? {
        Some(ledger) => ledger,
        None => {
            let owner = config.owner.clone().context(
                "no ledger in the data directory; set `owner` in the config to initialise one",
            )?;
            let governance = GovernanceConfig::new(owner.clone(), &config.params)?;
            tracing::info!(%owner, data_dir = %config.data_dir.display(), "initialised new ledger");
            VestingLedger::new(governance)
        }
    };
    Ok(ledger.with_merge_policy(config.merge_policy))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    vestlock_utils::init_logging(config.log_format, &config.log_level);

    if let Command::ShowConfig = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let env = LmdbEnvironment::open(&config.data_dir, config.map_size)
        .with_context(|| format!("opening {}", config.data_dir.display()))?;
    let store = env.stake_store();
    let mut ledger = open_ledger(&config, &store)?;
    let now = cli.at.map(Timestamp::new).unwrap_or_else(Timestamp::now);
    let mut gateway = JournalGateway::new();

    let receipt = match cli.command {
        Command::Stake {
            caller,
            amount,
            duration,
        } => {
            let position = match duration {
                Some(d) => ledger.stake(&caller, amount, d, now, &mut gateway),
                None => ledger.stake_default(&caller, amount, now, &mut gateway),
            }
            .map_err(reject)?;
            Some(("stake", ledger.resolve(&caller), Some(position)))
        }
        Command::StakeFor {
            caller,
            target,
            amount,
            duration,
        } => {
            let position = ledger
                .stake_for(&caller, &target, amount, duration, now, &mut gateway)
                .map_err(reject)?;
            Some(("stake-for", target, Some(position)))
        }
        Command::Extend { caller, amount } => {
            let position = ledger
                .extend(&caller, amount, now, &mut gateway)
                .map_err(reject)?;
            Some(("extend", ledger.resolve(&caller), Some(position)))
        }
        Command::ExtendFor {
            caller,
            target,
            amount,
        } => {
            let position = ledger
                .extend_for(&caller, &target, amount, now, &mut gateway)
                .map_err(reject)?;
            Some(("extend-for", target, Some(position)))
        }
        Command::Unstake { caller, amount } => {
            ledger
                .unstake(&caller, amount, now, &mut gateway)
                .map_err(reject)?;
            Some(("unstake", ledger.resolve(&caller), None))
        }
        Command::AddDelegate { caller, delegate } => {
            ledger.add_delegate(&caller, &delegate).map_err(reject)?;
            Some(("add-delegate", caller, None))
        }
        Command::RemoveDelegate { caller, delegate } => {
            ledger.remove_delegate(&caller, &delegate).map_err(reject)?;
            Some(("remove-delegate", caller, None))
        }
        Command::SetBounds {
            caller,
            min,
            max,
            default,
        } => {
            ledger
                .set_bounds(&caller, min, max, default)
                .map_err(reject)?;
            ledger.save_to_store(&store).map_err(reject)?;
            return print_json(ledger.governance());
        }
        Command::SetMetadata {
            caller,
            name,
            symbol,
        } => {
            ledger
                .set_metadata(&caller, &name, &symbol)
                .map_err(reject)?;
            ledger.save_to_store(&store).map_err(reject)?;
            return print_json(ledger.governance());
        }
        Command::Available { account } => {
            return print_json(&AvailableView {
                available: ledger.available(&account, now),
                account: &account,
                at: now,
            });
        }
        Command::Balance { account } => {
            return print_json(&BalanceView {
                balance: ledger.balance_of(&account),
                account: &account,
            });
        }
        Command::Snapshot { account } => {
            let position = ledger.position_snapshot(&account);
            let remaining = position.map(|p| {
                format_duration(p.duration.saturating_sub(p.elapsed(now)))
            });
            return print_json(&SnapshotView {
                account: &account,
                position,
                remaining,
            });
        }
        Command::Positions { account } => return print_json(&ledger.positions(&account)),
        Command::Delegation { address } => {
            return print_json(&DelegationView {
                address: &address,
                is_delegate: ledger.is_delegate(&address),
                acts_for: ledger.account_of(&address),
                delegate: ledger.delegate_of(&address),
            });
        }
        Command::Governance => return print_json(ledger.governance()),
        Command::Total => {
            return print_json(&TotalView {
                total_staked: ledger.total_staked(),
                accounts: ledger.account_count(),
            });
        }
        Command::ShowConfig => None,
    };

    ledger.save_to_store(&store).map_err(reject)?;
    tracing::debug!(transfers = gateway.entries().len(), "journal flushed");

    if let Some((op, account, position)) = receipt {
        print_json(&Receipt {
            op,
            balance: ledger.balance_of(&account),
            account,
            position,
        })?;
    }
    Ok(())
}
