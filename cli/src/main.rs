//! JIBJIB CLI - run ledger operations against a local snapshot
//!
//! Each invocation loads the snapshot, performs one operation with the
//! system clock and saves the snapshot again if anything changed.

mod config;
mod output;

use clap::{Parser, Subcommand};
use jibjib_core::{SystemClock, TokenId, UserId};
use jibjib_ledger::{Donation, MeditationLedger};
use jibjib_storage::Storage;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use config::{expand_path, load_config, CONFIG_FILE, DEFAULT_DATA_DIR};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "jibjib")]
#[command(about = "JIBJIB meditation reward ledger", version)]
struct Cli {
    /// Account performing the operation
    #[arg(short, long, global = true)]
    user: Option<UserId>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the ledger snapshot
    #[arg(short, long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Begin a meditation session
    Start {
        /// Token to settle a stale previous session in
        #[arg(short, long)]
        token: Option<TokenId>,
    },

    /// Complete the open session and collect its reward
    Complete {
        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Claim rewards owed from earlier treasury shortfalls
    Claim {
        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Donate to the treasury
    Donate {
        amount: u64,

        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Show session statistics
    Stats,

    /// Show when the next reward can be earned
    Eligibility,

    /// Show owed rewards
    Pending,

    /// Show the treasury balance of a token
    Balance {
        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Show the base reward of a token
    RewardAmount {
        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Show the required session length
    Duration,

    /// Set the base reward of a token (owner only)
    SetReward {
        amount: u64,

        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Set the display symbol of a token (owner only)
    SetSymbol {
        symbol: String,

        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Withdraw treasury funds (owner only)
    Withdraw {
        amount: u64,

        #[arg(short, long, default_value = "native")]
        token: TokenId,
    },

    /// Show every treasury fund
    Report,

    /// Show the event journal
    Events {
        /// Number of most recent events to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },
}

impl Commands {
    /// True if the command can change ledger state
    fn mutates(&self) -> bool {
        matches!(
            self,
            Commands::Start { .. }
                | Commands::Complete { .. }
                | Commands::Claim { .. }
                | Commands::Donate { .. }
                | Commands::SetReward { .. }
                | Commands::SetSymbol { .. }
                | Commands::Withdraw { .. }
        )
    }
}

fn require_user(user: Option<&UserId>) -> CliResult<&UserId> {
    user.ok_or_else(|| "this command needs --user".into())
}

fn run(
    ledger: &mut MeditationLedger<SystemClock>,
    user: Option<&UserId>,
    command: &Commands,
) -> CliResult<()> {
    match command {
        Commands::Start { token } => {
            let user = require_user(user)?;
            let start = ledger.start_meditation(user, token.clone())?;
            output::print_start(&start);
            println!(
                "Complete in {} or later",
                output::format_duration(ledger.get_meditation_duration())
            );
        }

        Commands::Complete { token } => {
            let user = require_user(user)?;
            let completion = ledger.complete_meditation(user, token)?;
            output::print_completion(&completion);
        }

        Commands::Claim { token } => {
            let user = require_user(user)?;
            let paid = ledger.claim_pending_reward(user, token)?;
            println!(
                "{} {} {}",
                "✓ Claimed".green().bold(),
                paid,
                output::token_label(ledger, token)
            );
        }

        Commands::Donate { amount, token } => {
            let donation = if token.is_native() {
                Donation::native(*amount)
            } else {
                Donation::token(token.clone(), *amount)
            };
            let credited = ledger.donate(user, &donation)?;
            println!(
                "{} {} {}. Thank you!",
                "✓ Donated".green().bold(),
                credited,
                output::token_label(ledger, token)
            );
        }

        Commands::Stats => {
            let user = require_user(user)?;
            output::print_stats(user, &ledger.get_user_stats(user));
        }

        Commands::Eligibility => {
            let user = require_user(user)?;
            let view = ledger.get_reward_eligibility(user);
            output::print_eligibility(user, &view, ledger.config().daily_cap);
        }

        Commands::Pending => {
            let user = require_user(user)?;
            let owed = ledger.state().pending.pending_for(user);
            if owed.is_empty() {
                println!("Nothing owed to {}", user);
            }
            for (token, amount) in owed {
                println!(
                    "{} {}",
                    amount.to_string().yellow(),
                    output::token_label(ledger, &token)
                );
            }
        }

        Commands::Balance { token } => {
            println!(
                "{} {}",
                ledger.get_token_balance(token).to_string().green(),
                output::token_label(ledger, token)
            );
        }

        Commands::RewardAmount { token } => {
            println!(
                "{} {} per session",
                ledger.get_reward_amount(token),
                output::token_label(ledger, token)
            );
        }

        Commands::Duration => {
            println!("{} seconds", ledger.get_meditation_duration());
        }

        Commands::SetReward { amount, token } => {
            let user = require_user(user)?;
            ledger.set_reward_amount(user, token, *amount)?;
            println!("{} {} now rewards {}", "✓".green(), token, amount);
        }

        Commands::SetSymbol { symbol, token } => {
            let user = require_user(user)?;
            ledger.set_token_symbol(user, token, symbol)?;
            println!("{} {} is now shown as {}", "✓".green(), token, symbol);
        }

        Commands::Withdraw { amount, token } => {
            let user = require_user(user)?;
            ledger.withdraw(user, token, *amount)?;
            println!(
                "{} {} {} to {}",
                "✓ Withdrew".green().bold(),
                amount,
                output::token_label(ledger, token),
                user
            );
        }

        Commands::Report => output::print_report(&ledger.treasury_report()),

        Commands::Events { count } => {
            let events: Vec<_> = match user {
                Some(user) => ledger.events_for(user).collect(),
                None => ledger.events().iter().collect(),
            };
            let skip = events.len().saturating_sub(*count);
            output::print_events(events.into_iter().skip(skip));
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> CliResult<()> {
    let default_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| expand_path(DEFAULT_DATA_DIR));
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_dir.join(CONFIG_FILE));
    let config = load_config(&config_path)?;

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.storage.data_dir.as_deref().map(expand_path))
        .unwrap_or(default_dir);
    let storage = Storage::open(&data_dir)?;
    let snapshot = config.storage.snapshot_name.as_str();

    let first_run = !storage.has_snapshot(snapshot);
    let state = storage.load_ledger(snapshot)?;
    // A wall clock stepped back between runs still reads no earlier than
    // what the ledger has already recorded
    let clock = SystemClock::with_floor(state.latest_timestamp());
    let mut ledger = MeditationLedger::with_state(state, config.ledger.clone(), clock)?;

    if first_run {
        for token in &config.tokens {
            ledger.register_token(&token.id, token.reward_amount, token.symbol.as_deref());
        }
    }

    // Failed operations leave the ledger untouched, so only the seeding
    // above would still need saving
    let result = run(&mut ledger, cli.user.as_ref(), &cli.command);
    if first_run || (result.is_ok() && cli.command.mutates()) {
        storage.save_ledger(snapshot, ledger.state())?;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_donate() {
        let cli = Cli::try_parse_from([
            "jibjib",
            "--user",
            "alice",
            "donate",
            "50",
            "--token",
            "0xEBe937eE67e3219D176965cC08110A258F925E01",
        ])
        .unwrap();

        assert_eq!(cli.user, Some(UserId::new("alice")));
        match cli.command {
            Commands::Donate { amount, token } => {
                assert_eq!(amount, 50);
                assert!(!token.is_native());
            }
            _ => panic!("expected donate"),
        }
    }

    #[test]
    fn test_token_defaults_to_native() {
        let cli = Cli::try_parse_from(["jibjib", "complete", "-u", "bob"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Complete {
                token: TokenId::Native
            }
        ));
        assert!(cli.command.mutates());
    }

    #[test]
    fn test_run_against_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[[tokens]]\nid = \"native\"\nsymbol = \"JBC\"\nreward_amount = 10\n",
        )
        .unwrap();

        let donate = Cli::try_parse_from(["jibjib", "-d", data_dir, "donate", "25"]).unwrap();
        execute(donate).unwrap();

        let storage = Storage::open(dir.path()).unwrap();
        let state = storage.load_ledger("ledger").unwrap();
        assert_eq!(state.treasury.balance(&TokenId::Native), 25);
        assert_eq!(state.treasury.reward_amount(&TokenId::Native), 10);

        let start = Cli::try_parse_from(["jibjib", "-d", data_dir, "-u", "alice", "start"]).unwrap();
        execute(start).unwrap();
        let complete =
            Cli::try_parse_from(["jibjib", "-d", data_dir, "-u", "alice", "complete"]).unwrap();
        assert!(execute(complete).is_err());

        let state = storage.load_ledger("ledger").unwrap();
        assert_eq!(state.sessions.open_sessions(), 1);
    }

    #[test]
    fn test_clock_never_reads_before_snapshot() {
        use jibjib_core::{LedgerConfig, ManualClock};

        // 2100-01-01, later than any wall clock running this test
        const LATER: u64 = 4_102_444_800;

        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let mut ledger =
            MeditationLedger::new(LedgerConfig::default(), ManualClock::new(LATER)).unwrap();
        ledger.donate(None, &Donation::native(25)).unwrap();
        storage.save_ledger("ledger", ledger.state()).unwrap();

        let start = Cli::try_parse_from(["jibjib", "-d", data_dir, "-u", "alice", "start"]).unwrap();
        execute(start).unwrap();

        let state = storage.load_ledger("ledger").unwrap();
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.events[1].timestamp(), LATER);
        assert_eq!(state.latest_timestamp(), LATER);
    }
}
