//! Terminal rendering of ledger results

use jibjib_core::{format_timestamp, Clock, TokenId, UserId};
use jibjib_ledger::{
    Completion, Ineligibility, LedgerEvent, MeditationLedger, Outcome, RewardEligibility,
    SessionStart, UserStats,
};
use jibjib_treasury::TreasuryReport;
use owo_colors::OwoColorize;

const RULE: &str = "═══════════════════════════════════";

fn header(title: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", RULE.bright_black());
}

/// Token with its symbol when one is configured
pub fn token_label<C: Clock>(ledger: &MeditationLedger<C>, token: &TokenId) -> String {
    match ledger.state().treasury.symbol(token) {
        Some(symbol) => format!("{} ({})", symbol, token),
        None => token.to_string(),
    }
}

pub fn print_start(start: &SessionStart) {
    if let Some(finalized) = &start.finalized {
        println!("{}", "Previous session was still open and has been closed:".yellow());
        print_completion(finalized);
    }
    println!(
        "{} at {}",
        "🧘 Meditation started".green().bold(),
        format_timestamp(start.started_at)
    );
}

pub fn print_completion(completion: &Completion) {
    let minutes = completion
        .completed_at
        .saturating_sub(completion.started_at)
        / 60;

    match completion.outcome {
        Outcome::Rewarded { amount, bonus } => {
            println!(
                "{} {} {}{}",
                "✓ Rewarded".green().bold(),
                amount.to_string().green(),
                completion.token,
                if bonus { " (bonus hour)" } else { "" }
            );
        }
        Outcome::PendingStored { amount, bonus } => {
            println!(
                "{} {} {} owed{}",
                "⚠ Treasury short:".yellow().bold(),
                amount.to_string().yellow(),
                completion.token,
                if bonus { " (bonus hour)" } else { "" }
            );
        }
        Outcome::RecordedOnly { reason } => {
            println!(
                "{} {}",
                "Session recorded, no reward:".bright_white(),
                describe_ineligibility(reason)
            );
        }
    }
    println!("  Session length: {} min", minutes);
}

fn describe_ineligibility(reason: Ineligibility) -> String {
    match reason {
        Ineligibility::DailyCapReached => "daily limit reached".to_string(),
        Ineligibility::CoolingDown { remaining } => {
            format!("next reward in {}", format_duration(remaining))
        }
        Ineligibility::UnsupportedToken => "token has no reward configured".to_string(),
    }
}

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, m) => format!("{}m", m),
        (h, m) => format!("{}h {}m", h, m),
    }
}

pub fn print_stats(user: &UserId, stats: &UserStats) {
    header("📊 Meditation Stats");
    println!("User:             {}", user);
    println!("Total sessions:   {}", stats.total_sessions.to_string().green());
    println!("Rewarded:         {}", stats.total_rewarded);
    println!("Today:            {}", stats.today_session_count);
    if stats.last_session_time > 0 {
        println!("Last session:     {}", format_timestamp(stats.last_session_time));
    }
    println!(
        "Meditating:       {}",
        if stats.is_meditating { "yes" } else { "no" }
    );
    if stats.can_claim {
        println!("{}", "Pending rewards available to claim".yellow());
    }
    println!();
}

pub fn print_eligibility(user: &UserId, view: &RewardEligibility, daily_cap: u32) {
    header("⏳ Reward Eligibility");
    println!("User:             {}", user);
    println!("Today:            {}/{}", view.today_session_count, daily_cap);
    if view.can_get_reward {
        println!("{}", "Next completion is eligible for a reward".green());
    } else if view.seconds_until_reward > 0 {
        println!(
            "Next reward in:   {}",
            format_duration(view.seconds_until_reward).yellow()
        );
    } else {
        println!("{}", "Daily limit reached".yellow());
    }
    println!();
}

pub fn print_report(report: &TreasuryReport) {
    header("💰 Treasury");
    for fund in &report.funds {
        let name = fund
            .symbol
            .clone()
            .unwrap_or_else(|| fund.token.to_string());
        println!("{}", name.bright_white().bold());
        println!("  Token:        {}", fund.token);
        println!("  Reward:       {}", fund.reward_amount);
        println!("  Balance:      {}", fund.balance.to_string().green());
        println!("  Donated:      {}", fund.total_deposited);
        println!("  Paid out:     {}", fund.total_paid);
        println!("  Withdrawn:    {}", fund.total_withdrawn);
    }
    println!("Transactions:   {}", report.transaction_count);
    println!();
}

pub fn print_events<'a>(events: impl Iterator<Item = &'a LedgerEvent>) {
    header("📜 Events");
    for event in events {
        println!(
            "[{}] {} {}",
            format_timestamp(event.timestamp()),
            event.name().bright_blue(),
            describe_event(event)
        );
    }
    println!();
}

fn describe_event(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::SessionStarted { user, .. } => user.to_string(),
        LedgerEvent::SessionCompleted {
            user,
            outcome,
            auto_finalized,
            ..
        } => format!(
            "{} {}{}",
            user,
            outcome.label(),
            if *auto_finalized { " (auto)" } else { "" }
        ),
        LedgerEvent::RewardPaid {
            user, token, amount, ..
        }
        | LedgerEvent::PendingRewardStored {
            user, token, amount, ..
        }
        | LedgerEvent::PendingRewardClaimed {
            user, token, amount, ..
        } => format!("{} {} {}", user, amount, token),
        LedgerEvent::Donated {
            donor,
            token,
            amount,
            ..
        } => match donor {
            Some(donor) => format!("{} {} from {}", amount, token, donor),
            None => format!("{} {}", amount, token),
        },
        LedgerEvent::Withdrawn { to, token, amount, .. } => {
            format!("{} {} to {}", amount, token, to)
        }
        LedgerEvent::RewardAmountSet { token, amount, .. } => format!("{} = {}", token, amount),
    }
}
