//! Read-only chain commands: verify, stats, export, show.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use zc_chain::{format_timestamp, verify_chain_signatures, ChainEngine};

use crate::config::Config;

fn open_chain(config: &Config) -> Result<ChainEngine> {
    ChainEngine::open(&config.chain_path)
        .with_context(|| format!("failed to load chain from {}", config.chain_path.display()))
}

/// Handle `zc chain-verify`.
pub fn cmd_verify(config: &Config, check_signatures: bool) -> Result<()> {
    let chain = open_chain(config)?;
    let report = chain.verify();

    let bad_signatures = if check_signatures {
        verify_chain_signatures(&chain.entries())
    } else {
        Vec::new()
    };

    if report.valid {
        println!("{} Hash chain structure valid", "✓".green().bold());
    } else {
        println!("{} Hash chain integrity check failed", "✗".red().bold());
        for problem in report.problems() {
            println!("  - {}", problem.red());
        }
    }

    if check_signatures {
        if bad_signatures.is_empty() {
            println!(
                "{} {} signatures verified",
                "✓".green().bold(),
                report.entries_verified
            );
        } else {
            println!("{} Invalid signatures", "✗".red().bold());
            for index in &bad_signatures {
                println!("  - {}", format!("bad signature at {index}").red());
            }
        }
    }

    let ok = report.valid && bad_signatures.is_empty();
    println!();
    println!("{}", "Summary:".bold().underline());
    println!("  {}: {}", "Entries".bold(), report.entries_verified);
    if ok {
        println!("  {}: {}", "Status".bold(), "VALID".green().bold());
        Ok(())
    } else {
        println!("  {}: {}", "Status".bold(), "INVALID".red().bold());
        bail!(
            "chain verification failed: {} integrity problem(s), {} bad signature(s)",
            report.issues.len(),
            bad_signatures.len()
        )
    }
}

/// Handle `zc chain-stats`.
pub fn cmd_stats(config: &Config) -> Result<()> {
    let chain = open_chain(config)?;
    let stats = chain.stats();

    println!("{}", "Chain Statistics".bold().underline());
    println!("{}: {}", "File".bold(), config.chain_path.display());
    println!("{}: {}", "Entries".bold(), stats.total_entries);
    println!("{}: {}", "Last Hash".bold(), stats.last_hash);
    if let Some(first) = &stats.first_timestamp {
        println!("{}: {}", "First Entry".bold(), format_timestamp(first));
    }
    if let Some(last) = &stats.last_timestamp {
        println!("{}: {}", "Last Entry".bold(), format_timestamp(last));
    }
    Ok(())
}

/// Handle `zc chain-export`: print the entries as JSON.
pub fn cmd_export(config: &Config) -> Result<()> {
    let chain = open_chain(config)?;
    println!("{}", chain.export_json()?);
    Ok(())
}

/// Handle `zc chain-show`: print a window of entries for humans.
pub fn cmd_show(config: &Config, offset: usize, limit: usize) -> Result<()> {
    let chain = open_chain(config)?;
    let page = chain.entries_page(offset, limit);

    if page.total == 0 {
        println!("{}", "Chain is empty".yellow());
        return Ok(());
    }

    println!("{}", "Log Chain".bold().underline());
    println!("{}: {}", "File".bold(), config.chain_path.display());
    println!("{}: {}", "Entries".bold(), page.total);
    println!();

    for (idx, entry) in page.entries.iter().enumerate() {
        let position = offset + idx;
        println!("{} {}", "Entry".bold().cyan(), position.to_string().cyan());
        println!("  {}: {}", "Timestamp".bold(), format_timestamp(&entry.timestamp));
        println!("  {}: {}", "Message".bold(), entry.message);
        println!("  {}: {}", "Public Key".bold(), entry.pubkey);
        println!("  {}: {}", "Prev Hash".bold(), entry.prev_hash);
        println!("  {}: {}", "Hash".bold(), entry.current_hash);
        if !entry.metadata.is_empty() {
            println!("  {}:", "Metadata".bold());
            for (key, value) in &entry.metadata {
                println!("    - {}: {}", key.green(), value);
            }
        }
        println!();
    }

    if page.entries.is_empty() {
        println!("{}", format!("No entries at offset {offset}").yellow());
    }
    Ok(())
}
