use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{anyhow, Result};
use url::Url;

use crate::{
    tracker::{
        storage::local_store::{JsonFileStore, LocalStore},
        sync::{
            http::{HttpLogStore, DEFAULT_ENDPOINT},
            LogStore,
        },
    },
    utils::{
        dir::resolve_application_path,
        percentage::{seconds_percentage, Percentage},
        time::format_duration,
    },
};

#[derive(Debug, clap::Args)]
pub struct StatusCommand {
    #[arg(
        long,
        env = "TABTALLY_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[command(flatten)]
    filter: SummaryFilter,
}

impl StatusCommand {
    pub fn dir(&self) -> Result<PathBuf> {
        resolve_application_path(self.dir.clone())
    }
}

#[derive(Debug, clap::Args)]
pub struct RemoteCommand {
    #[arg(
        long,
        env = "TABTALLY_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, env = "TABTALLY_ENDPOINT", default_value = DEFAULT_ENDPOINT, help = "Log store endpoint")]
    endpoint: Url,
    #[command(flatten)]
    filter: SummaryFilter,
}

impl RemoteCommand {
    pub fn dir(&self) -> Result<PathBuf> {
        resolve_application_path(self.dir.clone())
    }
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct SummaryFilter {
    #[arg(short, long, default_value_t = 10, help = "Number of sites to show")]
    top: usize,
    #[arg(short = 'p', long = "percentage", help = "Filter sites to have at least specified percentage", default_value_t = Percentage::new_opt(0.).unwrap())]
    min_percentage: Percentage,
}

#[derive(Debug, PartialEq)]
pub struct SiteUsage {
    pub site: String,
    pub seconds: u64,
    pub share: Percentage,
}

/// Sums time per site and orders sites from the most to the least used. Returns the kept sites
/// and the overall total.
pub fn summarize(
    entries: impl IntoIterator<Item = (String, u64)>,
    filter: SummaryFilter,
) -> (Vec<SiteUsage>, u64) {
    let mut per_site = BTreeMap::<String, u64>::new();
    for (site, seconds) in entries {
        *per_site.entry(site).or_insert(0) += seconds;
    }
    let total = per_site.values().sum();

    let mut usage = per_site
        .into_iter()
        .map(|(site, seconds)| SiteUsage {
            site,
            seconds,
            share: seconds_percentage(seconds, total),
        })
        .filter(|usage| usage.share >= filter.min_percentage)
        .collect::<Vec<_>>();
    usage.sort_by(|a, b| b.seconds.cmp(&a.seconds).then_with(|| a.site.cmp(&b.site)));
    usage.truncate(filter.top);
    (usage, total)
}

fn print_summary(usage: &[SiteUsage], total: u64) {
    for entry in usage {
        println!(
            "{}%\t{}\t{}",
            *entry.share as i32,
            format_duration(entry.seconds),
            entry.site
        );
    }
    println!("Total\t{}", format_duration(total));
}

/// Prints time accumulated locally that hasn't been synced yet.
pub async fn process_status_command(command: StatusCommand) -> Result<()> {
    let store = JsonFileStore::new(&command.dir()?)?;
    let time_logs = store.time_logs().await?;
    if time_logs.is_empty() {
        println!("No activity waiting to be synced.");
        return Ok(());
    }

    let (usage, total) = summarize(
        time_logs
            .into_iter()
            .map(|(site, seconds)| (site.to_string(), seconds)),
        command.filter,
    );
    print_summary(&usage, total);
    Ok(())
}

/// Prints what the log store holds for this user.
pub async fn process_remote_command(command: RemoteCommand) -> Result<()> {
    let store = JsonFileStore::new(&command.dir()?)?;
    let user_id = store
        .user_id()
        .await?
        .ok_or_else(|| anyhow!("No user id yet, the host hasn't run on this machine"))?;

    let log_store = HttpLogStore::new(command.endpoint)?;
    let Some(user_logs) = log_store.fetch(&user_id).await? else {
        println!("The log store has nothing for {user_id}.");
        return Ok(());
    };

    let (usage, total) = summarize(
        user_logs
            .logs
            .into_iter()
            .map(|entry| (entry.url, entry.time_spent)),
        command.filter,
    );
    print_summary(&usage, total);
    Ok(())
}
