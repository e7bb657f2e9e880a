use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

pub const HOST_NAME: &str = "com.tabtally.host";

#[derive(Debug, clap::Args)]
pub struct ManifestCommand {
    #[arg(long = "extension-id", help = "Id of the extension allowed to start the host")]
    extension_id: Vec<String>,
    #[arg(
        long = "host-path",
        help = "Path to tabtally-host. By default it's looked up next to this executable"
    )]
    host_path: Option<PathBuf>,
}

/// Native messaging manifest the browser reads to find and launch the host.
#[derive(Debug, Serialize)]
pub struct HostManifest {
    pub name: &'static str,
    pub description: &'static str,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub allowed_origins: Vec<String>,
}

impl HostManifest {
    pub fn new(path: PathBuf, extension_ids: &[String]) -> Self {
        Self {
            name: HOST_NAME,
            description: env!("CARGO_PKG_DESCRIPTION"),
            path,
            kind: "stdio",
            allowed_origins: extension_ids
                .iter()
                .map(|id| format!("chrome-extension://{id}/"))
                .collect(),
        }
    }
}

/// The host binary is installed next to the cli.
pub fn to_host_path(mut path: PathBuf) -> PathBuf {
    path.set_file_name("tabtally-host");
    #[cfg(windows)]
    {
        path.set_extension("exe");
    }
    path
}

pub fn process_manifest_command(command: ManifestCommand) -> Result<()> {
    let path = match command.host_path {
        Some(path) => path,
        None => to_host_path(
            std::env::current_exe().context("Can't locate the current executable")?,
        ),
    };
    let manifest = HostManifest::new(path, &command.extension_id);
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
