/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Proxy binary preferences.
//!
//! Settings resolve in precedence order: command line, then config file,
//! then built-in defaults. The config file is TOML; when `--config` is not
//! given the platform config directory is probed and a missing file is not
//! an error.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bpaf::Bpaf;
use serde::Deserialize;

use crate::services::proxy::ProxyConfig;

const CONFIG_FILE: &str = "config.toml";

/// Command-line options for the proxy server.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
pub struct Options {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[bpaf(argument("ADDR"))]
    pub listen: Option<SocketAddr>,

    /// Upstream Wikipedia REST API base URL
    #[bpaf(argument("URL"))]
    pub upstream: Option<String>,

    /// Path to a TOML config file
    #[bpaf(argument("PATH"))]
    pub config: Option<PathBuf>,
}

/// On-disk settings; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub listen: Option<SocketAddr>,
    pub upstream: Option<String>,
}

impl ConfigFile {
    fn read(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Parse the command line and resolve the effective proxy configuration.
pub fn load() -> anyhow::Result<ProxyConfig> {
    resolve(options().run())
}

fn resolve(opts: Options) -> anyhow::Result<ProxyConfig> {
    let file = match &opts.config {
        Some(path) => ConfigFile::read(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => ConfigFile::read(&path)?,
            _ => ConfigFile::default(),
        },
    };

    let defaults = ProxyConfig::default();
    Ok(ProxyConfig {
        listen: opts.listen.or(file.listen).unwrap_or(defaults.listen),
        upstream: opts.upstream.or(file.upstream).unwrap_or(defaults.upstream),
    })
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wikigraph").join(CONFIG_FILE))
}
