//! # abd-config
//!
//! Loads the replica address list a client session is configured
//! against (spec.md §6: "a list of N replica addresses, supplied
//! externally as a line-oriented list"). Grounded in both
//! `ABDClient_async.cpp`'s `servers.conf` reader and the teacher's
//! `kimberlite-config::loader::ConfigLoader` builder-pattern style.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Builder for loading a replica address list from a line-oriented file.
///
/// Each non-empty, non-`#`-prefixed line is one `host:port` address.
pub struct ReplicaListLoader {
    path: PathBuf,
}

impl ReplicaListLoader {
    /// Starts a loader pointed at the conventional `servers.conf` in the
    /// current directory; override with [`ReplicaListLoader::with_path`].
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("servers.conf"),
        }
    }

    /// Sets the path to read the replica list from.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Reads and parses the replica list.
    pub fn load(self) -> Result<Vec<SocketAddr>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read replica list at {}", self.path.display()))?;

        let addrs = parse_replica_list(&contents).with_context(|| {
            format!("failed to parse replica list at {}", self.path.display())
        })?;

        anyhow::ensure!(
            !addrs.is_empty(),
            "no replica addresses found in {}",
            self.path.display()
        );

        Ok(addrs)
    }
}

impl Default for ReplicaListLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a line-oriented replica list, skipping blank lines and `#`
/// comments, the same convention as `ABDClient_async.cpp`'s
/// `servers.conf` reader.
fn parse_replica_list(contents: &str) -> Result<Vec<SocketAddr>> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.parse::<SocketAddr>()
                .with_context(|| format!("invalid replica address: {line:?}"))
        })
        .collect()
}
