//! [`Launcher`] that hands launch handles to an external opener.
//!
//! The opener (`xdg-open` by default) is spawned detached with the item's
//! path as its only argument; launchgrid does not wait for it.

use crate::item::Item;
use crate::traits::Launcher;
use log::info;
use std::process::{Command, Stdio};

/// Spawns `opener <path>` for every launch.
#[derive(Debug, Clone)]
pub struct OpenerLauncher {
    opener: String,
}

/// Error from spawning the opener.
#[derive(Debug, thiserror::Error)]
#[error("failed to launch {path} with {opener}: {source}")]
pub struct LaunchError {
    opener: String,
    path: String,
    #[source]
    source: std::io::Error,
}

impl OpenerLauncher {
    pub fn new(opener: impl Into<String>) -> Self {
        Self {
            opener: opener.into(),
        }
    }
}

impl Launcher for OpenerLauncher {
    type Error = LaunchError;

    fn launch(&self, item: &Item) -> Result<(), LaunchError> {
        Command::new(&self.opener)
            .arg(&item.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError {
                opener: self.opener.clone(),
                path: item.path.clone(),
                source,
            })?;
        info!("launched {} ({})", item.display_name, item.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_opener_reports_error() {
        let launcher = OpenerLauncher::new("/nonexistent/launchgrid-opener");
        let item = Item::new("a", "A", "org.a", "/a");
        let err = launcher.launch(&item).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/launchgrid-opener"));
    }

    #[cfg(unix)]
    #[test]
    fn spawns_opener() {
        let launcher = OpenerLauncher::new("true");
        let item = Item::new("a", "A", "org.a", "/a");
        launcher.launch(&item).unwrap();
    }
}
