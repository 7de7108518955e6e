//! Host configuration for the deck.
//!
//! The file keeps the layout the deck's host tooling has always used:
//!
//! ```toml
//! [config]
//! send_completed_notifs = true
//!
//! [config.display]
//! columns = 16
//! brightness = 255
//! notif_time_ms = 500
//!
//! [[command]]
//! command = "make -C ~/firmware"
//! log_message = "Building firmware"
//! report_message = ["Build", "finished"]
//! ```
//!
//! `[[command]]` entries are indexed by button number in file order.
//! Transport settings such as `port` and `baudrate` may be present and are
//! ignored here.

use anyhow::{bail, Context, Result};
use communique_core::messages::DEFAULT_COLUMNS;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Rows on the deck display
pub(crate) const DISPLAY_ROWS: usize = 2;

fn default_columns() -> usize {
    DEFAULT_COLUMNS
}

fn default_brightness() -> i32 {
    255
}

fn default_notif_time_ms() -> i32 {
    500
}

/// Parsed host configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DeckConfig {
    #[serde(default)]
    pub(crate) config: HostConfig,
    #[serde(default, rename = "command")]
    pub(crate) commands: Vec<ButtonCommand>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HostConfig {
    /// Answer each handled button press with a `DisplayText` report
    #[serde(default)]
    pub(crate) send_completed_notifs: bool,
    #[serde(default)]
    pub(crate) display: DisplayConfig,
}

/// Defaults for outgoing `DisplayText` messages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct DisplayConfig {
    #[serde(default = "default_columns")]
    pub(crate) columns: usize,
    #[serde(default = "default_brightness")]
    pub(crate) brightness: i32,
    #[serde(default = "default_notif_time_ms")]
    pub(crate) notif_time_ms: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            brightness: default_brightness(),
            notif_time_ms: default_notif_time_ms(),
        }
    }
}

/// What the host does when a button is pressed
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct ButtonCommand {
    /// Shell command to run
    pub(crate) command: Option<String>,
    /// Logged when the button is pressed
    pub(crate) log_message: Option<String>,
    /// Display rows sent back once the command completes
    pub(crate) report_message: Option<Vec<String>>,
}

impl DeckConfig {
    /// Load and validate a configuration file
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        contents
            .parse()
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Command bound to a button, if any
    pub(crate) fn button(&self, number: i32) -> Option<&ButtonCommand> {
        usize::try_from(number)
            .ok()
            .and_then(|index| self.commands.get(index))
    }

    /// Validate structural invariants
    pub(crate) fn validate(&self) -> Result<()> {
        if self.config.display.columns == 0 {
            bail!("config.display.columns must be at least 1");
        }

        for (index, command) in self.commands.iter().enumerate() {
            match &command.report_message {
                Some(rows) if rows.len() > DISPLAY_ROWS => bail!(
                    "command {}: report_message has {} rows, the display shows {}",
                    index,
                    rows.len(),
                    DISPLAY_ROWS
                ),
                None if self.config.send_completed_notifs => bail!(
                    "command {}: send_completed_notifs is set but no report_message is configured",
                    index
                ),
                _ => {}
            }
        }

        Ok(())
    }
}

impl FromStr for DeckConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> Result<Self> {
        let config: DeckConfig =
            toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}
