//! Built-in display surfaces
//!
//! Both surfaces consume the core's command stream until the sender side is
//! dropped. Neither renders pixels: `log` narrates commands through tracing
//! and `json` writes one serialized command per line to stdout.

use anyhow::{Context, Result};
use clap::ValueEnum;
use roomboard_core::DisplayCommand;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::info;

/// Where display commands go
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Structured log lines on stderr
    #[default]
    Log,
    /// JSON lines on stdout
    Json,
}

/// Drain `rx` into the chosen surface
pub async fn run(format: OutputFormat, mut rx: mpsc::Receiver<DisplayCommand>) -> Result<()> {
    match format {
        OutputFormat::Log => {
            while let Some(command) = rx.recv().await {
                log_command(&command);
            }
        }
        OutputFormat::Json => {
            let mut stdout = BufWriter::new(tokio::io::stdout());
            while let Some(command) = rx.recv().await {
                let line = json_line(&command)?;
                stdout
                    .write_all(line.as_bytes())
                    .await
                    .context("Failed to write to stdout")?;
                // flush per batch so a renderer sees frames promptly
                if rx.is_empty() {
                    stdout.flush().await.context("Failed to flush stdout")?;
                }
            }
            stdout.flush().await.context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

fn json_line(command: &DisplayCommand) -> Result<String> {
    let mut line = serde_json::to_string(command).context("Failed to serialize command")?;
    line.push('\n');
    Ok(line)
}

fn log_command(command: &DisplayCommand) {
    match command {
        DisplayCommand::SetBackground { color } => info!(%color, "Background"),
        DisplayCommand::SetStatusColor { color } => info!(%color, "Status strip"),
        DisplayCommand::SetText { region, text } => info!(%region, text = %text, "Text"),
        DisplayCommand::SetSlots { slots } => {
            for (index, slot) in slots.iter().enumerate() {
                info!(slot = index + 1, time = %slot.time, name = %slot.name, "Upcoming");
            }
        }
        DisplayCommand::WipeStatusColor { from, to, tween } => {
            info!(%from, %to, duration_ms = tween.duration_ms, "Status strip wipe");
        }
        other => tracing::debug!(command = other.kind(), ?other, "Animation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomboard_core::{RegionId, Rgb};

    #[test]
    fn test_json_line_is_tagged() {
        let line = json_line(&DisplayCommand::SetText {
            region: RegionId::Name,
            text: "Standup".to_string(),
        })
        .unwrap();

        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["type"], "set_text");
        assert_eq!(value["text"], "Standup");
    }

    #[test]
    fn test_colors_serialize_as_hex() {
        let line = json_line(&DisplayCommand::SetStatusColor {
            color: Rgb::new(0x82, 0xD1, 0x73),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["color"], "#82D173");
    }

    #[tokio::test]
    async fn test_log_surface_drains_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(DisplayCommand::SetBackground { color: Rgb::BLACK })
            .await
            .unwrap();
        drop(tx);

        run(OutputFormat::Log, rx).await.unwrap();
    }
}
