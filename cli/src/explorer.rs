//! Opening explorer links in the operator's browser.

use std::time::Duration;

use tokio::process::Command;
use tracing::warn;

/// Pause between links so the browser is not flooded.
const OPEN_INTERVAL: Duration = Duration::from_secs(1);

fn opener(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

async fn open(url: &str) -> std::io::Result<()> {
    let status = opener(url).status().await?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("opener exited with {status}")))
    }
}

/// Open every URL in turn; any that cannot be opened is printed instead.
pub async fn open_all(urls: &[String]) {
    for (i, url) in urls.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(OPEN_INTERVAL).await;
        }
        if let Err(e) = open(url).await {
            warn!(%url, error = %e, "could not open browser");
            println!("Open manually: {url}");
        }
    }
}
