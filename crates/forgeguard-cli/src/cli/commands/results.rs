//! Result image command handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::app::App;

pub async fn fetch(app: &App, filename: &str, output: Option<PathBuf>, open_after: bool) -> Result<()> {
    let dir = app.download_dir(output);
    let download = app.client().fetch_protected_image(filename).await?;
    let path = download.save_to(&dir).await?;
    println!("Saved {}", path.display());

    if open_after {
        open::that(&path).with_context(|| format!("open {}", path.display()))?;
    }
    Ok(())
}
