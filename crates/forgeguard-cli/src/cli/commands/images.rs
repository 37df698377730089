//! Image command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use forgeguard_core::api::ImageUpload;

use super::{analyze, confirm, print_json};
use crate::cli::app::App;
use crate::cli::render;

pub async fn list(app: &App, json: bool) -> Result<()> {
    let images = app.client().list_images().await?;
    if json {
        return print_json(&images);
    }
    if images.is_empty() {
        println!("No images found. Upload one with `forgeguard images upload <FILE>`.");
    } else {
        println!("{}", render::images_table(&images));
    }
    Ok(())
}

pub async fn show(app: &App, id: &str, json: bool) -> Result<()> {
    let image = app.client().get_image(id).await?;
    if json {
        return print_json(&image);
    }
    print!("{}", render::image_detail(&image));
    Ok(())
}

pub async fn upload(app: &App, file: &Path, analyze_after: bool, json: bool) -> Result<()> {
    let upload = ImageUpload::from_path(file)?;
    tracing::info!(filename = %upload.filename, mime = %upload.mime_type, "uploading image");
    let receipt = app
        .client()
        .upload_image(upload)
        .await
        .with_context(|| format!("upload {}", file.display()))?;

    if !json {
        println!("Uploaded {} as {}.", receipt.filename, receipt.id);
    }
    if analyze_after {
        return analyze::run_all(app, &receipt.id, json).await;
    }
    if json {
        return print_json(&serde_json::json!({
            "id": receipt.id,
            "filename": receipt.filename,
            "message": receipt.message,
        }));
    }
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<()> {
    let reply = app.client().delete_image(id).await?;
    println!("{}", non_empty(reply.message.as_deref(), "Image deleted."));
    Ok(())
}

pub async fn delete_all(app: &App, yes: bool) -> Result<()> {
    confirm(yes, "delete all of your images")?;
    let reply = app.client().delete_all_images().await?;
    println!("{}", non_empty(reply.message.as_deref(), "All images deleted."));
    Ok(())
}

pub(super) fn non_empty<'a>(message: Option<&'a str>, fallback: &'a str) -> &'a str {
    message.filter(|m| !m.trim().is_empty()).unwrap_or(fallback)
}
