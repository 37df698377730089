//! Admin command handlers.

use std::path::PathBuf;

use anyhow::{Result, bail};
use forgeguard_core::api::{NewUser, Role, UserUpdate};

use super::images::non_empty;
use super::{confirm, print_json};
use crate::cli::app::App;
use crate::cli::render;

pub async fn dashboard(app: &App, json: bool) -> Result<()> {
    let stats = app.client().admin_dashboard().await?;
    if json {
        return print_json(&stats);
    }
    println!("{}", render::dashboard(&stats));
    Ok(())
}

pub async fn users(app: &App, json: bool) -> Result<()> {
    let users = app.client().list_users().await?;
    if json {
        return print_json(&users);
    }
    if users.is_empty() {
        println!("No users found.");
    } else {
        println!("{}", render::users_table(&users));
    }
    Ok(())
}

pub async fn user(app: &App, id: &str, json: bool) -> Result<()> {
    let user = app.client().get_user(id).await?;
    if json {
        return print_json(&user);
    }
    print!("{}", render::user_detail(&user));
    Ok(())
}

pub async fn create_user(
    app: &App,
    email: &str,
    name: &str,
    password: &str,
    role: Role,
    json: bool,
) -> Result<()> {
    let new_user = NewUser {
        email: email.trim(),
        password,
        name: name.trim(),
        role,
    };
    let user = app.client().create_user(&new_user).await?;
    if json {
        return print_json(&user);
    }
    println!("Created user {} ({}).", user.email, user.id);
    Ok(())
}

pub async fn update_user(app: &App, id: &str, update: &UserUpdate, json: bool) -> Result<()> {
    if update.is_empty() {
        bail!("Nothing to update. Pass at least one of --email, --name, --role, --password.");
    }
    let user = app.client().update_user(id, update).await?;
    if json {
        return print_json(&user);
    }
    println!("Updated user {}.", user.id);
    print!("{}", render::user_detail(&user));
    Ok(())
}

pub async fn delete_user(app: &App, id: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("delete user {id}"))?;
    let reply = app.client().delete_user(id).await?;
    println!("{}", non_empty(reply.message.as_deref(), "User deleted."));
    Ok(())
}

pub async fn user_images(app: &App, id: &str, json: bool) -> Result<()> {
    let images = app.client().list_user_images(id).await?;
    if json {
        return print_json(&images);
    }
    if images.is_empty() {
        println!("User {id} has no images.");
    } else {
        println!("{}", render::images_table(&images));
    }
    Ok(())
}

pub async fn user_image(app: &App, user_id: &str, image_id: &str, json: bool) -> Result<()> {
    let image = app.client().get_user_image(user_id, image_id).await?;
    if json {
        return print_json(&image);
    }
    print!("{}", render::image_detail(&image));
    Ok(())
}

pub async fn delete_user_image(app: &App, user_id: &str, image_id: &str) -> Result<()> {
    let reply = app.client().delete_user_image(user_id, image_id).await?;
    println!("{}", non_empty(reply.message.as_deref(), "Image deleted."));
    Ok(())
}

pub async fn delete_user_images(app: &App, id: &str, yes: bool) -> Result<()> {
    confirm(yes, &format!("delete all images of user {id}"))?;
    let reply = app.client().delete_user_images(id).await?;
    println!("{}", non_empty(reply.message.as_deref(), "All images deleted."));
    Ok(())
}

pub async fn download(app: &App, id: &str, output: Option<PathBuf>) -> Result<()> {
    let dir = app.download_dir(output);
    let archive = app.client().download_user_data(id).await?;
    let path = archive.save_to(&dir).await?;
    println!("Saved {}", path.display());
    Ok(())
}
