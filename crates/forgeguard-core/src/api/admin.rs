//! Administrator endpoints: overview, user management and per-user data.

use super::client::{ApiClient, RequestOptions, segment};
use super::download::Download;
use super::error::ApiResult;
use super::types::{DashboardStats, Image, ImageList, MessageReply, NewUser, User, UserList, UserUpdate};

/// Archive name for a user's data export.
pub fn user_archive_name(user_id: &str) -> String {
    format!("user_{user_id}_data.zip")
}

fn user_path(user_id: &str) -> String {
    format!("/api/admin/users/{}", segment(user_id))
}

impl ApiClient {
    /// `GET /api/admin/dashboard`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn admin_dashboard(&self) -> ApiResult<DashboardStats> {
        self.request_json("/api/admin/dashboard", RequestOptions::get())
            .await
    }

    /// `GET /api/admin/users`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        let list: UserList = self
            .request_json("/api/admin/users", RequestOptions::get())
            .await?;
        Ok(list.users)
    }

    /// `POST /api/admin/users`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn create_user(&self, user: &NewUser<'_>) -> ApiResult<User> {
        self.request_json("/api/admin/users", RequestOptions::post().json(user)?)
            .await
    }

    /// `GET /api/admin/users/{id}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.request_json(&user_path(user_id), RequestOptions::get())
            .await
    }

    /// `PUT /api/admin/users/{id}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> ApiResult<User> {
        self.request_json(&user_path(user_id), RequestOptions::put().json(update)?)
            .await
    }

    /// `DELETE /api/admin/users/{id}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn delete_user(&self, user_id: &str) -> ApiResult<MessageReply> {
        self.request_or_default(&user_path(user_id), RequestOptions::delete())
            .await
    }

    /// `GET /api/admin/users/{id}/images`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn list_user_images(&self, user_id: &str) -> ApiResult<Vec<Image>> {
        let list: ImageList = self
            .request_json(&format!("{}/images", user_path(user_id)), RequestOptions::get())
            .await?;
        Ok(list.images)
    }

    /// `DELETE /api/admin/users/{id}/images`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn delete_user_images(&self, user_id: &str) -> ApiResult<MessageReply> {
        self.request_or_default(
            &format!("{}/images", user_path(user_id)),
            RequestOptions::delete(),
        )
        .await
    }

    /// `GET /api/admin/users/{id}/images/{imageId}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn get_user_image(&self, user_id: &str, image_id: &str) -> ApiResult<Image> {
        self.request_json(
            &format!("{}/images/{}", user_path(user_id), segment(image_id)),
            RequestOptions::get(),
        )
        .await
    }

    /// `DELETE /api/admin/users/{id}/images/{imageId}`.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError).
    pub async fn delete_user_image(&self, user_id: &str, image_id: &str) -> ApiResult<MessageReply> {
        self.request_or_default(
            &format!("{}/images/{}", user_path(user_id), segment(image_id)),
            RequestOptions::delete(),
        )
        .await
    }

    /// `GET /api/admin/users/{id}/download`: zip archive of the user's data.
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](super::ApiError), or `Decode` if the
    /// backend answers with JSON instead of an archive.
    pub async fn download_user_data(&self, user_id: &str) -> ApiResult<Download> {
        let response = self
            .request(&format!("{}/download", user_path(user_id)), RequestOptions::get())
            .await?;
        Download::from_response(response, user_archive_name(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_archive_name() {
        assert_eq!(user_archive_name("42"), "user_42_data.zip");
    }

    #[test]
    fn test_user_path_encodes_id() {
        assert_eq!(user_path("a b"), "/api/admin/users/a%20b");
    }
}
