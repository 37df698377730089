//! Wire types exchanged with the analysis backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role. Only `Admin` changes which navigation set is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("Unknown role: {other} (expected user, admin or employee)")),
        }
    }
}

/// The user half of a session, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SessionUser {
    /// Name when present, email otherwise.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

/// Final verdict of the phase 2 classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Forged,
    Authentic,
    #[default]
    Pending,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Forged => f.write_str("forged"),
            Prediction::Authentic => f.write_str("authentic"),
            Prediction::Pending => f.write_str("pending"),
        }
    }
}

/// Analysis state for one image, produced entirely by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub image_id: String,
    #[serde(default)]
    pub phase1_complete: bool,
    #[serde(default)]
    pub phase2_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1_heatmap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2_mask: Option<String>,
    #[serde(default)]
    pub prediction: Prediction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_forged: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_authentic: Option<f64>,
    pub created_at: String,
}

/// An uploaded image, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub filename: String,
    pub original_url: String,
    pub uploaded_at: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageList {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Plain `{ "message": ... }` reply of delete/logout endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageReply {
    /// Absent or `null` when the backend has nothing to say
    #[serde(default)]
    pub message: Option<String>,
}

/// A user account as seen by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub role: Role,
}

/// Partial update; absent fields are left unchanged by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.role.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUploads {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisBreakdown {
    pub forged: u64,
    pub authentic: u64,
    pub pending: u64,
}

/// Aggregate counts for the admin overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_images: u64,
    pub forged_images: u64,
    pub authentic_images: u64,
    pub pending_analysis: u64,
    #[serde(default)]
    pub recent_uploads: Vec<DailyUploads>,
    #[serde(default)]
    pub analysis_breakdown: AnalysisBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" employee ".parse::<Role>().unwrap(), Role::Employee);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_session_user_without_name() {
        let user: SessionUser =
            serde_json::from_str(r#"{"id":"u1","email":"a@b.com","role":"employee"}"#).unwrap();
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.display_name(), "a@b.com");

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("name"));
    }

    #[test]
    fn test_analysis_result_before_phase2() {
        let json = r#"{
            "id": "a1",
            "image_id": "img1",
            "phase1_complete": true,
            "phase2_complete": false,
            "phase1_heatmap": "heatmap_img1.png",
            "prediction": "pending",
            "created_at": "2025-01-10T12:00:00Z"
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.phase1_complete);
        assert!(!result.phase2_complete);
        assert_eq!(result.prediction, Prediction::Pending);
        assert_eq!(result.phase1_heatmap.as_deref(), Some("heatmap_img1.png"));
        assert!(result.phase2_mask.is_none());
    }

    #[test]
    fn test_user_update_skips_absent_fields() {
        let update = UserUpdate {
            name: Some("Grace".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"name":"Grace"}"#);
        assert!(!update.is_empty());
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn test_dashboard_stats_defaults_optional_sections() {
        let json = r#"{"total_users":3,"total_images":10,"forged_images":2,"authentic_images":5,"pending_analysis":3}"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_images, 10);
        assert!(stats.recent_uploads.is_empty());
        assert_eq!(stats.analysis_breakdown, AnalysisBreakdown::default());
    }
}
