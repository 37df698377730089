//! Terminal rendering: tables, detail blocks and error reports.

use chrono::{DateTime, Local};
use comfy_table::{ContentArrangement, Table};
use forgeguard_core::api::{AnalysisResult, ApiError, DashboardStats, Image, Prediction, User};
use forgeguard_core::pipeline::phase2_available;

/// Formats an RFC 3339 timestamp in local time; unparseable values pass
/// through unchanged.
pub fn timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().copied());
    table
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |p| format!("{:.1}%", p * 100.0))
}

/// One-word analysis status for list views.
pub fn status(analysis: Option<&AnalysisResult>) -> String {
    match analysis {
        None => "not analyzed".to_string(),
        Some(a) if a.phase2_complete => a.prediction.to_string(),
        Some(a) if a.phase1_complete => "phase 1 done".to_string(),
        Some(_) => "pending".to_string(),
    }
}

pub fn images_table(images: &[Image]) -> String {
    let mut table = table(&["ID", "Filename", "Uploaded", "Status"]);
    for image in images {
        table.add_row(vec![
            image.id.clone(),
            image.filename.clone(),
            timestamp(&image.uploaded_at),
            status(image.analysis.as_ref()),
        ]);
    }
    table.to_string()
}

pub fn image_detail(image: &Image) -> String {
    let mut out = format!(
        "Image {}\n  Filename:  {}\n  Uploaded:  {}\n  Owner:     {}\n  URL:       {}\n",
        image.id,
        image.filename,
        timestamp(&image.uploaded_at),
        image.user_id,
        image.original_url,
    );
    match &image.analysis {
        Some(analysis) => out.push_str(&analysis_detail(analysis)),
        None => out.push_str("\nNot analyzed yet.\n"),
    }
    out
}

pub fn analysis_detail(analysis: &AnalysisResult) -> String {
    let check = |done: bool| if done { "complete" } else { "pending" };
    let mut out = format!(
        "\nAnalysis {}\n  Phase 1 (ELA):  {}\n  Phase 2 (CNN):  {}\n",
        analysis.id,
        check(analysis.phase1_complete),
        check(analysis.phase2_complete),
    );
    if let Some(heatmap) = &analysis.phase1_heatmap {
        out.push_str(&format!("  Heatmap:        {heatmap}\n"));
    }
    if let Some(mask) = &analysis.phase2_mask {
        out.push_str(&format!("  Mask:           {mask}\n"));
    }
    if analysis.phase2_complete {
        let verdict = match analysis.prediction {
            Prediction::Forged => "FORGED",
            Prediction::Authentic => "AUTHENTIC",
            Prediction::Pending => "PENDING",
        };
        out.push_str(&format!(
            "  Verdict:        {verdict} (forged {}, authentic {})\n",
            percent(analysis.probability_forged),
            percent(analysis.probability_authentic),
        ));
    } else if phase2_available(Some(analysis)) {
        out.push_str(&format!(
            "\nPhase 2 is available: forgeguard analyze phase2 {}\n",
            analysis.image_id
        ));
    }
    out
}

pub fn users_table(users: &[User]) -> String {
    let mut table = table(&["ID", "Email", "Name", "Role", "Images", "Created"]);
    for user in users {
        table.add_row(vec![
            user.id.clone(),
            user.email.clone(),
            user.name.clone(),
            user.role.to_string(),
            user.image_count.map_or_else(|| "-".to_string(), |c| c.to_string()),
            timestamp(&user.created_at),
        ]);
    }
    table.to_string()
}

pub fn user_detail(user: &User) -> String {
    let mut out = format!(
        "User {}\n  Email:    {}\n  Name:     {}\n  Role:     {}\n",
        user.id, user.email, user.name, user.role
    );
    if !user.created_at.is_empty() {
        out.push_str(&format!("  Created:  {}\n", timestamp(&user.created_at)));
    }
    if let Some(count) = user.image_count {
        out.push_str(&format!("  Images:   {count}\n"));
    }
    out
}

pub fn dashboard(stats: &DashboardStats) -> String {
    let mut totals = table(&["Users", "Images", "Forged", "Authentic", "Pending"]);
    totals.add_row(vec![
        stats.total_users.to_string(),
        stats.total_images.to_string(),
        stats.forged_images.to_string(),
        stats.authentic_images.to_string(),
        stats.pending_analysis.to_string(),
    ]);
    let mut out = totals.to_string();

    if !stats.recent_uploads.is_empty() {
        let mut uploads = table(&["Date", "Uploads"]);
        for day in &stats.recent_uploads {
            uploads.add_row(vec![day.date.clone(), day.count.to_string()]);
        }
        out.push_str("\n\nRecent uploads\n");
        out.push_str(&uploads.to_string());
    }

    let b = &stats.analysis_breakdown;
    out.push_str(&format!(
        "\n\nAnalysis breakdown: {} forged, {} authentic, {} pending",
        b.forged, b.authentic, b.pending
    ));
    out
}

/// Renders an error for stderr. Backend errors get a title from their kind
/// and a retry hint when re-running could help; everything else prints the
/// full context chain.
pub fn error_report(err: &anyhow::Error) -> String {
    let Some(api) = err.chain().find_map(|e| e.downcast_ref::<ApiError>()) else {
        return format!("{err:#}");
    };
    let mut out = format!("{}: {err:#}", api.kind.title());
    if api.is_retryable() {
        out.push_str("\nThis may be temporary. Run the command again to retry.");
    }
    out
}

#[cfg(test)]
mod tests {
    use forgeguard_core::api::ApiErrorKind;

    use super::*;

    #[test]
    fn test_timestamp_passthrough() {
        assert_eq!(timestamp("yesterday"), "yesterday");
        assert!(timestamp("2025-01-10T12:00:00Z").starts_with("2025-01-"));
    }

    #[test]
    fn test_error_report_for_server_error() {
        let err = anyhow::Error::from(ApiError::from_status(500, ""));
        let report = error_report(&err);
        assert!(report.starts_with("Server Error: Server error. Please try again later."));
        assert!(report.contains("Run the command again"));
    }

    #[test]
    fn test_error_report_for_client_error_has_no_retry_hint() {
        let err = anyhow::Error::from(ApiError::new(ApiErrorKind::Client, "Bad file", Some(400)));
        assert_eq!(error_report(&err), "Error: Bad file");
    }

    #[test]
    fn test_error_report_plain_error() {
        let err = anyhow::anyhow!("boom").context("load config");
        assert_eq!(error_report(&err), "load config: boom");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status(None), "not analyzed");
    }
}
