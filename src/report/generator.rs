//! Markdown and JSON report generation.
//!
//! This module renders one-shot CLI analyses for writing to disk.

use crate::models::{
    ClassifiedComment, Report, ReportMetadata, SentimentDistribution, SentimentLabel, VideoInfo,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let analysis = &report.analysis;
    let mut output = String::new();

    output.push_str("# Xenia Sentiment Report\n\n");

    output.push_str(&generate_metadata_section(
        &report.metadata,
        &analysis.video_id,
        analysis.processing_time_seconds,
    ));

    if let Some(ref video) = analysis.video {
        output.push_str(&generate_video_section(video));
    }

    output.push_str(&generate_distribution_section(
        &analysis.sentiment_distribution,
    ));

    output.push_str(&generate_comments_section(
        SentimentLabel::Positive,
        &analysis.top_positive_comments,
    ));
    output.push_str(&generate_comments_section(
        SentimentLabel::Negative,
        &analysis.top_negative_comments,
    ));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(
    metadata: &ReportMetadata,
    video_id: &str,
    duration_seconds: f64,
) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Video:** {}\n", metadata.video_url));
    section.push_str(&format!("- **Video ID:** `{}`\n", video_id));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Comments Requested:** {}\n",
        metadata.max_comments
    ));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.2}s\n",
        duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_video_section(video: &VideoInfo) -> String {
    let mut section = String::new();

    section.push_str("## Video\n\n");
    section.push_str(&format!("- **Title:** {}\n", video.title));
    section.push_str(&format!("- **Channel:** {}\n", video.channel));
    section.push_str(&format!(
        "- **Views:** {} | **Likes:** {} | **Comments:** {}\n\n",
        video.views, video.likes, video.comments
    ));

    section
}

/// Share of `count` in `total`, as a percentage.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Generate the sentiment distribution table.
fn generate_distribution_section(dist: &SentimentDistribution) -> String {
    let total = dist.total();
    let mut section = String::new();

    section.push_str("## Sentiment Distribution\n\n");
    section.push_str("| Sentiment | Comments | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for (label, count) in [
        (SentimentLabel::Positive, dist.positive),
        (SentimentLabel::Negative, dist.negative),
        (SentimentLabel::Neutral, dist.neutral),
    ] {
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% |\n",
            label.emoji(),
            label,
            count,
            percentage(count, total)
        ));
    }
    section.push_str(&format!("| **Total** | **{}** | |\n\n", total));

    section
}

/// Generate the top comments section for one label.
fn generate_comments_section(label: SentimentLabel, comments: &[ClassifiedComment]) -> String {
    let mut section = String::new();

    let heading = match label {
        SentimentLabel::Positive => "Top Positive Comments",
        SentimentLabel::Negative => "Top Negative Comments",
        SentimentLabel::Neutral => "Top Neutral Comments",
    };
    section.push_str(&format!("## {}\n\n", heading));

    if comments.is_empty() {
        section.push_str("No comments in this category.\n\n");
        return section;
    }

    for (i, comment) in comments.iter().enumerate() {
        let quoted = comment.text.lines().collect::<Vec<_>>().join("\n> ");
        section.push_str(&format!(
            "{}. {} **{:.1}%**\n\n> {}\n\n",
            i + 1,
            label.emoji(),
            comment.confidence * 100.0,
            quoted
        ));
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by Xenia*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
