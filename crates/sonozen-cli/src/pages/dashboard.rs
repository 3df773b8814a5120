use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use sonozen_core::{DashboardSummary, SleepAnalysisRecord};

fn long_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%B %-d, %Y %H:%M").to_string()
}

fn short_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%B %-d, %Y").to_string()
}

/// dashboard 页：空状态，或统计 + 最新详情 + 历史列表（最新在前）
pub fn render_dashboard(history: &[SleepAnalysisRecord]) -> String {
    let summary = DashboardSummary::new(history);
    let mut out = String::new();

    let Some(latest) = summary.latest else {
        out.push_str(&format!("{}\n", "No analyses yet".bold()));
        out.push_str("Start your journey to better sleep with your first analysis.\n");
        out.push_str(&format!("  {}\n", "sonozen analyze".green()));
        return out;
    };

    out.push_str(&format!("{}\n\n", "Your sleep dashboard".bold()));
    out.push_str(&format!("  Total analyses: {}\n", summary.total.to_string().cyan()));
    out.push_str(&format!(
        "  Average score:  {}\n",
        format!("{}/100", summary.average_score).cyan()
    ));
    out.push_str(&format!(
        "  Latest score:   {}\n\n",
        format!("{}/100", latest.sleep_score()).cyan()
    ));

    out.push_str(&format!("{}\n", "Latest analysis".bold()));
    out.push_str(&format!("{}\n\n", long_date(&latest.date).dimmed()));
    out.push_str(&format!("{}\n\n", latest.analysis.summary));

    out.push_str(&format!("{}\n", "Main issues identified".yellow()));
    for issue in &latest.analysis.main_issues {
        out.push_str(&format!("  • {}\n", issue));
    }

    out.push_str(&format!("\n{}\n", "Personalized recommendations".green()));
    for (index, rec) in latest.analysis.recommendations.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", index + 1, rec));
    }

    if !summary.earlier.is_empty() {
        out.push_str(&format!("\n{}\n", "History".bold()));
        for record in summary.earlier {
            out.push_str(&format!(
                "  {}  Score: {}/100  {}\n",
                short_date(&record.date).dimmed(),
                record.sleep_score(),
                record.analysis.summary
            ));
        }
    }

    out.push_str(&format!("\n{} {}\n", "New analysis:".dimmed(), "sonozen analyze".green()));
    out
}
