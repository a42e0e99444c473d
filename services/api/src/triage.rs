use clap::Args;
use complaint_desk::complaints::{classify, summarize, Priority};
use complaint_desk::error::AppError;
use serde::Serialize;

#[derive(Args, Debug)]
pub(crate) struct TriageArgs {
    /// Complaint description to classify and summarise
    #[arg(long)]
    pub(crate) description: String,
    /// Optional title, echoed in the preview
    #[arg(long)]
    pub(crate) title: Option<String>,
    /// Emit the preview as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct TriagePreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    pub(crate) priority: Priority,
    pub(crate) summary: String,
}

/// Same classification and summary a submission would get; nothing is stored.
pub(crate) fn preview(args: &TriageArgs) -> TriagePreview {
    TriagePreview {
        title: args.title.clone(),
        priority: classify(&args.description),
        summary: summarize(&args.description),
    }
}

pub(crate) fn render_text(preview: &TriagePreview) -> String {
    let mut lines = Vec::new();
    if let Some(title) = &preview.title {
        lines.push(format!("Title:    {title}"));
    }
    lines.push(format!("Priority: {}", preview.priority.label()));
    lines.push(format!("Summary:  {}", preview.summary));
    lines.join("\n")
}

pub(crate) fn run_triage(args: TriageArgs) -> Result<(), AppError> {
    let preview = preview(&args);
    if args.json {
        let rendered = serde_json::to_string_pretty(&preview)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        println!("{}", render_text(&preview));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(description: &str, title: Option<&str>) -> TriageArgs {
        TriageArgs {
            description: description.to_string(),
            title: title.map(str::to_string),
            json: false,
        }
    }

    #[test]
    fn preview_matches_submission_triage() {
        let result = preview(&args(
            "The wifi network in block C is really slow. It drops every evening.",
            None,
        ));
        assert_eq!(result.priority, Priority::Medium);
        assert_eq!(result.summary, "The wifi network in block C is slow.");
    }

    #[test]
    fn text_rendering_lists_title_priority_and_summary() {
        let result = preview(&args("Lift is broken on the third floor", Some("Lift")));
        assert_eq!(
            render_text(&result),
            "Title:    Lift\nPriority: High\nSummary:  Lift is broken on the third floor"
        );
    }

    #[test]
    fn json_rendering_omits_a_missing_title() {
        let result = preview(&args("Canteen food is cold", None));
        let value = serde_json::to_value(&result).expect("serializes");
        assert_eq!(
            value,
            serde_json::json!({ "priority": "Low", "summary": "Canteen food is cold" })
        );
    }
}
