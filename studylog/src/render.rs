use study_store::record::{ScoredAttempt, SpeakingAttempt};

const EMPTY_LOG: &str = "No items yet.";

fn cell(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub fn scored_table<R: AsRef<ScoredAttempt>>(records: &[R]) -> String {
    if records.is_empty() {
        return EMPTY_LOG.to_string();
    }

    let mut lines = vec![format!(
        "{:>11}  {:>13}  {:<10}  {}",
        "Link Number", "Right Answers", "Day", "Questions Link"
    )];
    lines.extend(records.iter().map(AsRef::as_ref).map(|record| {
        format!(
            "{:>11}  {:>13}  {:<10}  {}",
            record.id,
            record.right_answers,
            cell(&record.day),
            cell(&record.url)
        )
    }));

    lines.join("\n")
}

pub fn speaking_table(records: &[SpeakingAttempt]) -> String {
    if records.is_empty() {
        return EMPTY_LOG.to_string();
    }

    let mut lines = vec![format!("{:>4}  {:<10}  {}", "#", "Day", "Task Link")];
    lines.extend(records.iter().map(|record| {
        format!(
            "{:>4}  {:<10}  {}",
            record.id,
            cell(&record.day),
            cell(&record.url)
        )
    }));

    lines.join("\n")
}
