use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use study_store::audio::{
    default_backend, list_recordings, load_clip, CaptureBackend, RecordingSession,
};
use study_store::controller::PracticeLog;
use study_store::layout::DataLayout;
use study_store::record::{Domain, Record, RecordId, ScoredAttempt, ScoredDraft, SpeakingDraft};
use study_store::repository::RecordsRepository;
use study_store::tips::{tips_for, SPEAKING_TEMPLATES};
use study_store::{SpeakingLog, StudyLogs};
use thiserror::Error;

use crate::cli::{Cli, Command, ScoredAction, ScoredFields, SpeakingAction, SpeakingFields};
use crate::render::{scored_table, speaking_table};
use crate::timer::run_timer;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No item with number {0}")]
    MissingItem(RecordId),
}

pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let layout = DataLayout::new(&cli.data_dir);

    match cli.command {
        Command::Tips { domain } => writeln!(out, "{}", tips_for(domain.into()))?,
        Command::Templates => writeln!(out, "{}", SPEAKING_TEMPLATES)?,
        Command::Timer { countdown } => {
            run_timer(countdown, out).await?;
        }
        Command::Reading { action } => {
            let mut logs = StudyLogs::open(&layout);
            warn_unreadable(&logs.reading, out)?;
            run_scored(&mut logs.reading, action, out)?;
        }
        Command::Listening { action } => {
            let mut logs = StudyLogs::open(&layout);
            warn_unreadable(&logs.listening, out)?;
            run_scored(&mut logs.listening, action, out)?;
        }
        Command::Speaking { action } => {
            let mut logs = StudyLogs::open(&layout);
            warn_unreadable(&logs.speaking, out)?;
            run_speaking(&mut logs.speaking, &layout, action, out).await?;
        }
    }

    Ok(())
}

fn warn_unreadable<T: RecordsRepository, W: Write>(
    log: &PracticeLog<T>,
    out: &mut W,
) -> Result<()> {
    if let Some(warning) = log.load_warning() {
        writeln!(out, "Warning: {}", warning)?;
    }
    Ok(())
}

fn run_scored<T, W>(log: &mut PracticeLog<T>, action: ScoredAction, out: &mut W) -> Result<()>
where
    T: RecordsRepository,
    T::Item: Record<Draft = ScoredDraft> + AsRef<ScoredAttempt>,
    W: Write,
{
    let domain = T::Item::DOMAIN;

    match action {
        ScoredAction::List { json } => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(log.records())?)?;
            } else {
                writeln!(out, "{}", scored_table(log.records()))?;
            }
        }
        ScoredAction::Add(fields) => {
            let id = log.add_blank()?;
            let draft = scored_draft(log, id, fields)?;
            log.save(id, draft)?;
            writeln!(out, "Added {} item {}", domain, id)?;
        }
        ScoredAction::Edit { id, fields } => {
            let draft = scored_draft(log, id, fields)?;
            log.save(id, draft)?;
            writeln!(out, "Saved {} item {}", domain, id)?;
        }
        ScoredAction::Delete { id } => {
            log.delete(id)?;
            writeln!(out, "Deleted {} item {}", domain, id)?;
        }
    }

    Ok(())
}

fn scored_draft<T>(
    log: &PracticeLog<T>,
    id: RecordId,
    fields: ScoredFields,
) -> Result<ScoredDraft>
where
    T: RecordsRepository,
    T::Item: AsRef<ScoredAttempt>,
{
    let current = log.get(id).ok_or(CommandError::MissingItem(id))?;
    Ok(fields.apply(ScoredDraft::from(current.as_ref())))
}

fn speaking_draft(
    log: &SpeakingLog,
    id: RecordId,
    fields: SpeakingFields,
) -> Result<SpeakingDraft> {
    let current = log.get(id).ok_or(CommandError::MissingItem(id))?;
    Ok(fields.apply(SpeakingDraft::from(current)))
}

async fn run_speaking<W: Write>(
    log: &mut SpeakingLog,
    layout: &DataLayout,
    action: SpeakingAction,
    out: &mut W,
) -> Result<()> {
    match action {
        SpeakingAction::List { json } => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(log.records())?)?;
            } else {
                writeln!(out, "{}", speaking_table(log.records()))?;
            }
        }
        SpeakingAction::Add(fields) => {
            let id = log.add_blank()?;
            if !fields.is_empty() {
                let draft = speaking_draft(log, id, fields)?;
                log.save(id, draft)?;
            }
            writeln!(out, "Added {} item {}", Domain::Speaking, id)?;
        }
        SpeakingAction::Edit { id, fields } => {
            let draft = speaking_draft(log, id, fields)?;
            log.save(id, draft)?;
            writeln!(out, "Saved {} item {}", Domain::Speaking, id)?;
        }
        SpeakingAction::Delete { id } => {
            log.delete(id)?;
            writeln!(out, "Deleted {} item {}", Domain::Speaking, id)?;
        }
        SpeakingAction::Devices => {
            for device in default_backend().input_devices()? {
                writeln!(out, "{}", device)?;
            }
        }
        SpeakingAction::Recordings { id } => {
            let recordings = list_recordings(&layout.recordings_dir(), id)?;
            if recordings.is_empty() {
                writeln!(out, "No recordings for item {}", id)?;
            }
            for path in recordings {
                writeln!(out, "{}", path.display())?;
            }
        }
        SpeakingAction::Record {
            id,
            seconds,
            device,
            play,
        } => {
            if log.get(id).is_none() {
                return Err(CommandError::MissingItem(id).into());
            }
            let session = RecordingSession::new(default_backend(), id);
            record_answer(session, layout, seconds, device.as_deref(), play, out).await?;
        }
        SpeakingAction::Play { path, from } => play_file(&path, from, out).await?,
    }

    Ok(())
}

async fn record_answer<B: CaptureBackend, W: Write>(
    mut session: RecordingSession<B>,
    layout: &DataLayout,
    seconds: u64,
    device: Option<&str>,
    play: bool,
    out: &mut W,
) -> Result<()> {
    session.start(device)?;
    writeln!(out, "Recording for {} seconds, Ctrl-C stops early", seconds)?;

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => {
            if let Some(elapsed) = session.recording_elapsed() {
                writeln!(out, "Stopped after {:.1} seconds", elapsed.as_secs_f64())?;
            }
        }
    }
    let duration = session.stop()?.duration_secs();
    writeln!(out, "Recorded {:.1} seconds", duration)?;

    if play {
        session.play(0.0)?;
        tokio::time::sleep(Duration::from_secs_f64(duration)).await;
        session.stop_playback();
    }

    layout.ensure_dirs()?;
    let path = session.save(&layout.recordings_dir())?;
    writeln!(out, "Saved answer for item {}: {}", session.record_id(), path.display())?;
    Ok(())
}

async fn play_file<W: Write>(path: &Path, from: f64, out: &mut W) -> Result<()> {
    let clip = load_clip(path)?.from_position(from);
    let mut backend = default_backend();

    writeln!(out, "Playing {:.1} seconds", clip.duration_secs())?;
    backend.play(&clip)?;
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs_f64(clip.duration_secs())) => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    backend.stop_playback();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use clap::Parser;
    use tempdir::TempDir;

    use super::run;
    use crate::cli::Cli;

    async fn run_args(tmp_dir: &TempDir, args: &[&str]) -> anyhow::Result<String> {
        let data_dir = tmp_dir.path().to_string_lossy().to_string();
        let mut argv = vec!["studylog", "--data-dir", data_dir.as_str()];
        argv.extend_from_slice(args);

        let mut out = Vec::new();
        run(Cli::try_parse_from(argv)?, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn test_reading_add_edit_list_delete() {
        let tmp_dir = TempDir::new("test_").unwrap();

        let added = run_args(
            &tmp_dir,
            &["reading", "add", "--url", "http://r", "--right-answers", "7", "--day", "2024-02-01"],
        )
        .await
        .unwrap();
        assert_eq!(added, "Added reading item 1\n");

        run_args(&tmp_dir, &["reading", "edit", "1", "--right-answers", "9"])
            .await
            .unwrap();
        assert_eq!(
            read_to_string(tmp_dir.path().join("reading.csv")).unwrap(),
            "id,url,right_answers,day\n1,http://r,9,2024-02-01\n"
        );

        let listed = run_args(&tmp_dir, &["reading", "list"]).await.unwrap();
        assert!(listed.contains("http://r"));

        let json = run_args(&tmp_dir, &["reading", "list", "--json"]).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["right_answers"], 9);

        run_args(&tmp_dir, &["reading", "delete", "1"]).await.unwrap();
        let listed = run_args(&tmp_dir, &["reading", "list"]).await.unwrap();
        assert_eq!(listed, "No items yet.\n");

        tmp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_listening_add_without_url_is_rejected() {
        let tmp_dir = TempDir::new("test_").unwrap();

        let err = run_args(&tmp_dir, &["listening", "add", "--right-answers", "3"])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Questions link cannot be empty");
        assert!(!tmp_dir.path().join("listening.csv").exists());

        tmp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_edit_missing_item() {
        let tmp_dir = TempDir::new("test_").unwrap();

        let err = run_args(&tmp_dir, &["reading", "edit", "4", "--day", "2024-01-01"])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No item with number 4");

        tmp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_speaking_add_is_stored_right_away() {
        let tmp_dir = TempDir::new("test_").unwrap();

        run_args(&tmp_dir, &["speaking", "add"]).await.unwrap();
        run_args(&tmp_dir, &["speaking", "add", "--url", "http://s", "--day", "2024-05-05"])
            .await
            .unwrap();

        let stored = read_to_string(tmp_dir.path().join("speaking.csv")).unwrap();
        let lines = stored.lines().collect::<Vec<&str>>();
        assert_eq!(lines[0], "id,url,day");
        assert!(lines[1].starts_with("1,,"));
        assert_eq!(lines[2], "2,http://s,2024-05-05");

        let recordings = run_args(&tmp_dir, &["speaking", "recordings", "1"])
            .await
            .unwrap();
        assert_eq!(recordings, "No recordings for item 1\n");

        tmp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_log_is_reported() {
        let tmp_dir = TempDir::new("test_").unwrap();
        std::fs::create_dir(tmp_dir.path().join("listening.csv")).unwrap();

        let listed = run_args(&tmp_dir, &["listening", "list"]).await.unwrap();

        assert!(listed.starts_with("Warning: Could not load items"));
        assert!(listed.ends_with("No items yet.\n"));

        tmp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_log_refuses_changes() {
        let tmp_dir = TempDir::new("test_").unwrap();
        std::fs::create_dir(tmp_dir.path().join("speaking.csv")).unwrap();

        let err = run_args(&tmp_dir, &["speaking", "add"]).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Items were not loaded, the file is left as it is"
        );
        assert!(tmp_dir.path().join("speaking.csv").is_dir());

        tmp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_edit_negative_item_number() {
        let tmp_dir = TempDir::new("test_").unwrap();
        std::fs::write(
            tmp_dir.path().join("reading.csv"),
            "id,url,right_answers,day\n-1,http://neg,3,2024-02-01\n",
        )
        .unwrap();

        run_args(&tmp_dir, &["reading", "edit", "-1", "--right-answers", "5"])
            .await
            .unwrap();

        assert_eq!(
            read_to_string(tmp_dir.path().join("reading.csv")).unwrap(),
            "id,url,right_answers,day\n-1,http://neg,5,2024-02-01\n"
        );

        tmp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_tips_and_templates() {
        let tmp_dir = TempDir::new("test_").unwrap();

        let tips = run_args(&tmp_dir, &["tips", "listening"]).await.unwrap();
        assert!(tips.starts_with("The Listening section"));

        let templates = run_args(&tmp_dir, &["templates"]).await.unwrap();
        assert!(templates.starts_with("Task 1"));

        tmp_dir.close().unwrap();
    }

    #[cfg(not(feature = "capture"))]
    #[tokio::test]
    async fn test_record_without_capture_support() {
        let tmp_dir = TempDir::new("test_").unwrap();
        run_args(&tmp_dir, &["speaking", "add"]).await.unwrap();

        let err = run_args(&tmp_dir, &["speaking", "record", "1", "--seconds", "1"])
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Audio recording not available"));

        tmp_dir.close().unwrap();
    }
}
