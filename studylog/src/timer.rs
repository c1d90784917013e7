use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use study_store::timer::Stopwatch;
use tokio::time::{interval, MissedTickBehavior};

/// Drives the stopwatch once per second until Ctrl-C, or until a countdown runs out.
pub async fn run_timer<W: Write>(countdown: Option<u64>, out: &mut W) -> Result<Stopwatch> {
    let mut watch = countdown.map(Stopwatch::countdown).unwrap_or_default();
    watch.start();

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    write!(out, "{}", watch.display())?;
    out.flush()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while watch.is_running() {
        tokio::select! {
            _ = ticker.tick() => {
                watch.tick();
                write!(out, "\r{}", watch.display())?;
                out.flush()?;
            }
            _ = &mut ctrl_c => {
                watch.pause();
            }
        }
    }
    writeln!(out)?;

    if watch.is_finished() {
        writeln!(out, "Time is up")?;
    }
    log::debug!("[timer] Stopped after {} seconds", watch.elapsed());
    Ok(watch)
}

#[cfg(test)]
mod tests {
    use super::run_timer;

    #[tokio::test(start_paused = true)]
    async fn test_countdown_runs_out() {
        let mut out = Vec::new();

        let watch = run_timer(Some(3), &mut out).await.unwrap();

        assert!(watch.is_finished());
        assert_eq!(watch.elapsed(), 3);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("00:00:03\r00:00:02\r00:00:01\r00:00:00"));
        assert!(text.ends_with("Time is up\n"));
    }
}
