use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use study_store::record::{Domain, RecordId, ScoredDraft, SpeakingDraft};

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "studylog", version, about = "Reading, listening and speaking practice log")]
pub struct Cli {
    /// Directory holding the practice logs and speaking recordings
    #[arg(long, env = "STUDYLOG_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reading practice log
    Reading {
        #[command(subcommand)]
        action: ScoredAction,
    },
    /// Listening practice log
    Listening {
        #[command(subcommand)]
        action: ScoredAction,
    },
    /// Speaking practice log and answer recordings
    Speaking {
        #[command(subcommand)]
        action: SpeakingAction,
    },
    /// Show the tips of a section
    Tips { domain: DomainArg },
    /// Show the speaking answer templates
    Templates,
    /// Run a practice stopwatch until Ctrl-C
    Timer {
        /// Count down from this many seconds instead of counting up
        #[arg(long)]
        countdown: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum DomainArg {
    Reading,
    Listening,
    Speaking,
}

impl From<DomainArg> for Domain {
    fn from(value: DomainArg) -> Self {
        match value {
            DomainArg::Reading => Domain::Reading,
            DomainArg::Listening => Domain::Listening,
            DomainArg::Speaking => Domain::Speaking,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ScoredAction {
    /// Show every item
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a new item and save it
    Add(ScoredFields),
    /// Change fields of an existing item, the others keep their value
    Edit {
        #[arg(allow_negative_numbers = true)]
        id: RecordId,
        #[command(flatten)]
        fields: ScoredFields,
    },
    /// Delete an item
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: RecordId,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScoredFields {
    /// Questions link
    #[arg(long)]
    pub url: Option<String>,
    /// Number of right answers
    #[arg(long, allow_hyphen_values = true)]
    pub right_answers: Option<String>,
    /// Day of the attempt, YYYY-MM-DD
    #[arg(long)]
    pub day: Option<String>,
}

impl ScoredFields {
    pub fn apply(self, mut draft: ScoredDraft) -> ScoredDraft {
        if let Some(url) = self.url {
            draft.url = url;
        }
        if let Some(right_answers) = self.right_answers {
            draft.right_answers = right_answers;
        }
        if let Some(day) = self.day {
            draft.day = day;
        }
        draft
    }
}

#[derive(Subcommand, Debug)]
pub enum SpeakingAction {
    /// Show every item
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a new item, it is stored right away
    Add(SpeakingFields),
    /// Change fields of an existing item, the others keep their value
    Edit {
        #[arg(allow_negative_numbers = true)]
        id: RecordId,
        #[command(flatten)]
        fields: SpeakingFields,
    },
    /// Delete an item
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: RecordId,
    },
    /// List audio input devices
    Devices,
    /// Record an answer for an item and save it as WAV
    Record {
        #[arg(allow_negative_numbers = true)]
        id: RecordId,
        /// Recording length
        #[arg(long, default_value_t = 45)]
        seconds: u64,
        /// Input device name, the default device when omitted
        #[arg(long)]
        device: Option<String>,
        /// Listen to the answer before it is saved
        #[arg(long)]
        play: bool,
    },
    /// List saved answers of an item
    Recordings {
        #[arg(allow_negative_numbers = true)]
        id: RecordId,
    },
    /// Play a saved answer
    Play {
        path: PathBuf,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SpeakingFields {
    /// Task link
    #[arg(long)]
    pub url: Option<String>,
    /// Day of the attempt, YYYY-MM-DD
    #[arg(long)]
    pub day: Option<String>,
}

impl SpeakingFields {
    pub fn apply(self, mut draft: SpeakingDraft) -> SpeakingDraft {
        if let Some(url) = self.url {
            draft.url = url;
        }
        if let Some(day) = self.day {
            draft.day = day;
        }
        draft
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.day.is_none()
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command, ScoredAction};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_negative_right_answers_reaches_validation() {
        let cli = Cli::try_parse_from([
            "studylog",
            "reading",
            "edit",
            "3",
            "--right-answers",
            "-1",
        ])
        .unwrap();

        match cli.command {
            Command::Reading {
                action: ScoredAction::Edit { id, fields },
            } => {
                assert_eq!(id, 3);
                assert_eq!(fields.right_answers.as_deref(), Some("-1"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_negative_item_number() {
        let cli = Cli::try_parse_from(["studylog", "listening", "delete", "-1"]).unwrap();

        match cli.command {
            Command::Listening {
                action: ScoredAction::Delete { id },
            } => assert_eq!(id, -1),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
