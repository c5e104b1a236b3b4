use crate::experience::Experience;
use crate::types::{Emotion, Polarity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown in place of a persona for logged records that somehow lack a design.
pub const UNSET_PERSONA: &str = "未设定";

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookEntry {
    pub id: u64,
    pub title: String,
    pub reflection: String,
    pub persona: String,
    pub emotion: Emotion,
    pub emotion_polarity: Polarity,
    pub logged_at: DateTime<Utc>,
}

impl PlaybookEntry {
    /// `None` for records that have not been logged.
    pub fn from_experience(exp: &Experience) -> Option<Self> {
        let log = exp.log.as_ref()?;
        Some(Self {
            id: exp.id,
            title: exp.title.clone(),
            reflection: log.reflection.clone(),
            persona: exp
                .persona()
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| UNSET_PERSONA.to_string()),
            emotion: log.emotion,
            emotion_polarity: log.emotion_polarity,
            logged_at: log.logged_at,
        })
    }

    /// Case-insensitive substring match over title, persona, and reflection.
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.title, &self.persona, &self.reflection]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

// ---------------------------------------------------------------------------
// PlaybookFilter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybookFilter {
    #[default]
    All,
    Positive,
    Negative,
}

impl PlaybookFilter {
    pub fn admits(self, polarity: Polarity) -> bool {
        match self {
            PlaybookFilter::All => true,
            PlaybookFilter::Positive => polarity == Polarity::Positive,
            PlaybookFilter::Negative => polarity == Polarity::Negative,
        }
    }
}

impl std::str::FromStr for PlaybookFilter {
    type Err = crate::error::LightnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "" => Ok(PlaybookFilter::All),
            "positive" => Ok(PlaybookFilter::Positive),
            "negative" => Ok(PlaybookFilter::Negative),
            other => Err(crate::error::LightnessError::InvalidInput(format!(
                "unknown playbook filter '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Playbook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaybookStats {
    /// Every logged entry, before search and filter.
    pub total: usize,
    pub positive: usize,
    /// Negative and neutral entries.
    pub negative: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    pub entries: Vec<PlaybookEntry>,
    pub successes: Vec<PlaybookEntry>,
    pub data_points: Vec<PlaybookEntry>,
    pub stats: PlaybookStats,
}

impl Playbook {
    /// Build the playbook view from logged records (already in display
    /// order), applying the search term and filter.
    pub fn build(records: &[Experience], term: &str, filter: PlaybookFilter) -> Self {
        let all: Vec<PlaybookEntry> = records
            .iter()
            .filter_map(PlaybookEntry::from_experience)
            .collect();
        let total = all.len();

        let entries: Vec<PlaybookEntry> = all
            .into_iter()
            .filter(|e| e.matches(term) && filter.admits(e.emotion_polarity))
            .collect();
        let (successes, data_points): (Vec<_>, Vec<_>) = entries
            .iter()
            .cloned()
            .partition(|e| e.emotion_polarity == Polarity::Positive);

        Self {
            stats: PlaybookStats {
                total,
                positive: successes.len(),
                negative: data_points.len(),
            },
            entries,
            successes,
            data_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experience::{Design, Log};
    use crate::types::{Persona, Status};

    fn logged(id: u64, title: &str, persona: Persona, emotion: Emotion, reflection: &str) -> Experience {
        let now = Utc::now();
        let mut exp = Experience::new(id, title, now);
        exp.status = Status::Logged;
        exp.design = Some(Design {
            imagination: "想象".into(),
            persona,
            side_quests: vec![],
            fun_idea: Some("想象".into()),
            designed_at: now,
        });
        exp.played_at = Some(now);
        exp.logged_at = Some(now);
        exp.log = Some(Log {
            reflection: reflection.into(),
            emotion,
            emotion_polarity: emotion.polarity(),
            follow_up_answer: String::new(),
            logged_at: now,
        });
        exp
    }

    fn sample() -> Vec<Experience> {
        vec![
            logged(3, "Dishes", Persona::Creator, Emotion::Happy, "Music helped"),
            logged(2, "倒垃圾", Persona::Explorer, Emotion::Bored, "太长了"),
            logged(1, "回邮件", Persona::Leader, Emotion::Mixed, "还行"),
        ]
    }

    #[test]
    fn unfiltered_splits_neutral_into_data_points() {
        let book = Playbook::build(&sample(), "", PlaybookFilter::All);
        assert_eq!(book.entries.len(), 3);
        assert_eq!(
            book.stats,
            PlaybookStats {
                total: 3,
                positive: 1,
                negative: 2
            }
        );
        assert_eq!(book.successes[0].id, 3);
        assert_eq!(
            book.data_points.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![2, 1]
        );
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = sample();
        let by_title = Playbook::build(&records, "dISHES", PlaybookFilter::All);
        assert_eq!(by_title.entries.len(), 1);

        let by_persona = Playbook::build(&records, "explorer", PlaybookFilter::All);
        assert_eq!(by_persona.entries[0].id, 2);

        let by_reflection = Playbook::build(&records, "music", PlaybookFilter::All);
        assert_eq!(by_reflection.entries[0].id, 3);

        let none = Playbook::build(&records, "zzz", PlaybookFilter::All);
        assert!(none.entries.is_empty());
        assert_eq!(none.stats.total, 3);
    }

    #[test]
    fn negative_filter_excludes_neutral() {
        let book = Playbook::build(&sample(), "", PlaybookFilter::Negative);
        assert_eq!(book.entries.len(), 1);
        assert_eq!(book.entries[0].emotion, Emotion::Bored);

        let positive = Playbook::build(&sample(), "", PlaybookFilter::Positive);
        assert_eq!(positive.entries.len(), 1);
        assert!(positive.data_points.is_empty());
    }

    #[test]
    fn unlogged_records_are_skipped() {
        let mut records = sample();
        records.push(Experience::new(9, "未完成", Utc::now()));
        let book = Playbook::build(&records, "", PlaybookFilter::All);
        assert_eq!(book.stats.total, 3);
    }

    #[test]
    fn missing_design_shows_unset_persona() {
        let mut exp = logged(1, "t", Persona::Mover, Emotion::Calm, "r");
        exp.design = None;
        let entry = PlaybookEntry::from_experience(&exp).unwrap();
        assert_eq!(entry.persona, UNSET_PERSONA);
    }

    #[test]
    fn filter_parses() {
        assert_eq!("positive".parse::<PlaybookFilter>().unwrap(), PlaybookFilter::Positive);
        assert_eq!("".parse::<PlaybookFilter>().unwrap(), PlaybookFilter::All);
        assert!("favorites".parse::<PlaybookFilter>().is_err());
    }
}
