use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LightnessError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an experience. Declaration order is the lifecycle
/// order, so `Ord` compares progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Undesigned,
    Designed,
    Played,
    Logged,
}

impl Status {
    pub fn all() -> &'static [Status] {
        &[
            Status::Undesigned,
            Status::Designed,
            Status::Played,
            Status::Logged,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Status> {
        Status::all().get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Single-byte tag used as the leading byte of status index keys.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Undesigned => "undesigned",
            Status::Designed => "designed",
            Status::Played => "played",
            Status::Logged => "logged",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = LightnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undesigned" => Ok(Status::Undesigned),
            "designed" => Ok(Status::Designed),
            "played" => Ok(Status::Played),
            "logged" => Ok(Status::Logged),
            _ => Err(LightnessError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Play style chosen in the design wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Collector,
    Competitor,
    Explorer,
    Creator,
    Storyteller,
    Comedian,
    Leader,
    Mover,
}

impl Persona {
    pub fn all() -> &'static [Persona] {
        &[
            Persona::Collector,
            Persona::Competitor,
            Persona::Explorer,
            Persona::Creator,
            Persona::Storyteller,
            Persona::Comedian,
            Persona::Leader,
            Persona::Mover,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Persona::Collector => "collector",
            Persona::Competitor => "competitor",
            Persona::Explorer => "explorer",
            Persona::Creator => "creator",
            Persona::Storyteller => "storyteller",
            Persona::Comedian => "comedian",
            Persona::Leader => "leader",
            Persona::Mover => "mover",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Persona::Collector => "收集者",
            Persona::Competitor => "竞争者",
            Persona::Explorer => "探索者",
            Persona::Creator => "创造者",
            Persona::Storyteller => "故事讲述者",
            Persona::Comedian => "搞笑者",
            Persona::Leader => "领导者",
            Persona::Mover => "运动者",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Persona::Collector => "像寻宝一样，在过程中发现并整理美好。",
            Persona::Competitor => "挑战自己，享受全力以赴赢得游戏的感觉。",
            Persona::Explorer => "保持好奇，把熟悉的环境变成未知的地图。",
            Persona::Creator => "从无到有，把你的想法变成现实的杰作。",
            Persona::Storyteller => "赋予行动意义，把它编织成一个精彩的故事。",
            Persona::Comedian => "寻找笑点，用幽默感化解一切沉闷。",
            Persona::Leader => "运筹帷幄，像将军一样规划并执行你的蓝图。",
            Persona::Mover => "感受身体的韵律，让行动充满活力与节奏。",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Persona {
    type Err = LightnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persona::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| LightnessError::InvalidPersona(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Polarity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
        }
    }

    /// Question asked on the log screen once an emotion of this polarity is picked.
    pub fn follow_up_question(self) -> &'static str {
        match self {
            Polarity::Positive => "是什么让它变得有趣？",
            Polarity::Negative => "太好了，我们收集到新的数据点。这次实验告诉了你什么？",
            Polarity::Neutral => "这个过程中有什么特别的发现吗？",
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Polarity::Positive => &["轻松", "有成就感", "充实", "愉快", "满足", "兴奋"],
            Polarity::Negative => &["困难", "压力大", "无聊", "挫败", "疲惫", "焦虑"],
            Polarity::Neutral => &["平常", "还好", "一般", "复杂", "混合", "说不清"],
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Emotion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Calm,
    Thoughtful,
    Amused,
    Bored,
    Anxious,
    Frustrated,
    Mixed,
}

impl Emotion {
    pub fn all() -> &'static [Emotion] {
        &[
            Emotion::Happy,
            Emotion::Calm,
            Emotion::Thoughtful,
            Emotion::Amused,
            Emotion::Bored,
            Emotion::Anxious,
            Emotion::Frustrated,
            Emotion::Mixed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Calm => "calm",
            Emotion::Thoughtful => "thoughtful",
            Emotion::Amused => "amused",
            Emotion::Bored => "bored",
            Emotion::Anxious => "anxious",
            Emotion::Frustrated => "frustrated",
            Emotion::Mixed => "mixed",
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            Emotion::Happy | Emotion::Calm | Emotion::Amused => Polarity::Positive,
            Emotion::Bored | Emotion::Anxious | Emotion::Frustrated => Polarity::Negative,
            Emotion::Thoughtful | Emotion::Mixed => Polarity::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Emotion::Happy => "开心",
            Emotion::Calm => "平静",
            Emotion::Thoughtful => "思考",
            Emotion::Amused => "有趣",
            Emotion::Bored => "无聊",
            Emotion::Anxious => "焦虑",
            Emotion::Frustrated => "沮丧",
            Emotion::Mixed => "复杂",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Calm => "😌",
            Emotion::Thoughtful => "🤔",
            Emotion::Amused => "😅",
            Emotion::Bored => "😴",
            Emotion::Anxious => "😰",
            Emotion::Frustrated => "😤",
            Emotion::Mixed => "🙃",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Emotion {
    type Err = LightnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::all()
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| LightnessError::InvalidEmotion(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

/// Ordering of query results by `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
