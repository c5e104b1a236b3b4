//! Prompt construction and completion post-processing.

use crate::error::AgentError;
use crate::types::Message;
use lightness_core::types::Persona;
use regex::Regex;
use std::sync::OnceLock;

pub const SYSTEM_PROMPT: &str = "你是一个专业的体验设计师，擅长为不同人格特征的用户设计有趣的支线任务。请严格按照要求返回3个建议，每个建议一行，不要添加序号或其他格式。";

/// Used when the persona identifier is not one of the eight known ones.
pub const UNKNOWN_PERSONA: &str = "普通用户";

/// Persona description as the model sees it.
pub fn persona_prompt_description(persona: &str) -> &'static str {
    match persona.parse::<Persona>() {
        Ok(Persona::Collector) => "收集者 - 喜欢收集、整理和保存有意义的事物",
        Ok(Persona::Competitor) => "竞争者 - 喜欢挑战、比较和追求卓越",
        Ok(Persona::Explorer) => "探索者 - 喜欢发现新事物、尝试不同方法",
        Ok(Persona::Creator) => "创造者 - 喜欢创新、设计和制作独特的东西",
        Ok(Persona::Storyteller) => "故事讲述者 - 喜欢叙述、分享和创造故事",
        Ok(Persona::Comedian) => "幽默家 - 喜欢寻找乐趣、制造笑点",
        Ok(Persona::Leader) => "领导者 - 喜欢组织、规划和指导他人",
        Ok(Persona::Mover) => "行动者 - 喜欢身体活动和动态体验",
        Err(_) => UNKNOWN_PERSONA,
    }
}

/// System and user messages asking for three side quests.
pub fn build_prompt(task: &str, persona: &str) -> Vec<Message> {
    let user = format!(
        "任务：\"{task}\"\n人格特征：{desc}\n\n\
         请为这个任务设计3个有趣的支线任务，让完成过程更加愉快。要求：\n\
         1. 每个建议都要符合该人格特征的偏好\n\
         2. 建议要简短、具体、可执行\n\
         3. 要有创意和趣味性\n\
         4. 严格返回3个建议，每行一个，不要序号\n\n\
         示例格式：\n\
         为这个任务创造一个专属的背景音乐\n\
         邀请朋友一起参与并记录过程\n\
         设计一个完成后的小小庆祝仪式",
        desc = persona_prompt_description(persona),
    );
    vec![Message::system(SYSTEM_PROMPT), Message::user(user)]
}

static LIST_MARKER_RE: OnceLock<Regex> = OnceLock::new();

fn list_marker_re() -> &'static Regex {
    LIST_MARKER_RE.get_or_init(|| Regex::new(r"^(?:\d+\s*[.、)）]|[-*•])\s*").unwrap())
}

/// Turn raw completion text into exactly three suggestions.
///
/// Lines are trimmed and stripped of leading list markers; blank lines are
/// dropped and only the first three survive.
pub fn parse_completion(content: &str) -> Result<[String; 3], AgentError> {
    let lines: Vec<String> = content
        .lines()
        .map(|line| list_marker_re().replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(3)
        .collect();

    <[String; 3]>::try_from(lines).map_err(|lines| AgentError::InsufficientSuggestions(lines.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_task_and_persona() {
        let messages = build_prompt("洗碗", "collector");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert!(messages[1].content.contains("任务：\"洗碗\""));
        assert!(messages[1].content.contains("收集者 - 喜欢收集"));
    }

    #[test]
    fn unknown_persona_uses_generic_description() {
        let messages = build_prompt("洗碗", "wizard");
        assert!(messages[1].content.contains("人格特征：普通用户"));
    }

    #[test]
    fn parse_keeps_first_three_lines() {
        let out = parse_completion("一\n\n二\n三\n四\n").unwrap();
        assert_eq!(out, ["一", "二", "三"]);
    }

    #[test]
    fn parse_strips_list_markers() {
        let out = parse_completion("1. 听歌\n2、跳舞\n- 拍照\n").unwrap();
        assert_eq!(out, ["听歌", "跳舞", "拍照"]);

        let out = parse_completion("* a\n• b\n3) c").unwrap();
        assert_eq!(out, ["a", "b", "c"]);
    }

    #[test]
    fn parse_rejects_short_output() {
        let err = parse_completion("只有一行\n   \n").unwrap_err();
        assert!(matches!(err, AgentError::InsufficientSuggestions(1)));
    }
}
