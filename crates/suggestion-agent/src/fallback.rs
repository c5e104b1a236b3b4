//! Static suggestion templates used whenever the model cannot answer.

use lightness_core::types::Persona;

pub const BASE_TEMPLATES: [&str; 8] = [
    "为这个任务设定一个有趣的背景故事",
    "添加一个小小的仪式感",
    "准备一个庆祝完成的方式",
    "邀请朋友一起参与",
    "记录过程中的有趣瞬间",
    "创造一个专属的工作环境",
    "设定一个有挑战性的目标",
    "寻找任务的深层意义",
];

pub fn persona_templates(persona: Persona) -> &'static [&'static str; 5] {
    match persona {
        Persona::Collector => &[
            "收集完成这个任务过程中的有趣瞬间",
            "建立一个专门的收藏夹记录相关资源",
            "寻找并整理与任务相关的美好事物",
            "创建一个进度收集册",
            "收集其他人对这个任务的有趣见解",
        ],
        Persona::Competitor => &[
            "设定一个挑战性的时间目标",
            "与朋友比赛看谁完成得更好",
            "为自己设立不同难度等级",
            "记录并突破个人最佳记录",
            "创建一个积分奖励系统",
        ],
        Persona::Explorer => &[
            "探索完成这个任务的不同方法",
            "发现任务背后的有趣故事",
            "寻找意想不到的连接和关联",
            "探索任务可能带来的新机会",
            "调查其他人是如何处理类似任务的",
        ],
        Persona::Creator => &[
            "为这个任务创造一个独特的仪式",
            "设计一个专属的工作环境",
            "创作与任务相关的艺术作品",
            "发明一个新的完成方法",
            "制作一个纪念品来庆祝完成",
        ],
        Persona::Storyteller => &[
            "为这个任务编写一个背景故事",
            "想象自己是故事中的英雄",
            "记录任务过程中的精彩情节",
            "与朋友分享任务的有趣经历",
            "创造一个关于任务意义的故事",
        ],
        Persona::Comedian => &[
            "寻找任务中的搞笑元素",
            "用幽默的方式重新定义任务",
            "创造一些有趣的任务昵称",
            "设计搞笑的庆祝方式",
            "与朋友分享任务中的趣事",
        ],
        Persona::Leader => &[
            "制定详细的任务执行计划",
            "组织团队一起完成任务",
            "设立里程碑和检查点",
            "创建任务完成的标准流程",
            "指导其他人完成类似任务",
        ],
        Persona::Mover => &[
            "在任务中加入身体活动元素",
            "创造任务的节奏和韵律",
            "设计动态的工作方式",
            "用运动来庆祝任务完成",
            "让任务过程充满活力和动感",
        ],
    }
}

/// FNV-1a; stable across builds and platforms, unlike `DefaultHasher`.
fn stable_hash(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Three templates for `persona` (unknown identifiers use the base table),
/// picked by rotating the table by a hash of `task`. The same inputs always
/// give the same answer.
pub fn fallback_suggestions(task: &str, persona: &str) -> [String; 3] {
    let table: &[&str] = match persona.parse::<Persona>() {
        Ok(p) => persona_templates(p),
        Err(_) => &BASE_TEMPLATES,
    };
    let start = (stable_hash(task) % table.len() as u64) as usize;
    std::array::from_fn(|i| table[(start + i) % table.len()].to_string())
}
