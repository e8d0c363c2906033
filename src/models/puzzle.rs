use serde::{Deserialize, Serialize};

/// 一道题目
///
/// 从题目文件解析得到，加载后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// 图片文件路径（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Puzzle {
    /// 非空的图片路径
    pub fn image_path(&self) -> Option<&str> {
        self.image.as_deref().filter(|path| !path.is_empty())
    }

    pub fn question_text(&self) -> &str {
        self.question.as_deref().unwrap_or_default()
    }
}

/// 一道题目的答案记录
///
/// `answer` 永远是字符串：模型的回答，或格式化后的错误信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: i64,
    pub title: String,
    pub question: String,
    pub answer: String,
}

impl AnswerRecord {
    pub fn new(puzzle: &Puzzle, answer: String) -> Self {
        Self {
            id: puzzle.id,
            title: puzzle.title.clone(),
            question: puzzle.question_text().to_string(),
            answer,
        }
    }
}
