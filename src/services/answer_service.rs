//! 答题服务 - 业务能力层
//!
//! 一道题目 → 一个答案字符串。任何失败都在这里转换为错误文本，
//! 单道题目的失败不会中断整个批次。

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{AnswerRecord, Puzzle};
use crate::services::llm_service::CompletionClient;
use crate::services::prompt_builder::PromptBuilder;

/// 失败答案的统一前缀
pub const ERROR_ANSWER_PREFIX: &str = "Error getting answer: ";

/// 把错误转换为答案文本
pub fn error_answer(err: &impl std::fmt::Display) -> String {
    format!("{ERROR_ANSWER_PREFIX}{err}")
}

/// 答案是否为错误文本
pub fn is_error_answer(answer: &str) -> bool {
    answer.starts_with(ERROR_ANSWER_PREFIX)
}

/// 答题服务
///
/// 职责：
/// - 构建请求（系统指令 + 图片 + 题目文字）
/// - 调用模型
/// - 把成功/失败统一为一个字符串
pub struct AnswerService<C> {
    client: C,
    prompt_builder: PromptBuilder,
}

impl<C: CompletionClient> AnswerService<C> {
    pub fn new(client: C) -> Self {
        Self::with_prompt_builder(client, PromptBuilder::new())
    }

    pub fn with_prompt_builder(client: C, prompt_builder: PromptBuilder) -> Self {
        Self {
            client,
            prompt_builder,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 获取答案，可能失败
    pub async fn try_answer(&self, puzzle: &Puzzle) -> Result<String> {
        let request = self.prompt_builder.build_request(puzzle).await?;
        debug!(
            "题目 #{} 请求内容 {} 段，模型: {}",
            puzzle.id,
            request.content.len(),
            self.client.model_name()
        );

        let answer = self.client.complete(&request.messages()).await?;
        Ok(answer)
    }

    /// 获取答案，永不失败
    ///
    /// 失败时返回 `"Error getting answer: <message>"`
    pub async fn get_answer(&self, puzzle: &Puzzle) -> String {
        match self.try_answer(puzzle).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("⚠️ 题目 #{} 获取答案失败: {}", puzzle.id, e);
                error_answer(&e)
            }
        }
    }

    /// 获取答案并组装为答案记录
    pub async fn answer(&self, puzzle: &Puzzle) -> AnswerRecord {
        let answer = self.get_answer(puzzle).await;
        AnswerRecord::new(puzzle, answer)
    }
}
