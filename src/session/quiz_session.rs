//! 答题会话状态
//!
//! 显式持有"剩余题目 / 当前题目 / 当前答案"，由交互层拥有并修改，
//! 不使用任何全局状态。

use rand::Rng;

use crate::models::Puzzle;
use crate::services::answer_service::AnswerService;
use crate::services::llm_service::CompletionClient;

/// 出题顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PickOrder {
    #[default]
    Random,
    Sequential,
}

/// 答题会话
#[derive(Debug, Clone)]
pub struct QuizSession {
    puzzles: Vec<Puzzle>,
    /// 尚未出过的题目下标
    remaining: Vec<usize>,
    current: Option<usize>,
    answer: Option<String>,
}

impl QuizSession {
    pub fn new(puzzles: Vec<Puzzle>) -> Self {
        let remaining = (0..puzzles.len()).collect();
        Self {
            puzzles,
            remaining,
            current: None,
            answer: None,
        }
    }

    pub fn total(&self) -> usize {
        self.puzzles.len()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn current(&self) -> Option<&Puzzle> {
        self.current.map(|index| &self.puzzles[index])
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// 出一道新题，并清空上一题的答案
    ///
    /// 题目出完后返回 `None`，需要调用 `start_over` 重新开始
    pub fn next_question<R: Rng>(
        &mut self,
        order: PickOrder,
        rng: &mut R,
    ) -> Option<&Puzzle> {
        self.answer = None;

        if self.remaining.is_empty() {
            self.current = None;
            return None;
        }

        let slot = match order {
            PickOrder::Random => rng.gen_range(0..self.remaining.len()),
            PickOrder::Sequential => 0,
        };
        self.current = Some(self.remaining.remove(slot));
        self.current()
    }

    /// 重新填满剩余题目
    pub fn start_over(&mut self) {
        self.remaining = (0..self.puzzles.len()).collect();
    }

    /// 清空当前题目和答案
    pub fn reset(&mut self) {
        self.current = None;
        self.answer = None;
    }

    /// 为当前题目获取答案
    ///
    /// 没有当前题目时返回 `None`，不会调用模型
    pub async fn ask<C: CompletionClient>(&mut self, service: &AnswerService<C>) -> Option<&str> {
        let index = self.current?;
        let answer = service.get_answer(&self.puzzles[index]).await;
        self.answer = Some(answer);
        self.answer()
    }
}
