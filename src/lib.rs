//! # Puzzle Solver
//!
//! 批量调用多模态大模型解答题目（文字 + 可选图片），并把答案写入 JSON 文件
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - `Puzzle` / `AnswerRecord` 以及题目文件加载（JSON / TOML）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个 Puzzle
//! - `ImageEncoder` - 读取图片并编码为 data URL
//! - `PromptBuilder` - 构建系统指令 + 图片 + 题目文字
//! - `CompletionClient` - 模型调用能力（OpenAI 兼容接口）
//! - `AnswerService` - 题目 → 答案字符串，失败转为错误文本
//! - `AnswerWriter` - 答案记录落盘（streaming / atomic / jsonl）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 批量解题，控制并发，保证输出顺序
//!
//! ### ④ 交互层（Session）
//! - `session/` - 交互式逐题答题
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{CompletionError, ConfigError, PuzzleError, Result};
pub use models::{load_puzzles, AnswerRecord, Puzzle};
pub use orchestrator::{BatchRunner, BatchSummary};
pub use services::{
    AnswerService, AnswerWriter, CompletionClient, OpenAiCompletionClient, OutputFormat,
    PromptBuilder,
};
pub use session::{PickOrder, QuizSession, QuizShell};
