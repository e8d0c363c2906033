//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和调度：加载题目、打开输出、逐题委托服务层、写入答案、输出统计。
//!
//! ## 层次关系
//!
//! ```text
//! batch_runner (处理 Vec<Puzzle>)
//!     ↓
//! services::AnswerService (处理单个 Puzzle)
//!     ↓
//! services::CompletionClient (模型调用)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断。

pub mod batch_runner;

pub use batch_runner::{BatchRunner, BatchSummary};
