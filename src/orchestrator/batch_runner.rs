//! 批量解题器 - 编排层
//!
//! ## 职责
//!
//! 1. **批量加载**：读取题目文件（`Vec<Puzzle>`）
//! 2. **打开输出**：在调用模型之前确认输出文件可写
//! 3. **逐题处理**：委托 `AnswerService` 获取答案，单题失败不影响其他题目
//! 4. **按序落盘**：答案记录严格按照题目文件中的顺序写入
//! 5. **全局统计**：汇总成功/失败数量
//!
//! ## 并发
//!
//! 默认一次只处理一道题。`max_concurrent > 1` 时最多同时发出 N 个请求，
//! 结果仍按加载顺序产出（`StreamExt::buffered`），写入顺序不变。

use std::path::{Path, PathBuf};
use std::pin::pin;

use futures::stream::{self, StreamExt};
use tracing::info;

use crate::error::Result;
use crate::models::{load_puzzles, AnswerRecord, Puzzle};
use crate::services::answer_service::{is_error_answer, AnswerService};
use crate::services::answer_writer::{AnswerWriter, OutputFormat};
use crate::services::llm_service::CompletionClient;
use crate::utils::logging::{log_progress, log_puzzles_loaded, print_final_stats};

/// 批次处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub answered: usize,
    pub failed: usize,
    pub output: PathBuf,
}

/// 批量解题器
pub struct BatchRunner<C> {
    service: AnswerService<C>,
    format: OutputFormat,
    max_concurrent: usize,
}

impl<C: CompletionClient> BatchRunner<C> {
    pub fn new(service: AnswerService<C>, format: OutputFormat) -> Self {
        Self {
            service,
            format,
            max_concurrent: 1,
        }
    }

    /// 设置最大并发请求数（至少为 1）
    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn service(&self) -> &AnswerService<C> {
        &self.service
    }

    /// 运行完整批次：加载 → 打开输出 → 逐题解答 → 写入
    ///
    /// 只有题目文件读取/解析失败或输出文件写入失败才会返回错误
    pub async fn run(&self, input: &Path, output: &Path) -> Result<BatchSummary> {
        info!("📁 正在加载题目: {}", input.display());
        let puzzles = load_puzzles(input).await?;
        log_puzzles_loaded(puzzles.len(), input);

        let writer = AnswerWriter::open(self.format, output)?;
        let summary = self.process_all(&puzzles, writer).await?;

        print_final_stats(
            summary.answered,
            summary.failed,
            summary.total,
            &summary.output,
        );
        Ok(summary)
    }

    /// 处理全部题目并写入给定的 writer
    pub async fn process_all(
        &self,
        puzzles: &[Puzzle],
        mut writer: AnswerWriter,
    ) -> Result<BatchSummary> {
        let total = puzzles.len();
        let mut answered = 0;
        let mut failed = 0;

        let mut records = pin!(self.record_stream(puzzles));

        while let Some((index, record)) = records.next().await {
            if is_error_answer(&record.answer) {
                failed += 1;
                info!("[{}/{}] ⚠️ 题目 #{} 已记录错误答案", index + 1, total, record.id);
            } else {
                answered += 1;
                info!("[{}/{}] ✓ 题目 #{} 完成", index + 1, total, record.id);
            }
            writer.write_record(&record)?;
        }

        let output = writer.finish()?;

        Ok(BatchSummary {
            total,
            answered,
            failed,
            output,
        })
    }

    /// 在内存中解答全部题目（不落盘）
    pub async fn answer_all(&self, puzzles: &[Puzzle]) -> Vec<AnswerRecord> {
        self.record_stream(puzzles)
            .map(|(_, record)| record)
            .collect()
            .await
    }

    /// 按加载顺序产出 (索引, 答案记录)
    fn record_stream<'a>(
        &'a self,
        puzzles: &'a [Puzzle],
    ) -> impl futures::Stream<Item = (usize, AnswerRecord)> + 'a {
        let total = puzzles.len();
        stream::iter(puzzles.iter().enumerate())
            .map(move |(index, puzzle)| async move {
                log_progress(index + 1, total, puzzle.id, puzzle.question_text());
                (index, self.service.answer(puzzle).await)
            })
            .buffered(self.max_concurrent)
    }
}
