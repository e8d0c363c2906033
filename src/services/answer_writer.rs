//! 答案写入服务 - 业务能力层
//!
//! 只负责"把答案记录落盘"，支持三种方式：
//!
//! - `streaming`：逐条写入 JSON 数组，每写一条就重写结尾的 `]`，
//!   文件在任何一条记录之后都是合法 JSON
//! - `atomic`：全部记录先放在内存，结束时写入临时文件再重命名覆盖
//! - `jsonl`：每行一条紧凑 JSON，逐条追加

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PuzzleError, Result};
use crate::models::AnswerRecord;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 逐条写入，文件始终是合法的 JSON 数组
    #[default]
    Streaming,
    /// 结束时一次性写入
    Atomic,
    /// 每行一条 JSON
    #[serde(rename = "jsonl")]
    #[value(name = "jsonl")]
    JsonLines,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Streaming => write!(f, "streaming"),
            OutputFormat::Atomic => write!(f, "atomic"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" => Ok(OutputFormat::Streaming),
            "atomic" => Ok(OutputFormat::Atomic),
            "jsonl" => Ok(OutputFormat::JsonLines),
            other => Err(format!("未知的输出格式: {other}")),
        }
    }
}

/// 答案写入器
///
/// 打开时就创建目标（或临时）文件，保证输出不可写时在调用模型之前失败
pub enum AnswerWriter {
    Streaming(StreamingArrayWriter),
    Atomic(AtomicArrayWriter),
    JsonLines(JsonLinesWriter),
}

impl AnswerWriter {
    pub fn open(format: OutputFormat, path: &Path) -> Result<Self> {
        debug!("打开输出文件: {} ({})", path.display(), format);
        let writer = match format {
            OutputFormat::Streaming => AnswerWriter::Streaming(StreamingArrayWriter::create(path)?),
            OutputFormat::Atomic => AnswerWriter::Atomic(AtomicArrayWriter::create(path)?),
            OutputFormat::JsonLines => AnswerWriter::JsonLines(JsonLinesWriter::create(path)?),
        };
        Ok(writer)
    }

    pub fn write_record(&mut self, record: &AnswerRecord) -> Result<()> {
        match self {
            AnswerWriter::Streaming(w) => w.write_record(record),
            AnswerWriter::Atomic(w) => {
                w.push(record.clone());
                Ok(())
            }
            AnswerWriter::JsonLines(w) => w.write_record(record),
        }
    }

    /// 完成写入，返回最终文件路径
    pub fn finish(self) -> Result<PathBuf> {
        match self {
            AnswerWriter::Streaming(w) => w.finish(),
            AnswerWriter::Atomic(w) => w.finish(),
            AnswerWriter::JsonLines(w) => w.finish(),
        }
    }
}

/// 逐条写入的 JSON 数组
///
/// 文件布局与逐条 `json.dump(indent=2)` 的结果一致：
/// `[\n{...},\n{...}\n]`
pub struct StreamingArrayWriter {
    path: PathBuf,
    file: File,
    /// 结尾 `\n]` 的起始偏移
    tail: u64,
    count: usize,
}

const ARRAY_TAIL: &str = "\n]";

impl StreamingArrayWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = File::create(path).map_err(|e| PuzzleError::output_write(path, e))?;
        file.write_all(format!("[{ARRAY_TAIL}").as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| PuzzleError::output_write(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            tail: 1,
            count: 0,
        })
    }

    pub fn write_record(&mut self, record: &AnswerRecord) -> Result<()> {
        let body = serde_json::to_string_pretty(record)?;
        let separator = if self.count == 0 { "\n" } else { ",\n" };
        let chunk = format!("{separator}{body}{ARRAY_TAIL}");

        self.file
            .seek(SeekFrom::Start(self.tail))
            .and_then(|_| self.file.write_all(chunk.as_bytes()))
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data())
            .map_err(|e| PuzzleError::output_write(&self.path, e))?;

        self.tail += (separator.len() + body.len()) as u64;
        self.count += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<PathBuf> {
        self.file
            .sync_all()
            .map_err(|e| PuzzleError::output_write(&self.path, e))?;
        Ok(self.path)
    }
}

/// 一次性写入的 JSON 数组
///
/// 未调用 `finish` 就被丢弃时，临时文件会被删除，目标文件保持原样
pub struct AtomicArrayWriter {
    path: PathBuf,
    temp: NamedTempFile,
    records: Vec<AnswerRecord>,
}

impl AtomicArrayWriter {
    pub fn create(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(PuzzleError::output_write(
                path,
                std::io::Error::new(std::io::ErrorKind::Other, "输出路径是一个目录"),
            ));
        }

        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp = NamedTempFile::new_in(dir).map_err(|e| PuzzleError::output_write(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            temp,
            records: Vec::new(),
        })
    }

    pub fn push(&mut self, record: AnswerRecord) {
        self.records.push(record);
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        {
            let mut out = BufWriter::new(self.temp.as_file_mut());
            serde_json::to_writer_pretty(&mut out, &self.records)?;
            out.flush()
                .map_err(|e| PuzzleError::output_write(&self.path, e))?;
        }
        self.temp
            .as_file()
            .sync_all()
            .map_err(|e| PuzzleError::output_write(&self.path, e))?;

        self.temp
            .persist(&self.path)
            .map_err(|e| PuzzleError::output_write(&self.path, e.error))?;
        Ok(self.path)
    }
}

/// 每行一条 JSON
pub struct JsonLinesWriter {
    path: PathBuf,
    file: File,
}

impl JsonLinesWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| PuzzleError::output_write(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn write_record(&mut self, record: &AnswerRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| PuzzleError::output_write(&self.path, e))
    }

    pub fn finish(self) -> Result<PathBuf> {
        self.file
            .sync_all()
            .map_err(|e| PuzzleError::output_write(&self.path, e))?;
        Ok(self.path)
    }
}
