use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum PuzzleError {
    /// 题目文件不存在
    #[error("题目文件不存在: {}", path.display())]
    NotFound { path: PathBuf },

    /// 读取题目文件失败
    #[error("读取题目文件失败 ({}): {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 题目文件内容无法解析
    #[error("题目文件格式错误 ({}): {message}", path.display())]
    MalformedData { path: PathBuf, message: String },

    /// 图片读取失败
    #[error("读取图片失败 ({}): {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 输出文件写入失败
    #[error("写入输出文件失败 ({}): {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 序列化失败
    #[error("JSON 序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 模型调用失败
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// LLM 调用错误
///
/// `Display` 只输出底层消息本身，作为答案记录时会加上统一前缀。
#[derive(Debug, Error)]
pub enum CompletionError {
    /// 传输层失败（网络、超时等）
    #[error("{0}")]
    Transport(String),

    /// async-openai 返回的错误
    #[error(transparent)]
    OpenAi(#[from] async_openai::error::OpenAIError),

    /// 返回结果为空
    #[error("LLM 返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },

    /// 返回内容为空
    #[error("LLM 返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置文件读取失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl PuzzleError {
    pub fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        PuzzleError::MalformedData {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PuzzleError::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, PuzzleError>;
