use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::services::answer_writer::OutputFormat;

/// 程序配置
///
/// 优先级：默认值 < TOML 配置文件 < 环境变量 < 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 题目文件
    pub input_file: PathBuf,
    /// 答案输出文件
    pub output_file: PathBuf,
    /// 输出格式
    pub output_format: OutputFormat,
    /// 同时请求的题目数量（1 表示严格顺序处理）
    pub max_concurrent_puzzles: usize,
    /// 图片相对路径的根目录
    pub image_root: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: Option<f32>,
    pub llm_max_tokens: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("puzzles.json"),
            output_file: PathBuf::from("puzzles_answer.json"),
            output_format: OutputFormat::Streaming,
            max_concurrent_puzzles: 1,
            image_root: None,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            llm_temperature: None,
            llm_max_tokens: None,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺失的键使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 加载配置：有配置文件则以文件为基础，然后叠加环境变量
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 用环境变量覆盖当前值
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("PUZZLE_INPUT_FILE") {
            self.input_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("PUZZLE_OUTPUT_FILE") {
            self.output_file = PathBuf::from(v);
        }
        if let Some(v) = parse_var(&lookup, "PUZZLE_OUTPUT_FORMAT", "streaming|atomic|jsonl")? {
            self.output_format = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_CONCURRENT_PUZZLES", "usize")? {
            self.max_concurrent_puzzles = v;
        }
        if let Some(v) = lookup("PUZZLE_IMAGE_ROOT") {
            self.image_root = Some(PathBuf::from(v));
        }
        if let Some(v) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        if let Some(v) = lookup("LLM_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = parse_var(&lookup, "LLM_TEMPERATURE", "f32")? {
            self.llm_temperature = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "LLM_MAX_TOKENS", "u32")? {
            self.llm_max_tokens = Some(v);
        }
        Ok(self)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_cli_convention() {
        let config = Config::default();
        assert_eq!(config.input_file, PathBuf::from("puzzles.json"));
        assert_eq!(config.output_file, PathBuf::from("puzzles_answer.json"));
        assert_eq!(config.max_concurrent_puzzles, 1);
        assert_eq!(config.output_format, OutputFormat::Streaming);
    }

    #[test]
    fn toml_file_keeps_defaults_for_missing_keys() {
        let config = Config::from_toml_str(
            r#"
            input_file = "set_b.json"
            output_format = "jsonl"
            llm_model_name = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.input_file, PathBuf::from("set_b.json"));
        assert_eq!(config.output_format, OutputFormat::JsonLines);
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert_eq!(config.output_file, PathBuf::from("puzzles_answer.json"));
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = Config::default()
            .with_overrides_from(lookup_from(&[
                ("MAX_CONCURRENT_PUZZLES", "4"),
                ("PUZZLE_OUTPUT_FORMAT", "atomic"),
                ("OPENAI_API_KEY", "sk-test"),
                ("LLM_TEMPERATURE", "0.2"),
            ]))
            .unwrap();

        assert_eq!(config.max_concurrent_puzzles, 4);
        assert_eq!(config.output_format, OutputFormat::Atomic);
        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.llm_temperature, Some(0.2));
    }

    #[test]
    fn invalid_env_value_is_rejected() {
        let err = Config::default()
            .with_overrides_from(lookup_from(&[("MAX_CONCURRENT_PUZZLES", "many")]))
            .unwrap_err();

        match err {
            ConfigError::EnvVarParseFailed { var_name, value, .. } => {
                assert_eq!(var_name, "MAX_CONCURRENT_PUZZLES");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
