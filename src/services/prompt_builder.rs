//! 请求构建 - 业务能力层
//!
//! 把一道题目转换为发送给模型的请求：固定的系统指令 + 用户内容（图片在前，文字在后）

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Puzzle;
use crate::services::image_encoder::encode_image;

/// 系统指令（全局唯一，不随题目变化）
pub const SYSTEM_PROMPT: &str = "You are an expert mathematical puzzle solver.
Your task is to:
1. Carefully read and understand the mathematical puzzle
2. If an image is provided, analyze it thoroughly before answering
3. Break down the problem step by step
4. Show your reasoning and work
5. Provide a clear, concise final answer

Be precise and logical in your approach.";

/// 用户消息中的一段内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ContentPart {
    pub fn image(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

/// 发送给模型的一条消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    User { content: Vec<ContentPart> },
}

/// 一道题目对应的完整请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleRequest {
    pub system_instructions: &'static str,
    pub content: Vec<ContentPart>,
}

impl PuzzleRequest {
    /// system + user 两条消息
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::System {
                content: self.system_instructions.to_string(),
            },
            ChatMessage::User {
                content: self.content.clone(),
            },
        ]
    }
}

/// 请求构建器
///
/// 职责：
/// - 按"图片在前、文字在后"的顺序组装用户内容
/// - 图片读取失败直接返回错误，由上层决定如何处理
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    image_root: Option<PathBuf>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 相对图片路径以 `root` 为根目录解析
    pub fn with_image_root(root: impl Into<PathBuf>) -> Self {
        Self {
            image_root: Some(root.into()),
        }
    }

    pub fn resolve_image_path(&self, image: &str) -> PathBuf {
        let path = Path::new(image);
        match &self.image_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 构建请求
    ///
    /// 题目既没有图片也没有文字时返回空内容，不视为错误
    pub async fn build_request(&self, puzzle: &Puzzle) -> Result<PuzzleRequest> {
        let mut content = Vec::with_capacity(2);

        if let Some(image) = puzzle.image_path() {
            let url = encode_image(&self.resolve_image_path(image)).await?;
            content.push(ContentPart::image(url));
        }

        if let Some(question) = &puzzle.question {
            content.push(ContentPart::text(question.clone()));
        }

        Ok(PuzzleRequest {
            system_instructions: SYSTEM_PROMPT,
            content,
        })
    }
}
