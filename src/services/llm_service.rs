//! LLM 服务 - 业务能力层
//!
//! 只负责"把消息发给模型、拿回文本"这一个能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini, Doubao, Azure 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::CompletionError;
use crate::services::prompt_builder::{ChatMessage, ContentPart};

/// 模型调用能力
///
/// 输入有序的消息列表，返回首个候选回答的文本。
/// 重试、超时等都属于实现方自己的事情。
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;

    /// 模型标识（仅用于日志）
    fn model_name(&self) -> &str;
}

/// 基于 async-openai 的模型调用实现
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiCompletionClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        debug!("调用 LLM API，模型: {}", self.model_name);

        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        // 构建请求
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model_name).messages(messages);
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        let request = args.build()?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            CompletionError::from(e)
        })?;

        debug!("LLM API 调用成功");

        first_choice_text(response, &self.model_name)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 取首个候选回答的文本，原样返回
///
/// 没有候选或文本为空（含纯空白）时返回错误
fn first_choice_text(
    response: CreateChatCompletionResponse,
    model: &str,
) -> Result<String, CompletionError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::EmptyResponse {
            model: model.to_string(),
        })?;

    choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| CompletionError::EmptyContent {
            model: model.to_string(),
        })
}

/// 转换为 async-openai 的消息类型
fn to_request_message(
    message: &ChatMessage,
) -> Result<ChatCompletionRequestMessage, CompletionError> {
    let converted = match message {
        ChatMessage::System { content } => {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(content.as_str())
                .build()?;
            ChatCompletionRequestMessage::System(system_msg)
        }
        ChatMessage::User { content } => {
            // 使用 Vision API：多部分内容，顺序保持不变
            let parts: Vec<ChatCompletionRequestUserMessageContentPart> =
                content.iter().map(to_content_part).collect();

            let user_msg = ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(parts))
                .build()?;
            ChatCompletionRequestMessage::User(user_msg)
        }
    };
    Ok(converted)
}

fn to_content_part(part: &ContentPart) -> ChatCompletionRequestUserMessageContentPart {
    match part {
        ContentPart::ImageUrl { image_url } => {
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image_url.url.clone(),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            )
        }
        ContentPart::Text { text } => ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText { text: text.clone() },
        ),
    }
}
