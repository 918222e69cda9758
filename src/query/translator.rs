//! 自然语言 → SQL 翻译器
//!
//! 翻译服务被当作不可信的外部黑盒：输出只是一段文本，
//! 是否能执行由 guard 决定。

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DbBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ureq::Agent;

use super::prompt::{TranslationContext, build_system_prompt};
use crate::config::TranslatorConfig;
use crate::errors::{Result, VidstatError};

#[async_trait]
pub trait SqlTranslator: Send + Sync {
    /// 返回一段 SQL 文本（未校验）
    async fn translate(&self, question: &str) -> Result<String>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 兼容的 chat-completions 客户端
///
/// ureq 是同步的，请求放在 `spawn_blocking` 中执行；
/// HTTP agent 和 tokio 截止时间同时限制耗时。
pub struct OpenAiTranslator {
    agent: Agent,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    backend: DbBackend,
    context: TranslationContext,
}

impl OpenAiTranslator {
    pub fn new(config: &TranslatorConfig, backend: DbBackend) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(VidstatError::config(
                "translator.api_key is not set (or export OPENAI_API_KEY)",
            ));
        }
        let context = TranslationContext::from_config(config)?;
        let timeout = config.timeout();

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Ok(Self {
            agent,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
            backend,
            context,
        })
    }

    /// 同步请求（在 spawn_blocking 中调用）
    fn complete_sync(
        agent: Agent,
        endpoint: String,
        api_key: String,
        body: serde_json::Value,
        timeout: Duration,
    ) -> Result<String> {
        let resp = agent
            .post(&endpoint)
            .header("Authorization", &format!("Bearer {}", api_key))
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::Timeout(_) => VidstatError::TranslatorTimeout(timeout),
                ureq::Error::StatusCode(code) => {
                    VidstatError::translator(format!("completion endpoint returned HTTP {}", code))
                }
                other => VidstatError::translator(format!("request to {} failed: {}", endpoint, other)),
            })?;

        let parsed: ChatResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| VidstatError::translator(format!("invalid completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VidstatError::translator("completion contained no message"))
    }
}

#[async_trait]
impl SqlTranslator for OpenAiTranslator {
    async fn translate(&self, question: &str) -> Result<String> {
        let system_prompt = build_system_prompt(self.backend, &self.context);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let body = serde_json::to_value(&request)?;

        info!("Requesting SQL from {} for: {}", self.model, question);

        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();
        let timeout = self.timeout;
        let task = tokio::task::spawn_blocking(move || {
            Self::complete_sync(agent, endpoint, api_key, body, timeout)
        });

        let raw = with_deadline(self.timeout, async move {
            task.await.map_err(|join_err| {
                warn!("Translator task failed: {}", join_err);
                VidstatError::translator(format!("translator task failed: {}", join_err))
            })?
        })
        .await?;

        let sql = clean_sql_response(&raw);
        if sql.is_empty() {
            return Err(VidstatError::translator("completion was empty"));
        }
        debug!("Translator produced: {}", sql);
        Ok(sql)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// 给一次翻译加截止时间；超时返回 TranslatorTimeout
pub async fn with_deadline<T, F>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Translator gave no answer within {} ms", timeout.as_millis());
            Err(VidstatError::TranslatorTimeout(timeout))
        }
    }
}

/// 清理模型输出：去掉 Markdown 代码块和 `SQL:` 前缀
pub fn clean_sql_response(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        // 跳过语言标记（```sql）
        let body_start = after.find('\n').map_or(0, |i| i + 1);
        let first_line = &after[..body_start];
        let body = if first_line.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
            &after[body_start..]
        } else {
            after
        };
        text = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
        text = text.trim();
    }

    if let Some(label) = text.get(..4)
        && label.eq_ignore_ascii_case("sql:")
    {
        text = &text[4..];
    }

    text.trim().to_string()
}
