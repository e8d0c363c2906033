use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use puzzle_solver::error::CompletionError;
use puzzle_solver::models::AnswerRecord;
use puzzle_solver::orchestrator::BatchRunner;
use puzzle_solver::services::{
    AnswerService, ChatMessage, CompletionClient, ContentPart, OutputFormat, PromptBuilder,
};
use serde_json::json;

/// 按题目文字查表应答，记录每次请求
struct ScriptedClient {
    replies: HashMap<String, Result<String, String>>,
    seen: Mutex<Vec<Vec<ContentPart>>>,
}

impl ScriptedClient {
    fn new(replies: &[(&str, Result<&str, &str>)]) -> Self {
        Self {
            replies: replies
                .iter()
                .map(|(q, r)| {
                    (
                        q.to_string(),
                        r.map(str::to_string).map_err(str::to_string),
                    )
                })
                .collect(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let content = match messages.last() {
            Some(ChatMessage::User { content }) => content.clone(),
            _ => Vec::new(),
        };
        let question = content
            .iter()
            .find_map(|part| match part {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();
        self.seen.lock().unwrap().push(content);

        match self.replies.get(&question) {
            Some(reply) => reply.clone().map_err(CompletionError::Transport),
            None => Err(CompletionError::Transport(format!("no reply for {question}"))),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn solves_a_single_text_puzzle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("puzzles.json");
    let output = dir.path().join("puzzles_answer.json");
    std::fs::write(&input, r#"[{"id": 1, "title": "T", "question": "2+2=?"}]"#)?;

    let client = ScriptedClient::new(&[("2+2=?", Ok("4"))]);
    let runner = BatchRunner::new(AnswerService::new(client), OutputFormat::Streaming);
    let summary = runner.run(&input, &output).await?;

    assert_eq!(summary.answered, 1);
    assert_eq!(
        read_json(&output),
        json!([{"id": 1, "title": "T", "question": "2+2=?", "answer": "4"}])
    );
    Ok(())
}

#[tokio::test]
async fn transport_failure_is_recorded_and_run_succeeds() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("puzzles.json");
    let output = dir.path().join("answers.json");
    std::fs::write(&input, r#"[{"id": 1, "title": "T", "question": "2+2=?"}]"#)?;

    let client = ScriptedClient::new(&[("2+2=?", Err("timeout"))]);
    let runner = BatchRunner::new(AnswerService::new(client), OutputFormat::Streaming);
    let summary = runner.run(&input, &output).await?;

    assert_eq!(summary.failed, 1);
    assert_eq!(
        read_json(&output),
        json!([{"id": 1, "title": "T", "question": "2+2=?", "answer": "Error getting answer: timeout"}])
    );
    Ok(())
}

#[tokio::test]
async fn every_puzzle_gets_one_record_in_load_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("puzzles.json");
    let output = dir.path().join("answers.json");
    std::fs::write(
        &input,
        r#"[
            {"id": 30, "title": "C", "question": "third"},
            {"id": 10, "title": "A", "question": "first"},
            {"id": 20, "title": "B", "question": "broken"}
        ]"#,
    )?;

    let client = ScriptedClient::new(&[
        ("third", Ok("3")),
        ("first", Ok("1")),
        ("broken", Err("connection reset")),
    ]);
    let runner =
        BatchRunner::new(AnswerService::new(client), OutputFormat::Streaming).with_concurrency(3);
    let summary = runner.run(&input, &output).await?;

    assert_eq!((summary.total, summary.answered, summary.failed), (3, 2, 1));
    let records: Vec<AnswerRecord> = serde_json::from_value(read_json(&output))?;
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![30, 10, 20]);
    assert_eq!(records[2].answer, "Error getting answer: connection reset");
    assert_eq!(runner.service().client().calls(), 3);
    Ok(())
}

#[tokio::test]
async fn image_is_sent_before_question_text() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("figures"))?;
    std::fs::write(dir.path().join("figures").join("7.png"), [0xfb, 0xff, 0xfe])?;
    let input = dir.path().join("puzzles.toml");
    let output = dir.path().join("answers.json");
    std::fs::write(
        &input,
        r#"
[[puzzles]]
id = 7
title = "Triangles"
question = "How many triangles?"
image = "figures/7.png"
"#,
    )?;

    let client = ScriptedClient::new(&[("How many triangles?", Ok("5"))]);
    let service =
        AnswerService::with_prompt_builder(client, PromptBuilder::with_image_root(dir.path()));
    let runner = BatchRunner::new(service, OutputFormat::Atomic);
    runner.run(&input, &output).await?;

    let seen = runner.service().client().seen.lock().unwrap().clone();
    assert_eq!(
        seen[0],
        vec![
            ContentPart::image("data:image/png;base64,+//+"),
            ContentPart::text("How many triangles?"),
        ]
    );
    assert_eq!(read_json(&output)[0]["answer"], "5");
    Ok(())
}

#[tokio::test]
async fn json_lines_output_has_one_record_per_line() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("puzzles.json");
    let output = dir.path().join("answers.jsonl");
    std::fs::write(
        &input,
        r#"[{"id": 1, "title": "A", "question": "x"}, {"id": 2, "title": "B"}]"#,
    )?;

    let client = ScriptedClient::new(&[("x", Ok("y")), ("", Ok("nothing"))]);
    let runner = BatchRunner::new(AnswerService::new(client), OutputFormat::JsonLines);
    runner.run(&input, &output).await?;

    let content = std::fs::read_to_string(&output)?;
    let records: Vec<AnswerRecord> = content
        .lines()
        .map(serde_json::from_str::<AnswerRecord>)
        .collect::<Result<_, _>>()?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].question, "");
    assert_eq!(records[1].answer, "nothing");
    Ok(())
}

#[tokio::test]
async fn malformed_input_is_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("puzzles.json");
    let output = dir.path().join("answers.json");
    std::fs::write(&input, r#"{"id": 1}"#)?;

    let runner = BatchRunner::new(
        AnswerService::new(ScriptedClient::new(&[])),
        OutputFormat::Streaming,
    );

    assert!(runner.run(&input, &output).await.is_err());
    assert!(!output.exists());
    assert_eq!(runner.service().client().calls(), 0);
    Ok(())
}

#[tokio::test]
#[ignore] // 需要真实的 API Key：cargo test -- --ignored
async fn live_model_answers_a_puzzle() -> anyhow::Result<()> {
    use puzzle_solver::config::Config;
    use puzzle_solver::models::Puzzle;
    use puzzle_solver::services::OpenAiCompletionClient;

    puzzle_solver::logger::init();
    let config = Config::from_env()?;
    let service = AnswerService::new(OpenAiCompletionClient::new(&config));

    let answer = service
        .try_answer(&Puzzle {
            id: 1,
            title: "Sum".to_string(),
            question: Some("2+2=?".to_string()),
            image: None,
        })
        .await?;

    assert!(!answer.is_empty());
    Ok(())
}
