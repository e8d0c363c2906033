//! 交互式答题终端
//!
//! 逐行读取命令，驱动 `QuizSession`。只做展示，不含业务逻辑。

use rand::Rng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::services::answer_service::AnswerService;
use crate::services::llm_service::CompletionClient;
use crate::session::quiz_session::{PickOrder, QuizSession};

const HELP: &str = "命令: new | ask | mode random|sequential | reset | restart | help | quit\n";

/// 终端命令
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    New,
    Ask,
    Mode(PickOrder),
    Reset,
    Restart,
    Help,
    Quit,
    Unknown(String),
}

impl ShellCommand {
    /// 空行返回 `None`
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?.to_ascii_lowercase();
        let parsed = match command.as_str() {
            "n" | "new" => ShellCommand::New,
            "a" | "ask" => ShellCommand::Ask,
            "mode" => match words.next().map(str::to_ascii_lowercase).as_deref() {
                Some("random") => ShellCommand::Mode(PickOrder::Random),
                Some("sequential") | Some("seq") => ShellCommand::Mode(PickOrder::Sequential),
                _ => ShellCommand::Unknown(line.trim().to_string()),
            },
            "reset" => ShellCommand::Reset,
            "restart" => ShellCommand::Restart,
            "h" | "help" | "?" => ShellCommand::Help,
            "q" | "quit" | "exit" => ShellCommand::Quit,
            _ => ShellCommand::Unknown(line.trim().to_string()),
        };
        Some(parsed)
    }
}

/// 交互式答题终端
pub struct QuizShell<'a, C, R> {
    session: QuizSession,
    service: &'a AnswerService<C>,
    rng: R,
    order: PickOrder,
}

impl<'a, C: CompletionClient, R: Rng> QuizShell<'a, C, R> {
    pub fn new(session: QuizSession, service: &'a AnswerService<C>, rng: R) -> Self {
        Self {
            session,
            service,
            rng,
            order: PickOrder::default(),
        }
    }

    pub fn with_order(mut self, order: PickOrder) -> Self {
        self.order = order;
        self
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// 运行命令循环，直到 `quit` 或输入结束
    pub async fn run<I, O>(&mut self, mut input: I, output: &mut O) -> std::io::Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        output
            .write_all(format!("题目总数: {}\n{}", self.session.total(), HELP).as_bytes())
            .await?;
        output.flush().await?;

        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line).await? == 0 {
                break;
            }
            let Some(command) = ShellCommand::parse(&line) else {
                continue;
            };
            if command == ShellCommand::Quit {
                break;
            }

            let reply = self.handle(command).await;
            output.write_all(reply.as_bytes()).await?;
            output.flush().await?;
        }

        Ok(())
    }

    async fn handle(&mut self, command: ShellCommand) -> String {
        match command {
            ShellCommand::New => match self.session.next_question(self.order, &mut self.rng) {
                Some(puzzle) => {
                    let mut text = format!("题目# {}\n{}\n", puzzle.id, puzzle.question_text());
                    if let Some(image) = puzzle.image_path() {
                        text.push_str(&format!("[图片: {}]\n", image));
                    }
                    text
                }
                None => "题目已全部出完，输入 restart 重新开始\n".to_string(),
            },
            ShellCommand::Ask => {
                tracing::info!("🤖 正在生成答案...");
                match self.session.ask(self.service).await {
                    Some(answer) => format!("答案: {}\n", answer),
                    None => "当前没有题目，请先输入 new\n".to_string(),
                }
            }
            ShellCommand::Mode(order) => {
                self.order = order;
                format!("出题顺序: {:?}\n", order)
            }
            ShellCommand::Reset => {
                self.session.reset();
                "已清空当前题目和答案\n".to_string()
            }
            ShellCommand::Restart => {
                self.session.start_over();
                format!("可以重新开始答题了（剩余 {} 题）\n", self.session.remaining())
            }
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => String::new(),
            ShellCommand::Unknown(text) => format!("未知命令: {}\n{}", text, HELP),
        }
    }
}
