use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::BufReader;

use puzzle_solver::config::Config;
use puzzle_solver::logger;
use puzzle_solver::models::load_puzzles;
use puzzle_solver::orchestrator::BatchRunner;
use puzzle_solver::services::{
    AnswerService, OpenAiCompletionClient, OutputFormat, PromptBuilder,
};
use puzzle_solver::session::{PickOrder, QuizSession, QuizShell};
use puzzle_solver::utils::logging::log_startup;

#[derive(Parser, Debug)]
#[command(name = "puzzle_solver", version, about = "批量调用大模型解答题目")]
struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 批量解题（默认）
    Solve(SolveArgs),
    /// 交互式逐题答题
    Quiz(QuizArgs),
}

#[derive(clap::Args, Debug, Default)]
struct SolveArgs {
    /// 题目文件（.json 或 .toml）
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 答案输出文件
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 输出格式
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// 同时请求的题目数量
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// 模型名称
    #[arg(short, long)]
    model: Option<String>,

    /// 图片相对路径的根目录
    #[arg(long)]
    image_root: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct QuizArgs {
    /// 题目文件（.json 或 .toml）
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 出题顺序
    #[arg(long, value_enum, default_value = "random")]
    order: PickOrder,

    /// 模型名称
    #[arg(short, long)]
    model: Option<String>,

    /// 图片相对路径的根目录
    #[arg(long)]
    image_root: Option<PathBuf>,
}

fn prompt_builder(config: &Config) -> PromptBuilder {
    match &config.image_root {
        Some(root) => PromptBuilder::with_image_root(root),
        None => PromptBuilder::new(),
    }
}

async fn solve(mut config: Config, args: SolveArgs) -> Result<()> {
    if let Some(input) = args.input {
        config.input_file = input;
    }
    if let Some(output) = args.output {
        config.output_file = output;
    }
    if let Some(format) = args.format {
        config.output_format = format;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrent_puzzles = concurrency;
    }
    if let Some(model) = args.model {
        config.llm_model_name = model;
    }
    if let Some(root) = args.image_root {
        config.image_root = Some(root);
    }

    log_startup(&config);

    let client = OpenAiCompletionClient::new(&config);
    let service = AnswerService::with_prompt_builder(client, prompt_builder(&config));
    let runner = BatchRunner::new(service, config.output_format)
        .with_concurrency(config.max_concurrent_puzzles);

    runner
        .run(&config.input_file, &config.output_file)
        .await
        .with_context(|| format!("批量解题失败: {}", config.input_file.display()))?;

    Ok(())
}

async fn quiz(mut config: Config, args: QuizArgs) -> Result<()> {
    if let Some(input) = args.input {
        config.input_file = input;
    }
    if let Some(model) = args.model {
        config.llm_model_name = model;
    }
    if let Some(root) = args.image_root {
        config.image_root = Some(root);
    }

    let puzzles = load_puzzles(&config.input_file).await?;
    let client = OpenAiCompletionClient::new(&config);
    let service = AnswerService::with_prompt_builder(client, prompt_builder(&config));

    let mut shell = QuizShell::new(QuizSession::new(puzzles), &service, StdRng::from_entropy())
        .with_order(args.order);
    let mut stdout = tokio::io::stdout();
    shell
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.verbose {
        config.verbose_logging = true;
    }

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    let result = match cli.command.unwrap_or(Command::Solve(SolveArgs::default())) {
        Command::Solve(args) => solve(config, args).await,
        Command::Quiz(args) => quiz(config, args).await,
    };
    if let Err(e) = &result {
        tracing::error!("❌ 程序异常退出: {:#}", e);
    }
    result
}
