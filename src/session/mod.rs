//! 交互层（Session）
//!
//! - `quiz_session` - 答题会话状态（剩余题目 / 当前题目 / 当前答案）
//! - `quiz_shell` - 逐行命令终端，只负责展示

pub mod quiz_session;
pub mod quiz_shell;

pub use quiz_session::{PickOrder, QuizSession};
pub use quiz_shell::QuizShell;
