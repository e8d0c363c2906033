use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::{PuzzleError, Result};
use crate::models::puzzle::Puzzle;

/// TOML 题目文件的顶层结构：`[[puzzles]]`
#[derive(Debug, Deserialize)]
struct TomlPuzzleSet {
    puzzles: Vec<Puzzle>,
}

/// 从文件加载全部题目
///
/// `.toml` 按 `[[puzzles]]` 解析，其他扩展名按 JSON 数组解析。
/// 返回顺序与文件中的顺序一致，不去重、不丢弃。
pub async fn load_puzzles(path: &Path) -> Result<Vec<Puzzle>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PuzzleError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(PuzzleError::InputRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let content = String::from_utf8(bytes).map_err(|e| PuzzleError::malformed(path, e))?;

    let puzzles = parse_puzzles(path, &content)?;

    warn_duplicate_ids(&puzzles);
    tracing::debug!("成功解析 {} 道题目: {}", puzzles.len(), path.display());

    Ok(puzzles)
}

fn parse_puzzles(path: &Path, content: &str) -> Result<Vec<Puzzle>> {
    let is_toml = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str::<TomlPuzzleSet>(content)
            .map(|set| set.puzzles)
            .map_err(|e| PuzzleError::malformed(path, e))
    } else {
        serde_json::from_str(content).map_err(|e| PuzzleError::malformed(path, e))
    }
}

fn warn_duplicate_ids(puzzles: &[Puzzle]) {
    let mut seen = HashSet::new();
    for puzzle in puzzles {
        if !seen.insert(puzzle.id) {
            tracing::warn!("题目 id 重复: {} ({})", puzzle.id, puzzle.title);
        }
    }
}
