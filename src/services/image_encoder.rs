//! 图片编码 - 业务能力层
//!
//! 把本地图片文件转换为可以直接放进请求体的 data URL

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use phf::phf_map;
use tokio::fs;

use crate::error::{PuzzleError, Result};

/// 未识别的扩展名统一按 JPEG 处理
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

static MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "webp" => "image/webp",
};

/// 根据扩展名推断 MIME 类型（不检查文件内容）
pub fn mime_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// 把字节编码为 `data:<mime>;base64,<data>`
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// 读取图片并编码为 data URL
///
/// 读取失败时返回 `ImageRead`，不会退化成空引用
pub async fn encode_image(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await.map_err(|source| PuzzleError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mime = mime_type_for(path);
    tracing::debug!(
        "图片编码完成: {} ({}, {} 字节)",
        path.display(),
        mime,
        bytes.len()
    );

    Ok(to_data_url(mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_lookup_table() {
        assert_eq!(mime_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("dir/a.png")), "image/png");
        assert_eq!(mime_type_for(Path::new("a.Gif")), "image/gif");
        assert_eq!(mime_type_for(Path::new("a.webp")), "image/webp");
    }

    #[test]
    fn unknown_or_missing_extension_defaults_to_jpeg() {
        assert_eq!(mime_type_for(Path::new("scan.bmp")), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for(Path::new("figure")), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for(Path::new(".hidden")), DEFAULT_MIME_TYPE);
    }

    #[tokio::test]
    async fn encodes_with_standard_alphabet() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pixel.png");
        // 0xfb 0xff 在 URL-safe 编码下会出现 '-' / '_'
        std::fs::write(&path, [0xfb, 0xff, 0xfe])?;

        let url = encode_image(&path).await?;

        assert_eq!(url, "data:image/png;base64,+//+");
        Ok(())
    }

    #[tokio::test]
    async fn bmp_file_is_declared_as_jpeg() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("figure.bmp");
        std::fs::write(&path, b"BM")?;

        let url = encode_image(&path).await?;

        assert!(url.starts_with("data:image/jpeg;base64,"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_propagates_image_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_image(&dir.path().join("missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PuzzleError::ImageRead { .. }));
    }
}
