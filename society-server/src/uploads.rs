//! Upload Storage
//!
//! 上传文件统一存到 work_dir/uploads/<category>/ 下：
//! - KYC 图片重编码为 JPEG（质量 85），文件名取内容 sha256 前缀（天然去重）
//! - PDF 校验魔数后按给定名字落盘（收据号/订地号已保证唯一）
//!
//! 数据库只存相对路径 "category/filename"，经 /api/files 回读。

use std::io::Cursor;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::core::Config;
use crate::utils::AppError;

/// Maximum upload size (10MB, covers rendered receipt PDFs)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Supported image formats for member photos / KYC scans
const SUPPORTED_IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for stored images
const JPEG_QUALITY: u8 = 85;

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// 文件名只保留字母数字，其余替换为下划线（与打印件命名一致）
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn ensure_category_dir(config: &Config, category: &str) -> Result<PathBuf, AppError> {
    let dir = config.uploads_dir().join(category);
    std::fs::create_dir_all(&dir)
        .map_err(|e| AppError::internal(format!("Failed to create uploads directory: {e}")))?;
    Ok(dir)
}

fn check_size(data: &[u8]) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::validation("Empty file provided".to_string()));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {} bytes ({}MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }
    Ok(())
}

/// 存储图片类上传（会员照片、证件扫描件）
///
/// 重编码为 JPEG；返回相对路径 "category/<hash>.jpg"。
pub fn store_image(
    config: &Config,
    category: &str,
    original_name: &str,
    data: &[u8],
) -> Result<String, AppError> {
    check_size(data)?;

    let ext = PathBuf::from(original_name)
        .extension()
        .and_then(|e| e.to_str().map(|s| s.to_lowercase()))
        .ok_or_else(|| {
            AppError::validation(format!("Invalid file extension for: {original_name}"))
        })?;
    if !SUPPORTED_IMAGE_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext,
            SUPPORTED_IMAGE_FORMATS.join(", ")
        )));
    }

    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image: {e}")))?;

    // Re-encode as JPEG with fixed quality
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to compress image: {e}")))?;
    }

    // Content-hash filename: identical uploads dedupe to one file
    let hash = calculate_hash(&buffer);
    let filename = format!("{}.jpg", &hash[..32]);
    let dir = ensure_category_dir(config, category)?;
    let path = dir.join(&filename);
    if !path.exists() {
        std::fs::write(&path, &buffer)
            .map_err(|e| AppError::internal(format!("Failed to save file: {e}")))?;
    }

    tracing::info!(
        original_name = %original_name,
        size = buffer.len(),
        category = %category,
        "Image stored"
    );

    Ok(format!("{category}/{filename}"))
}

/// 存储 PDF 类上传（收据打印件、取消文书）
///
/// 返回相对路径 "category/<stem>.pdf"。
pub fn store_pdf(
    config: &Config,
    category: &str,
    stem: &str,
    data: &[u8],
) -> Result<String, AppError> {
    check_size(data)?;

    // PDF magic: "%PDF-"
    if !data.starts_with(b"%PDF-") {
        return Err(AppError::validation("File is not a valid PDF".to_string()));
    }

    let filename = format!("{}.pdf", sanitize_filename(stem));
    let dir = ensure_category_dir(config, category)?;
    let path = dir.join(&filename);
    std::fs::write(&path, data)
        .map_err(|e| AppError::internal(format!("Failed to save file: {e}")))?;

    tracing::info!(size = data.len(), category = %category, filename = %filename, "PDF stored");

    Ok(format!("{category}/{filename}"))
}

/// 按扩展名分流存储（KYC 材料既可能是扫描图也可能是 PDF）
///
/// PDF 用内容哈希作文件名，图片走 [`store_image`]。
pub fn store_document(
    config: &Config,
    category: &str,
    original_name: &str,
    data: &[u8],
) -> Result<String, AppError> {
    let ext = PathBuf::from(original_name)
        .extension()
        .and_then(|e| e.to_str().map(|s| s.to_lowercase()));
    if ext.as_deref() == Some("pdf") {
        let hash = calculate_hash(data);
        store_pdf(config, category, &hash[..32], data)
    } else {
        store_image(config, category, original_name, data)
    }
}

/// 解析相对路径到 uploads 目录内的绝对路径
///
/// 拒绝路径穿越（.. 或绝对路径段）。
pub fn resolve(config: &Config, relative: &str) -> Result<PathBuf, AppError> {
    let rel = PathBuf::from(relative);
    let traversal = rel.components().any(|c| {
        !matches!(c, std::path::Component::Normal(_))
    });
    if traversal {
        return Err(AppError::validation("Invalid file path".to_string()));
    }
    Ok(config.uploads_dir().join(rel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_alphanumerics_only() {
        assert_eq!(sanitize_filename("NCG-RCP-000001"), "NCG_RCP_000001");
        assert_eq!(sanitize_filename("a b/c.pdf"), "a_b_c_pdf");
    }

    #[test]
    fn resolve_rejects_traversal() {
        let config = crate::core::Config::with_overrides("/tmp/society-test", 0);
        assert!(resolve(&config, "../etc/passwd").is_err());
        assert!(resolve(&config, "receipts/ok.pdf").is_ok());
    }

    #[test]
    fn store_pdf_rejects_non_pdf_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::core::Config::with_overrides(dir.path().to_string_lossy(), 0);
        let err = store_pdf(&config, "receipts", "Receipt_X", b"not a pdf").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let ok = store_pdf(&config, "receipts", "Receipt_X", b"%PDF-1.4 fake").unwrap();
        assert_eq!(ok, "receipts/Receipt_X.pdf");
    }
}
