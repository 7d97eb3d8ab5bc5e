//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `catalog-check`: 检查图集目录 JSON（解析、ID 唯一、预览照片引用）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use gallery_runtime::{Catalog, CatalogError};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => check_all()?,
        "catalog-check" => {
            let path = args.next();
            catalog_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  catalog-check   检查图集目录 JSON

CATALOG-CHECK:
  cargo xtask catalog-check [path]

  不带参数：检查 gallery-runtime/assets/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 结构
    - 空图集、重复的图集 ID / 照片 ID
    - previewPhotoId 是否指向图集内的照片
"#
    );
}

fn check_all() -> anyhow::Result<()> {
    let sh = Shell::new()?;

    eprintln!("\n==> cargo fmt --all -- --check");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    eprintln!("\n==> cargo clippy --workspace --all-targets");
    cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

    eprintln!("\n==> cargo test --workspace");
    cmd!(sh, "cargo test --workspace").run()?;

    Ok(())
}

//=============================================================================
// catalog-check 命令实现
//=============================================================================

/// 默认目录（相对于 workspace root）
const DEFAULT_CATALOG_DIR: &str = "gallery-runtime/assets";

/// 单个文件的检查结果
#[derive(Debug)]
enum FileOutcome {
    /// 通过，附带图集数量和警告
    Ok { sets: usize, warnings: Vec<String> },
    /// 读取或校验失败
    Failed(String),
}

/// 执行目录检查
fn catalog_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_catalog_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(DEFAULT_CATALOG_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认目录不存在: {}\n请在 workspace 根目录运行，或指定目录文件路径",
                    dir.display()
                );
            }
            collect_catalog_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到图集目录文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个图集目录文件...\n", files.len());

    let mut errors = 0;
    let mut warns = 0;
    for file in &files {
        match check_catalog_file(file) {
            FileOutcome::Ok { sets, warnings } => {
                eprintln!("[OK] {}: {} 个图集", file.display(), sets);
                for warning in &warnings {
                    eprintln!("[WARN] {}: {}", file.display(), warning);
                }
                warns += warnings.len();
            }
            FileOutcome::Failed(message) => {
                eprintln!("[ERROR] {}: {}", file.display(), message);
                errors += 1;
            }
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    if errors > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", errors, warns);
        anyhow::bail!("图集目录检查发现错误");
    } else if warns > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warns);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
    Ok(())
}

/// 收集目录下的所有 JSON 文件
fn collect_catalog_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn check_catalog_file(file: &Path) -> FileOutcome {
    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => return FileOutcome::Failed(format!("无法读取文件 - {}", e)),
    };
    match check_catalog_json(&content) {
        Ok((sets, warnings)) => FileOutcome::Ok { sets, warnings },
        Err(e) => FileOutcome::Failed(e.to_string()),
    }
}

/// 校验目录内容，返回图集数量和警告
fn check_catalog_json(json: &str) -> Result<(usize, Vec<String>), CatalogError> {
    let catalog = Catalog::from_json_str(json)?;
    let mut warnings = Vec::new();

    for set in catalog.all_sets() {
        if let Some(preview) = &set.preview_photo_id {
            if !set.photos.iter().any(|p| &p.id == preview) {
                warnings.push(format!(
                    "图集 '{}' 的 previewPhotoId '{}' 不存在，将回退到第一张",
                    set.id, preview
                ));
            }
        }
        if set.photos.len() == 1 {
            warnings.push(format!("图集 '{}' 只有 hero，详情网格为空", set.id));
        }
    }

    Ok((catalog.len(), warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"[
        { "id": "a", "name": "A", "photos": [
            { "id": "a-1", "src": "a1.jpg", "alt": "" },
            { "id": "a-2", "src": "a2.jpg", "alt": "" }
        ] }
    ]"#;

    #[test]
    fn test_check_valid_catalog() {
        let (sets, warnings) = check_catalog_json(VALID).unwrap();
        assert_eq!(sets, 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_check_reports_dangling_preview() {
        let json = r#"[
            { "id": "a", "name": "A", "previewPhotoId": "nope", "photos": [
                { "id": "a-1", "src": "a1.jpg", "alt": "" }
            ] }
        ]"#;
        let (_, warnings) = check_catalog_json(json).unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_check_rejects_duplicate_set() {
        let json = r#"[
            { "id": "a", "name": "A", "photos": [{ "id": "1", "src": "1.jpg", "alt": "" }] },
            { "id": "a", "name": "B", "photos": [{ "id": "2", "src": "2.jpg", "alt": "" }] }
        ]"#;
        assert!(matches!(
            check_catalog_json(json),
            Err(CatalogError::DuplicateSet { .. })
        ));
    }

    #[test]
    fn test_builtin_catalog_passes() {
        let json = std::fs::read_to_string(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("../../gallery-runtime/assets/catalog.json"),
        )
        .unwrap();
        assert!(check_catalog_json(&json).is_ok());
    }

    #[test]
    fn test_collect_only_json_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.json"), VALID).unwrap();
        std::fs::write(dir.path().join("nested/b.json"), VALID).unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = collect_catalog_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(matches!(
            check_catalog_file(&files[0]),
            FileOutcome::Ok { sets: 1, .. }
        ));
    }
}
