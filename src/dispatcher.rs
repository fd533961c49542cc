//! 변환 작업 분배 모듈
//!
//! 고정 크기 워커 풀에 NEF 파일을 하나씩 넘기고 결과를 모읍니다.
//! 완료 순서는 보장하지 않지만 반환 목록은 입력 순서를 따릅니다.

use colored::Colorize;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::processor::{convert_file, ConvertResult};

/// 출력 폴더 준비
///
/// 없으면 만들고 (상위 폴더는 만들지 않음), 이미 있으면 그대로 둡니다.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            if path.is_dir() {
                Ok(())
            } else {
                Err(ConvertError::OutputNotADirectory {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(source) => Err(ConvertError::CreateOutput {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// 모든 후보 파일을 워커 풀에서 변환
///
/// 후보가 없으면 풀을 만들지 않고 빈 목록을 반환합니다.
/// 개별 파일 실패는 `ConvertResult`로 돌려주며 에러로 전파하지 않습니다.
pub fn dispatch(
    candidates: &[PathBuf],
    output_dir: &Path,
    config: &ConvertConfig,
    progress: &ProgressBar,
) -> Result<Vec<ConvertResult>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("nefconvert-worker-{}", i))
        .build()
        .map_err(|e| ConvertError::ThreadPool {
            reason: e.to_string(),
        })?;

    let results = pool.install(|| {
        candidates
            .par_iter()
            .map(|path| {
                progress.println(format!("  {} Converting {}", "▶".bright_cyan(), path.display()));

                let result = convert_file(path, output_dir, config);
                if result.is_success() {
                    progress.println(format!("  {} Done with {}", "✓".green(), path.display()));
                }

                progress.inc(1);
                result
            })
            .collect()
    });

    Ok(results)
}
