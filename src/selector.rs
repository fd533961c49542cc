//! 변환 대상 선택 모듈
//!
//! 입력 폴더에서 같은 이름의 JPEG가 없는 NEF 파일 목록을 만듭니다.
//! 하위 폴더는 탐색하지 않습니다.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::pattern::{PatternMatcher, RAW_PATTERN};

/// 폴더 바로 아래에서 패턴과 일치하는 파일을 경로 순으로 정렬해 반환
///
/// 폴더를 읽을 수 없으면 `ConvertError::Scan`을 반환합니다.
pub fn list_matching(dir: &Path, matcher: &PatternMatcher) -> Result<Vec<PathBuf>> {
    let scan_err = |source: std::io::Error| ConvertError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let matched = entry
            .file_name()
            .to_str()
            .map(|name| matcher.matches(name))
            .unwrap_or(false);

        if matched {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// 파일 경로의 stem (확장자 제외 이름)
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// 건너뛸 stem 목록 (`*.JPG` 결과 다음에 `*.JPEG` 결과)
pub fn skip_stems(dir: &Path) -> Result<Vec<String>> {
    let mut stems = Vec::new();
    for matcher in PatternMatcher::jpegs()? {
        stems.extend(list_matching(dir, &matcher)?.iter().filter_map(|p| file_stem(p)));
    }
    Ok(stems)
}

/// 선택 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// 변환할 NEF 경로 (NEF 정렬 순서)
    pub candidates: Vec<PathBuf>,
    /// 입력 폴더에서 찾은 NEF 파일 수
    pub raw_total: usize,
}

impl Selection {
    /// 같은 이름의 JPEG가 있어 건너뛴 수
    pub fn skipped(&self) -> usize {
        self.raw_total - self.candidates.len()
    }
}

/// 입력 폴더를 한 번 훑어 변환 대상과 NEF 총 개수를 함께 반환
///
/// 입력 폴더에 같은 stem의 JPG/JPEG가 있는 NEF는 제외하고,
/// NEF 정렬 순서를 유지해 `<dir>/<stem>.NEF` 경로로 반환합니다.
pub fn select(dir: &Path) -> Result<Selection> {
    let skip: HashSet<String> = skip_stems(dir)?.into_iter().collect();
    let raw_files = list_matching(dir, &PatternMatcher::raw()?)?;

    // "*.NEF" -> "NEF"
    let raw_ext = RAW_PATTERN.trim_start_matches("*.");

    let candidates = raw_files
        .iter()
        .filter_map(|p| file_stem(p))
        .filter(|stem| !skip.contains(stem))
        .map(|stem| dir.join(format!("{}.{}", stem, raw_ext)))
        .collect();

    Ok(Selection {
        candidates,
        raw_total: raw_files.len(),
    })
}

/// 변환할 NEF 파일 목록
pub fn files_to_convert(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(select(dir)?.candidates)
}
