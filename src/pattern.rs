//! 패턴 매칭 모듈
//!
//! glob 패턴을 사용한 파일 이름 필터링을 담당합니다.
//! 확장자는 대소문자를 구분해서 비교합니다 (`*.NEF`는 `a.nef`와 일치하지 않음).
//! 점으로 시작하는 숨김 파일도 `*`에 일치합니다.

use glob::{MatchOptions, Pattern};

use crate::error::{ConvertError, Result};

/// RAW 파일 패턴
pub const RAW_PATTERN: &str = "*.NEF";

/// 건너뛰기 판단에 쓰이는 JPEG 패턴 (이 순서대로 목록을 이어 붙임)
pub const JPEG_PATTERNS: [&str; 2] = ["*.JPG", "*.JPEG"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// 컴파일된 패턴 매처
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Pattern,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Examples
    /// ```
    /// use nefconvert::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new("*.NEF").unwrap();
    /// assert!(matcher.matches("DSC_0001.NEF"));
    /// assert!(!matcher.matches("DSC_0001.nef"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled = Pattern::new(pattern).map_err(|_| ConvertError::InvalidPattern {
            pattern: pattern.to_string(),
        })?;

        Ok(Self { pattern: compiled })
    }

    /// RAW 파일 매처
    pub fn raw() -> Result<Self> {
        Self::new(RAW_PATTERN)
    }

    /// JPEG 매처 목록 (`*.JPG`, `*.JPEG` 순)
    pub fn jpegs() -> Result<Vec<Self>> {
        JPEG_PATTERNS.iter().map(|p| Self::new(p)).collect()
    }

    /// 파일 이름이 패턴과 일치하는지 확인
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.matches_with(file_name, MATCH_OPTIONS)
    }

    /// 원본 패턴 문자열
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}
