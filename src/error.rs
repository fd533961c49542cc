//! 에러 타입 정의 모듈
//!
//! nefconvert에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// nefconvert에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 출력 경로에 폴더가 아닌 파일이 이미 존재
    #[error("출력 경로가 폴더가 아닙니다: {path}")]
    OutputNotADirectory { path: PathBuf },

    /// 출력 폴더 생성 실패
    #[error("출력 폴더를 만들 수 없습니다 ({path}): {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 폴더 목록 조회 실패
    #[error("폴더를 읽을 수 없습니다 ({path}): {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RAW 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpen { file: PathBuf, reason: String },

    /// RAW 디코딩 실패
    #[error("RAW 디코딩 실패 ({file}): {reason}")]
    Decode { file: PathBuf, reason: String },

    /// 지원하지 않는 센서 데이터
    #[error("지원하지 않는 RAW 데이터 ({file}): {reason}")]
    UnsupportedData { file: PathBuf, reason: String },

    /// JPEG 인코딩 실패
    #[error("JPEG 인코딩 실패 ({file}): {reason}")]
    Encode { file: PathBuf, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    Write { file: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPool { reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },
}

/// nefconvert 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;
