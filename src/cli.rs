//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

/// nefconvert CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "nefconvert",
    author = "YourName <your@email.com>",
    version,
    about = "NEF TO JPEG CONVERTER - 폴더 내 NEF RAW 파일들을 JPEG로 일괄 변환하는 CLI 도구",
    long_about = r#"
NEF TO JPEG CONVERTER
=====================

입력 폴더의 NEF 파일들을 찾아 JPEG로 변환합니다.
같은 이름의 JPG/JPEG 파일이 입력 폴더에 이미 있으면 건너뜁니다.

특징:
  • CPU 코어 수만큼의 워커로 병렬 변환
  • 카메라 화이트 밸런스 적용, 밝기 1.7배 보정
  • 진행률 표시 및 실패 파일 보고

예제:
  nefconvert -i ./DCIM -o ./converted
"#
)]
pub struct Args {
    /// NEF/JPEG 파일들이 있는 입력 폴더 경로
    #[arg(short, long)]
    pub input: PathBuf,

    /// 변환된 JPEG를 저장할 출력 폴더 경로 (없으면 생성)
    #[arg(short, long)]
    pub output: PathBuf,
}
