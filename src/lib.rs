//! nefconvert - NEF TO JPEG CONVERTER
//!
//! 폴더 내 NEF RAW 파일들을 JPEG로 일괄 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🔍 **중복 건너뛰기**: 입력 폴더에 같은 이름의 JPG/JPEG가 있는 NEF는 변환하지 않음
//! - 🚀 **병렬 처리**: CPU 코어 수만큼의 Rayon 워커로 동시 변환
//! - 🎞️ **RAW 현상**: 카메라 화이트 밸런스, 디모자이크, sRGB 변환, 밝기 1.7배
//! - 📊 **진행률 및 통계**: 성공/실패 파일 수, 입출력 용량 표시
//!
//! # 예제
//!
//! ```bash
//! nefconvert -i ./DCIM/100NIKON -o ./converted
//! ```

pub mod cli;
pub mod config;
pub mod develop;
pub mod dispatcher;
pub mod error;
pub mod pattern;
pub mod processor;
pub mod selector;
pub mod stats;

// Re-exports for convenient access
pub use cli::Args;
pub use config::ConvertConfig;
pub use develop::{develop, Rgb16Image, SensorFrame};
pub use dispatcher::{dispatch, ensure_output_dir};
pub use error::{ConvertError, Result};
pub use pattern::PatternMatcher;
pub use processor::{convert_file, ConvertResult};
pub use selector::{files_to_convert, select, Selection};
pub use stats::{format_bytes, Statistics};
