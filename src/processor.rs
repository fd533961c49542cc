//! NEF 파일 처리 모듈
//!
//! 개별 NEF 파일의 읽기, 현상, JPEG 저장을 담당합니다.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::ConvertConfig;
use crate::develop::{develop, Rgb16Image, SensorFrame};
use crate::error::{ConvertError, Result};
use crate::selector::file_stem;

/// 파일 변환 결과
#[derive(Debug)]
pub struct ConvertResult {
    /// 원본 NEF 파일 경로
    pub path: PathBuf,
    /// 저장된 JPEG 경로 (성공 시)
    pub output: Option<PathBuf>,
    /// 에러 메시지 (실패 시)
    pub error: Option<String>,
    /// 원본 파일 크기
    pub file_size: u64,
    /// 저장된 JPEG 크기
    pub bytes_written: u64,
}

impl ConvertResult {
    /// 성공 결과 생성
    pub fn success(path: PathBuf, output: PathBuf, file_size: u64, bytes_written: u64) -> Self {
        Self {
            path,
            output: Some(output),
            error: None,
            file_size,
            bytes_written,
        }
    }

    /// 실패 결과 생성
    pub fn failure(path: PathBuf, error: String, file_size: u64) -> Self {
        Self {
            path,
            output: None,
            error: Some(error),
            file_size,
            bytes_written: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 열려 있는 RAW 파일 내용
///
/// 스코프를 벗어나면 매핑/버퍼가 해제됩니다.
pub enum RawSource {
    /// 대용량 파일: 메모리 매핑
    Mapped(Mmap),
    /// 일반 파일: 메모리로 읽음
    Buffered(Vec<u8>),
}

impl RawSource {
    /// 파일 크기에 따라 메모리 매핑 또는 버퍼 읽기로 열기
    pub fn open(path: &Path, file_size: u64, mmap_threshold: u64) -> Result<Self> {
        let open_err = |reason: String| ConvertError::FileOpen {
            file: path.to_path_buf(),
            reason,
        };

        let mut file = File::open(path).map_err(|e| open_err(e.to_string()))?;

        if file_size >= mmap_threshold && file_size > 0 {
            let mmap = unsafe {
                Mmap::map(&file).map_err(|e| open_err(format!("메모리 매핑 실패: {}", e)))?
            };
            return Ok(RawSource::Mapped(mmap));
        }

        let mut buf = Vec::with_capacity(file_size as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| open_err(e.to_string()))?;
        Ok(RawSource::Buffered(buf))
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            RawSource::Mapped(mmap) => &mmap[..],
            RawSource::Buffered(buf) => &buf[..],
        }
    }

    /// rawloader로 디코딩
    pub fn decode(&self, path: &Path) -> Result<SensorFrame> {
        let mut reader = Cursor::new(self.bytes());
        let image = rawloader::decode(&mut reader).map_err(|e| ConvertError::Decode {
            file: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        SensorFrame::from_raw(image, path)
    }
}

/// NEF 경로에 대응하는 출력 JPEG 경로 (`<output_dir>/<stem>.jpg`)
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = file_stem(input).unwrap_or_default();
    output_dir.join(format!("{}.jpg", stem))
}

/// 16비트 래스터를 8비트 JPEG로 저장 (기존 파일은 덮어씀)
///
/// # Returns
/// 저장된 파일 크기
pub fn write_jpeg(img: Rgb16Image, path: &Path, quality: u8) -> Result<u64> {
    let rgb8 = DynamicImage::ImageRgb16(img).to_rgb8();

    let file = File::create(path).map_err(|e| ConvertError::Write {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);

    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    rgb8.write_with_encoder(encoder)
        .map_err(|e| ConvertError::Encode {
            file: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    writer.flush().map_err(|e| ConvertError::Write {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    drop(writer);

    Ok(fs::metadata(path).map(|m| m.len()).unwrap_or(0))
}

/// 단일 NEF 파일 변환
///
/// # Arguments
/// * `path` - 변환할 NEF 파일 경로
/// * `output_dir` - JPEG를 저장할 폴더
/// * `config` - 변환 설정
///
/// # Returns
/// 변환 결과를 담은 `ConvertResult`
pub fn convert_file(path: &Path, output_dir: &Path, config: &ConvertConfig) -> ConvertResult {
    let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let output = output_path(path, output_dir);

    match convert_file_internal(path, &output, file_size, config) {
        Ok(written) => ConvertResult::success(path.to_path_buf(), output, file_size, written),
        Err(e) => ConvertResult::failure(path.to_path_buf(), e.to_string(), file_size),
    }
}

/// 내부 변환 로직
fn convert_file_internal(
    path: &Path,
    output: &Path,
    file_size: u64,
    config: &ConvertConfig,
) -> Result<u64> {
    let img = {
        let source = RawSource::open(path, file_size, config.mmap_threshold)?;
        let frame = source.decode(path)?;
        develop(&frame, config.brightness)
    };

    write_jpeg(img, output, config.jpeg_quality)
}
