//! 변환 설정 모듈
//!
//! 실행 한 번에 쓰이는 설정 값을 모아 둡니다. `main`에서 한 번 만들어
//! 디스패처와 워커로 그대로 넘깁니다.

use std::num::NonZeroUsize;

/// 기본 밝기 배율
pub const DEFAULT_BRIGHTNESS: f32 = 1.7;

/// 기본 JPEG 품질
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// 변환 설정
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// 워커 스레드 수
    pub workers: usize,
    /// 선형 밝기 배율 (모든 이미지에 동일하게 적용)
    pub brightness: f32,
    /// JPEG 품질 (1-100)
    pub jpeg_quality: u8,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertConfig {
    /// 기본 설정 생성 (워커 수 = 논리 CPU 수)
    pub fn new() -> Self {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        Self {
            workers,
            brightness: DEFAULT_BRIGHTNESS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        }
    }

    /// 워커 수 설정 (0은 1로 취급)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// 밝기 배율 설정
    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    /// JPEG 품질 설정
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }
}
