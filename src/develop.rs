//! RAW 현상 모듈
//!
//! rawloader로 읽은 센서 데이터를 16비트 RGB 래스터로 현상합니다.
//!
//! 처리 순서:
//! 1. 블랙/화이트 레벨 정규화
//! 2. 카메라 화이트 밸런스 (녹색 기준)
//! 3. 쌍선형 디모자이크
//! 4. 카메라 색공간 -> sRGB 행렬 변환
//! 5. 밝기 배율
//! 6. BT.709 감마
//! 7. 센서 크롭, 방향 보정

use image::{imageops, ImageBuffer, Rgb};
use rawloader::{RawImage, RawImageData, CFA};
use rayon::prelude::*;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// 16비트 RGB 래스터
pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

/// sRGB(D65) -> XYZ
const XYZ_FROM_SRGB: [[f32; 3]; 3] = [
    [0.412453, 0.357580, 0.180423],
    [0.212671, 0.715160, 0.072169],
    [0.019334, 0.119193, 0.950227],
];

const IDENTITY: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 출력 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    HorizontalFlip,
    Rotate180,
    VerticalFlip,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl From<&rawloader::Orientation> for Orientation {
    fn from(o: &rawloader::Orientation) -> Self {
        match o {
            rawloader::Orientation::HorizontalFlip => Orientation::HorizontalFlip,
            rawloader::Orientation::Rotate180 => Orientation::Rotate180,
            rawloader::Orientation::VerticalFlip => Orientation::VerticalFlip,
            rawloader::Orientation::Transpose => Orientation::Transpose,
            rawloader::Orientation::Rotate90 => Orientation::Rotate90,
            rawloader::Orientation::Transverse => Orientation::Transverse,
            rawloader::Orientation::Rotate270 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }
}

/// 현상에 필요한 센서 데이터와 메타데이터
#[derive(Debug, Clone)]
pub struct SensorFrame {
    pub width: usize,
    pub height: usize,
    /// CFA 모자이크 값 (픽셀당 1개)
    pub data: Vec<u16>,
    pub cfa: CFA,
    /// CFA 색상 인덱스별 블랙 레벨
    pub black_levels: [u16; 4],
    /// CFA 색상 인덱스별 화이트 레벨
    pub white_levels: [u16; 4],
    /// 촬영 시 화이트 밸런스 계수 (R, G, B, E)
    pub wb_coeffs: [f32; 4],
    pub xyz_to_cam: [[f32; 3]; 4],
    /// 유효 영역 크롭 (top, right, bottom, left)
    pub crops: [usize; 4],
    pub orientation: Orientation,
}

impl SensorFrame {
    /// rawloader 결과를 현상용 프레임으로 변환
    pub fn from_raw(image: RawImage, file: &Path) -> Result<Self> {
        let unsupported = |reason: String| ConvertError::UnsupportedData {
            file: file.to_path_buf(),
            reason,
        };

        if image.cpp != 1 {
            return Err(unsupported(format!(
                "픽셀당 {}개 성분 데이터는 지원하지 않습니다",
                image.cpp
            )));
        }

        if image.cfa.width == 0 || image.cfa.height == 0 {
            return Err(unsupported("CFA 패턴이 없습니다".to_string()));
        }

        let data = match image.data {
            RawImageData::Integer(values) => values,
            RawImageData::Float(_) => {
                return Err(unsupported("부동소수점 센서 데이터".to_string()))
            }
        };

        check_dimensions(image.width, image.height, data.len()).map_err(unsupported)?;

        Ok(Self {
            width: image.width,
            height: image.height,
            data,
            orientation: Orientation::from(&image.orientation),
            cfa: image.cfa,
            black_levels: image.blacklevels,
            white_levels: image.whitelevels,
            wb_coeffs: image.wb_coeffs,
            xyz_to_cam: image.xyz_to_cam,
            crops: image.crops,
        })
    }

    /// CFA 색상 인덱스 (에메랄드(3)는 녹색으로 취급)
    fn color_at(&self, row: usize, col: usize) -> usize {
        match self.cfa.color_at(row, col) {
            3 => 1,
            c => c.min(2),
        }
    }

    /// 크롭 후 출력 영역 (left, top, width, height)
    fn crop_rect(&self) -> (usize, usize, usize, usize) {
        let [top, right, bottom, left] = self.crops;
        if left + right >= self.width || top + bottom >= self.height {
            return (0, 0, self.width, self.height);
        }
        (left, top, self.width - left - right, self.height - top - bottom)
    }
}

/// 센서 크기와 데이터 길이 확인
fn check_dimensions(width: usize, height: usize, len: usize) -> std::result::Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("빈 이미지 크기: {}x{}", width, height));
    }
    if len < width * height {
        return Err(format!(
            "센서 데이터 길이 불일치: {} < {}x{}",
            len, width, height
        ));
    }
    Ok(())
}

/// 녹색 기준으로 정규화한 화이트 밸런스 계수
///
/// 계수가 없거나 비정상이면 중립값(1.0)을 사용합니다.
pub fn normalized_wb(coeffs: [f32; 4]) -> [f32; 4] {
    let valid = |v: f32| v.is_finite() && v > 0.0;

    let green = coeffs[1];
    if !valid(green) || !valid(coeffs[0]) || !valid(coeffs[2]) {
        return [1.0; 4];
    }

    let fourth = if valid(coeffs[3]) { coeffs[3] } else { green };
    [coeffs[0] / green, 1.0, coeffs[2] / green, fourth / green]
}

/// 카메라 RGB -> 선형 sRGB 변환 행렬
///
/// 카메라 행렬이 없거나 역행렬을 구할 수 없으면 단위 행렬을 반환합니다.
pub fn cam_to_srgb(xyz_to_cam: &[[f32; 3]; 4]) -> [[f32; 3]; 3] {
    let mut cam_from_srgb = [[0.0f32; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            cam_from_srgb[i][j] = (0..3).map(|k| xyz_to_cam[i][k] * XYZ_FROM_SRGB[k][j]).sum();
        }
    }

    // 흰색(1,1,1)이 흰색으로 남도록 행 정규화
    for row in cam_from_srgb.iter_mut() {
        let sum: f32 = row.iter().sum();
        if sum.abs() < 1e-6 {
            return IDENTITY;
        }
        row.iter_mut().for_each(|v| *v /= sum);
    }

    invert3(&cam_from_srgb).unwrap_or(IDENTITY)
}

fn invert3(m: &[[f32; 3]; 3]) -> Option<[[f32; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

    if det.abs() < 1e-9 {
        return None;
    }

    let inv = 1.0 / det;
    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
        ],
    ])
}

/// BT.709 감마 곡선 (선형 0..1 -> 감마 0..1)
pub fn bt709_gamma(v: f32) -> f32 {
    if v < 0.018 {
        v * 4.5
    } else {
        1.099 * v.powf(0.45) - 0.099
    }
}

/// 블랙/화이트 레벨 정규화와 화이트 밸런스를 적용한 모자이크 평면
fn scaled_mosaic(frame: &SensorFrame) -> Vec<f32> {
    let wb = normalized_wb(frame.wb_coeffs);
    let width = frame.width;

    let mut plane = vec![0.0f32; width * frame.height];
    plane
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            for (col, px) in out.iter_mut().enumerate() {
                let c = frame.cfa.color_at(row, col).min(3);
                let black = frame.black_levels[c] as f32;
                let range = (frame.white_levels[c] as f32 - black).max(1.0);
                let raw = frame.data[row * width + col] as f32;
                *px = ((raw - black) / range * wb[c]).clamp(0.0, 1.0);
            }
        });
    plane
}

/// 3x3 이웃 평균으로 누락된 색상 성분을 채움
fn demosaic(frame: &SensorFrame, plane: &[f32]) -> Vec<[f32; 3]> {
    let (width, height) = (frame.width, frame.height);

    let mut rgb = vec![[0.0f32; 3]; width * height];
    rgb.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            for (col, px) in out.iter_mut().enumerate() {
                let own = frame.color_at(row, col);
                let mut sums = [0.0f32; 3];
                let mut counts = [0u32; 3];

                for r in row.saturating_sub(1)..(row + 2).min(height) {
                    for c in col.saturating_sub(1)..(col + 2).min(width) {
                        let color = frame.color_at(r, c);
                        sums[color] += plane[r * width + c];
                        counts[color] += 1;
                    }
                }

                for ch in 0..3 {
                    px[ch] = if ch == own {
                        plane[row * width + col]
                    } else if counts[ch] > 0 {
                        sums[ch] / counts[ch] as f32
                    } else {
                        0.0
                    };
                }
            }
        });
    rgb
}

fn to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

fn orient(img: Rgb16Image, orientation: Orientation) -> Rgb16Image {
    match orientation {
        Orientation::Normal => img,
        Orientation::HorizontalFlip => imageops::flip_horizontal(&img),
        Orientation::Rotate180 => imageops::rotate180(&img),
        Orientation::VerticalFlip => imageops::flip_vertical(&img),
        Orientation::Transpose => imageops::flip_horizontal(&imageops::rotate90(&img)),
        Orientation::Rotate90 => imageops::rotate90(&img),
        Orientation::Transverse => imageops::flip_horizontal(&imageops::rotate270(&img)),
        Orientation::Rotate270 => imageops::rotate270(&img),
    }
}

/// 센서 프레임을 16비트 sRGB 래스터로 현상
///
/// `brightness`는 감마 적용 전 선형 값에 곱해지며 결과는 최대값에서 잘립니다.
pub fn develop(frame: &SensorFrame, brightness: f32) -> Rgb16Image {
    if frame.width == 0 || frame.height == 0 {
        return ImageBuffer::new(0, 0);
    }

    let plane = scaled_mosaic(frame);
    let rgb = demosaic(frame, &plane);
    let matrix = cam_to_srgb(&frame.xyz_to_cam);

    let (left, top, out_w, out_h) = frame.crop_rect();
    let width = frame.width;

    let img = ImageBuffer::from_fn(out_w as u32, out_h as u32, |x, y| {
        let cam = rgb[(top + y as usize) * width + left + x as usize];
        let mut out = [0u16; 3];
        for (ch, value) in out.iter_mut().enumerate() {
            let linear: f32 = (0..3).map(|k| matrix[ch][k] * cam[k]).sum();
            *value = to_u16(bt709_gamma((linear * brightness).clamp(0.0, 1.0)));
        }
        Rgb(out)
    });

    orient(img, frame.orientation)
}
