//! 통합 테스트 모듈
//!
//! 파일 선택부터 변환 분배까지 전체 흐름을 테스트합니다.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 테스트용 파일 생성 헬퍼
fn create_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// 최소 구성의 비압축 CFA DNG (RGGB, 16비트 리틀엔디언)
///
/// rawloader는 확장자가 아니라 내용으로 형식을 판별하므로 `.NEF` 이름으로 저장해도 읽힙니다.
fn synthetic_dng(width: u32, height: u32) -> Vec<u8> {
    const BYTE: u16 = 1;
    const ASCII: u16 = 2;
    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    const SRATIONAL: u16 = 10;

    fn shorts(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
    fn longs(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
    fn srationals(values: &[(i32, i32)]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|(n, d)| n.to_le_bytes().into_iter().chain(d.to_le_bytes()))
            .collect()
    }

    let pixels: Vec<u8> = (0..width * height)
        .flat_map(|i| (((i * 37) % 3000 + 500) as u16).to_le_bytes())
        .collect();
    let pixel_offset = 8u32;
    let pixel_len = pixels.len() as u32;

    let color_matrix: Vec<(i32, i32)> = (0..9)
        .map(|i| if i % 4 == 0 { (1, 1) } else { (0, 1) })
        .collect();

    // (tag, type, count, value)
    let entries: Vec<(u16, u16, u32, Vec<u8>)> = vec![
        (254, LONG, 1, longs(&[0])),
        (256, LONG, 1, longs(&[width])),
        (257, LONG, 1, longs(&[height])),
        (258, SHORT, 1, shorts(&[16])),
        (259, SHORT, 1, shorts(&[1])),
        (262, SHORT, 1, shorts(&[32803])),
        (271, ASCII, 10, b"Synthetic\0".to_vec()),
        (272, ASCII, 12, b"Test Sensor\0".to_vec()),
        (273, LONG, 1, longs(&[pixel_offset])),
        (277, SHORT, 1, shorts(&[1])),
        (278, LONG, 1, longs(&[height])),
        (279, LONG, 1, longs(&[pixel_len])),
        (33421, SHORT, 2, shorts(&[2, 2])),
        (33422, BYTE, 4, vec![0, 1, 1, 2]),
        (50706, BYTE, 4, vec![1, 4, 0, 0]),
        (50714, SHORT, 1, shorts(&[0])),
        (50717, SHORT, 1, shorts(&[4095])),
        (50721, SRATIONAL, 9, srationals(&color_matrix)),
    ];

    let ifd_offset = pixel_offset + pixel_len;
    let extra_base = ifd_offset + 2 + 12 * entries.len() as u32 + 4;

    let mut ifd: Vec<u8> = Vec::new();
    let mut extra: Vec<u8> = Vec::new();
    ifd.extend((entries.len() as u16).to_le_bytes());
    for (tag, kind, count, value) in &entries {
        ifd.extend(tag.to_le_bytes());
        ifd.extend(kind.to_le_bytes());
        ifd.extend(count.to_le_bytes());
        if value.len() <= 4 {
            let mut inline = value.clone();
            inline.resize(4, 0);
            ifd.extend(inline);
        } else {
            ifd.extend((extra_base + extra.len() as u32).to_le_bytes());
            extra.extend(value);
            if value.len() % 2 == 1 {
                extra.push(0);
            }
        }
    }
    ifd.extend(0u32.to_le_bytes());

    let mut file: Vec<u8> = Vec::new();
    file.extend(b"II");
    file.extend(42u16.to_le_bytes());
    file.extend(ifd_offset.to_le_bytes());
    file.extend(pixels);
    file.extend(ifd);
    file.extend(extra);
    file
}

/// A.NEF(디코딩 가능), B.NEF, B.JPG 구성
fn setup_camera_directory() -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    create_file(temp_dir.path(), "A.NEF", &synthetic_dng(16, 12));
    create_file(temp_dir.path(), "B.NEF", b"raw b");
    create_file(temp_dir.path(), "B.JPG", b"jpeg b");

    temp_dir
}

mod selector_tests {
    use super::*;
    use nefconvert::selector::{files_to_convert, list_matching};
    use nefconvert::{ConvertError, PatternMatcher};

    #[test]
    fn test_skips_raw_with_jpeg_sibling() {
        let temp_dir = setup_camera_directory();

        let files = files_to_convert(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("A.NEF")]);
    }

    #[test]
    fn test_no_jpegs_returns_all_sorted() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "DSC_0003.NEF", b"");
        create_file(temp_dir.path(), "DSC_0001.NEF", b"");
        create_file(temp_dir.path(), "DSC_0002.NEF", b"");

        let files = files_to_convert(temp_dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                temp_dir.path().join("DSC_0001.NEF"),
                temp_dir.path().join("DSC_0002.NEF"),
                temp_dir.path().join("DSC_0003.NEF"),
            ]
        );
    }

    #[test]
    fn test_all_converted_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.NEF", b"");
        create_file(temp_dir.path(), "a.JPG", b"");
        create_file(temp_dir.path(), "b.NEF", b"");
        create_file(temp_dir.path(), "b.JPEG", b"");

        assert!(files_to_convert(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_no_raw_files_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.JPG", b"");
        create_file(temp_dir.path(), "notes.txt", b"");

        assert!(files_to_convert(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_case_sensitive_extensions() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "lower.nef", b"");
        create_file(temp_dir.path(), "upper.NEF", b"");
        // 소문자 jpg는 건너뛰기 대상이 아님
        create_file(temp_dir.path(), "upper.jpg", b"");

        let files = files_to_convert(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("upper.NEF")]);
    }

    #[test]
    fn test_non_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let sub_dir = temp_dir.path().join("sub");
        fs::create_dir(&sub_dir).unwrap();
        create_file(&sub_dir, "deep.NEF", b"");
        create_file(temp_dir.path(), "top.NEF", b"");
        // 하위 폴더의 JPG는 건너뛰기 판단에 쓰이지 않음
        create_file(&sub_dir, "top.JPG", b"");

        let files = files_to_convert(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("top.NEF")]);
    }

    #[test]
    fn test_stem_match_is_exact() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "DSC_0001.NEF", b"");
        create_file(temp_dir.path(), "dsc_0001.JPG", b"");
        create_file(temp_dir.path(), "DSC_00011.JPG", b"");

        let files = files_to_convert(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("DSC_0001.NEF")]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = files_to_convert(&missing);
        assert!(matches!(result, Err(ConvertError::Scan { .. })));
    }

    #[test]
    fn test_list_matching_only_direct_children() {
        let temp_dir = setup_camera_directory();
        let jpg = PatternMatcher::new("*.JPG").unwrap();

        let files = list_matching(temp_dir.path(), &jpg).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("B.JPG")]);
    }
}

mod dispatcher_tests {
    use super::*;
    use indicatif::ProgressBar;
    use nefconvert::{dispatch, ensure_output_dir, files_to_convert, ConvertConfig};

    #[test]
    fn test_output_created_before_conversion() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        assert!(!out.exists());

        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_camera_directory_converts_only_unmatched() {
        let temp_dir = setup_camera_directory();
        let out = temp_dir.path().join("out");
        ensure_output_dir(&out).unwrap();

        let candidates = files_to_convert(temp_dir.path()).unwrap();
        let config = ConvertConfig::new().with_workers(2);
        let pb = ProgressBar::hidden();
        let results = dispatch(&candidates, &out, &config, &pb).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, temp_dir.path().join("A.NEF"));
        assert!(results[0].is_success(), "{:?}", results[0].error);
        assert_eq!(results[0].output, Some(out.join("A.jpg")));
        assert!(results[0].bytes_written > 0);
        assert_eq!(pb.position(), 1);

        let decoded = image::open(out.join("A.jpg")).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));

        assert!(!out.join("B.jpg").exists());
    }

    #[test]
    fn test_mapped_source_converts() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_file(temp_dir.path(), "DSC_0100.NEF", &synthetic_dng(8, 6));

        let config = ConvertConfig::new().with_mmap_threshold(0);
        let result = nefconvert::convert_file(&input, temp_dir.path(), &config);

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.output, Some(temp_dir.path().join("DSC_0100.jpg")));
        assert!(temp_dir.path().join("DSC_0100.jpg").exists());
    }

    #[test]
    fn test_mixed_batch_reports_each_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        ensure_output_dir(&out).unwrap();

        create_file(temp_dir.path(), "good.NEF", &synthetic_dng(8, 6));
        create_file(temp_dir.path(), "bad.NEF", b"corrupt");

        let candidates = files_to_convert(temp_dir.path()).unwrap();
        let results = dispatch(&candidates, &out, &ConvertConfig::new(), &ProgressBar::hidden())
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(!results[0].is_success());
        assert!(results[1].is_success(), "{:?}", results[1].error);
        assert!(!out.join("bad.jpg").exists());
        assert!(out.join("good.jpg").exists());
    }

    #[test]
    fn test_results_follow_input_order() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        ensure_output_dir(&out).unwrap();

        for i in 0..8 {
            create_file(temp_dir.path(), &format!("IMG_{}.NEF", i), b"corrupt");
        }

        let candidates = files_to_convert(temp_dir.path()).unwrap();
        let config = ConvertConfig::new().with_workers(4);
        let results = dispatch(&candidates, &out, &config, &ProgressBar::hidden()).unwrap();

        let paths: Vec<_> = results.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, candidates);
        assert!(results.iter().all(|r| !r.is_success()));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_no_candidates_no_writes() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        ensure_output_dir(&out).unwrap();

        let candidates = files_to_convert(temp_dir.path()).unwrap();
        assert!(candidates.is_empty());

        let pb = ProgressBar::hidden();
        let results = dispatch(&candidates, &out, &ConvertConfig::new(), &pb).unwrap();

        assert!(results.is_empty());
        assert_eq!(pb.position(), 0);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }
}

mod develop_tests {
    use super::*;
    use nefconvert::develop::{develop, Orientation, SensorFrame};
    use nefconvert::processor::{output_path, write_jpeg};
    use rawloader::CFA;

    #[test]
    fn test_developed_frame_written_as_jpeg() {
        let temp_dir = TempDir::new().unwrap();

        let frame = SensorFrame {
            width: 16,
            height: 12,
            data: (0..16 * 12).map(|i| (i * 20) as u16).collect(),
            cfa: CFA::new("RGGB"),
            black_levels: [0; 4],
            white_levels: [4095; 4],
            wb_coeffs: [2.0, 1.0, 1.5, f32::NAN],
            xyz_to_cam: [[0.0; 3]; 4],
            crops: [0; 4],
            orientation: Orientation::Normal,
        };

        let img = develop(&frame, 1.7);
        let output = output_path(Path::new("DSC_0042.NEF"), temp_dir.path());
        write_jpeg(img, &output, 75).unwrap();

        assert_eq!(output, temp_dir.path().join("DSC_0042.jpg"));
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
    }
}
