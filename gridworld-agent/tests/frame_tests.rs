use gridworld_agent::frame::{Frame, Region, GREEN};
use gridworld_agent::AgentError;

fn gradient(w: usize, h: usize) -> Frame {
    let mut f = Frame::new(w, h, [0, 0, 0]);
    for y in 0..h {
        for x in 0..w {
            f.set(x, y, [x as u8, y as u8, (x + y) as u8]);
        }
    }
    f
}

#[test]
fn test_ppm_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.ppm");
    let frame = gradient(7, 5);

    frame.save(&path).unwrap();
    let loaded = Frame::load(&path).unwrap();
    assert_eq!(loaded, frame);
}

#[test]
fn test_ppm_header_with_comment() {
    let mut bytes = b"P6\n# made by hand\n2 1\n255\n".to_vec();
    bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
    let frame = Frame::read_ppm(&mut bytes.as_slice()).unwrap();
    assert_eq!(frame.width(), 2);
    assert_eq!(frame.get(1, 0), [4, 5, 6]);
}

#[test]
fn test_ppm_rejects_ascii_variant() {
    let bytes = b"P3\n1 1\n255\n0 0 0\n".to_vec();
    assert!(matches!(
        Frame::read_ppm(&mut bytes.as_slice()),
        Err(AgentError::Frame(_))
    ));
}

#[test]
fn test_ppm_rejects_truncated_pixels() {
    let mut bytes = b"P6 4 4 255\n".to_vec();
    bytes.extend_from_slice(&[0; 10]);
    assert!(Frame::read_ppm(&mut bytes.as_slice()).is_err());
}

#[test]
fn test_ppm_rejects_oversized_header() {
    let mut bytes = b"P6 4611686018427387904 4 255\n".to_vec();
    bytes.extend_from_slice(&[0; 12]);
    assert!(matches!(
        Frame::read_ppm(&mut bytes.as_slice()),
        Err(AgentError::Frame(_))
    ));

    let mut bytes = format!("P6 {} 1 255\n", usize::MAX / 3).into_bytes();
    bytes.extend_from_slice(&[0; 12]);
    assert!(matches!(
        Frame::read_ppm(&mut bytes.as_slice()),
        Err(AgentError::Frame(_))
    ));
}

#[test]
fn test_from_pixels_checks_length() {
    assert!(Frame::from_pixels(2, 2, vec![0; 11]).is_err());
    assert!(Frame::from_pixels(2, 2, vec![0; 12]).is_ok());
}

#[test]
fn test_crop() {
    let frame = gradient(10, 10);
    let region = Region { x: 3, y: 4, width: 2, height: 3 };
    let crop = frame.crop(region).unwrap();
    assert_eq!((crop.width(), crop.height()), (2, 3));
    assert_eq!(crop.get(0, 0), frame.get(3, 4));
    assert_eq!(crop.get(1, 2), frame.get(4, 6));

    let outside = Region { x: 8, y: 0, width: 5, height: 1 };
    assert!(frame.crop(outside).is_err());
}

#[test]
fn test_draw_rectangle_outline() {
    let mut frame = Frame::new(20, 20, [0, 0, 0]);
    frame.draw_rectangle(2, 3, 10, 8, GREEN, 2);

    assert_eq!(frame.get(2, 3), GREEN);
    assert_eq!(frame.get(3, 4), GREEN, "second ring of a 2 px outline");
    assert_eq!(frame.get(11, 10), GREEN, "bottom-right corner");
    assert_eq!(frame.get(6, 7), [0, 0, 0], "interior untouched");
    assert_eq!(frame.get(12, 3), [0, 0, 0], "nothing past the right edge");
}

#[test]
fn test_draw_rectangle_clips() {
    let mut frame = Frame::new(5, 5, [0, 0, 0]);
    frame.draw_rectangle(3, 3, 10, 10, GREEN, 2);
    assert_eq!(frame.get(4, 4), GREEN);
}
