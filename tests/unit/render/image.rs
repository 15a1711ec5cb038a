use super::*;

fn vp(x: i32, y: i32, w: u32, h: u32) -> Viewport {
    Viewport::new(x, y, w, h).unwrap()
}

#[test]
fn new_mask_is_black() {
    let m = MaskImage::new(vp(0, 0, 3, 2), 1);
    assert_eq!(m.width(), 3);
    assert_eq!(m.height(), 2);
    assert_eq!(m.mip_level(), 1);
    assert!(m.data().iter().all(|v| *v == 0.0));
}

#[test]
fn from_data_checks_buffer_size() {
    let err = MaskImage::from_data(vp(0, 0, 2, 2), 0, vec![0.0; 3]).unwrap_err();
    assert!(matches!(err, RotoError::Render(_)));
}

#[test]
fn pixel_lookup_is_relative_and_absolute() {
    let m = MaskImage::from_data(vp(10, 20, 2, 2), 0, vec![0.0, 0.25, 0.5, 1.0]).unwrap();
    assert_eq!(m.get(1, 1), Some(1.0));
    assert_eq!(m.get(2, 0), None);
    assert_eq!(m.value_at(11, 20), Some(0.25));
    assert_eq!(m.value_at(9, 20), None);
}

#[test]
fn gray8_conversion_rounds_and_clamps() {
    let m = MaskImage::from_data(vp(0, 0, 2, 1), 0, vec![0.5, 1.0]).unwrap();
    let g = m.to_gray8();
    assert_eq!(g.get_pixel(0, 0).0, [128]);
    assert_eq!(g.get_pixel(1, 0).0, [255]);
    assert_eq!(m.to_luma32f().get_pixel(0, 0).0, [0.5]);
}
