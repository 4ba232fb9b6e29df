use pixdither::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};

const CLIPS: [(u8, u8); 7] = [
    (0, 0),
    (10, 10),
    (5, 200),
    (200, 30),
    (127, 127),
    (126, 128),
    (255, 255),
];

fn random_pix(rng: &mut SmallRng, width: u32, height: u32) -> Pix {
    let bytes: Vec<u8> = (0..width * height).map(|_| rng.random()).collect();
    Pix::from_gray_bytes(width, height, &bytes).unwrap()
}

fn boundary_values(clip: ClipParams) -> Vec<u8> {
    let upper = 255 - clip.upper;
    vec![
        0,
        clip.lower,
        clip.lower.saturating_add(1),
        127,
        128,
        upper.saturating_sub(1),
        upper,
        255,
    ]
}

#[test_log::test]
fn row_of_five_with_zero_clips() {
    let pix = Pix::from_gray_bytes(5, 1, &[0, 64, 128, 192, 255]).unwrap();
    let out = dither_to_binary_with_clip(&pix, ClipParams::new(0, 0)).unwrap();
    assert_eq!(out.depth(), 1);
    assert_eq!(out.data(), &[0xc000_0000]);
    assert_eq!(out.to_bytes(), vec![1, 1, 0, 0, 0]);
}

#[test_log::test]
fn direct_runs_are_deterministic() {
    let mut rng = SmallRng::seed_from_u64(1);
    let pix = random_pix(&mut rng, 67, 41);
    let a = dither_to_binary(&pix).unwrap();
    let b = dither_to_binary(&pix).unwrap();
    assert_eq!(a.data(), b.data());
}

#[test_log::test]
fn lut_matches_direct_on_random_rasters() {
    let mut rng = SmallRng::seed_from_u64(42);
    for &(lower, upper) in &CLIPS {
        let clip = ClipParams::new(lower, upper);
        for (w, h) in [(1, 1), (1, 17), (33, 1), (64, 64), (97, 13)] {
            let pix = random_pix(&mut rng, w, h);
            assert_eq!(
                dither_to_binary_with_clip(&pix, clip).unwrap(),
                dither_to_binary_lut(&pix, clip).unwrap(),
                "{w}x{h} with {clip:?}"
            );
        }
    }
}

#[test]
fn lut_matches_direct_over_whole_domain() {
    let all: Vec<u8> = (0..=255).collect();
    let row = Pix::from_gray_bytes(256, 1, &all).unwrap();
    let column = Pix::from_gray_bytes(1, 256, &all).unwrap();
    let square = Pix::from_gray_bytes(16, 16, &all).unwrap();

    for &(lower, upper) in &CLIPS {
        let clip = ClipParams::new(lower, upper);
        for pix in [&row, &column, &square] {
            assert_eq!(
                dither_to_binary_with_clip(pix, clip).unwrap(),
                dither_to_binary_lut(pix, clip).unwrap()
            );
        }

        let edges = boundary_values(clip);
        let flat: Vec<u8> = edges
            .iter()
            .flat_map(|&v| std::iter::repeat_n(v, 9))
            .collect();
        let pix = Pix::from_gray_bytes(9, edges.len() as u32, &flat).unwrap();
        assert_eq!(
            dither_to_binary_with_clip(&pix, clip).unwrap(),
            dither_to_binary_lut(&pix, clip).unwrap()
        );
    }
}

#[test]
fn single_pixels_threshold_at_midpoint() {
    for v in 0..=255u8 {
        let pix = Pix::from_gray_bytes(1, 1, &[v]).unwrap();
        let out = dither_to_binary(&pix).unwrap();
        assert_eq!(out.get_pixel(0, 0).unwrap(), (v <= MIDPOINT) as u32);
    }
}

#[test]
fn flat_extremes_stay_flat() {
    let black = Pix::from_gray_bytes(40, 3, &[0; 120]).unwrap();
    assert_eq!(dither_to_binary(&black).unwrap().count_pixels().unwrap(), 120);

    let white = Pix::from_gray_bytes(40, 3, &[255; 120]).unwrap();
    assert_eq!(dither_to_binary(&white).unwrap().count_pixels().unwrap(), 0);
}

#[test]
fn mid_gray_is_about_half_on() {
    let pix = Pix::from_gray_bytes(64, 64, &[128; 64 * 64]).unwrap();
    let on = dither_to_binary(&pix).unwrap().count_pixels().unwrap();
    assert!((1600..=2500).contains(&on), "{on} of 4096 ON");
}

#[test]
fn source_is_left_untouched() {
    let mut rng = SmallRng::seed_from_u64(3);
    let pix = random_pix(&mut rng, 20, 20);
    let before = pix.clone();
    dither_to_binary(&pix).unwrap();
    dither_to_binary_lut(&pix, ClipParams::new(0, 0)).unwrap();
    dither_to_2bpp(&pix).unwrap();
    assert_eq!(pix, before);
}

#[test]
fn methods_selected_at_runtime() {
    let mut rng = SmallRng::seed_from_u64(9);
    let pix = random_pix(&mut rng, 31, 7);
    let clip = ClipParams::new(20, 40);
    let methods: Vec<DitherMethod> = vec![
        FloydSteinberg::new(clip).into(),
        FloydSteinbergLut::new(clip).into(),
        TwoBitDither::default().into(),
    ];

    let outs: Vec<Pix> =
        methods.iter().map(|m| dither(&pix, m).unwrap()).collect();
    assert_eq!(outs[0], outs[1]);
    assert_eq!(outs[2].depth(), 2);
    assert_eq!(outs[2], dither_to_2bpp(&pix).unwrap());
}

#[test]
fn rejects_non_8bpp_sources() {
    for depth in [1, 2, 4] {
        let pix = Pix::new(8, 8, depth).unwrap();
        assert!(matches!(dither_to_binary(&pix), Err(Error::Precondition(_))));
        assert!(dither_to_binary_lut(&pix, ClipParams::default()).is_err());
        assert!(dither_to_2bpp(&pix).is_err());
    }
}

#[test]
fn threshold_from_four_bits() {
    let mut pix = Pix::new(3, 1, 4).unwrap();
    pix.set_pixel(0, 0, 2).unwrap();
    pix.set_pixel(1, 0, 8).unwrap();
    pix.set_pixel(2, 0, 15).unwrap();
    let out = threshold_to_binary(&pix, 8).unwrap();
    assert_eq!(out.to_bytes(), vec![1, 0, 0]);
}

#[test]
fn histogram_of_dithered_output() {
    let mut rng = SmallRng::seed_from_u64(11);
    let pix = random_pix(&mut rng, 50, 30);
    let binary = dither_to_binary(&pix).unwrap();
    let hist = gray_histogram(&binary, 1).unwrap();
    assert_eq!(hist.count(), 2);
    assert_eq!(
        hist.get_int_value(1).unwrap() as u64,
        binary.count_pixels().unwrap()
    );
    assert_eq!(hist.get_sum(), 1500.0);

    let two = dither_to_2bpp(&pix).unwrap();
    assert_eq!(gray_histogram(&two, 1).unwrap().count(), 4);
}
