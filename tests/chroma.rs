use folio_fx::chroma::{key_frame, key_pixel, plan_frame, ChromaKeyConfig, FramePlan, VideoStatus, HAVE_CURRENT_DATA};

fn studio_green() -> ChromaKeyConfig {
    ChromaKeyConfig {
        key_color: [0.0, 0.85, 0.0],
        similarity: 0.35,
        smoothness: 0.12,
        ..Default::default()
    }
}

#[test]
fn green_screen_is_keyed_out_and_red_is_kept() {
    let cfg = studio_green();
    let green = key_pixel([0.0, 1.0, 0.0], &cfg);
    let red = key_pixel([1.0, 0.0, 0.0], &cfg);
    assert!(green[3] < 1e-3, "green alpha {}", green[3]);
    assert!(red[3] > 0.999, "red alpha {}", red[3]);
    // opaque pixels are not darkened
    assert!((red[0] - 1.0).abs() < 1e-6);
}

#[test]
fn keys_a_whole_frame_in_place() {
    let cfg = studio_green();
    let mut frame = vec![
        0, 255, 0, 255, // green
        255, 0, 0, 255, // red
    ];
    key_frame(&mut frame, &cfg);
    assert_eq!(frame[3], 0);
    assert_eq!(&frame[4..8], &[255, 0, 0, 255]);
}

#[test]
fn spill_pulls_green_toward_the_other_channels() {
    let fringe = [0.6, 0.7, 0.6];
    let with_spill = key_pixel(fringe, &studio_green());
    let without = key_pixel(
        fringe,
        &ChromaKeyConfig {
            spill: 0.0,
            ..studio_green()
        },
    );

    // partially transparent, so on the soft edge
    assert!(with_spill[3] > 0.0 && with_spill[3] < 1.0);
    let input_ratio = 0.7 / 0.6;
    assert!((without[1] / without[0] - input_ratio).abs() < 1e-4);
    assert!(with_spill[1] / with_spill[0] < input_ratio - 0.05);
}

#[test]
fn soft_edges_are_slightly_darkened() {
    let cfg = ChromaKeyConfig {
        spill: 0.0,
        ..studio_green()
    };
    let out = key_pixel([0.6, 0.7, 0.6], &cfg);
    assert!(out[0] < 0.6);
    assert!(out[0] > 0.6 * 0.85 - 1e-6);
}

#[test]
fn frames_are_skipped_until_video_has_data() {
    let playing = VideoStatus {
        ready_state: HAVE_CURRENT_DATA,
        paused: false,
        ended: false,
        width: 640,
        height: 360,
    };
    assert_eq!(
        plan_frame(VideoStatus { ready_state: 1, ..playing }, (640, 360)),
        FramePlan::Skip
    );
    assert_eq!(plan_frame(VideoStatus { paused: true, ..playing }, (640, 360)), FramePlan::Skip);
    assert_eq!(plan_frame(VideoStatus { ended: true, ..playing }, (640, 360)), FramePlan::Skip);
    assert_eq!(plan_frame(VideoStatus { width: 0, ..playing }, (640, 360)), FramePlan::Skip);
}

#[test]
fn surface_is_resized_only_when_video_size_changes() {
    let status = VideoStatus {
        ready_state: 4,
        width: 640,
        height: 360,
        ..Default::default()
    };
    assert_eq!(plan_frame(status, (640, 360)), FramePlan::Draw { resize: None });
    assert_eq!(
        plan_frame(status, (300, 150)),
        FramePlan::Draw {
            resize: Some((640, 360))
        }
    );
}
