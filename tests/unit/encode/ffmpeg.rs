use std::ffi::OsStr;

use super::*;
use crate::encode::sink::AudioInput;
use crate::foundation::core::Fps;

fn cfg(audio: Option<AudioInput>) -> SinkConfig {
    SinkConfig {
        width: 480,
        height: 270,
        fps: Fps::new(30, 1).unwrap(),
        audio,
    }
}

fn args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(OsStr::to_string_lossy)
        .map(|s| s.into_owned())
        .collect()
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0; 4]).is_err());
}

#[test]
fn video_only_command_uses_realtime_h264() {
    let opts = FfmpegSinkOpts::new("target/unit_ffmpeg/Main_0000-0009.mp4");
    let a = args(&ffmpeg_command(&opts, &cfg(None)));
    assert_eq!(a[0], "-y");
    assert_eq!(value_after(&a, "-s").as_deref(), Some("480x270"));
    assert_eq!(value_after(&a, "-r").as_deref(), Some("30/1"));
    assert_eq!(value_after(&a, "-c:v").as_deref(), Some("libx264"));
    assert_eq!(value_after(&a, "-preset").as_deref(), Some("ultrafast"));
    assert_eq!(value_after(&a, "-crf").as_deref(), Some("20"));
    assert_eq!(value_after(&a, "-g").as_deref(), Some("30"));
    assert_eq!(value_after(&a, "-pix_fmt").as_deref(), Some("rgba"));
    assert!(a.iter().any(|x| x == "yuv420p"));
    assert!(a.iter().any(|x| x == "-an"));
    assert!(!a.iter().any(|x| x == "libmp3lame"));
    assert!(a.last().unwrap().ends_with("Main_0000-0009.mp4"));
}

#[test]
fn audio_command_offsets_and_encodes_mp3() {
    let opts = FfmpegSinkOpts::new("out.mp4");
    let audio = AudioInput {
        path: PathBuf::from("talk.wav"),
        offset_secs: 2.5,
    };
    let a = args(&ffmpeg_command(&opts, &cfg(Some(audio))));
    assert_eq!(value_after(&a, "-ss").as_deref(), Some("2.500"));
    let ss = a.iter().position(|x| x == "-ss").unwrap();
    assert_eq!(a[ss + 2], "-i");
    assert_eq!(a[ss + 3], "talk.wav");
    assert_eq!(value_after(&a, "-c:a").as_deref(), Some("libmp3lame"));
    assert!(a.iter().any(|x| x == "-shortest"));
    assert!(!a.iter().any(|x| x == "-an"));
}

#[test]
fn begin_rejects_odd_sizes() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/unit_ffmpeg/odd.mp4"));
    let mut c = cfg(None);
    c.width = 481;
    assert!(matches!(sink.begin(c), Err(VizError::Configuration(_))));
}

#[test]
fn push_before_begin_is_a_render_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/unit_ffmpeg/none.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame),
        Err(VizError::Render(_))
    ));
}

#[test]
fn dropping_an_unstarted_sink_is_a_no_op() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("target/unit_ffmpeg/unstarted.mp4"));
    drop(sink);
    assert!(!Path::new("target/unit_ffmpeg/unstarted.mp4").exists());
}

#[test]
fn dropping_mid_stream_closes_input_and_reaps_ffmpeg() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let out = Path::new("target/unit_ffmpeg/abandoned.mp4");
    let _ = std::fs::remove_file(out);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out));
    sink.begin(cfg(None)).unwrap();
    let frame = FrameRGBA {
        width: 480,
        height: 270,
        data: vec![255; 480 * 270 * 4],
        premultiplied: true,
    };
    // Without libx264 ffmpeg exits early and the write fails; drop must still return.
    let pushed = sink.push_frame(FrameIndex(0), &frame).is_ok();
    // No `end()`: ffmpeg sees EOF on drop and has exited by the time drop returns.
    drop(sink);
    if pushed {
        assert!(out.exists());
    }
}
