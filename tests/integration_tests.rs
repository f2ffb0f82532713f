use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use vedit::adapters::mock::{media_descriptor, MockExecuteAdapter, MockProbeAdapter, RecordingHost};
use vedit::adapters::JsonSessionStore;
use vedit::app::executor::RendererFactory;
use vedit::app::{AppContainer, DefaultAppContainer, MediaOperationExecutor, SessionWorkspace};
use vedit::domain::composition::AudioTrack;
use vedit::domain::model::*;
use vedit::engine::progress::{ProgressFrame, ProgressRenderer, ProgressStyle};
use vedit::DomainError;

/// Test utilities for session rounds over mock adapters
mod test_utils {
    use super::*;

    pub struct Harness {
        pub dir: TempDir,
        pub execute: Arc<MockExecuteAdapter>,
        pub host: Arc<RecordingHost>,
        pub container: DefaultAppContainer,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_execute(MockExecuteAdapter::new())
        }

        pub fn with_execute(execute: MockExecuteAdapter) -> Self {
            let dir = TempDir::new().unwrap();
            let output_dir = dir.path().join("out");
            std::fs::create_dir_all(&output_dir).unwrap();

            let execute = Arc::new(execute);
            let host = Arc::new(RecordingHost::new());
            let container = DefaultAppContainer::with_ports(
                Arc::new(MockProbeAdapter::new()),
                execute.clone(),
                Arc::new(JsonSessionStore::new(dir.path().join("state"))),
                host.clone(),
                EncodeSettings::default(),
                output_dir,
                ProgressStyle::None,
            );

            Self {
                dir,
                execute,
                host,
                container,
            }
        }

        pub async fn workspace(&self, id: &str) -> SessionWorkspace {
            self.container
                .open_workspace(&SessionId::parse(id).unwrap())
                .await
                .unwrap()
        }

        pub fn output_files(&self) -> Vec<PathBuf> {
            std::fs::read_dir(self.dir.path().join("out"))
                .unwrap()
                .map(|entry| entry.unwrap().path())
                .collect()
        }
    }

    pub fn video(name: &str, duration: f64, has_audio: bool) -> Upload {
        Upload::new(name, MediaKind::Video, media_descriptor(duration, Some(25.0), has_audio))
    }

    pub fn audio(name: &str, duration: f64) -> Upload {
        Upload::new(name, MediaKind::Audio, media_descriptor(duration, None, true))
    }
}

use test_utils::*;

#[tokio::test]
async fn test_cleanup_twice_is_a_no_op() {
    let harness = Harness::new();
    let mut workspace = harness.workspace("alice").await;
    let merge = harness.container.merge_interactor();

    merge
        .receive(&mut workspace, Some(&video("v.mp4", 6.0, true)), Some(&audio("a.mp3", 4.0)))
        .await
        .unwrap();
    merge.execute(&mut workspace).await.unwrap();

    let first = harness.container.clear(&mut workspace, OperationMode::Merge);
    assert!(first.is_clean());
    assert_eq!(first.handles_closed, 2);
    assert_eq!(first.files.removed.len(), 3);

    let second = harness.container.clear(&mut workspace, OperationMode::Merge);
    assert!(second.is_clean());
    assert_eq!(second.handles_closed, 0);
    assert!(second.files.removed.is_empty());
    assert_eq!(harness.host.redraws(), 2);
}

#[tokio::test]
async fn test_concat_preserves_upload_order() {
    let harness = Harness::new();
    let mut workspace = harness.workspace("alice").await;
    let concat = harness.container.concat_interactor();

    let uploads = [
        video("third.mp4", 3.0, true),
        video("first.mp4", 1.0, true),
        video("second.mp4", 2.0, false),
    ];
    concat.receive(&mut workspace, &uploads).await.unwrap();
    let artifact = concat.execute(&mut workspace).await.unwrap();
    assert_eq!(artifact.duration, 6.0);

    let staged: Vec<PathBuf> = workspace
        .context
        .concat()
        .unwrap()
        .clips
        .iter()
        .map(|clip| clip.file.path.clone())
        .collect();
    let calls = harness.execute.calls();
    assert_eq!(calls[0].composition.timeline_paths(), staged);

    let names: Vec<&str> = workspace
        .context
        .concat()
        .unwrap()
        .clips
        .iter()
        .map(|clip| clip.file.source_name.as_str())
        .collect();
    assert_eq!(names, vec!["third.mp4", "first.mp4", "second.mp4"]);
}

#[tokio::test]
async fn test_idle_rounds_do_not_restage() {
    let harness = Harness::new();
    let concat = harness.container.concat_interactor();
    let uploads = [video("a.mp4", 2.0, true), video("b.mp4", 2.0, true)];

    let mut workspace = harness.workspace("alice").await;
    let report = concat.receive(&mut workspace, &uploads).await.unwrap();
    assert_eq!(report.staged, 2);
    harness.container.save_workspace(&workspace).await.unwrap();
    let staged_before = workspace.context.concat().unwrap().clips.clone();

    for _ in 0..3 {
        let mut workspace = harness.workspace("alice").await;
        let report = concat.receive(&mut workspace, &uploads).await.unwrap();
        assert_eq!(report.staged, 0);
        assert_eq!(report.reused, 2);

        let idle = concat.receive(&mut workspace, &[]).await.unwrap();
        assert_eq!(idle.staged, 0);
        assert_eq!(workspace.context.concat().unwrap().clips, staged_before);
        harness.container.save_workspace(&workspace).await.unwrap();
    }

    let staging = harness.workspace("alice").await.lifecycle.store().root().to_path_buf();
    assert_eq!(std::fs::read_dir(staging).unwrap().count(), 2);
}

#[tokio::test]
async fn test_background_volumes_bound_the_mix() {
    let harness = Harness::new();
    let music = harness.container.music_interactor();

    for (original, level) in [(0.0, 0.0), (0.3, 0.8), (1.0, 1.0), (0.5, 0.25)] {
        let mut workspace = harness.workspace("alice").await;
        music
            .receive(&mut workspace, Some(&video("v.mp4", 5.0, true)), Some(&audio("m.mp3", 9.0)))
            .await
            .unwrap();
        music
            .execute(&mut workspace, Volume::new(original).unwrap(), Volume::new(level).unwrap())
            .await
            .unwrap();
    }

    for call in harness.execute.calls() {
        let AudioTrack::Layers(layers) = &call.composition.audio else {
            panic!("background music must replace the audio track");
        };
        assert_eq!(layers.len(), 2);
        let sum: f64 = layers.iter().map(|layer| layer.gain).sum();
        assert!(call.composition.peak_gain() <= sum + f64::EPSILON);
        assert!(call.composition.peak_gain() <= 2.0);
    }
}

#[tokio::test]
async fn test_silent_video_gets_music_alone() {
    let harness = Harness::new();
    let music = harness.container.music_interactor();
    let mut workspace = harness.workspace("alice").await;

    music
        .receive(&mut workspace, Some(&video("v.mp4", 5.0, false)), Some(&audio("m.mp3", 3.0)))
        .await
        .unwrap();
    music
        .execute(&mut workspace, Volume::MUTE, Volume::HALF)
        .await
        .unwrap();

    let calls = harness.execute.calls();
    let AudioTrack::Layers(layers) = &calls[0].composition.audio else {
        panic!("background music must replace the audio track");
    };
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].input, 1);
    assert_eq!(layers[0].gain, 0.5);
    assert_eq!(calls[0].composition.peak_gain(), 0.5);
}

#[tokio::test]
async fn test_merged_audio_is_capped_to_the_shorter_track() {
    for (audio_len, video_len) in [(12.0, 8.0), (3.0, 8.0), (8.0, 8.0)] {
        let harness = Harness::new();
        let merge = harness.container.merge_interactor();
        let mut workspace = harness.workspace("alice").await;

        merge
            .receive(
                &mut workspace,
                Some(&video("v.mp4", video_len, true)),
                Some(&audio("a.mp3", audio_len)),
            )
            .await
            .unwrap();
        let artifact = merge.execute(&mut workspace).await.unwrap();

        let calls = harness.execute.calls();
        let expected = f64::min(audio_len, video_len);
        assert!((calls[0].composition.audio_duration() - expected).abs() < 1e-9);
        assert_eq!(artifact.duration, video_len);
    }
}

#[tokio::test]
async fn test_trim_rejects_reversed_range_without_output() {
    let harness = Harness::new();
    let trim = harness.container.trim_interactor();
    let mut workspace = harness.workspace("alice").await;

    trim.receive(&mut workspace, Some(&video("v.mp4", 10.0, true)))
        .await
        .unwrap();

    let err = trim
        .execute(&mut workspace, Some(5.0), Some(2.0))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(workspace.context.trim().unwrap().output.is_none());
    assert!(harness.host.offered().is_empty());
    assert!(harness.output_files().is_empty());

    let artifact = trim
        .execute(&mut workspace, Some(2.0), Some(5.0))
        .await
        .unwrap();
    assert_eq!(artifact.duration, 3.0);
    assert_eq!(artifact.tag, OperationTag::Subclip);
    assert!(artifact.file_name().starts_with("Subclip_2-5_"));
}

#[tokio::test]
async fn test_clear_removes_every_trim_output() {
    let harness = Harness::new();
    let trim = harness.container.trim_interactor();
    let mut workspace = harness.workspace("alice").await;

    trim.receive(&mut workspace, Some(&video("v.mp4", 10.0, true)))
        .await
        .unwrap();
    let first = trim
        .execute(&mut workspace, Some(0.0), Some(2.0))
        .await
        .unwrap();
    let second = trim
        .execute(&mut workspace, Some(3.0), Some(6.0))
        .await
        .unwrap();
    assert!(first.path.exists());
    assert!(second.path.exists());

    let report = harness.container.clear(&mut workspace, OperationMode::Trim);

    assert!(report.is_clean());
    assert!(!first.path.exists());
    assert!(!second.path.exists());
    assert!(harness.output_files().is_empty());
    assert!(workspace.context.trim().unwrap().superseded.is_empty());
}

#[tokio::test]
async fn test_vanished_staged_file_is_staged_again() {
    let harness = Harness::new();
    let trim = harness.container.trim_interactor();
    let mut workspace = harness.workspace("alice").await;
    let upload = video("v.mp4", 10.0, true);

    trim.receive(&mut workspace, Some(&upload)).await.unwrap();
    let staged = workspace.context.trim().unwrap().video.as_ref().unwrap().file.path.clone();
    std::fs::remove_file(&staged).unwrap();

    let report = trim.receive(&mut workspace, Some(&upload)).await.unwrap();

    assert_eq!(report.staged, 1);
    assert_eq!(report.reused, 0);
    assert_eq!(report.retired, 1);
    let restaged = workspace.context.trim().unwrap().video.as_ref().unwrap().file.path.clone();
    assert!(restaged.is_file());
    trim.execute(&mut workspace, None, None).await.unwrap();
}

#[tokio::test]
async fn test_trim_beyond_duration_is_rejected() {
    let harness = Harness::new();
    let trim = harness.container.trim_interactor();
    let mut workspace = harness.workspace("alice").await;

    trim.receive(&mut workspace, Some(&video("v.mp4", 10.0, true)))
        .await
        .unwrap();
    let err = trim
        .execute(&mut workspace, Some(8.0), Some(12.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::OutOfRange(_)));
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let captured: Arc<Mutex<Vec<ProgressFrame>>> = Arc::default();
    let factory_frames = Arc::clone(&captured);
    let renderers: RendererFactory = Arc::new(move || {
        let frames = Arc::clone(&factory_frames);
        Box::new(move |frame: &ProgressFrame| frames.lock().unwrap().push(frame.clone()))
            as Box<dyn ProgressRenderer>
    });

    let dir = TempDir::new().unwrap();
    let executor = MediaOperationExecutor::new(
        Arc::new(MockExecuteAdapter::new()),
        Arc::new(RecordingHost::new()),
        EncodeSettings::default(),
        dir.path(),
        ProgressStyle::None,
    )
    .with_renderers(renderers);

    let handle = MediaHandle::open("/tmp/v.mp4", MediaKind::Video, MediaInfo::video(4.0, 25.0, true));
    let composition =
        vedit::domain::composition::Composition::subclip(&handle, TimeRange::new(0.0, 4.0).unwrap()).unwrap();
    executor
        .encode(OperationMode::Trim, &composition, "0-4")
        .await
        .unwrap();

    let frames = captured.lock().unwrap().clone();
    let percents: Vec<u8> = frames.iter().map(|frame| frame.reported_percent()).collect();
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(percents.last(), Some(&100));
    assert!(frames.last().unwrap().finished);
}

#[tokio::test]
async fn test_same_named_uploads_stage_apart_per_session() {
    let harness = Harness::new();
    let trim = harness.container.trim_interactor();

    let mut alice = harness.workspace("alice").await;
    let mut bob = harness.workspace("bob").await;
    let upload = video("holiday.mp4", 10.0, true);

    trim.receive(&mut alice, Some(&upload)).await.unwrap();
    trim.receive(&mut bob, Some(&upload)).await.unwrap();

    let alice_path = alice.context.trim().unwrap().video.clone().unwrap().file.path;
    let bob_path = bob.context.trim().unwrap().video.clone().unwrap().file.path;
    assert_ne!(alice_path, bob_path);
    assert!(alice_path.exists());
    assert!(bob_path.exists());

    harness.container.clear(&mut alice, OperationMode::Trim);
    assert!(!alice_path.exists());
    assert!(bob_path.exists());
}

#[tokio::test]
async fn test_backend_failure_leaves_no_output_slot() {
    let harness = Harness::with_execute(MockExecuteAdapter::failing("encoder crashed"));
    let merge = harness.container.merge_interactor();
    let mut workspace = harness.workspace("alice").await;

    merge
        .receive(&mut workspace, Some(&video("v.mp4", 4.0, true)), Some(&audio("a.mp3", 4.0)))
        .await
        .unwrap();
    let err = merge.execute(&mut workspace).await.unwrap_err();

    assert!(matches!(err, DomainError::Backend(_)));
    assert!(!err.is_validation());
    let state = workspace.context.merge().unwrap();
    assert!(state.output.is_none());
    assert!(state.video.is_some());
    assert!(state.audio.is_some());
    assert!(harness.host.offered().is_empty());
}

#[tokio::test]
async fn test_unsupported_upload_is_rejected_before_staging() {
    let harness = Harness::new();
    let merge = harness.container.merge_interactor();
    let mut workspace = harness.workspace("alice").await;

    let bogus = Upload::new("notes.txt", MediaKind::Audio, b"hello".to_vec());
    let err = merge
        .receive(&mut workspace, None, Some(&bogus))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnsupportedFormat(_)));

    let staging = workspace.lifecycle.store().root().to_path_buf();
    assert_eq!(std::fs::read_dir(staging).unwrap().count(), 0);
}
