use async_trait::async_trait;
use sjt_core::CharacterSeed;
use sjt_error::{MediaError, MediaErrorKind, SjtResult};
use sjt_interface::Muxer;
use sjt_media::{
    ArtifactFinalizer, AvMerger, CharacterStore, FinalizeRequest, MergeOptions, TraitDirectories,
    allocate_env_dir,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Records calls and writes a placeholder output. For videos whose name
/// contains `bad` it writes a truncated output and then fails.
#[derive(Default)]
struct RecordingMuxer {
    calls: Mutex<Vec<(PathBuf, PathBuf, PathBuf)>>,
}

#[async_trait]
impl Muxer for RecordingMuxer {
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> SjtResult<()> {
        self.calls.lock().unwrap().push((
            video.to_path_buf(),
            audio.to_path_buf(),
            output.to_path_buf(),
        ));
        if video.to_string_lossy().contains("bad") {
            std::fs::write(output, b"trunc").unwrap();
            return Err(MediaError::new(MediaErrorKind::MergeFailed("corrupt".to_string())).into());
        }
        std::fs::write(output, b"merged").unwrap();
        Ok(())
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"x").unwrap();
    path
}

#[test]
fn test_env_allocation_uses_max_suffix() {
    let root = tempfile::tempdir().unwrap();
    for name in ["env1", "env3", "env7", "envx", "other"] {
        std::fs::create_dir(root.path().join(name)).unwrap();
    }
    touch(root.path(), "env9");

    let dir = allocate_env_dir(root.path()).unwrap();
    assert_eq!(dir, root.path().join("env8"));
    assert!(dir.is_dir());
}

#[test]
fn test_env_allocation_starts_at_one() {
    let root = tempfile::tempdir().unwrap();
    let parent = root.path().join("Neuroticism");
    assert_eq!(allocate_env_dir(&parent).unwrap(), parent.join("env1"));
    assert_eq!(allocate_env_dir(&parent).unwrap(), parent.join("env2"));
}

#[test]
fn test_trait_directories_classify_labels() {
    let root = tempfile::tempdir().unwrap();
    let dirs = TraitDirectories::new(root.path());
    let run = dirs.allocate_run_dir("N4").unwrap();
    assert_eq!(run, root.path().join("Neuroticism").join("env1"));
    assert_eq!(dirs.trait_dir("好奇心"), root.path().join("Misc"));
}

#[tokio::test]
async fn test_merge_first_pair_only() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "hailuo_video_1.mp4");
    touch(dir.path(), "hailuo_narration_1.mp3");

    let muxer = Arc::new(RecordingMuxer::default());
    let merger = AvMerger::new(muxer.clone());
    let report = merger
        .merge(
            dir.path(),
            dir.path(),
            dir.path(),
            &MergeOptions::first_pair("env1"),
        )
        .await
        .unwrap();

    assert_eq!(muxer.calls.lock().unwrap().len(), 1);
    assert_eq!(report.merged, vec![dir.path().join("env1.mp4")]);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_merge_isolates_failing_pairs() {
    let videos = tempfile::tempdir().unwrap();
    let audio = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    touch(videos.path(), "a_bad.mp4");
    touch(videos.path(), "b.mp4");
    touch(videos.path(), "c.mp4");
    touch(audio.path(), "1.mp3");
    touch(audio.path(), "2.mp3");
    touch(audio.path(), "notes.txt");

    let muxer = Arc::new(RecordingMuxer::default());
    let report = AvMerger::new(muxer.clone())
        .merge(videos.path(), audio.path(), out.path(), &MergeOptions::default())
        .await
        .unwrap();

    let calls = muxer.calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].1, audio.path().join("1.mp3"));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.merged,
        vec![out.path().join("merged_b.mp4"), out.path().join("merged_c.mp4")]
    );
    assert!(!out.path().join("merged_a_bad.mp4").exists());
}

#[tokio::test]
async fn test_merge_limit_truncates_batch() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a.mp4");
    touch(dir.path(), "b.mp4");
    touch(dir.path(), "c.mp4");
    touch(dir.path(), "1.mp3");

    let muxer = Arc::new(RecordingMuxer::default());
    let options = MergeOptions {
        limit: Some(2),
        output_basename: Some("batch".to_string()),
        ..Default::default()
    };
    let report = AvMerger::new(muxer.clone())
        .merge(dir.path(), dir.path(), dir.path(), &options)
        .await
        .unwrap();

    assert_eq!(muxer.calls.lock().unwrap().len(), 2);
    assert_eq!(
        report.merged,
        vec![dir.path().join("batch_1.mp4"), dir.path().join("batch_2.mp4")]
    );
}

#[tokio::test]
async fn test_failed_merge_finalizes_rendered_clip() {
    let root = tempfile::tempdir().unwrap();
    let work = root.path().join("env1");
    std::fs::create_dir_all(&work).unwrap();
    let clip = work.join("hailuo_video_bad.mp4");
    std::fs::write(&clip, b"video").unwrap();
    touch(&work, "hailuo_narration_1.mp3");

    let report = AvMerger::new(Arc::new(RecordingMuxer::default()))
        .merge(&work, &work, &work, &MergeOptions::first_pair("env1"))
        .await
        .unwrap();
    assert!(report.merged.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(!work.join("env1.mp4").exists());

    let out = root.path().join("final");
    let artifact = ArtifactFinalizer::new()
        .finalize(&FinalizeRequest {
            work_dir: work.clone(),
            target_dir: Some(out.clone()),
            merge_basename: Some("env1".to_string()),
            out_basename: Some("SJT_N4_1".to_string()),
        })
        .unwrap();

    assert_eq!(artifact.path, out.join("SJT_N4_1.mp4"));
    assert_eq!(std::fs::read(&artifact.path).unwrap(), b"video");
}

#[tokio::test]
async fn test_merge_without_audio_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "hailuo_video_1.mp4");

    let muxer = Arc::new(RecordingMuxer::default());
    let report = AvMerger::new(muxer.clone())
        .merge(dir.path(), dir.path(), dir.path(), &MergeOptions::first_pair("env1"))
        .await
        .unwrap();

    assert!(muxer.calls.lock().unwrap().is_empty());
    assert!(report.merged.is_empty());
}

#[test]
fn test_finalize_moves_renames_and_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    let work = root.path().join("Neuroticism").join("env1");
    std::fs::create_dir_all(work.join("nested")).unwrap();
    touch(&work, "hailuo_video_1.mp4");
    touch(&work, "hailuo_narration_1.mp3");
    touch(&work, "merged_x.mp4");
    touch(&work.join("nested"), "scratch.bin");
    let out = root.path().join("final");

    let artifact = ArtifactFinalizer::new()
        .finalize(&FinalizeRequest {
            work_dir: work.clone(),
            target_dir: Some(out.clone()),
            merge_basename: Some("env1".to_string()),
            out_basename: Some("SJT_N4_1".to_string()),
        })
        .unwrap();

    assert_eq!(artifact.path, out.join("SJT_N4_1.mp4"));
    assert_eq!(std::fs::read(&artifact.path).unwrap(), b"x");
    assert!(!work.exists());
    assert!(artifact.cleanup.is_clean());
    assert!(!out.join("merged_x.mp4").exists());
}

#[test]
fn test_finalize_in_place_keeps_work_dir() {
    let work = tempfile::tempdir().unwrap();
    touch(work.path(), "hailuo_video_1.mp4");
    touch(work.path(), "env1.mp4");

    let artifact = ArtifactFinalizer::new()
        .finalize(&FinalizeRequest {
            work_dir: work.path().to_path_buf(),
            target_dir: None,
            merge_basename: Some("env1".to_string()),
            out_basename: None,
        })
        .unwrap();

    assert_eq!(artifact.path, work.path().join("env1.mp4"));
    assert!(!artifact.cleanup.attempted);
    assert!(work.path().join("hailuo_video_1.mp4").exists());
}

#[test]
fn test_finalize_falls_back_to_silent_clip() {
    let work = tempfile::tempdir().unwrap();
    touch(work.path(), "hailuo_video_1.mp4");

    let artifact = ArtifactFinalizer::new()
        .finalize(&FinalizeRequest {
            work_dir: work.path().to_path_buf(),
            target_dir: None,
            merge_basename: Some("env1".to_string()),
            out_basename: Some("SJT_E1_2".to_string()),
        })
        .unwrap();

    assert_eq!(artifact.path, work.path().join("SJT_E1_2.mp4"));
}

#[test]
fn test_finalize_without_clip_fails() {
    let work = tempfile::tempdir().unwrap();
    touch(work.path(), "hailuo_narration_1.mp3");

    let err = ArtifactFinalizer::new()
        .finalize(&FinalizeRequest {
            work_dir: work.path().to_path_buf(),
            target_dir: None,
            merge_basename: None,
            out_basename: None,
        })
        .unwrap_err();
    assert!(err.to_string().contains("no output file located"));
}

#[test]
fn test_character_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CharacterStore::new(dir.path().join("results").join("role_features.json"));
    assert_eq!(store.load_value(), serde_json::json!({}));

    let seed = CharacterSeed::from_json_or_default(Some(r#"{"gender": "男"}"#));
    store.save(&seed).unwrap();

    let value = store.load_value();
    assert_eq!(value["gender"], "男");
    assert_eq!(value["hairstyle"], "短发");
}
