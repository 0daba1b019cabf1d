//! Command handlers.

use crate::cli::CharacterArgs;
use serde_json::{Map, Value};
use sjt::{
    ApiSection, AvMerger, FfmpegMuxer, HailuoClient, JsonError, MediaError, MediaErrorKind,
    MergeOptions, NarrationSynthesizer, Situation, SjtConfig, SjtResult, VideoSjtPipeline,
    VideoSjtRequest, ValidationError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options of the `generate` command.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Situation JSON file
    pub situation: PathBuf,
    /// Trait label
    pub trait_label: String,
    /// Final clip directory
    pub outdir: Option<PathBuf>,
    /// Final file name without extension
    pub basename: Option<String>,
    /// Character overrides
    pub character: CharacterArgs,
    /// Director override
    pub director: Option<sjt::DirectorKind>,
}

fn read_situation(path: &Path) -> SjtResult<Situation> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        MediaError::new(MediaErrorKind::FileRead(format!("{}: {}", path.display(), e)))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        JsonError::new(format!("Invalid situation JSON in {}: {}", path.display(), e)).into()
    })
}

/// Merge `--character` JSON with the per-field flags.
///
/// Returns `None` when nothing was given so the defaults apply.
pub fn character_json(args: &CharacterArgs) -> SjtResult<Option<String>> {
    let mut fields = match args.character.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ValidationError::new("--character must be a JSON object").into()),
            Err(e) => {
                return Err(JsonError::new(format!("Invalid --character JSON: {}", e)).into());
            }
        },
        _ => Map::new(),
    };

    let overrides = [
        ("age", &args.age),
        ("gender", &args.gender),
        ("group", &args.group),
        ("hairstyle", &args.hairstyle),
        ("clothing", &args.clothing),
        ("nationality", &args.nationality),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::String(value.clone()));
        }
    }

    if fields.is_empty() {
        return Ok(None);
    }
    Ok(Some(Value::Object(fields).to_string()))
}

/// Run the full pipeline and print the result record.
pub async fn generate(config: SjtConfig, args: GenerateArgs) -> SjtResult<()> {
    let situation = read_situation(&args.situation)?;
    let request = VideoSjtRequest::builder()
        .situation(situation)
        .trait_label(args.trait_label)
        .character_seed_json(character_json(&args.character)?)
        .outdir(args.outdir)
        .out_basename(args.basename)
        .director(args.director)
        .build()
        .map_err(|e| ValidationError::new(format!("Failed to build request: {}", e)))?;

    let pipeline = VideoSjtPipeline::from_config(config)?;
    let output = pipeline.run(&request).await?;

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| JsonError::new(format!("Failed to serialize run output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Render a prompt and print the downloaded path.
pub async fn render(config: SjtConfig, prompt: &str, trait_label: &str) -> SjtResult<()> {
    let client = HailuoClient::new(
        &config.video,
        config.api_key(ApiSection::Video)?,
        config.storage.output_root.clone(),
    );
    let rendered = client.run(prompt, trait_label).await?;
    println!("{}", rendered.path.display());
    Ok(())
}

/// Synthesize narration and print the saved path.
pub async fn narrate(
    config: SjtConfig,
    text: &str,
    outdir: &Path,
    speed: Option<f32>,
) -> SjtResult<()> {
    let synthesizer =
        NarrationSynthesizer::new(&config.narration, config.api_key(ApiSection::Narration)?);
    let path = synthesizer.synthesize(text, outdir, speed).await?;
    println!("{}", path.display());
    Ok(())
}

/// Options of the `merge` command; without `--all` only the first pair runs.
pub fn merge_options(basename: Option<String>, all: bool, limit: Option<usize>) -> MergeOptions {
    MergeOptions {
        limit,
        only_first_pair: !all,
        output_basename: basename,
    }
}

/// Merge a directory and print the merged paths.
pub async fn merge(config: SjtConfig, dir: &Path, options: MergeOptions) -> SjtResult<()> {
    let merger = AvMerger::new(Arc::new(FfmpegMuxer::from_config(&config.merge)));
    let report = merger.merge(dir, dir, dir, &options).await?;

    for path in &report.merged {
        println!("{}", path.display());
    }
    for failure in &report.failures {
        eprintln!(
            "failed: {} + {}: {}",
            failure.video.display(),
            failure.audio.display(),
            failure.message
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_character_input_uses_defaults() {
        assert_eq!(character_json(&CharacterArgs::default()).unwrap(), None);
    }

    #[test]
    fn test_flags_override_json() {
        let args = CharacterArgs {
            character: Some(r#"{"age": 30, "gender": "男"}"#.to_string()),
            gender: Some("女".to_string()),
            hairstyle: Some("马尾".to_string()),
            ..Default::default()
        };
        let json: Value = serde_json::from_str(&character_json(&args).unwrap().unwrap()).unwrap();
        assert_eq!(json["age"], 30);
        assert_eq!(json["gender"], "女");
        assert_eq!(json["hairstyle"], "马尾");
    }

    #[test]
    fn test_merge_limit_is_passed_through() {
        let options = merge_options(Some("batch".to_string()), true, Some(2));
        assert_eq!(options.limit, Some(2));
        assert!(!options.only_first_pair);
        assert_eq!(options.output_basename.as_deref(), Some("batch"));

        let defaults = merge_options(None, false, None);
        assert!(defaults.only_first_pair);
        assert_eq!(defaults.limit, None);
    }

    #[test]
    fn test_non_object_character_is_rejected() {
        let args = CharacterArgs {
            character: Some("[1, 2]".to_string()),
            ..Default::default()
        };
        assert!(character_json(&args).is_err());
    }
}
