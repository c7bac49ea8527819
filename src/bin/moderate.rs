use anyhow::{bail, Context, Result};
use content_moderation::services::config_store::ModerationConfig;
use content_moderation::{init_logging, ContentType, CorpusEntry, ModerationPipeline};
use serde::Serialize;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_watch(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid --watch value: {}", raw))?;
    if !value.is_finite() {
        bail!("--watch must be a finite percentage, got {}", raw);
    }
    Ok(value)
}

fn load_corpus(path: &str) -> Result<Vec<CorpusEntry>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read corpus {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parse corpus {}", path))
}

fn load_config(path: Option<&str>) -> Result<ModerationConfig> {
    let mut config = match path {
        Some(p) => ModerationConfig::from_json_file(std::path::Path::new(p))?,
        None => ModerationConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn write_json<T: Serialize>(out_path: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(out_path, json).with_context(|| format!("write {}", out_path))?;
    println!();
    println!("Wrote JSON: {}", out_path);
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  moderate <text_file> [--type comment|reflection] [--corpus <json_path>] [--watch <pct>] [--config <json_path>] [--out <json_path>]\n\nNotes:\n  - The corpus file is a JSON array of {{\"id\", \"content\", \"authorId\"}} entries.\n  - MODERATION_QUALITY_THRESHOLD / MODERATION_SIMILARITY_THRESHOLD override the config file."
        );
        return Ok(());
    }

    init_logging();

    let path = args[1].clone();
    let content_type = match parse_arg_value(&args, "--type") {
        Some(t) => t.parse::<ContentType>().map_err(anyhow::Error::msg)?,
        None => ContentType::Comment,
    };
    let watch = match parse_arg_value(&args, "--watch") {
        Some(raw) => parse_watch(&raw)?,
        None => 100.0,
    };
    let corpus = match parse_arg_value(&args, "--corpus") {
        Some(p) => load_corpus(&p)?,
        None => Vec::new(),
    };
    let config = load_config(parse_arg_value(&args, "--config").as_deref())?;
    let out_path = parse_arg_value(&args, "--out");

    let text = std::fs::read_to_string(&path).with_context(|| format!("read file {}", path))?;
    let pipeline = ModerationPipeline::new(config)?;

    println!("File: {}", path);
    println!("Type: {}", content_type);
    println!("Text: {} chars  {}", text.trim().chars().count(), preview(text.trim(), 80));
    println!();

    match content_type {
        ContentType::Comment => {
            println!("Corpus: {} entries", corpus.len());
            let preview_result = pipeline.preview_comment(&text, &corpus)?;
            let q = &preview_result.quality;
            let s = &preview_result.similarity;
            println!("Quality: {} ({:?}, passed={})", q.score, q.level, q.passed);
            println!("Similarity: {:.2}% ({:?}, mode={:?})", s.score, s.verdict, s.mode);
            if let (Some(id), Some(excerpt)) = (s.matched_entry_id, s.matched_excerpt.as_deref()) {
                println!("Closest entry: #{}  {}", id, preview(excerpt, 80));
            }
            println!(
                "Decision: {} ({})",
                preview_result.predicted.status, preview_result.predicted.reason
            );
            for r in &preview_result.recommendations {
                println!("  - {}", r);
            }
            if let Some(out_path) = out_path {
                write_json(&out_path, &preview_result)?;
            }
        }
        ContentType::Reflection => {
            println!("Watch completion: {:.1}%", watch);
            let eval = pipeline.preview_reflection(&text, watch)?;
            println!(
                "Quality: {} ({:?}, passed={})",
                eval.quality.score, eval.quality.level, eval.quality.passed
            );
            println!(
                "Indicators: thought={} examples={} questions={}",
                eval.indicators.has_thought_words,
                eval.indicators.has_specific_examples,
                eval.indicators.has_questions
            );
            println!("Decision: {} ({})", eval.decision.status, eval.decision.reason);
            for s in &eval.quality.suggestions {
                println!("  - {}", s);
            }
            if let Some(out_path) = out_path {
                write_json(&out_path, &eval)?;
            }
        }
    }

    Ok(())
}
