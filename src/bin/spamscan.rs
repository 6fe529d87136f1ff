use anyhow::{bail, Context, Result};
use serde::Serialize;
use spamscan::models::{BatchItemReport, BatchSummary, Verdict};
use spamscan::services::{
    Analyzer, AnalyzerOptions, ConfigStore, EngineConfig, RecurrentModel, Vocabulary,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

/// The positional message: everything left after flags and their values.
fn message_arg(args: &[String]) -> Option<String> {
    const VALUE_FLAGS: &[&str] = &["--model", "--vocab", "--config", "--batch", "--out"];
    const BARE_FLAGS: &[&str] = &["--normalize"];

    let mut i = 1;
    let mut rest: Vec<&str> = Vec::new();
    while i < args.len() {
        let arg = args[i].as_str();
        if VALUE_FLAGS.contains(&arg) {
            i += 2;
            continue;
        }
        if BARE_FLAGS.contains(&arg) {
            i += 1;
            continue;
        }
        rest.push(arg);
        i += 1;
    }

    if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    }
}

fn load_config(args: &[String]) -> Result<EngineConfig> {
    if let Some(path) = parse_arg_value(args, "--config") {
        return ConfigStore::new(PathBuf::from(&path))
            .load()
            .with_context(|| format!("loading config {}", path));
    }
    match ConfigStore::default_config_file() {
        Some(path) => ConfigStore::new(path).load().context("loading default config"),
        None => Ok(EngineConfig::default()),
    }
}

fn print_verdict(verdict: &Verdict, message: &str, model_name: &str) {
    println!("Classification: {}", verdict.label);
    println!("Confidence:     {:.1}%", verdict.confidence);
    println!("Raw score:      {:.3}", verdict.raw_score);
    println!("Model:          {}", model_name);
    println!("Input length:   {} words", message.split_whitespace().count());
}

fn main() -> Result<()> {
    spamscan::init_logging();

    let args: Vec<String> = std::env::args().collect();
    let batch_path = parse_arg_value(&args, "--batch");
    let message = message_arg(&args);

    if message.is_none() && batch_path.is_none() {
        eprintln!(
            "Usage:\n  spamscan --model <model.json> --vocab <vocabulary.json> [--config <cfg.json>] [--normalize] [--out <report.json>] <message>\n  spamscan --model <model.json> --vocab <vocabulary.json> --batch <messages.txt> [--out <report.json>]\n\nNotes:\n  - `--batch` reads one message per line; blank lines are skipped.\n  - `--model`/`--vocab`/`--normalize` override the config file.\n  - Set SPAMSCAN_DISABLE_FILE_LOG=1 to log to the console only."
        );
        return Ok(());
    }

    let config = load_config(&args)?;

    let model_path = parse_arg_value(&args, "--model")
        .or(config.model_path.clone())
        .context("no model artifact configured (use --model or the config file)")?;
    let vocab_path = parse_arg_value(&args, "--vocab")
        .or(config.vocabulary_path.clone())
        .context("no vocabulary artifact configured (use --vocab or the config file)")?;
    let normalize = has_flag(&args, "--normalize") || config.normalize;
    let out_path = parse_arg_value(&args, "--out");

    // Artifact loading is fatal: refuse all analysis on failure.
    let vocabulary = Arc::new(
        Vocabulary::load(Path::new(&vocab_path))
            .with_context(|| format!("loading vocabulary artifact {}", vocab_path))?,
    );
    let model = Arc::new(
        RecurrentModel::load(Path::new(&model_path))
            .with_context(|| format!("loading model artifact {}", model_path))?,
    );

    let analyzer = Analyzer::new(
        vocabulary,
        model,
        AnalyzerOptions {
            normalize,
            max_len: config.max_len,
        },
    )?;

    if let Some(batch_path) = batch_path {
        run_batch(&analyzer, &batch_path, out_path.as_deref())
    } else {
        run_single(&analyzer, &message.unwrap_or_default(), out_path.as_deref())
    }
}

fn run_single(analyzer: &Analyzer, message: &str, out_path: Option<&str>) -> Result<()> {
    let verdict = match analyzer.analyze(message) {
        Ok(verdict) => verdict,
        Err(err) => bail!("{}", err),
    };

    print_verdict(&verdict, message, analyzer.model_name());

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output {
            message: String,
            model: String,
            word_count: usize,
            verdict: Verdict,
        }

        let out = Output {
            message: preview(message, 100),
            model: analyzer.model_name().to_string(),
            word_count: message.split_whitespace().count(),
            verdict,
        };

        let json = serde_json::to_string_pretty(&out)?;
        std::fs::write(out_path, json)
            .with_context(|| format!("writing report {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}

fn run_batch(analyzer: &Analyzer, batch_path: &str, out_path: Option<&str>) -> Result<()> {
    let content = std::fs::read_to_string(batch_path)
        .with_context(|| format!("reading batch file {}", batch_path))?;
    let messages: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if messages.is_empty() {
        bail!("batch file {} contains no messages", batch_path);
    }

    let results = analyzer.analyze_batch(&messages);

    let mut items: Vec<BatchItemReport> = Vec::with_capacity(results.len());
    for (index, (message, result)) in messages.iter().zip(&results).enumerate() {
        match result {
            Ok(verdict) => {
                println!(
                    "[{:04}] {:4} {:5.1}% {:.3}  {}",
                    index,
                    verdict.label,
                    verdict.confidence,
                    verdict.raw_score,
                    preview(message, 60)
                );
                items.push(BatchItemReport {
                    index,
                    message: preview(message, 60),
                    verdict: Some(verdict.clone()),
                    error: None,
                });
            }
            Err(err) => {
                println!("[{:04}] skipped: {}  {}", index, err, preview(message, 60));
                items.push(BatchItemReport {
                    index,
                    message: preview(message, 60),
                    verdict: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    let summary = Analyzer::summarize_batch(&results);
    println!();
    println!(
        "Summary: {} messages, {} spam, {} ham, {} skipped",
        summary.total, summary.spam, summary.ham, summary.failed
    );

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output {
            model: String,
            items: Vec<BatchItemReport>,
            summary: BatchSummary,
        }

        let out = Output {
            model: analyzer.model_name().to_string(),
            items,
            summary,
        };

        let json = serde_json::to_string_pretty(&out)?;
        std::fs::write(out_path, json)
            .with_context(|| format!("writing report {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
