use chrono::prelude::*;
use std::error::Error;
use std::{
    io::Write,
    path::Path,
    time::{Instant, SystemTime},
};

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use rhagair::predictor::{Predictor, PredictorConfig};
use rhagair::store::StoreMetadata;
use rhagair::tokenizer::Tokenize;
use serde::Serialize;
use structopt::clap::{App, AppSettings, Arg};

const DEFAULT_TOP_N: usize = 5;

fn load_sentences(
    path: &str,
    max_sentences: Option<usize>,
) -> Result<Vec<String>, Box<dyn Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)?;

    Ok(rdr
        .records()
        .filter_map(Result::ok)
        .filter_map(|r| r.get(0).map(|x| x.trim().to_string()))
        .filter(|x| !x.is_empty())
        .take(max_sentences.unwrap_or(std::usize::MAX))
        .collect())
}

#[derive(Debug, Default, Serialize, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
struct Time {
    secs: u64,
    subsec_nanos: u32,
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let ms = self.secs * 1000 + (self.subsec_nanos as u64 / 1_000_000);
        write!(f, "{}ms", ms)
    }
}

impl From<std::time::Duration> for Time {
    fn from(d: std::time::Duration) -> Time {
        Time {
            secs: d.as_secs(),
            subsec_nanos: d.subsec_nanos(),
        }
    }
}

/// How one word of a sentence fared.
#[derive(Debug, Serialize)]
struct WordResult {
    word: String,
    /// Characters typed before the word appeared in the top predictions.
    typed: Option<usize>,
    /// Position among the predictions at that point.
    position: Option<usize>,
    /// Keystrokes spent, counting one to select a prediction.
    keystrokes: usize,
}

#[derive(Debug, Serialize)]
struct SentenceResult<'a> {
    input: &'a str,
    words: Vec<WordResult>,
    time: Time,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    metadata: Option<StoreMetadata>,
    config: &'a PredictorConfig,
    top_n: usize,
    summary: Summary,
    results: Vec<SentenceResult<'a>>,
    start_timestamp: Time,
    total_time: Time,
}

#[derive(Serialize, Default, Debug, Clone)]
struct Summary {
    total_sentences: u32,
    total_words: u32,
    total_chars: u32,
    keystrokes: u32,
    first_position: u32,
    top_n: u32,
    never_predicted: u32,
    slowest_sentence: Time,
    fastest_sentence: Time,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let percent = |v: u32, of: u32| -> String {
            if of == 0 {
                return "-".to_string();
            }
            format!("{:.2}%", v as f32 / of as f32 * 100f32)
        };

        write!(
            f,
            "[saved] {} [#1] {} [^n] {} [never] {} [fast] {} [slow] {}",
            percent(
                self.total_chars.saturating_sub(self.keystrokes),
                self.total_chars
            ),
            percent(self.first_position, self.total_words),
            percent(self.top_n, self.total_words),
            percent(self.never_predicted, self.total_words),
            self.fastest_sentence,
            self.slowest_sentence
        )
    }
}

impl Summary {
    fn new<'a>(results: &[SentenceResult<'a>]) -> Summary {
        let mut summary = Summary::default();

        results.iter().for_each(|result| {
            summary.total_sentences += 1;

            for word in &result.words {
                summary.total_words += 1;
                summary.total_chars += word.word.chars().count() as u32;
                summary.keystrokes += word.keystrokes as u32;

                match (word.typed, word.position) {
                    (Some(0), Some(0)) => {
                        summary.first_position += 1;
                        summary.top_n += 1;
                    }
                    (Some(0), Some(_)) => summary.top_n += 1,
                    (None, _) => summary.never_predicted += 1,
                    _ => {}
                }
            }
        });

        if let Some(slowest) = results.iter().map(|x| x.time).max() {
            summary.slowest_sentence = slowest;
        }
        if let Some(fastest) = results.iter().map(|x| x.time).min() {
            summary.fastest_sentence = fastest;
        }

        summary
    }
}

/// Types `word` one character at a time after `preceding` until it shows
/// up in the top `top_n` predictions.
fn simulate_word(
    predictor: &Predictor,
    preceding: &[String],
    word: &str,
    top_n: usize,
) -> Result<WordResult, rhagair::PredictorError> {
    let chars = word.chars().collect::<Vec<_>>();
    let mut context = preceding.to_vec();
    context.push(String::new());

    for typed in 0..chars.len() {
        if let Some(last) = context.last_mut() {
            *last = chars[..typed].iter().collect();
        }

        let predictions = predictor.predict(&context[..], top_n)?;
        if let Some(position) = predictions.iter().position(|p| p.value() == word) {
            return Ok(WordResult {
                word: word.to_string(),
                typed: Some(typed),
                position: Some(position),
                keystrokes: std::cmp::min(typed + 1, chars.len()),
            });
        }
    }

    Ok(WordResult {
        word: word.to_string(),
        typed: None,
        position: None,
        keystrokes: chars.len(),
    })
}

fn simulate<'a>(
    predictor: &Predictor,
    input: &'a str,
    top_n: usize,
) -> Result<SentenceResult<'a>, rhagair::PredictorError> {
    let now = Instant::now();
    let words = input
        .words()
        .into_iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>();

    let mut results = Vec::with_capacity(words.len());
    for (index, word) in words.iter().enumerate() {
        results.push(simulate_word(predictor, &words[..index], word, top_n)?);
    }

    Ok(SentenceResult {
        input,
        words: results,
        time: now.elapsed().into(),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let matches = App::new("rhagair-accuracy")
        .setting(AppSettings::ArgRequiredElseHelp)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keystroke savings testing for rhagair.")
        .arg(
            Arg::with_name("config")
                .short("c")
                .takes_value(true)
                .help("Provide JSON config file to override predictor defaults"),
        )
        .arg(
            Arg::with_name("sentences")
                .value_name("SENTENCES")
                .help("The sentence corpus, one per line, in the first TSV column"),
        )
        .arg(
            Arg::with_name("store")
                .value_name("STORE")
                .help("Use the given store directory or database"),
        )
        .arg(
            Arg::with_name("json-output")
                .short("o")
                .value_name("JSON-OUTPUT")
                .help("The file path for the JSON report output"),
        )
        .arg(
            Arg::with_name("tsv-output")
                .short("t")
                .value_name("TSV-OUTPUT")
                .help("The file path for the TSV line append"),
        )
        .arg(
            Arg::with_name("top-n")
                .short("n")
                .takes_value(true)
                .help("Number of predictions shown to the user"),
        )
        .arg(
            Arg::with_name("max-sentences")
                .short("w")
                .takes_value(true)
                .help("Truncate corpus to max number of sentences specified"),
        )
        .get_matches();

    let cfg: PredictorConfig = match matches.value_of("config") {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_json::from_reader(file)?
        }
        None => PredictorConfig::default(),
    };

    let top_n = matches
        .value_of("top-n")
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP_N);

    let predictor = Predictor::new(cfg.clone());
    match matches.value_of("store") {
        Some(path) => predictor.initialize(Path::new(path))?,
        None => {
            eprintln!("No store found for given path; aborting.");
            std::process::exit(1);
        }
    };

    let sentences = match matches.value_of("sentences") {
        Some(path) => load_sentences(
            path,
            matches
                .value_of("max-sentences")
                .and_then(|x| x.parse::<usize>().ok()),
        )?,
        None => {
            eprintln!("No corpus for given path; aborting.");
            std::process::exit(1);
        }
    };

    let pb = ProgressBar::new(sentences.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{pos}/{len} [{percent}%] {wide_bar} {elapsed_precise}"),
    );

    let start_time = Instant::now();
    let results = sentences
        .par_iter()
        .progress_with(pb)
        .map(|input| simulate(&predictor, input, top_n))
        .collect::<Result<Vec<_>, _>>()?;

    let total_time: Time = start_time.elapsed().into();
    let start_timestamp: Time = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .into();

    let summary = Summary::new(&results);
    println!("{}", summary);

    if let Some(path) = matches.value_of("json-output") {
        let output = std::fs::File::create(path)?;
        let report = Report {
            metadata: predictor.metadata(),
            config: &cfg,
            top_n,
            summary,
            results,
            start_timestamp,
            total_time,
        };
        println!("Writing JSON report…");
        serde_json::to_writer_pretty(output, &report)?;
    } else if let Some(path) = matches.value_of("tsv-output") {
        let mut output = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let md = output.metadata()?;
        if md.len() == 0 {
            // new file, write headers:
            output.write_all(b"id\tdate\ttag/branch\tsaved\ttop1\ttopn\tnever\n")?;
        }
        let git_id = std::process::Command::new("git")
            .arg("rev-parse")
            .arg("--short")
            .arg("HEAD")
            .output()?;
        output.write_all(String::from_utf8_lossy(&git_id.stdout).trim().as_bytes())?;
        output.write_all(b"\t")?;
        output.write_all(Local::now().to_rfc3339().as_bytes())?;
        output.write_all(b"\t")?;
        let git_descr = std::process::Command::new("git").arg("describe").output()?;
        output.write_all(String::from_utf8_lossy(&git_descr.stdout).trim().as_bytes())?;
        output.write_all(b"\t")?;
        output.write_all(
            (summary.total_chars.saturating_sub(summary.keystrokes))
                .to_string()
                .as_bytes(),
        )?;
        output.write_all(b"\t")?;
        output.write_all(summary.first_position.to_string().as_bytes())?;
        output.write_all(b"\t")?;
        output.write_all(summary.top_n.to_string().as_bytes())?;
        output.write_all(b"\t")?;
        output.write_all(summary.never_predicted.to_string().as_bytes())?;
        output.write_all(b"\n")?;
    };

    predictor.cleanup();
    println!("Done!");
    Ok(())
}
