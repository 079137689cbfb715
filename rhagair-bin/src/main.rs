use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use rhagair::predictor::prediction::Prediction;
use rhagair::predictor::{Predictor, PredictorConfig};
use rhagair::spelling::{self, SpellingVariant};
use rhagair::tokenizer::{self, Tokenize, TokenizerVariant};

const DEFAULT_MAX_RESULTS: usize = 10;

trait OutputWriter {
    fn write_predictions(&mut self, input: &str, context: &[String], predictions: &[Prediction]);
    fn finish(&mut self) -> anyhow::Result<()>;
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_predictions(&mut self, input: &str, context: &[String], predictions: &[Prediction]) {
        println!("Input: {}\t\t{:?}", input, context);
        for p in predictions {
            println!("{}\t\t{}\t\t[{}]", p.value(), p.score(), p.context_len);
        }
        println!();
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
struct PredictionRequest {
    input: String,
    context: Vec<String>,
    predictions: Vec<Prediction>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<PredictionRequest>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_predictions(&mut self, input: &str, context: &[String], predictions: &[Prediction]) {
        self.results.push(PredictionRequest {
            input: input.to_owned(),
            context: context.to_vec(),
            predictions: predictions.to_vec(),
        });
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

fn run(
    predictor: &Predictor,
    inputs: Vec<String>,
    writer: &mut dyn OutputWriter,
    max_results: usize,
) -> anyhow::Result<()> {
    for input in inputs {
        let context = input
            .context_words()
            .into_iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>();
        let predictions = predictor.predict(&context[..], max_results)?;
        writer.write_predictions(&input, &context, &predictions);
    }

    Ok(())
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "predict the next word for each line of input")]
    Predict(PredictArgs),

    #[options(help = "print input split into Welsh letters")]
    Tokenize(TokenizeArgs),

    #[options(help = "print common misspellings of a word")]
    Variants(VariantsArgs),
}

#[derive(Debug, Options)]
struct PredictArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "store directory or database to be used", required)]
    store: PathBuf,

    #[options(help = "JSON file overriding the predictor configuration")]
    config: Option<PathBuf>,

    #[options(help = "maximum number of results")]
    max: Option<usize>,

    #[options(no_short, help = "number of preceding words used as context")]
    context: Option<usize>,

    #[options(
        no_short,
        long = "no-case-handling",
        help = "return predictions as stored instead of matching the input's case"
    )]
    disable_case_handling: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "text to be completed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "lemma used to pick the digraph rules")]
    lemma: Option<String>,

    #[options(free, help = "words to be tokenized")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct VariantsArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "lemma used to pick the digraph rules")]
    lemma: Option<String>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

fn read_stdin() -> anyhow::Result<String> {
    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn words(inputs: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs);
    }

    Ok(read_stdin()?
        .words()
        .into_iter()
        .map(|w| w.to_string())
        .collect())
}

fn tokenize(args: TokenizeArgs) -> anyhow::Result<()> {
    for word in words(args.inputs)? {
        let lemma = args.lemma.as_deref().unwrap_or(&word);
        let tokens = tokenizer::tokenize(&word, lemma);
        let variant: TokenizerVariant = tokenizer::select_variant(lemma);
        println!("{}\t{:?}\t{}", word, variant, tokens.join(" "));
    }

    Ok(())
}

#[derive(Serialize)]
struct VariantsRequest {
    word: String,
    variants: Vec<SpellingVariant>,
}

fn variants(args: VariantsArgs) -> anyhow::Result<()> {
    let mut results = vec![];

    for word in words(args.inputs)? {
        let lemma = args.lemma.as_deref().unwrap_or(&word);
        let variants = spelling::generate(&word, lemma)
            .into_iter()
            .collect::<Vec<_>>();

        if args.use_json {
            results.push(VariantsRequest { word, variants });
        } else {
            println!("Input: {}", word);
            for v in variants {
                println!("{}\t\t{}", v.mistake, v.correct);
            }
            println!();
        }
    }

    if args.use_json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

fn predict(args: PredictArgs) -> anyhow::Result<()> {
    let mut config: PredictorConfig = match args.config.as_ref() {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening config {}", path.display()))?;
            serde_json::from_reader(file)?
        }
        None => PredictorConfig::default(),
    };

    if args.disable_case_handling {
        config.case_handling = false;
    }

    if let Some(v) = args.context {
        config.max_context = v;
    }

    let max_results = args.max.unwrap_or(DEFAULT_MAX_RESULTS);

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    let inputs = if args.inputs.is_empty() {
        read_stdin()?
            .lines()
            .map(|x| x.to_string())
            .filter(|x| !x.trim().is_empty())
            .collect()
    } else {
        vec![args.inputs.join(" ")]
    };

    let predictor = Predictor::new(config);
    predictor
        .initialize(&args.store)
        .with_context(|| format!("opening store {}", args.store.display()))?;

    if let Some(meta) = predictor.metadata() {
        log::info!("Using store for {}", meta.locale);
    }

    run(&predictor, inputs, &mut *writer, max_results)?;
    predictor.cleanup();

    writer.finish()
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Predict(args)) => predict(args),
        Some(Command::Tokenize(args)) => tokenize(args),
        Some(Command::Variants(args)) => variants(args),
    }
}
