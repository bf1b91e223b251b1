use crate::config::AppConfig;
use crate::flags::{ColorByFlag, FormatFlag, LayoutModeFlag, SizeByFlag};
use crate::input::{read_letters, read_tokens, write_output, LoadedLetters};
use anyhow::{Context, Result};
use biograph_entities::{
    clean_fragments, CancelFlag, ClassifierLoader, EntityExtractor, ExtractOptions,
    RecordedClassifier, ReadyLoader, UnavailableLoader,
};
use biograph_graph::{
    apply_encoding, compute_layout_with, detect_central_person, ego_network, to_csv, to_gexf,
    to_json, BiographyGraph, EdgeColorBy, EdgeWidthBy, EncodingOptions, ExportFormat,
    GraphBuilder, GraphConfig, GraphMetrics, PhysicsOptions,
};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub(crate) struct LettersArgs {
    /// Letters JSON: an array of letters or a biography record
    #[arg(long)]
    letters: PathBuf,

    /// Biography subject; detected from the letters when omitted
    #[arg(long)]
    central: Option<String>,
}

#[derive(Args)]
pub(crate) struct ExtractArgs {
    /// Letters JSON to enrich
    #[arg(long)]
    letters: PathBuf,

    /// Pre-tagged tokens per letter index, used instead of a model
    #[arg(long)]
    tokens: Option<PathBuf>,

    /// Directory holding model.onnx and tokenizer.json
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Dictionary to normalize against (e.g. vangogh)
    #[arg(long)]
    dictionary: Option<String>,

    /// Skip dictionary augmentation even if one is configured
    #[arg(long, conflicts_with = "dictionary")]
    no_dictionary: bool,

    /// Output file (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct GraphArgs {
    #[command(flatten)]
    input: LettersArgs,

    #[arg(long, value_enum, default_value = "json")]
    format: FormatFlag,

    /// Node coloring applied after the build
    #[arg(long, value_enum, default_value = "type")]
    color_by: ColorByFlag,

    /// Node sizing applied after the build
    #[arg(long, value_enum, default_value = "fixed")]
    size_by: SizeByFlag,

    /// Widen and shade edges by parallel-edge count
    #[arg(long)]
    edge_weight: bool,

    /// Output file (stdout when omitted); CSV edges go to `<out>.edges.csv`
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct MetricsArgs {
    #[command(flatten)]
    input: LettersArgs,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct EgoArgs {
    #[command(flatten)]
    input: LettersArgs,

    /// Node id at the center, e.g. "person:Theo van Gogh"
    #[arg(long)]
    center: String,

    /// Hops to expand (at least 1)
    #[arg(long, default_value_t = 1)]
    depth: usize,

    #[arg(long, value_enum, default_value = "json")]
    format: FormatFlag,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct LayoutArgs {
    #[command(flatten)]
    input: LettersArgs,

    #[arg(long, value_enum, default_value = "force")]
    mode: LayoutModeFlag,

    /// Keep renderer physics running after stabilization
    #[arg(long)]
    physics: bool,

    /// Pull toward the center (force mode)
    #[arg(long)]
    gravity: Option<f64>,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct CleanArgs {
    /// Names to clean, e.g. Gau Gauguin "Paul Gauguin"
    #[arg(required = true)]
    names: Vec<String>,
}

pub(crate) async fn run_extract(args: ExtractArgs, config: &AppConfig) -> Result<()> {
    let LoadedLetters { mut letters, .. } = read_letters(&args.letters)?;
    let loader = classifier_loader(&args, config, &letters)?;

    let mut extractor = EntityExtractor::new(config.extraction.clone(), loader)
        .with_dictionaries(config.dictionary_registry());
    if let Some(name) = &config.dictionaries.default {
        extractor = extractor.with_default_dictionary(name.clone());
    }

    let options = if args.no_dictionary {
        ExtractOptions::default()
    } else {
        match args.dictionary.clone().or_else(|| config.dictionaries.default.clone()) {
            Some(name) => ExtractOptions::with_dictionary(name),
            None => ExtractOptions::default(),
        }
    };

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; stopping after the current letter");
            on_interrupt.cancel();
        }
    });

    let bar = ProgressBar::new(letters.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.cyan} [{elapsed_precise}] {bar:30.green/blue} {pos}/{len} {msg}")
            .context("Invalid progress template")?,
    );
    bar.set_message("Extracting entities...");

    let report = extractor
        .enrich_letters(&mut letters, &options, &cancel, |done, _| bar.set_position(done as u64))
        .await;
    bar.finish_with_message(format!("{} mentions added", report.mentions_added));

    if report.failed > 0 {
        log::warn!(
            "{} of {} letters were left unchanged (classifier unavailable or failed)",
            report.failed,
            report.total
        );
    }
    if report.cancelled {
        log::warn!("Extraction cancelled after {} of {} letters", report.processed, report.total);
    }
    log::info!(
        "Processed {} letters, added {} mentions",
        report.processed,
        report.mentions_added
    );

    write_output(args.out.as_deref(), &serde_json::to_string_pretty(&letters)?)
}

fn classifier_loader(
    args: &ExtractArgs,
    config: &AppConfig,
    letters: &[biograph_protocol::Letter],
) -> Result<Arc<dyn ClassifierLoader>> {
    if let Some(path) = &args.tokens {
        let max_chars = config.extraction.max_text_chars;
        let mut recorded = RecordedClassifier::new();
        for (index, tokens) in read_tokens(path)? {
            let Some(letter) = letters.get(index) else {
                log::warn!("Tokens given for letter {index}, but there are only {} letters", letters.len());
                continue;
            };
            // Recordings are keyed by the text the classifier will actually see
            let text: String = letter.content.chars().take(max_chars).collect();
            if let Some(previous) = recorded.record(text, tokens.clone()) {
                if previous != tokens {
                    log::warn!(
                        "Letter {index} has the same text as an earlier letter; its tokens replace the earlier ones"
                    );
                }
            }
        }
        log::info!("Using {} pre-tagged letters from {}", recorded.len(), path.display());
        return Ok(Arc::new(ReadyLoader::new(recorded)));
    }

    model_loader(args.model_dir.as_deref())
}

#[cfg(feature = "onnx")]
fn model_loader(model_dir: Option<&Path>) -> Result<Arc<dyn ClassifierLoader>> {
    use biograph_entities::{OnnxConfig, OnnxLoader};

    let onnx = match model_dir {
        Some(dir) => Some(OnnxConfig::from_dir(dir)),
        None => OnnxConfig::from_env(),
    };
    let loader: Arc<dyn ClassifierLoader> = match onnx {
        Some(onnx) => Arc::new(OnnxLoader::new(onnx)),
        None => Arc::new(UnavailableLoader::new(
            "no model directory; pass --model-dir or set BIOGRAPH_NER_MODEL_PATH",
        )),
    };
    Ok(loader)
}

#[cfg(not(feature = "onnx"))]
fn model_loader(model_dir: Option<&Path>) -> Result<Arc<dyn ClassifierLoader>> {
    if model_dir.is_some() {
        log::warn!("--model-dir needs a build with the `onnx` feature; ignoring it");
    }
    Ok(Arc::new(UnavailableLoader::new(
        "built without the `onnx` feature; pass --tokens to supply tagged tokens",
    )))
}

/// Read letters and build the four-tier graph around the resolved subject
fn build_graph(input: &LettersArgs, config: &AppConfig) -> Result<BiographyGraph> {
    let loaded = read_letters(&input.letters)?;
    let graph_config = config.graph_config();
    let central = resolve_central(input, config, &graph_config, &loaded);
    log::info!("Biography subject: {central}");
    Ok(GraphBuilder::new(graph_config).build(&loaded.letters, &central))
}

/// `--central`, then the record's subject, then the most frequent
/// correspondent, then `[graph].central_person`
fn resolve_central(
    input: &LettersArgs,
    config: &AppConfig,
    graph_config: &GraphConfig,
    loaded: &LoadedLetters,
) -> String {
    input
        .central
        .clone()
        .or_else(|| loaded.subject.clone())
        .or_else(|| detect_central_person(&loaded.letters, graph_config))
        .or_else(|| config.graph.central_person.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn export(graph: &BiographyGraph, format: ExportFormat, out: Option<&Path>) -> Result<()> {
    match format {
        ExportFormat::Json => write_output(out, &to_json(graph)?),
        ExportFormat::Gexf => write_output(out, &to_gexf(graph)),
        ExportFormat::Csv => {
            let tables = to_csv(graph);
            match out {
                Some(path) => {
                    write_output(Some(path), &tables.nodes)?;
                    write_output(Some(&path.with_extension("edges.csv")), &tables.edges)
                }
                None => write_output(None, &format!("{}\n{}", tables.nodes, tables.edges)),
            }
        }
    }
}

pub(crate) fn run_graph(args: GraphArgs, config: &AppConfig) -> Result<()> {
    let mut graph = build_graph(&args.input, config)?;

    let encoding = EncodingOptions {
        node_color_by: args.color_by.as_domain(),
        node_size_by: args.size_by.as_domain(),
        edge_color_by: if args.edge_weight { EdgeColorBy::Weight } else { EdgeColorBy::Type },
        edge_width_by: if args.edge_weight { EdgeWidthBy::Weight } else { EdgeWidthBy::Fixed },
        ..Default::default()
    };
    let metrics = GraphMetrics::compute(&graph);
    apply_encoding(&mut graph, &metrics, &encoding);

    export(&graph, args.format.as_domain(), args.out.as_deref())
}

pub(crate) fn run_metrics(args: MetricsArgs, config: &AppConfig) -> Result<()> {
    let graph = build_graph(&args.input, config)?;
    let metrics = GraphMetrics::compute(&graph);
    write_output(args.out.as_deref(), &serde_json::to_string_pretty(&metrics)?)
}

pub(crate) fn run_ego(args: EgoArgs, config: &AppConfig) -> Result<()> {
    let graph = build_graph(&args.input, config)?;
    let ego = ego_network(&graph, &args.center, args.depth)
        .with_context(|| format!("Cannot extract ego network around {}", args.center))?;
    export(&ego, args.format.as_domain(), args.out.as_deref())
}

pub(crate) fn run_layout(args: LayoutArgs, config: &AppConfig) -> Result<()> {
    let graph = build_graph(&args.input, config)?;
    let mode = args.mode.as_domain();
    let mut physics = PhysicsOptions::for_mode(mode, args.physics);
    if let Some(gravity) = args.gravity {
        physics = physics.with_central_gravity(gravity);
    }
    let layout = compute_layout_with(&graph, mode, physics);
    write_output(args.out.as_deref(), &serde_json::to_string_pretty(&layout)?)
}

pub(crate) fn run_clean(args: CleanArgs) -> Result<()> {
    let cleaned = clean_fragments(&args.names);
    write_output(None, &serde_json::to_string_pretty(&cleaned)?)
}
