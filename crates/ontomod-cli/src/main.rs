//! Ontomod CLI
//!
//! Command-line interface for:
//! - Extracting ontology subsets (`subset`)
//! - Checking alignment against an upper ontology (`validate`)
//! - Normalizing an ontology in place (`normalize`)
//! - Summarizing a graph snapshot (`stats`)
//!
//! Graphs are read and written as `ontomod_snapshot_v1` JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use ontomod_model::{AxiomBody, GraphStore, ImportsScope, PrefixMap};
use ontomod_reasoner::StructuralReasoner;
use ontomod_subset::{
    default_base_prefixes_or, normalize, validate_alignment, AlignmentOptions, FilterConfig,
    NormalizeOptions, SubsetExtractor, SubsetOptions,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ontomod")]
#[command(author, version, about = "Ontomod: ontology subset extraction")]
struct Cli {
    /// More log output (repeat for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a subset (module) of an ontology.
    ///
    /// Seeds come from class expression queries, tags and explicit terms;
    /// `--fill-gaps` adds the ancestors that keep the hierarchy connected.
    Subset(SubsetArgs),

    /// Check that every class is aligned with an upper ontology.
    Validate(ValidateArgs),

    /// Normalize an ontology (merge axioms, inject declarations, add source).
    Normalize(NormalizeArgs),

    /// Print class and axiom counts of a snapshot.
    Stats {
        /// Input graph snapshot
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args)]
struct SubsetArgs {
    /// Input graph snapshot
    #[arg(short, long)]
    input: PathBuf,
    /// Class expression whose sub-classes and equivalents are included
    #[arg(short, long = "query")]
    queries: Vec<String>,
    /// Also include the super-classes of query results
    #[arg(short, long)]
    ancestors: bool,
    /// Include the classes tagged with this subset (IRI, CURIE or name)
    #[arg(short = 's', long = "tag", alias = "subset")]
    tags: Vec<String>,
    /// Include this class (IRI or CURIE)
    #[arg(short, long = "term")]
    terms: Vec<String>,
    /// Include the classes listed in this file (one per line)
    #[arg(short = 'T', long = "term-file")]
    term_files: Vec<PathBuf>,
    /// Fill gaps to closure (`--fill-gaps false` overrides --config)
    #[arg(short, long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    fill_gaps: Option<bool>,
    /// Exclude dangling classes when filling gaps (default: true)
    #[arg(long, value_name = "BOOL")]
    no_dangling: Option<bool>,
    /// When filling gaps, also follow relations using this property
    #[arg(long = "follow-property")]
    follow_properties: Vec<String>,
    /// When filling gaps, only include classes under this prefix
    #[arg(long = "follow-in")]
    follow_in: Vec<String>,
    /// When filling gaps, exclude classes under this prefix
    #[arg(long = "not-follow-in")]
    not_follow_in: Vec<String>,
    /// Include axioms from imported modules (default: true)
    #[arg(short, long = "collapse-imports", value_name = "BOOL")]
    collapse_imports: Option<bool>,
    /// Ontology IRI of the subset
    #[arg(long)]
    ontology_iri: Option<String>,
    /// Write the subset here instead of stdout
    #[arg(short, long)]
    write_to: Option<PathBuf>,
    /// JSON file with subset options; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Input graph snapshot
    #[arg(short, long)]
    input: PathBuf,
    /// Upper ontology snapshot
    #[arg(short, long)]
    upper_ontology: PathBuf,
    /// Only check classes in this namespace (repeatable; default: all classes)
    #[arg(short, long = "base-iri")]
    base_iris: Vec<String>,
    /// Ignore dangling classes
    #[arg(short = 'd', long)]
    ignore_dangling: bool,
    /// Write the list of unaligned classes here
    #[arg(short = 'O', long)]
    report_output: Option<PathBuf>,
    /// Exit with an error when unaligned classes are found (default: true)
    #[arg(short = 'x', long, value_name = "BOOL", default_value_t = true, action = clap::ArgAction::Set)]
    fail: bool,
}

#[derive(Args)]
struct NormalizeArgs {
    /// Input graph snapshot
    #[arg(short, long)]
    input: PathBuf,
    /// Output graph snapshot
    #[arg(short, long)]
    output: PathBuf,
    /// Merge axioms that differ only by their annotations
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    merge_axioms: Option<bool>,
    /// Declare subset IRIs as sub-properties of oboInOwl:SubsetProperty
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    subset_decls: Option<bool>,
    /// Declare synonym type IRIs as sub-properties of oboInOwl:SynonymTypeProperty
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    synonym_decls: Option<bool>,
    /// Add a dc:source annotation from the version IRI
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    add_source: Option<bool>,
    /// Perform all normalizations (except add-source)
    #[arg(short, long)]
    all: bool,
    /// Inject declarations only for IRIs in this namespace (repeatable)
    #[arg(long = "base-iri")]
    base_iris: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Subset(args) => cmd_subset(args),
        Commands::Validate(args) => cmd_validate(args),
        Commands::Normalize(args) => cmd_normalize(args),
        Commands::Stats { input } => cmd_stats(&input),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, _) => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_graph(path: &Path) -> Result<GraphStore> {
    GraphStore::load(path).with_context(|| format!("failed to load graph {}", path.display()))
}

// ============================================================================
// subset
// ============================================================================

fn subset_options(args: &SubsetArgs, prefixes: &PrefixMap) -> Result<SubsetOptions> {
    let mut options = match &args.config {
        Some(path) => SubsetOptions::load(path)?,
        None => SubsetOptions::default(),
    };

    options.queries.extend(args.queries.iter().cloned());
    options.with_ancestors |= args.ancestors;
    options.tags.extend(args.tags.iter().cloned());
    options.terms.extend(args.terms.iter().cloned());
    options.term_files.extend(args.term_files.iter().cloned());

    let filter = &mut options.filter;
    if let Some(fill_gaps) = args.fill_gaps {
        filter.fill_gaps = fill_gaps;
    }
    if let Some(no_dangling) = args.no_dangling {
        filter.exclude_dangling = no_dangling;
    }
    if let Some(collapse) = args.collapse_imports {
        filter.include_imports = collapse;
    }
    for property in &args.follow_properties {
        let iri = prefixes
            .expand(property)
            .map_err(|e| anyhow!("invalid --follow-property `{property}`: {e}"))?;
        FilterConfig::add_unique(&mut filter.follow_properties, iri);
    }
    for prefix in &args.follow_in {
        FilterConfig::add_unique(&mut filter.follow_in, prefix.clone());
    }
    for prefix in &args.not_follow_in {
        FilterConfig::add_unique(&mut filter.not_follow_in, prefix.clone());
    }

    if let Some(iri) = &args.ontology_iri {
        let iri = prefixes
            .expand(iri)
            .map_err(|e| anyhow!("invalid --ontology-iri `{iri}`: {e}"))?;
        options.ontology_iri = Some(iri);
    }
    Ok(options)
}

fn cmd_subset(args: SubsetArgs) -> Result<()> {
    let prefixes = PrefixMap::default();
    let options = subset_options(&args, &prefixes)?;
    let store = load_graph(&args.input)?;
    let oracle = StructuralReasoner::new(&store);

    let extractor = SubsetExtractor::new(&store, &oracle)
        .with_prefixes(prefixes)
        .with_config(options.filter.clone());
    let seeds = extractor.collect_seeds(&options.seed_sources())?;
    tracing::info!(seeds = seeds.len(), "creating ontology from initial subset");
    let mut subset = extractor.extract(&seeds)?;
    if let Some(iri) = &options.ontology_iri {
        subset.set_ontology_iri(iri.clone());
    }

    match &args.write_to {
        Some(out) => {
            subset.graph().save(out)?;
            eprintln!(
                "{} subset of {} classes to {}",
                "wrote".green().bold(),
                subset.nodes().len(),
                out.display().to_string().bold()
            );
        }
        None => println!("{}", subset.graph().to_snapshot_json()?),
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let local = load_graph(&args.input)?;
    let upper = load_graph(&args.upper_ontology)?;
    let options = AlignmentOptions {
        base_prefixes: args.base_iris.clone(),
        ignore_dangling: args.ignore_dangling,
    };

    let report = validate_alignment(&local, &upper, &options)?;
    if let Some(path) = &args.report_output {
        std::fs::write(path, report.to_text())
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    if report.is_aligned() {
        eprintln!("{} no top-level unaligned classes", "ok".green().bold());
        return Ok(());
    }
    eprintln!(
        "{} {} top-level unaligned class(es)",
        "error:".red().bold(),
        report.unaligned.len()
    );
    for iri in &report.unaligned {
        eprintln!("  {iri}");
    }
    if args.fail {
        return Err(anyhow!("ontology is misaligned"));
    }
    Ok(())
}

// ============================================================================
// normalize
// ============================================================================

fn cmd_normalize(args: NormalizeArgs) -> Result<()> {
    let mut store = load_graph(&args.input)?;
    let options = NormalizeOptions {
        merge_axioms: args.merge_axioms.unwrap_or(args.all),
        subset_decls: args.subset_decls.unwrap_or(args.all),
        synonym_decls: args.synonym_decls.unwrap_or(args.all),
        add_source: args.add_source.unwrap_or(false),
        base_prefixes: Some(default_base_prefixes_or(&args.base_iris)),
    };

    let summary = normalize(&mut store, &options);
    store.save(&args.output)?;
    eprintln!(
        "{} {} (merged {}, declarations {}, source {})",
        "wrote".green().bold(),
        args.output.display().to_string().bold(),
        summary.merged,
        summary.declarations,
        if summary.source_added { "added" } else { "unchanged" }
    );
    Ok(())
}

// ============================================================================
// stats
// ============================================================================

fn cmd_stats(input: &Path) -> Result<()> {
    let store = load_graph(input)?;
    let root = store.root();

    let mut logical = 0usize;
    let mut annotations = 0usize;
    let mut declarations = 0usize;
    for axiom in store.axioms(ImportsScope::Included) {
        match axiom.body {
            AxiomBody::Declaration { .. } => declarations += 1,
            AxiomBody::AnnotationAssertion { .. } | AxiomBody::SubAnnotationPropertyOf { .. } => {
                annotations += 1
            }
            _ => logical += 1,
        }
    }

    println!("{} {}", "Ontology".green().bold(), input.display());
    if let Some(iri) = &root.id.iri {
        println!("  iri:           {iri}");
    }
    if let Some(version) = &root.id.version_iri {
        println!("  version:       {version}");
    }
    println!("  imports:       {}", store.imports().len());
    println!(
        "  classes:       {} ({} local)",
        store.classes(ImportsScope::Included).len(),
        store.classes(ImportsScope::Excluded).len()
    );
    println!(
        "  axioms:        {} ({} local)",
        store.axiom_count(ImportsScope::Included),
        root.len()
    );
    println!("    logical:     {logical}");
    println!("    annotation:  {annotations}");
    println!("    declaration: {declarations}");
    Ok(())
}
