//! Proteomap CLI: map phosphopeptides onto stored pathway graphs.
//!
//! Usage:
//!   proteomap graph <import|list|remove> [--db path]
//!   proteomap map --graph <name> --peptides <tsv> --fasta <fasta> [options]
//!   proteomap weights --graph <name> --experiment <label> [--db path]
//!   proteomap experiments --graph <name> [--db path]

use clap::{Parser, Subcommand};
use proteomap::mapping::{list_experiments, read_measurements_file};
use proteomap::{
    AbundancePolicy, GraphEngine, GraphId, MappingConfig, MappingPipeline, OpenStore, PathwayGraph,
    ReferenceSequences, SqliteStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "proteomap",
    version,
    about = "Map quantified phosphopeptides onto proteoform pathway graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored pathway graphs
    Graph {
        #[command(subcommand)]
        action: GraphAction,
        /// Path to SQLite database file
        #[arg(long, global = true)]
        db: Option<PathBuf>,
    },
    /// Map a peptide table onto a graph and print the report
    Map {
        /// Name of the graph to annotate
        #[arg(long)]
        graph: String,
        /// Tab-separated peptide measurements
        #[arg(long)]
        peptides: PathBuf,
        /// Reference protein sequences (FASTA)
        #[arg(long)]
        fasta: PathBuf,
        /// YAML mapping configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Abundance policy (highest_support, max, mean, median, extreme)
        #[arg(long)]
        policy: Option<String>,
        /// Restrict the run to these experiments (repeatable)
        #[arg(long = "experiment")]
        experiments: Vec<String>,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Re-derive edge weights from stored scores
    Weights {
        #[arg(long)]
        graph: String,
        #[arg(long)]
        experiment: String,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List experiments with stored scores
    Experiments {
        #[arg(long)]
        graph: String,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum GraphAction {
    /// Import a serialized pathway graph (JSON)
    Import {
        /// Path to the graph JSON file
        path: PathBuf,
    },
    /// List stored graphs
    List,
    /// Remove a stored graph and all its annotations
    Remove {
        /// Name of the graph
        name: String,
    },
}

/// Get the default database path (~/.local/share/proteomap/proteomap.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let app_dir = data_dir.join("proteomap");
    std::fs::create_dir_all(&app_dir).ok();
    app_dir.join("proteomap.db")
}

fn open_engine(db: Option<PathBuf>) -> Result<GraphEngine, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    let engine = GraphEngine::with_store(Arc::new(store));
    let loaded = engine.load_all().map_err(|e| format!("Failed to load graphs: {}", e))?;
    info!(db = %db_path.display(), graphs = loaded, "Store opened");
    Ok(engine)
}

fn cmd_graph_import(engine: &GraphEngine, path: &Path) -> i32 {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", path.display(), e);
            return 1;
        }
    };
    let graph: PathwayGraph = match serde_json::from_str(&text) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: invalid graph file '{}': {}", path.display(), e);
            return 1;
        }
    };
    let (nodes, edges) = (graph.node_count(), graph.edge_count());
    match engine.upsert_graph(graph) {
        Ok(id) => {
            println!("Imported graph '{}' ({} nodes, {} edges)", id, nodes, edges);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_graph_list(engine: &GraphEngine) -> i32 {
    let ids = engine.list_graphs();
    if ids.is_empty() {
        println!("No graphs stored.");
        return 0;
    }
    println!("{:<32}  {:>9}  {:>9}  {:>11}", "GRAPH", "NODES", "EDGES", "EXPERIMENTS");
    println!("{}", "-".repeat(68));
    for id in ids {
        if let Some(graph) = engine.get_graph(&id) {
            println!(
                "{:<32}  {:>9}  {:>9}  {:>11}",
                id,
                graph.node_count(),
                graph.edge_count(),
                proteomap::mapping::experiments(&graph).len()
            );
        }
    }
    0
}

fn cmd_graph_remove(engine: &GraphEngine, name: &str) -> i32 {
    match engine.remove_graph(&GraphId::from(name)) {
        Ok(true) => {
            println!("Removed graph '{}'", name);
            0
        }
        Ok(false) => {
            eprintln!("Error: graph '{}' not found", name);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn load_config(
    path: Option<&Path>,
    policy: Option<&str>,
    experiments: Vec<String>,
) -> Result<MappingConfig, String> {
    let mut config = match path {
        Some(p) => {
            MappingConfig::from_yaml_file(p).map_err(|e| format!("'{}': {}", p.display(), e))?
        }
        None => MappingConfig::default(),
    };
    if let Some(name) = policy {
        let policy: AbundancePolicy = name.parse().map_err(|e| format!("{}", e))?;
        config.abundance_policy = policy;
    }
    if !experiments.is_empty() {
        config.experiments = Some(experiments);
    }
    Ok(config)
}

fn cmd_map(
    engine: &GraphEngine,
    graph: &str,
    peptides: &Path,
    fasta: &Path,
    config: MappingConfig,
) -> i32 {
    let references = match ReferenceSequences::from_fasta_file(fasta) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", fasta.display(), e);
            return 1;
        }
    };
    let records = match read_measurements_file(peptides, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", peptides.display(), e);
            return 1;
        }
    };
    info!(sequences = references.len(), records = records.len(), "Inputs loaded");

    let pipeline = MappingPipeline::new(config);
    match pipeline.run(engine, &GraphId::from(graph), records, &references) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_weights(engine: &GraphEngine, graph: &str, experiment: &str) -> i32 {
    let pipeline = MappingPipeline::new(MappingConfig::default());
    match pipeline.rederive_weights(engine, &GraphId::from(graph), experiment) {
        Ok(summary) => {
            println!(
                "Weighted {} edges for '{}' (max |abundance| {})",
                summary.edges, experiment, summary.max_abs_abundance
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_experiments(engine: &GraphEngine, graph: &str) -> i32 {
    match list_experiments(engine, &GraphId::from(graph)) {
        Ok(labels) if labels.is_empty() => {
            println!("No experiments mapped onto '{}'.", graph);
            0
        }
        Ok(labels) => {
            for label in labels {
                println!("{}", label);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Graph { action, db } => match open_engine(db) {
            Ok(engine) => match action {
                GraphAction::Import { path } => cmd_graph_import(&engine, &path),
                GraphAction::List => cmd_graph_list(&engine),
                GraphAction::Remove { name } => cmd_graph_remove(&engine, &name),
            },
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Map {
            graph,
            peptides,
            fasta,
            config,
            policy,
            experiments,
            db,
        } => {
            // Configuration problems are reported before the store is touched
            let config = match load_config(config.as_deref(), policy.as_deref(), experiments) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(2);
                }
            };
            match open_engine(db) {
                Ok(engine) => cmd_map(&engine, &graph, &peptides, &fasta, config),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            }
        }
        Commands::Weights { graph, experiment, db } => match open_engine(db) {
            Ok(engine) => cmd_weights(&engine, &graph, &experiment),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Experiments { graph, db } => match open_engine(db) {
            Ok(engine) => cmd_experiments(&engine, &graph),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
