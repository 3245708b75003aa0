use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use query::{
    CategoryId, DEFAULT_ENDPOINT, SortOrder, SparqlClient, build_query, parse_limit, suggestion_term,
};
use tools::{RenderOptions, load_config, load_rows, render_rows};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Provenance routes from Wikidata query results")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map a saved result set and write it as GeoJSON
    Render {
        /// Bindings array or full SPARQL JSON results document
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Draw every route, not only the origin markers
        #[arg(long)]
        all: bool,

        /// Highlight the route of this result index
        #[arg(long)]
        highlight: Option<usize>,

        /// Map styling overrides as JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the SPARQL for a category
    Query {
        /// Wikidata item id of the category, e.g. Q3305213
        category: String,

        /// ascending, descending or empty
        #[arg(long, default_value = "")]
        sort: String,

        #[arg(long, default_value = "")]
        limit: String,
    },

    /// Run the category query and write the bindings
    Fetch {
        category: String,

        #[arg(long, default_value = "")]
        sort: String,

        #[arg(long, default_value = "")]
        limit: String,

        #[arg(long, env = "SPARQL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List categories whose label contains a term
    Suggest {
        term: String,

        #[arg(long, env = "SPARQL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::Render {
            input,
            out,
            all,
            highlight,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => Default::default(),
            };
            let options = RenderOptions {
                draw_all: all,
                highlight,
                config,
            };
            let rendered = render_rows(load_rows(&input)?, &options);
            info!(
                rows = rendered.summary.rows,
                origins = rendered.summary.origins,
                skipped = rendered.summary.skipped,
                routes = rendered.routes,
                "rendered"
            );
            debug!(counters = ?rendered.metrics.counters, gauges = ?rendered.metrics.gauges, "map metrics");
            write_json(out.as_deref(), &rendered.geojson)
        }
        Command::Query {
            category,
            sort,
            limit,
        } => {
            println!("{}", category_query(&category, &sort, &limit)?);
            Ok(())
        }
        Command::Fetch {
            category,
            sort,
            limit,
            endpoint,
            out,
        } => {
            let sparql = category_query(&category, &sort, &limit)?;
            let bindings = SparqlClient::new(endpoint)
                .run_raw(&sparql)
                .await
                .map_err(|e| e.to_string())?;
            info!(rows = bindings.len(), "fetched");
            write_json(out.as_deref(), &serde_json::Value::Array(bindings))
        }
        Command::Suggest { term, endpoint } => {
            let Some(term) = suggestion_term(&term) else {
                return Err("term needs at least 3 characters".to_string());
            };
            let found = SparqlClient::new(endpoint)
                .suggest(term)
                .await
                .map_err(|e| e.to_string())?;
            for s in found {
                println!("{}\t{}", s.id, s.label);
            }
            Ok(())
        }
    }
}

fn category_query(category: &str, sort: &str, limit: &str) -> Result<String, String> {
    let category = CategoryId::parse(category).map_err(|e| e.to_string())?;
    let sort = sort.parse::<SortOrder>().map_err(|e| e.to_string())?;
    let limit = parse_limit(limit).map_err(|e| e.to_string())?;
    Ok(build_query(&category, sort, limit))
}

fn write_json(out: Option<&Path>, value: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    match out {
        Some(path) => fs::write(path, text).map_err(|e| format!("write {path:?}: {e}")),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").map_err(|e| e.to_string())
        }
    }
}
