use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fineltra::api::{
    fineltra, Bbox, CandidateOrder, FineltraCfg, Geometry, RelationId, TriangleSource,
};
use fineltra::mesh::rand::{grid_pairs, GridCfg, ReplayToken};
use fineltra::mesh::TriangleSet;
use fineltra::Pt2;
use polars::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod relation;

use relation::TableSource;

#[derive(Parser)]
#[command(name = "fineltra")]
#[command(about = "Rubber-sheet geometries through a triangle correspondence mesh")]
struct Cmd {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Transform a JSON geometry and write the result plus a provenance sidecar
    Transform {
        #[arg(long)]
        input: String,
        /// CSV or Parquet relation holding the triangle pairs
        #[arg(long)]
        mesh: String,
        #[arg(long, default_value = "src")]
        src_col: String,
        #[arg(long, default_value = "tgt")]
        tgt_col: String,
        #[arg(long)]
        out: String,
        /// Scan candidates in file order instead of canonical order
        #[arg(long)]
        arrival_order: bool,
    },
    /// Summarize a triangle relation
    Inspect {
        #[arg(long)]
        mesh: String,
        #[arg(long, default_value = "src")]
        src_col: String,
        #[arg(long, default_value = "tgt")]
        tgt_col: String,
    },
    /// Write a jittered-grid triangle relation as CSV
    Grid {
        #[arg(long)]
        out: String,
        #[arg(long, default_value_t = 10)]
        nx: usize,
        #[arg(long, default_value_t = 10)]
        ny: usize,
        #[arg(long, default_value_t = 100.0)]
        size: f64,
        #[arg(long, default_value_t = 0.2)]
        jitter: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        srid_src: i32,
        #[arg(long, default_value_t = 0)]
        srid_tgt: i32,
    },
    /// Print version and code revision
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = match cmd.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Transform {
            input,
            mesh,
            src_col,
            tgt_col,
            out,
            arrival_order,
        } => {
            let cfg = FineltraCfg {
                order: if arrival_order {
                    CandidateOrder::Arrival
                } else {
                    CandidateOrder::Canonical
                },
            };
            transform(&input, &mesh, &src_col, &tgt_col, &out, cfg)
        }
        Action::Inspect {
            mesh,
            src_col,
            tgt_col,
        } => {
            let summary = inspect(&mesh, &src_col, &tgt_col)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Action::Grid {
            out,
            nx,
            ny,
            size,
            jitter,
            seed,
            srid_src,
            srid_tgt,
        } => {
            let cfg = GridCfg {
                bounds: Bbox {
                    min: Pt2::zeros(),
                    max: Pt2::new(size, size),
                },
                nx,
                ny,
                jitter_frac: jitter,
                srid_src,
                srid_tgt,
                ..GridCfg::default()
            };
            grid(&out, cfg, seed)
        }
        Action::Report => report(),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn transform(
    input: &str,
    mesh: &str,
    src_col: &str,
    tgt_col: &str,
    out: &str,
    cfg: FineltraCfg,
) -> Result<()> {
    tracing::info!(input, mesh, src_col, tgt_col, out, "transform");
    let text = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    let geom = Geometry::from_json(&text).with_context(|| format!("decoding {input}"))?;
    let srid_in = geom.srid;

    let mut source = TableSource::new();
    let relation = source.register(mesh)?;
    let mut cache: HashMap<RelationId, String> = HashMap::new();
    let moved = fineltra(geom, relation, src_col, tgt_col, &source, &mut cache, cfg)
        .with_context(|| format!("transforming {input} through {mesh}"))?;
    tracing::info!(
        srid_in,
        srid_out = moved.srid,
        vertices = moved.shape.num_vertices(),
        "transformed"
    );

    let out_path = Path::new(out);
    ensure_parent(out_path)?;
    std::fs::write(out_path, serde_json::to_vec_pretty(&moved)?)
        .with_context(|| format!("writing {out}"))?;
    provenance::write_sidecar(
        out_path,
        json!({
            "input": input,
            "mesh": mesh,
            "src_col": src_col,
            "tgt_col": tgt_col,
            "order": format!("{:?}", cfg.order),
        }),
    )?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct MeshSummary {
    rows: usize,
    pairs: usize,
    unpaired: usize,
    srid_src: i32,
    srid_tgt: i32,
    degenerate_src: usize,
    bbox_src: Option<[f64; 4]>,
}

fn inspect(mesh: &str, src_col: &str, tgt_col: &str) -> Result<MeshSummary> {
    let mut source = TableSource::new();
    let id = source.register(mesh)?;
    let name = source.relation_name(id)?;
    let rows = source.rows(&name, src_col, tgt_col)?;
    let everything = Bbox {
        min: Pt2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        max: Pt2::new(f64::INFINITY, f64::INFINITY),
    };
    let candidates = source.fetch(&name, src_col, tgt_col, &everything)?;
    let set = TriangleSet::from_candidates(candidates, FineltraCfg::default())
        .with_context(|| format!("decoding triangles of {mesh}"))?;
    let degenerate_src = set.sources().filter(|t| t.is_degenerate()).count();
    let bbox_src = Bbox::from_points(set.sources().flat_map(|t| t.vertices()))
        .map(|b| [b.min.x, b.min.y, b.max.x, b.max.y]);
    if degenerate_src > 0 {
        tracing::warn!(degenerate_src, "relation has degenerate source triangles");
    }
    Ok(MeshSummary {
        rows: rows.len(),
        pairs: set.pairs().count(),
        unpaired: set.len() - set.pairs().count(),
        srid_src: set.srid_src(),
        srid_tgt: set.srid_tgt(),
        degenerate_src,
        bbox_src,
    })
}

fn grid(out: &str, cfg: GridCfg, seed: u64) -> Result<()> {
    tracing::info!(out, nx = cfg.nx, ny = cfg.ny, seed, "grid");
    let pairs = grid_pairs(cfg, ReplayToken { seed, index: 0 });
    let mut src = Vec::with_capacity(pairs.len());
    let mut tgt = Vec::with_capacity(pairs.len());
    for p in &pairs {
        src.push(p.src.to_geometry(cfg.srid_src).to_json()?);
        tgt.push(p.tgt.to_geometry(cfg.srid_tgt).to_json()?);
    }
    let mut df = df!("src" => src, "tgt" => tgt)?;
    let out_path = Path::new(out);
    ensure_parent(out_path)?;
    let mut file =
        std::fs::File::create(out_path).with_context(|| format!("creating {out}"))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    provenance::write_sidecar(
        out_path,
        json!({
            "nx": cfg.nx,
            "ny": cfg.ny,
            "jitter": cfg.jitter_frac,
            "seed": seed,
            "srid_src": cfg.srid_src,
            "srid_tgt": cfg.srid_tgt,
        }),
    )?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "fineltra": fineltra::VERSION,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
