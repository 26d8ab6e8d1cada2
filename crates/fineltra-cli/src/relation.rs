//! Triangle relations stored as CSV or Parquet files, read through polars.
//!
//! Each registered file is one relation; its `RelationId` is the registration
//! index and its name the file path. Triangle columns hold JSON-encoded
//! geometries (see `fineltra::geometry::Geometry::to_json`); an empty cell is
//! a null.

use std::path::{Path, PathBuf};

use fineltra::api::{
    Bbox, CandidatePair, FineltraError, FineltraResult, Geometry, RelationId, TriangleSource,
};
use polars::prelude::*;
use tracing::debug;

/// File-backed `TriangleSource`.
#[derive(Debug, Default)]
pub struct TableSource {
    tables: Vec<PathBuf>,
}

impl TableSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relation file. Fails when ids would run past `u32::MAX`.
    pub fn register<P: AsRef<Path>>(&mut self, path: P) -> FineltraResult<RelationId> {
        let id = u32::try_from(self.tables.len())
            .map_err(|_| FineltraError::Source("too many registered relations".into()))?;
        self.tables.push(path.as_ref().to_path_buf());
        Ok(RelationId(id))
    }

    /// All rows as nullable (src, tgt) geometry cells, in file order.
    pub fn rows(
        &self,
        relation: &str,
        src_col: &str,
        tgt_col: &str,
    ) -> FineltraResult<Vec<(Option<Geometry>, Option<Geometry>)>> {
        let path = self
            .tables
            .iter()
            .find(|p| p.to_string_lossy() == relation)
            .ok_or_else(|| FineltraError::Source(format!("no relation named {relation:?}")))?;
        let df = read_table(path).map_err(|e| FineltraError::Source(e.to_string()))?;
        let string_column = |name: &str| -> FineltraResult<StringChunked> {
            let series = df.column(name).map_err(|_| FineltraError::UnknownColumn {
                relation: relation.to_string(),
                column: name.to_string(),
            })?;
            series
                .str()
                .cloned()
                .map_err(|e| FineltraError::Source(e.to_string()))
        };
        let src = string_column(src_col)?;
        let tgt = string_column(tgt_col)?;
        let decode = |cell: Option<&str>| -> FineltraResult<Option<Geometry>> {
            match cell.map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => Geometry::from_json(s).map(Some),
            }
        };
        src.into_iter()
            .zip(tgt.into_iter())
            .map(|(s, t)| Ok((decode(s)?, decode(t)?)))
            .collect()
    }
}

impl TriangleSource for TableSource {
    fn relation_name(&self, id: RelationId) -> FineltraResult<String> {
        self.tables
            .get(id.0 as usize)
            .map(|p| p.to_string_lossy().into_owned())
            .ok_or(FineltraError::UnknownRelation(id))
    }

    fn fetch(
        &self,
        relation: &str,
        src_col: &str,
        tgt_col: &str,
        bbox: &Bbox,
    ) -> FineltraResult<Vec<CandidatePair>> {
        let rows = self.rows(relation, src_col, tgt_col)?;
        let total = rows.len();
        let out: Vec<CandidatePair> = rows
            .into_iter()
            .filter_map(|(src, tgt)| {
                let src = src?;
                src.bbox()
                    .is_some_and(|b| b.intersects(bbox))
                    .then_some(CandidatePair { src, tgt })
            })
            .collect();
        debug!(relation, total, kept = out.len(), "bbox prefilter");
        Ok(out)
    }
}

/// Every column is read as a string so JSON cells survive schema inference.
fn read_table(path: &Path) -> PolarsResult<DataFrame> {
    let lf = match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        _ => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?,
    };
    lf.collect()
}
