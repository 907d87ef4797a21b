// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text trace reader that populates a [`ViterbiLattice`].
//!
//! A trace is a series of tagged blocks with whitespace-separated columns:
//!
//! ```text
//! <UnitVector>          cluster concatCost
//! <CandidateDump>       cluster sampleOffset sampleLength targetCost routeCost precede
//! <RouteDump>           route cluster sampleOffset
//! <WaveUnitSel>         cluster sampleOffset
//! ```
//!
//! `#` starts a comment. Blocks with other tags are skipped. Route lines
//! arrive last cluster first and each route is reversed when it ends. The
//! `WaveUnitSel` path selects the route with the same nodes, adding it first
//! if no dumped route matches.

use std::fs;
use std::io;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

use super::{CostNode, LatticeError, NodeRef, NodeRoute, RouteBuilder, ViterbiLattice, WaveUnit};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Lattice {
        line: usize,
        #[source]
        source: LatticeError,
    },

    #[error("<{tag}> opened on line {line} is never closed")]
    Unclosed { tag: String, line: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    UnitVector,
    CandidateDump,
    RouteDump,
    WaveUnitSel,
    Skipped,
}

impl Block {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "UnitVector" => Self::UnitVector,
            "CandidateDump" => Self::CandidateDump,
            "RouteDump" => Self::RouteDump,
            "WaveUnitSel" => Self::WaveUnitSel,
            _ => Self::Skipped,
        }
    }
}

/// Whitespace column reader that reports errors against a line number.
struct Columns<'a> {
    line: usize,
    fields: SplitWhitespace<'a>,
}

impl<'a> Columns<'a> {
    fn new(line: usize, text: &'a str) -> Self {
        Self {
            line,
            fields: text.split_whitespace(),
        }
    }

    fn next<T: FromStr>(&mut self, name: &str) -> Result<T, TraceError> {
        let field = self.fields.next().ok_or_else(|| TraceError::Malformed {
            line: self.line,
            reason: format!("missing {}", name),
        })?;
        field.parse().map_err(|_| TraceError::Malformed {
            line: self.line,
            reason: format!("bad {} {:?}", name, field),
        })
    }

    fn end(mut self) -> Result<(), TraceError> {
        match self.fields.next() {
            None => Ok(()),
            Some(extra) => Err(TraceError::Malformed {
                line: self.line,
                reason: format!("unexpected column {:?}", extra),
            }),
        }
    }
}

struct Parser {
    lattice: ViterbiLattice,
    route_id: Option<i64>,
    route: RouteBuilder,
    route_line: usize,
    selection: Vec<(usize, NodeRef)>,
    selection_line: usize,
}

impl Parser {
    fn lattice_err(line: usize) -> impl Fn(LatticeError) -> TraceError {
        move |source| TraceError::Lattice { line, source }
    }

    fn node_ref(&self, line: usize, cluster: usize, offset: i64) -> Result<NodeRef, TraceError> {
        let index = self
            .lattice
            .clusters()
            .get(cluster)
            .ok_or(TraceError::Lattice {
                line,
                source: LatticeError::UnknownCluster(cluster),
            })?
            .index_of(offset)
            .ok_or_else(|| TraceError::Malformed {
                line,
                reason: format!("cluster {} has no candidate at sample {}", cluster, offset),
            })?;
        Ok(NodeRef { cluster, index })
    }

    fn unit_vector(&mut self, mut cols: Columns<'_>) -> Result<(), TraceError> {
        let line = cols.line;
        let cluster: usize = cols.next("cluster")?;
        let concat: f32 = cols.next("concat cost")?;
        cols.end()?;
        if cluster != self.lattice.clusters().len() {
            return Err(TraceError::Malformed {
                line,
                reason: format!(
                    "cluster {} declared out of order, expected {}",
                    cluster,
                    self.lattice.clusters().len()
                ),
            });
        }
        self.lattice.add_cluster(concat).map_err(Self::lattice_err(line))?;
        Ok(())
    }

    fn candidate(&mut self, mut cols: Columns<'_>) -> Result<(), TraceError> {
        let line = cols.line;
        let cluster: usize = cols.next("cluster")?;
        let offset: i64 = cols.next("sample offset")?;
        let length: u32 = cols.next("sample length")?;
        let target: f32 = cols.next("target cost")?;
        let route: f32 = cols.next("route cost")?;
        let precede: i64 = cols.next("precede index")?;
        cols.end()?;

        let mut node = CostNode::new(WaveUnit::new(offset, length), target, route);
        node.precede_node_index = usize::try_from(precede).ok();
        self.lattice
            .add_node(cluster, node)
            .map_err(Self::lattice_err(line))?;
        Ok(())
    }

    fn route_line(&mut self, mut cols: Columns<'_>) -> Result<(), TraceError> {
        let line = cols.line;
        let route: i64 = cols.next("route")?;
        let cluster: usize = cols.next("cluster")?;
        let offset: i64 = cols.next("sample offset")?;
        cols.end()?;

        if self.route_id.is_some_and(|id| id != route) {
            self.finish_route()?;
        }
        if self.route.is_empty() {
            self.route_line = line;
        }
        self.route_id = Some(route);
        let node = self.node_ref(line, cluster, offset)?;
        self.route.push(node);
        Ok(())
    }

    fn finish_route(&mut self) -> Result<(), TraceError> {
        self.route_id = None;
        let builder = std::mem::take(&mut self.route);
        if builder.is_empty() {
            return Ok(());
        }
        self.lattice
            .add_route(builder.finish())
            .map_err(Self::lattice_err(self.route_line))?;
        Ok(())
    }

    fn selection_line(&mut self, mut cols: Columns<'_>) -> Result<(), TraceError> {
        let line = cols.line;
        let cluster: usize = cols.next("cluster")?;
        let offset: i64 = cols.next("sample offset")?;
        cols.end()?;
        if self.selection.is_empty() {
            self.selection_line = line;
        }
        let node = self.node_ref(line, cluster, offset)?;
        self.selection.push((cluster, node));
        Ok(())
    }

    /// Select the traced path, adding it as a route if nothing matches.
    fn finish(mut self) -> Result<ViterbiLattice, TraceError> {
        if self.selection.is_empty() {
            return Ok(self.lattice);
        }
        let line = self.selection_line;
        self.selection.sort_by_key(|&(cluster, _)| cluster);
        let path: Vec<NodeRef> = self.selection.iter().map(|&(_, n)| n).collect();
        let route = match self.lattice.route_index(&path) {
            Some(r) => r,
            None => self
                .lattice
                .add_route(NodeRoute::new(path))
                .map_err(Self::lattice_err(line))?,
        };
        self.lattice.show_all_routes().map_err(Self::lattice_err(line))?;
        self.lattice.select_route(route).map_err(Self::lattice_err(line))?;
        Ok(self.lattice)
    }
}

/// Parse a trace into a lattice.
pub fn parse_trace(text: &str) -> Result<ViterbiLattice, TraceError> {
    let mut parser = Parser {
        lattice: ViterbiLattice::new(),
        route_id: None,
        route: RouteBuilder::default(),
        route_line: 0,
        selection: Vec::new(),
        selection_line: 0,
    };
    let mut open: Option<(Block, String, usize)> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }

        if let Some(tag) = text.strip_prefix("</").and_then(|t| t.strip_suffix('>')) {
            let closes = matches!(&open, Some((_, name, _)) if name == tag);
            if !closes {
                return Err(TraceError::Malformed {
                    line,
                    reason: format!("</{}> doesn't close an open block", tag),
                });
            }
            if matches!(open, Some((Block::RouteDump, _, _))) {
                parser.finish_route()?;
            }
            open = None;
            continue;
        }

        if let Some(tag) = text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            if let Some((_, name, _)) = &open {
                return Err(TraceError::Malformed {
                    line,
                    reason: format!("<{}> opened inside <{}>", tag, name),
                });
            }
            let block = Block::from_tag(tag);
            if block == Block::Skipped {
                log::debug!("skipping <{}> block at line {}", tag, line);
            }
            open = Some((block, tag.to_string(), line));
            continue;
        }

        let cols = Columns::new(line, text);
        match open.as_ref().map(|(block, _, _)| *block) {
            Some(Block::UnitVector) => parser.unit_vector(cols)?,
            Some(Block::CandidateDump) => parser.candidate(cols)?,
            Some(Block::RouteDump) => parser.route_line(cols)?,
            Some(Block::WaveUnitSel) => parser.selection_line(cols)?,
            Some(Block::Skipped) => {}
            None => {
                return Err(TraceError::Malformed {
                    line,
                    reason: "data outside any block".to_string(),
                })
            }
        }
    }

    if let Some((_, tag, line)) = open {
        return Err(TraceError::Unclosed { tag, line });
    }
    parser.finish()
}

/// Read and parse a trace file.
pub fn parse_trace_file(path: impl AsRef<Path>) -> Result<ViterbiLattice, TraceError> {
    let text = fs::read_to_string(path)?;
    parse_trace(&text)
}
