//! GTS (GNU Triangulated Surface) reader.
//!
//! A GTS file lists vertices, then edges as 1-based vertex pairs, then faces
//! as 1-based edge triples:
//!
//! ```text
//! nv ne nf [GtsSurface GtsFace GtsEdge GtsVertex]
//! x y z            (nv lines)
//! v1 v2            (ne lines)
//! e1 e2 e3         (nf lines)
//! ```
//!
//! Lines starting with `#` and blank lines are ignored. Errors carry the
//! line and column of the offending token.

use std::path::{Path, PathBuf};

use nalgebra::Point3;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::tracing_ext::OperationTimer;
use crate::TriSurface;

/// Read a GTS surface from disk.
pub fn read_gts(path: &Path) -> MeshResult<TriSurface> {
    let _timer = OperationTimer::new("read_gts");
    let text = std::fs::read_to_string(path).map_err(|e| MeshError::io_read(path, e))?;
    let surface = parse_gts(&text, path)?;

    info!(
        vertices = surface.vertex_count(),
        triangles = surface.triangle_count(),
        "Loaded GTS surface from {:?}",
        path
    );
    Ok(surface)
}

/// Parse GTS text. `path` is only used for error reporting.
pub fn parse_gts(text: &str, path: &Path) -> MeshResult<TriSurface> {
    let mut lines = Lines::new(text, path);

    let header = lines.next_record("header")?;
    if header.tokens.len() < 3 {
        return Err(header.error_at_end("header needs vertex, edge and face counts"));
    }
    let nv = header.usize_at(0)?;
    let ne = header.usize_at(1)?;
    let nf = header.usize_at(2)?;
    debug!(nv, ne, nf, "GTS header");

    let mut vertices = Vec::with_capacity(capacity_hint(nv, text));
    for _ in 0..nv {
        let record = lines.next_record("vertex")?;
        vertices.push(Point3::new(
            record.f64_at(0)?,
            record.f64_at(1)?,
            record.f64_at(2)?,
        ));
    }

    let mut edges = Vec::with_capacity(capacity_hint(ne, text));
    for _ in 0..ne {
        let record = lines.next_record("edge")?;
        let a = record.index_at(0, nv, "vertex")?;
        let b = record.index_at(1, nv, "vertex")?;
        if a == b {
            return Err(record.error_at(1, "edge joins a vertex to itself"));
        }
        edges.push([a, b]);
    }

    let mut triangles = Vec::with_capacity(capacity_hint(nf, text));
    for _ in 0..nf {
        let record = lines.next_record("face")?;
        let i1 = record.index_at(0, ne, "edge")?;
        let i2 = record.index_at(1, ne, "edge")?;
        let i3 = record.index_at(2, ne, "edge")?;
        if i2 == i1 {
            return Err(record.error_at(1, "face repeats an edge"));
        }
        if i3 == i1 || i3 == i2 {
            return Err(record.error_at(2, "face repeats an edge"));
        }
        let (e1, e2, e3) = (edges[i1 as usize], edges[i2 as usize], edges[i3 as usize]);

        let [a, b, c] = triangle_vertices(e1, e2)
            .ok_or_else(|| record.error_at(1, "first two edges share no vertex"))?;
        if !same_edge(e3, [b, c]) && !same_edge(e3, [c, a]) {
            return Err(record.error_at(2, "edges do not close a triangle"));
        }
        triangles.push([a, b, c]);
    }

    Ok(TriSurface::new(vertices, triangles))
}

/// Header counts are not trusted for pre-allocation; every record takes at
/// least two bytes of input.
fn capacity_hint(count: usize, text: &str) -> usize {
    count.min(text.len() / 2)
}

/// Vertices of the triangle spanned by two edges, ordered along the first.
fn triangle_vertices(e1: [u32; 2], e2: [u32; 2]) -> Option<[u32; 3]> {
    let [p, q] = e1;
    if e2[0] == q {
        Some([p, q, e2[1]])
    } else if e2[1] == q {
        Some([p, q, e2[0]])
    } else if e2[0] == p {
        Some([q, p, e2[1]])
    } else if e2[1] == p {
        Some([q, p, e2[0]])
    } else {
        None
    }
}

fn same_edge(e: [u32; 2], f: [u32; 2]) -> bool {
    (e[0] == f[0] && e[1] == f[1]) || (e[0] == f[1] && e[1] == f[0])
}

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    path: &'a Path,
    last_line: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str, path: &'a Path) -> Self {
        Self {
            inner: text.lines().enumerate(),
            path,
            last_line: 0,
        }
    }

    fn next_record(&mut self, what: &str) -> MeshResult<Record<'a>> {
        for (index, line) in self.inner.by_ref() {
            self.last_line = index + 1;
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Record::new(line, index + 1, self.path));
        }
        Err(MeshError::malformed_surface(
            self.path,
            self.last_line + 1,
            1,
            format!("unexpected end of file, expected {}", what),
        ))
    }
}

/// One significant line, split into tokens with their 1-based columns.
struct Record<'a> {
    tokens: Vec<(usize, &'a str)>,
    line: usize,
    width: usize,
    path: &'a Path,
}

impl<'a> Record<'a> {
    fn new(text: &'a str, line: usize, path: &'a Path) -> Self {
        let mut tokens = Vec::new();
        let mut start = None;
        for (i, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if let Some(s) = start.take() {
                    tokens.push((s + 1, &text[s..i]));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            tokens.push((s + 1, &text[s..]));
        }
        Self {
            tokens,
            line,
            width: text.len(),
            path,
        }
    }

    fn path(&self) -> PathBuf {
        self.path.to_path_buf()
    }

    fn error_at(&self, token: usize, message: impl Into<String>) -> MeshError {
        let column = self
            .tokens
            .get(token)
            .map(|(col, _)| *col)
            .unwrap_or(self.width + 1);
        MeshError::malformed_surface(self.path(), self.line, column, message)
    }

    fn error_at_end(&self, message: impl Into<String>) -> MeshError {
        MeshError::malformed_surface(self.path(), self.line, self.width + 1, message)
    }

    fn token(&self, i: usize) -> MeshResult<&'a str> {
        self.tokens
            .get(i)
            .map(|(_, t)| *t)
            .ok_or_else(|| self.error_at_end(format!("expected {} values", i + 1)))
    }

    fn usize_at(&self, i: usize) -> MeshResult<usize> {
        let token = self.token(i)?;
        token
            .parse()
            .map_err(|_| self.error_at(i, format!("invalid count '{}'", token)))
    }

    fn f64_at(&self, i: usize) -> MeshResult<f64> {
        let token = self.token(i)?;
        let value: f64 = token
            .parse()
            .map_err(|_| self.error_at(i, format!("invalid number '{}'", token)))?;
        if !value.is_finite() {
            return Err(self.error_at(i, format!("non-finite coordinate '{}'", token)));
        }
        Ok(value)
    }

    /// Parse a 1-based reference into `0..count`, returned 0-based.
    fn index_at(&self, i: usize, count: usize, kind: &str) -> MeshResult<u32> {
        let token = self.token(i)?;
        let value: usize = token
            .parse()
            .map_err(|_| self.error_at(i, format!("invalid {} index '{}'", kind, token)))?;
        if value == 0 || value > count {
            return Err(self.error_at(
                i,
                format!("{} index {} out of range 1..={}", kind, value, count),
            ));
        }
        Ok((value - 1) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
4 5 2 GtsSurface GtsFace GtsEdge GtsVertex
# corners
0 0 -10
10 0 -12
10 10 -14
0 10 -12

1 2
2 3
3 1
3 4
4 1
1 2 3
4 5 3
";

    fn parse(text: &str) -> MeshResult<TriSurface> {
        parse_gts(text, Path::new("surface.gts"))
    }

    fn expect_location(err: MeshError, line: usize, column: usize) {
        match err {
            MeshError::MalformedSurface {
                line: l, column: c, ..
            } => {
                assert_eq!((l, c), (line, column), "wrong location");
            }
            other => panic!("Expected MalformedSurface, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_square() {
        let surface = parse(SQUARE).unwrap();
        assert_eq!(surface.vertex_count(), 4);
        assert_eq!(surface.triangle_count(), 2);
        assert_eq!(surface.triangles[0], [0, 1, 2]);

        let mut second = surface.triangles[1];
        second.sort_unstable();
        assert_eq!(second, [0, 2, 3]);

        let bounds = surface.bounds().unwrap();
        assert_eq!(bounds.z_range(), (-14.0, -10.0));
    }

    #[test]
    fn test_bad_number_reports_column() {
        let text = "1 0 0\n0.0 abc 1.0\n";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("surface.gts:2:5"));
        expect_location(err, 2, 5);
    }

    #[test]
    fn test_edge_index_out_of_range() {
        let text = "2 1 0\n0 0 0\n1 0 0\n1 3\n";
        expect_location(parse(text).unwrap_err(), 4, 3);
    }

    #[test]
    fn test_open_face_is_rejected() {
        let text = "4 3 1\n0 0 0\n1 0 0\n0 1 0\n5 5 5\n1 2\n2 3\n3 4\n1 2 3\n";
        expect_location(parse(text).unwrap_err(), 9, 5);
    }

    #[test]
    fn test_truncated_file() {
        let text = "3 0 0\n0 0 0\n1 0 0\n";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("unexpected end of file"));
        expect_location(err, 4, 1);
    }

    #[test]
    fn test_short_header() {
        expect_location(parse("3 3\n").unwrap_err(), 1, 4);
    }

    #[test]
    fn test_face_with_repeated_edge() {
        let text = "3 3 1\n0 0 0\n1 0 0\n0 1 0\n1 2\n2 3\n3 1\n1 1 1\n";
        expect_location(parse(text).unwrap_err(), 8, 3);

        let text = "3 3 1\n0 0 0\n1 0 0\n0 1 0\n1 2\n2 3\n3 1\n1 2 2\n";
        expect_location(parse(text).unwrap_err(), 8, 5);
    }

    #[test]
    fn test_oversized_header_counts() {
        let err = parse("999999999999999999 0 0\n").unwrap_err();
        expect_location(err, 2, 1);
    }
}
