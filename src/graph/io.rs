//! The only part of the crate touching the file system.
//!
//! Graphs are stored as a vertex count followed by one line per matrix row:
//!
//! ```text
//! 3
//! 0 1 0
//! 1 0 1
//! 0 1 0
//! ```

use std::{
    fmt::Write as _,
    fs,
    io::{self, Read, Write},
    path::Path,
};

use ndarray::Array2;
use tracing::{debug, info};

use super::{Graph, MAX_WEIGHT};
use crate::error::{Error, Result};

impl Graph {
    /// Read a graph from `path`, see [Graph::load_from_str].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut graph = Self::empty();
        graph.load_from_file(path)?;
        Ok(graph)
    }

    /// Replace this graph with the one stored at `path`.
    ///
    /// On any failure the graph is left empty.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Loading graph from {}", path.display());
        match fs::read_to_string(path) {
            Ok(text) => self.load_from_str(&text),
            Err(err) => {
                self.reset();
                Err(err.into())
            }
        }
    }

    /// Replace this graph with the one read from `reader`.
    ///
    /// On any failure the graph is left empty.
    pub fn load_from_reader<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut text = String::new();
        if let Err(err) = reader.read_to_string(&mut text) {
            self.reset();
            return Err(err.into());
        }
        self.load_from_str(&text)
    }

    /// Replace this graph with the one described by `text`.
    ///
    /// On any failure the graph is left empty.
    pub fn load_from_str(&mut self, text: &str) -> Result<()> {
        match parse_matrix(text) {
            Ok(matrix) => {
                debug!("Loaded graph with {} vertices", matrix.nrows());
                self.matrix = matrix;
                Ok(())
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    /// Serialize in the same format [Graph::load_from_str] reads.
    pub fn to_text(&self) -> String {
        let mut text = format!("{}\n", self.vertex_count());
        for row in self.matrix.outer_iter() {
            let row = row
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(text, "{}", row);
        }
        text
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    /// Render as a [DOT](https://graphviz.org/doc/info/lang.html) graph.
    ///
    /// Undirected graphs list each edge once.
    pub fn write_dot<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "graph G {{")?;
        let n = self.vertex_count();
        for i in 1..=n {
            writeln!(writer, "  {};", i)?;
        }

        let is_undirected = self.is_undirected();
        let separator = if is_undirected { " -- " } else { " --> " };
        for i in 0..n {
            let first = if is_undirected { i } else { 0 };
            for j in first..n {
                if self.matrix[[i, j]] > 0 {
                    writeln!(writer, "  {}{}{};", i + 1, separator, j + 1)?;
                }
            }
        }
        writeln!(writer, "}}")
    }

    pub fn to_dot(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_dot(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn export_to_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Exporting graph to {}", path.display());
        let mut file = io::BufWriter::new(fs::File::create(path)?);
        self.write_dot(&mut file)?;
        file.flush()?;
        Ok(())
    }
}

fn format_error(line: usize, reason: impl Into<String>) -> Error {
    Error::Format {
        line,
        reason: reason.into(),
    }
}

fn parse_matrix(text: &str) -> Result<Array2<i32>> {
    let lines = text.lines().collect::<Vec<_>>();
    let header = lines
        .first()
        .ok_or_else(|| format_error(1, "missing vertex count"))?;

    let mut header_tokens = header.split_whitespace();
    let vertex_count = match (header_tokens.next(), header_tokens.next()) {
        (Some(token), None) => token
            .parse::<usize>()
            .map_err(|_| format_error(1, format!("`{}` is not a vertex count", token)))?,
        _ => return Err(format_error(1, "expected a single vertex count")),
    };
    if vertex_count <= 1 {
        return Err(format_error(
            1,
            format!("vertex count must be greater than 1, got {}", vertex_count),
        ));
    }
    if lines.len() != vertex_count + 1 {
        return Err(format_error(
            lines.len(),
            format!(
                "expected {} matrix rows, found {}",
                vertex_count,
                lines.len() - 1
            ),
        ));
    }

    let mut matrix = Array2::zeros((vertex_count, vertex_count));
    for (i, line) in lines.iter().skip(1).enumerate() {
        let line_number = i + 2;
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        if tokens.len() != vertex_count {
            return Err(format_error(
                line_number,
                format!("expected {} values, found {}", vertex_count, tokens.len()),
            ));
        }
        for (j, token) in tokens.into_iter().enumerate() {
            let value = token
                .parse::<i64>()
                .map_err(|_| format_error(line_number, format!("`{}` is not a weight", token)))?;
            if value < 0 || value > MAX_WEIGHT as i64 {
                return Err(format_error(
                    line_number,
                    format!("weight {} is out of range", value),
                ));
            }
            matrix[[i, j]] = value as i32;
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_valid_text() {
        let mut graph = Graph::empty();
        graph.load_from_str("3\n0 1 0\n1 0 1\n0 1 0\n").unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.get(1, 2).unwrap(), 1);
        assert_eq!(graph.get(1, 3).unwrap(), 0);
    }

    #[test]
    fn tolerates_repeated_spaces() {
        let mut graph = Graph::empty();
        graph.load_from_str("2\n0   5\n 7 0").unwrap();
        assert_eq!(graph.get(1, 2).unwrap(), 5);
        assert_eq!(graph.get(2, 1).unwrap(), 7);
    }

    #[test]
    fn malformed_text_resets_graph() {
        let cases = [
            "",
            "1\n0\n",
            "x\n0 1\n1 0\n",
            "2 2\n0 1\n1 0\n",
            "3\n0 1 0\n1 0 1\n",
            "2\n0 1\n1 0\n0 0\n",
            "2\n0 1 1\n1 0\n",
            "2\n0 -1\n1 0\n",
            "2\n0 a\n1 0\n",
            "2\n0 2147483647\n1 0\n",
        ];
        for text in cases {
            let mut graph = Graph::from_rows(&[vec![0, 1], vec![1, 0]]).unwrap();
            let err = graph.load_from_str(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{:?}", text);
            assert!(graph.is_empty(), "{:?}", text);
        }
    }

    #[test]
    fn missing_file_resets_graph() {
        let mut graph = Graph::from_rows(&[vec![0, 1], vec![1, 0]]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = graph
            .load_from_file(dir.path().join("does-not-exist.txt"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(graph.is_empty());
    }

    #[test]
    fn file_round_trip() {
        let graph = Graph::from_rows(&[vec![0, 4, 0], vec![2, 0, 9], vec![0, 1, 3]]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.txt");
        graph.save_to_file(&path).unwrap();
        assert_eq!(Graph::from_file(&path).unwrap(), graph);
    }

    #[test]
    fn dot_for_undirected_graph() {
        let graph = Graph::from_rows(&[vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]]).unwrap();
        assert_eq!(
            graph.to_dot(),
            "graph G {\n  1;\n  2;\n  3;\n  1 -- 2;\n  2 -- 3;\n}\n"
        );
    }

    #[test]
    fn dot_for_directed_graph() {
        let graph = Graph::from_rows(&[vec![0, 1], vec![0, 1]]).unwrap();
        assert_eq!(graph.to_dot(), "graph G {\n  1;\n  2;\n  1 --> 2;\n  2 --> 2;\n}\n");
    }

    #[test]
    fn dot_export_writes_file() {
        let graph = Graph::from_rows(&[vec![0, 1], vec![1, 0]]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        graph.export_to_dot(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), graph.to_dot());
    }
}
