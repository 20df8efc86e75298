//! Tabular per-epoch log.
//!
//! One header row, then one row per epoch:
//!
//! ```text
//! avg_fit,avg_gene,top_fit,top_gene,elite_fit,elite_gene
//! 12.5,[0.1 -0.25 ...],40.1,[...],31.2,[...]
//! ```
//!
//! Genes are written as a bracketed, whitespace-separated list. The reader
//! also accepts quoted fields (including line breaks inside a gene), as
//! produced by other CSV writers.

use std::{
    fmt::Write as _,
    fs::{self, File},
    io::{self, BufWriter, Write},
    num::ParseFloatError,
    path::Path,
};

use flapevo_training::record::{GenerationLog, GenerationRecord};

use super::ModelFileError;

pub const HEADER: [&str; 6] = [
    "avg_fit",
    "avg_gene",
    "top_fit",
    "top_gene",
    "elite_fit",
    "elite_gene",
];

/// Appends [`GenerationRecord`]s as CSV rows.
#[derive(Debug)]
pub struct CsvGenerationLog<W> {
    writer: W,
}

impl CsvGenerationLog<BufWriter<File>> {
    /// Creates (or truncates) the log file and writes the header.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W> CsvGenerationLog<W>
where
    W: Write,
{
    /// Writes the header row to `writer`.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{}", HEADER.join(","))?;
        writer.flush()?;
        Ok(Self { writer })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> GenerationLog for CsvGenerationLog<W>
where
    W: Write,
{
    fn write_record(&mut self, record: &GenerationRecord) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{}",
            record.average_fitness,
            format_gene(&record.average_weights),
            record.best_fitness,
            format_gene(&record.best_weights),
            record.elite_fitness,
            format_gene(&record.elite_weights),
        )?;
        // rows of an interrupted run stay on disk
        self.writer.flush()
    }
}

/// Formats weights as `[w0 w1 ...]`.
///
/// Values use the shortest representation that parses back to the same `f32`.
#[must_use]
pub fn format_gene(weights: &[f32]) -> String {
    let mut s = String::from("[");
    for (i, w) in weights.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        write!(s, "{w}").expect("writing to a String cannot fail");
    }
    s.push(']');
    s
}

/// Malformed serialized weight vector.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GeneParseError {
    #[display("gene must be enclosed in brackets")]
    MissingBrackets,
    #[display("invalid weight {token:?}: {source}")]
    InvalidNumber {
        token: String,
        source: ParseFloatError,
    },
}

/// Parses a bracketed, whitespace-separated list of numbers.
///
/// Any unparseable token fails the whole gene.
pub fn parse_gene(s: &str) -> Result<Vec<f32>, GeneParseError> {
    let inner = s
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(GeneParseError::MissingBrackets)?;
    inner
        .split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|source| GeneParseError::InvalidNumber {
                    token: token.to_owned(),
                    source,
                })
        })
        .collect()
}

/// One parsed row of the log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub avg_fit: f32,
    pub avg_gene: Vec<f32>,
    pub top_fit: f32,
    pub top_gene: Vec<f32>,
    pub elite_fit: f32,
    pub elite_gene: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LogParseError {
    #[display("missing header row")]
    MissingHeader,
    #[display("unexpected header {found:?}")]
    UnexpectedHeader { found: String },
    #[display("line {line}: expected 6 columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[display("line {line}: invalid {column}: {source}")]
    Fitness {
        line: usize,
        column: &'static str,
        source: ParseFloatError,
    },
    #[display("line {line}: invalid {column}: {source}")]
    Gene {
        line: usize,
        column: &'static str,
        source: GeneParseError,
    },
    #[display("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
}

/// Reads and parses a log file.
///
/// A missing file is reported as [`ModelFileError::NotFound`].
pub fn read_generation_log(path: &Path) -> Result<Vec<LogRow>, ModelFileError> {
    let text = fs::read_to_string(path).map_err(|e| ModelFileError::io(path, e))?;
    parse_log(&text).map_err(|source| ModelFileError::log(path, source))
}

/// Parses log text, header included.
pub fn parse_log(text: &str) -> Result<Vec<LogRow>, LogParseError> {
    let mut records = split_records(text)?.into_iter();
    let (_, header) = records.next().ok_or(LogParseError::MissingHeader)?;
    if header.iter().map(|s| s.trim()).ne(HEADER) {
        return Err(LogParseError::UnexpectedHeader {
            found: header.join(","),
        });
    }
    records
        .map(|(line, fields)| parse_row(line, &fields))
        .collect()
}

fn parse_row(line: usize, fields: &[String]) -> Result<LogRow, LogParseError> {
    let [avg_fit, avg_gene, top_fit, top_gene, elite_fit, elite_gene] = fields else {
        return Err(LogParseError::ColumnCount {
            line,
            found: fields.len(),
        });
    };
    let fitness = |column: &'static str, s: &str| {
        s.trim()
            .parse::<f32>()
            .map_err(|source| LogParseError::Fitness {
                line,
                column,
                source,
            })
    };
    let gene = |column: &'static str, s: &str| {
        parse_gene(s).map_err(|source| LogParseError::Gene {
            line,
            column,
            source,
        })
    };
    Ok(LogRow {
        avg_fit: fitness("avg_fit", avg_fit)?,
        avg_gene: gene("avg_gene", avg_gene)?,
        top_fit: fitness("top_fit", top_fit)?,
        top_gene: gene("top_gene", top_gene)?,
        elite_fit: fitness("elite_fit", elite_fit)?,
        elite_gene: gene("elite_gene", elite_gene)?,
    })
}

/// Splits CSV text into records of fields, each tagged with the 1-based line
/// it starts on. Blank lines are skipped.
fn split_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, LogParseError> {
    let mut records = vec![];
    let mut fields = vec![];
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                if !(fields.len() == 1 && fields[0].trim().is_empty()) {
                    records.push((start_line, std::mem::take(&mut fields)));
                }
                fields.clear();
                line += 1;
                start_line = line;
            }
            '\r' if !in_quotes => {}
            '\n' => {
                line += 1;
                field.push(c);
            }
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err(LogParseError::UnterminatedQuote { line: start_line });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((start_line, fields));
    }
    Ok(records)
}

/// The row with the highest `top_fit`; the earliest one on ties.
#[must_use]
pub fn best_row(rows: &[LogRow]) -> Option<&LogRow> {
    let mut best: Option<&LogRow> = None;
    for row in rows {
        if best.is_none_or(|b| row.top_fit > b.top_fit) {
            best = Some(row);
        }
    }
    best
}
