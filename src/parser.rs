use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};

use std::{fs::File, io::Read, path::Path};

/// One data line of the input, split into trimmed fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// 1-based line number in the input, for diagnostics.
    pub line: u64,
    pub fields: Vec<String>,
}

/// Reads delimited rows from `input`, discarding the first (header) line.
///
/// Fields are split strictly on `delimiter` and trimmed of surrounding
/// whitespace. Quote characters have no special meaning: a quoted value
/// containing the delimiter is split like any other text. A trailing
/// delimiter yields a trailing empty field, and a line without any delimiter
/// yields a single field. Rows may have any number of fields; checking the
/// field count is left to the caller. Blank lines are skipped.
///
/// # Errors
///
/// Returns any error from reading `input`, including text that is not valid
/// UTF-8.
pub fn read_rows(input: impl Read, delimiter: u8) -> Result<Vec<Row>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(input);
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);
        rows.push(Row {
            line,
            fields: record.iter().map(String::from).collect(),
        });
    }
    Ok(rows)
}

/// Reads delimited rows from the file at `path`. See [`read_rows`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn read_rows_from_path(path: impl AsRef<Path>, delimiter: u8) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_rows(file, delimiter).with_context(|| format!("reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(input: &str) -> Vec<Vec<String>> {
        read_rows(input.as_bytes(), b',')
            .unwrap()
            .into_iter()
            .map(|r| r.fields)
            .collect()
    }

    #[test]
    fn read_rows_fn_skips_header_and_trims_fields() {
        let rows = fields("Date,Product\n 2024-01-05 ,  Widget  \n");
        assert_eq!(rows, vec![vec!["2024-01-05", "Widget"]]);
    }

    #[test]
    fn read_rows_fn_keeps_empty_trailing_field() {
        let rows = fields("h\na,b,\n");
        assert_eq!(rows, vec![vec!["a", "b", ""]]);
    }

    #[test]
    fn read_rows_fn_returns_single_field_for_line_without_delimiter() {
        let rows = fields("h\njust one field\n");
        assert_eq!(rows, vec![vec!["just one field"]]);
    }

    #[test]
    fn read_rows_fn_does_not_treat_quotes_specially() {
        let rows = fields("h\n\"Widget, large\",3\n");
        assert_eq!(rows, vec![vec!["\"Widget", "large\"", "3"]]);
    }

    #[test]
    fn read_rows_fn_allows_rows_of_different_lengths() {
        let rows = fields("a,b,c,d,e\n1,2,3\n1,2,3,4,5,6\n");
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 6);
    }

    #[test]
    fn read_rows_fn_reads_final_line_without_newline_and_crlf() {
        let rows = fields("h\r\na,b\r\nc,d");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn read_rows_fn_honours_custom_delimiter() {
        let rows = read_rows("h\n2024-01-05;Widget;Tools\n".as_bytes(), b';').unwrap();
        assert_eq!(rows[0].fields, vec!["2024-01-05", "Widget", "Tools"]);
        assert_eq!(rows[0].line, 2);
    }

    #[test]
    fn read_rows_from_path_fn_returns_error_for_missing_file() {
        assert!(read_rows_from_path("testdata/does-not-exist.csv", b',').is_err());
    }
}
