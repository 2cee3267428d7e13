//! Delimited text: quote-aware record splitting and field quoting
//!
//! Fields containing the delimiter, a quote or a line break are wrapped in
//! double quotes with inner quotes doubled. A field is read as quoted only
//! when it starts with a quote.

use std::path::{Path, PathBuf};

use crate::error::{ArrError, ArrResult};

pub const TAB: char = '\t';
pub const COMMA: char = ',';

/// Split `content` into records. A line break ends a record only outside
/// quotes, so quoted fields may span lines. Blank lines are skipped. Each
/// record comes with the 1-based line it starts on.
pub fn split_records(content: &str, delimiter: char) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut record_line = 1;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut blank = true;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
                blank = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                if blank {
                    fields.clear();
                } else {
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                line += 1;
                record_line = line;
                field_start = true;
                blank = true;
            }
            c if c == delimiter => {
                fields.push(std::mem::take(&mut field));
                field_start = true;
                blank = false;
            }
            // Anything after a closing quote is kept as part of the field
            c => {
                field.push(c);
                field_start = false;
                blank = false;
            }
        }
    }

    if !blank {
        fields.push(field);
        records.push((record_line, fields));
    }
    records
}

/// Split one record into fields.
pub fn split_record(line: &str, delimiter: char) -> Vec<String> {
    split_records(line, delimiter)
        .into_iter()
        .next()
        .map(|(_, fields)| fields)
        .unwrap_or_else(|| vec![String::new()])
}

/// Quote a field if it needs it.
pub fn quote_field(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Join fields into one record, without line terminator.
pub fn join_record<S: AsRef<str>>(fields: &[S], delimiter: char) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref(), delimiter))
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

/// A delimited table with a header row.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    /// Parse `content`. `path` is only used in error messages.
    /// Blank lines are skipped.
    pub fn parse(path: &Path, content: &str, delimiter: char) -> ArrResult<Self> {
        let mut records = split_records(content, delimiter).into_iter();
        let header = records
            .next()
            .map(|(_, fields)| fields.into_iter().map(|h| h.trim().to_string()).collect())
            .ok_or_else(|| {
                ArrError::InvalidInput(format!("{} has no header row", path.display()))
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
            rows: records.collect(),
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column.
    pub fn column(&self, name: &str) -> ArrResult<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ArrError::MissingColumn {
                column: name.to_string(),
                path: self.path.clone(),
            })
    }

    /// (1-based line number, fields) for every data row.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows.iter().map(|(line, fields)| (*line, fields.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(split_record("a\tb\t\tc", TAB), vec!["a", "b", "", "c"]);
        assert_eq!(split_record("", TAB), vec![""]);
        assert_eq!(split_record("a\t", TAB), vec!["a", ""]);
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_record("\"he said \"\"hi\"\"\"\t2", TAB),
            vec!["he said \"hi\"", "2"]
        );
        assert_eq!(split_record("\"a,b\",c", COMMA), vec!["a,b", "c"]);
    }

    #[test]
    fn test_quote_roundtrip_special_fields() {
        let fields = ["plain", "with\ttab", "with \"quote\"", ""];
        let line = join_record(&fields, TAB);
        assert_eq!(split_record(&line, TAB), fields);
    }

    #[test]
    fn test_table_columns() {
        let table = Table::parse(Path::new("t.tsv"), "id\ttext\tscore\n1\thello\t2\n\n2\t\t0\n", TAB).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("score").unwrap(), 2);
        assert!(matches!(
            table.column("EssayText"),
            Err(ArrError::MissingColumn { .. })
        ));
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[1].1[1], "");
    }

    #[test]
    fn test_quoted_line_break_stays_in_field() {
        let content = "text\tscore\r\n\"first line\nsecond line\"\t2\r\nnext\t1\r\n";
        let records = split_records(content, TAB);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], (2, vec!["first line\nsecond line".to_string(), "2".to_string()]));
        assert_eq!(records[2].0, 4);

        let fields = ["line one\r\nline two", "3"];
        assert_eq!(split_record(&join_record(&fields, TAB), TAB), fields);
    }

    #[test]
    fn test_table_without_header() {
        assert!(Table::parse(Path::new("t.tsv"), "\n\n", TAB).is_err());
    }
}
