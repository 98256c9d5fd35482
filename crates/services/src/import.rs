//! Bulk question import from a spreadsheet.
//!
//! CSV files and Excel/OpenDocument workbooks share one layout; only the first
//! worksheet of a workbook is read. Expected header:
//! `statement,time,explanation,option_1,option_2,option_3,option_4,answer`.
//! `time` and `explanation` may be blank or missing; `option_3`/`option_4` may
//! be blank; `answer` is the 1-based number of the correct option column.

use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use quiz_core::model::{
    DEFAULT_TIME_LIMIT_MS, OptionDraft, QuestionDraft, QuestionId, TopicId, ValidatedQuestion,
};

use crate::error::ImportError;

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub topic_id: TopicId,
    pub question_ids: Vec<QuestionId>,
}

impl ImportReport {
    #[must_use]
    pub fn imported(&self) -> usize {
        self.question_ids.len()
    }
}

#[derive(Debug, Deserialize)]
struct ImportRow {
    statement: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    option_1: String,
    option_2: String,
    #[serde(default)]
    option_3: Option<String>,
    #[serde(default)]
    option_4: Option<String>,
    answer: String,
}

impl ImportRow {
    fn into_draft(self, topic: TopicId, row: usize) -> Result<QuestionDraft, ImportError> {
        let answer = self
            .answer
            .parse::<usize>()
            .map_err(|_| ImportError::InvalidAnswer {
                row,
                raw: self.answer.clone(),
            })?;

        let time_limit_ms = match self.time.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TIME_LIMIT_MS,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ImportError::InvalidTime {
                    row,
                    raw: raw.to_owned(),
                })?,
        };

        // Columns 1 and 2 are always kept so blanks surface as validation errors.
        let columns = [
            Some(self.option_1),
            Some(self.option_2),
            self.option_3.filter(|t| !t.trim().is_empty()),
            self.option_4.filter(|t| !t.trim().is_empty()),
        ];
        if answer == 0 || columns.get(answer - 1).is_none_or(Option::is_none) {
            return Err(ImportError::InvalidAnswer {
                row,
                raw: self.answer,
            });
        }

        let mut draft = QuestionDraft::new(topic, self.statement).with_time_limit_ms(time_limit_ms);
        draft.explanation = self.explanation;
        draft.options = columns
            .into_iter()
            .enumerate()
            .filter_map(|(index, text)| text.map(|t| OptionDraft::new(t, index + 1 == answer)))
            .collect();
        Ok(draft)
    }
}

/// How a file on disk is read, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

impl SheetFormat {
    /// # Errors
    ///
    /// Returns `ImportError::UnsupportedFormat` for anything but CSV or a
    /// spreadsheet workbook.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(ImportError::UnsupportedFormat(extension)),
        }
    }
}

/// Parse and validate every row of a CSV sheet.
///
/// # Errors
///
/// Returns the first `ImportError` found, or `ImportError::Empty` when the
/// sheet has no data rows.
pub fn parse_questions<R: Read>(
    topic: TopicId,
    reader: R,
) -> Result<Vec<ValidatedQuestion>, ImportError> {
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|source| ImportError::Csv { row: 0, source })?
        .clone();

    let records = csv.records().enumerate().map(|(index, record)| {
        let row = index + 1;
        record
            .map(|record| (row, record))
            .map_err(|source| ImportError::Csv { row, source })
    });
    parse_records(topic, &headers, records)
}

/// Parse and validate the first worksheet of a workbook file.
///
/// # Errors
///
/// Returns `ImportError::Workbook` if the file is not a readable workbook,
/// otherwise as `parse_questions`.
pub fn parse_workbook(topic: TopicId, path: &Path) -> Result<Vec<ValidatedQuestion>, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(ImportError::Empty)??;

    let mut rows = range.rows();
    let headers = rows.next().map(cells_to_record).ok_or(ImportError::Empty)?;
    let records = rows
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|(index, cells)| Ok((index + 1, cells_to_record(cells))));
    parse_records(topic, &headers, records)
}

fn cells_to_record(cells: &[Data]) -> StringRecord {
    cells
        .iter()
        .map(|cell| cell.to_string().trim().to_owned())
        .collect()
}

fn parse_records<I>(
    topic: TopicId,
    headers: &StringRecord,
    records: I,
) -> Result<Vec<ValidatedQuestion>, ImportError>
where
    I: Iterator<Item = Result<(usize, StringRecord), ImportError>>,
{
    let mut questions = Vec::new();
    for item in records {
        let (row, record) = item?;
        let parsed: ImportRow = record
            .deserialize(Some(headers))
            .map_err(|source| ImportError::Csv { row, source })?;
        let question = parsed
            .into_draft(topic, row)?
            .validate()
            .map_err(|source| ImportError::Row { row, source })?;
        questions.push(question);
    }

    if questions.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionError;

    const HEADER: &str = "statement,time,explanation,option_1,option_2,option_3,option_4,answer\n";

    fn parse(body: &str) -> Result<Vec<ValidatedQuestion>, ImportError> {
        parse_questions(TopicId::new(1), format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn parses_rows_with_defaults() {
        let questions = parse(
            "Capital of France?,,,Paris,Lyon,Nice,,1\n\
             Capital of Spain?,30000,Since 1561,Seville,Madrid,,,2\n",
        )
        .unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].time_limit_ms, DEFAULT_TIME_LIMIT_MS);
        assert_eq!(questions[0].explanation, None);
        assert_eq!(questions[0].options.len(), 3);
        assert!(questions[0].options[0].is_correct);

        assert_eq!(questions[1].time_limit_ms, 30_000);
        assert_eq!(questions[1].explanation.as_deref(), Some("Since 1561"));
        assert_eq!(questions[1].options.len(), 2);
        assert!(questions[1].options[1].is_correct);
    }

    #[test]
    fn answer_must_point_at_a_filled_option() {
        let err = parse("Capital of Italy?,,,Rome,Milan,,,3\n").unwrap_err();
        assert!(matches!(err, ImportError::InvalidAnswer { row: 1, .. }));

        let err = parse("Capital of Italy?,,,Rome,Milan,,,first\n").unwrap_err();
        assert!(matches!(err, ImportError::InvalidAnswer { row: 1, .. }));
    }

    #[test]
    fn errors_name_the_data_row() {
        let err = parse(
            "Capital of Italy?,,,Rome,Milan,,,1\n\
             ,,,Rome,Milan,,,1\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Row {
                row: 2,
                source: QuestionError::EmptyStatement
            }
        ));
        assert!(err.to_string().starts_with("row 2:"));
    }

    #[test]
    fn rejects_bad_time() {
        let err = parse("Capital of Italy?,0,,Rome,Milan,,,1\n").unwrap_err();
        assert!(matches!(err, ImportError::InvalidTime { row: 1, .. }));
    }

    #[test]
    fn header_only_sheet_is_empty() {
        assert!(matches!(parse("").unwrap_err(), ImportError::Empty));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            SheetFormat::from_path(Path::new("capitals.CSV")).unwrap(),
            SheetFormat::Csv
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("capitals.xlsx")).unwrap(),
            SheetFormat::Workbook
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("capitals.xls")).unwrap(),
            SheetFormat::Workbook
        );
        assert!(matches!(
            SheetFormat::from_path(Path::new("capitals.txt")),
            Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"
        ));
        assert!(matches!(
            SheetFormat::from_path(Path::new("capitals")),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_optional_columns_are_allowed() {
        let sheet = "statement,option_1,option_2,answer\nCapital of Peru?,Lima,Cusco,1\n";
        let questions = parse_questions(TopicId::new(1), sheet.as_bytes()).unwrap();
        assert_eq!(questions[0].options.len(), 2);
    }
}
