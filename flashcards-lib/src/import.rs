//! Translation of uploaded CSV files and JSON import requests into cards.

use crate::document::LenientInt;
use crate::error::FieldErrors;
use flashcards_repo::card_repo::NewCard;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HeaderMode {
    Present,
    Absent,
    /// Treat the first row as a header if its first two cells name the card sides.
    Detect,
}

impl HeaderMode {
    pub fn from_flag(flag: &str) -> Option<HeaderMode> {
        match flag.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(HeaderMode::Present),
            "false" | "0" => Some(HeaderMode::Absent),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("is larger than {} bytes", MAX_UPLOAD_BYTES)]
    TooLarge,
    #[error("is not a valid CSV file: {0}")]
    Csv(#[from] csv::Error),
    #[error("contains invalid rows")]
    InvalidRows(FieldErrors),
}

/// The card shape shared by the preview response and the import request.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCard {
    pub side_a: String,
    pub side_b: String,
    pub proficiency_level: i32,
}

#[derive(Serialize, Debug)]
pub struct PreviewList {
    pub cards: Vec<PreviewCard>,
}

#[derive(Deserialize, Debug)]
pub struct ImportPayload {
    pub cards: Option<Vec<ImportedCard>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImportedCard {
    pub side_a: Option<String>,
    pub side_b: Option<String>,
    pub proficiency_level: Option<LenientInt>,
}

/// Parses `content` into cards. Columns are positional: side a, side b and an optional
/// proficiency level defaulting to 0. Nothing is persisted.
pub fn parse_csv(content: &[u8], header: HeaderMode) -> Result<Vec<PreviewCard>, ImportError> {
    if content.len() > MAX_UPLOAD_BYTES {
        return Err(ImportError::TooLarge);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);

    let mut cards = Vec::new();
    let mut errors = FieldErrors::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 && is_header(&record, header) {
            continue;
        }
        let line = record
            .position()
            .map_or(index as u64 + 1, |position| position.line());
        match card_from_record(&record) {
            Ok(card) => cards.push(card),
            Err(message) => errors.add(format!("line {}", line), message),
        }
    }
    errors.into_result().map_err(ImportError::InvalidRows)?;

    Ok(cards)
}

fn is_header(record: &csv::StringRecord, header: HeaderMode) -> bool {
    match header {
        HeaderMode::Present => true,
        HeaderMode::Absent => false,
        HeaderMode::Detect => {
            let side = |i: usize| record.get(i).map(normalize_header_cell);
            side(0).as_deref() == Some("sidea") && side(1).as_deref() == Some("sideb")
        }
    }
}

fn normalize_header_cell(cell: &str) -> String {
    cell.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn card_from_record(record: &csv::StringRecord) -> Result<PreviewCard, String> {
    if !(2..=3).contains(&record.len()) {
        return Err(format!("expected 2 or 3 columns, found {}", record.len()));
    }
    let side_a = &record[0];
    let side_b = &record[1];
    if side_a.trim().is_empty() {
        return Err("side a can't be blank".to_owned());
    }
    if side_b.trim().is_empty() {
        return Err("side b can't be blank".to_owned());
    }
    let proficiency_level = match record.get(2).map(str::trim) {
        None | Some("") => 0,
        Some(level) => parse_proficiency(level)
            .ok_or_else(|| "proficiency level must be a non-negative integer".to_owned())?,
    };

    Ok(PreviewCard {
        side_a: side_a.to_owned(),
        side_b: side_b.to_owned(),
        proficiency_level,
    })
}

fn parse_proficiency(level: &str) -> Option<i32> {
    level.parse().ok().filter(|level| *level >= 0)
}

/// Validates an import request. All cards must be valid for any of them to be created.
pub fn cards_from_import(payload: ImportPayload) -> Result<Vec<NewCard>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let Some(imported) = payload.cards else {
        errors.add("cards", "can't be blank");
        return Err(errors);
    };

    let mut cards = Vec::with_capacity(imported.len());
    for (index, card) in imported.into_iter().enumerate() {
        let field = |name: &str| format!("cards[{}].{}", index, name);

        let side_a = card.side_a.unwrap_or_default();
        if side_a.trim().is_empty() {
            errors.add(field("sideA"), "can't be blank");
        }
        let side_b = card.side_b.unwrap_or_default();
        if side_b.trim().is_empty() {
            errors.add(field("sideB"), "can't be blank");
        }
        let proficiency_level = match card.proficiency_level {
            None => 0,
            Some(level) => match level.to_i32().filter(|level| *level >= 0) {
                Some(level) => level,
                None => {
                    errors.add(field("proficiencyLevel"), "must be a non-negative integer");
                    0
                }
            },
        };
        cards.push(NewCard::new(side_a, side_b, proficiency_level, Vec::new()));
    }
    errors.into_result()?;

    Ok(cards)
}
