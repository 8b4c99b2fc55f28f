use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Tolerance (in percentage points) before a recomputed success rate is
/// reported as disagreeing with the stored one.
pub const RATE_TOLERANCE: f64 = 0.01;

const COUNT_FIELDS: [&str; 4] = [
    "success_count",
    "upload_errors",
    "validation_errors",
    "mapping_errors",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetReport {
    pub success_count: u64,
    pub upload_errors: u64,
    pub validation_errors: u64,
    pub mapping_errors: u64,
    pub success_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
}

/// Why a sheet was rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedSheet {
    pub field: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    sheets: BTreeMap<String, SheetReport>,
    malformed: BTreeMap<String, MalformedSheet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyNote {
    CountOverflow,
    TotalMismatch { total_rows: u64, counted: u64 },
    RateMismatch { success_rate: f64, recomputed: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetStatus {
    Ok,
    Malformed {
        field: Option<String>,
        reason: String,
    },
}

impl MigrationReport {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let report = Self::from_json_str(&raw)?;
        debug!(
            "loaded report {} sheets={} malformed={}",
            path.display(),
            report.sheets.len(),
            report.malformed.len()
        );
        Ok(report)
    }

    /// Decode and validate a report. Only a broken top level fails the whole
    /// report; a bad sheet is kept aside so the remaining sheets stay usable.
    pub fn from_json_str(raw: &str) -> Result<Self, ReportError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ReportError::malformed(format!("invalid JSON: {e}")))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ReportError> {
        let root = value
            .as_object()
            .ok_or_else(|| ReportError::malformed("top level is not an object"))?;
        let sheets = root
            .get("sheets")
            .ok_or_else(|| ReportError::Malformed {
                sheet: None,
                field: Some("sheets".into()),
                reason: "missing".into(),
            })?
            .as_object()
            .ok_or_else(|| ReportError::Malformed {
                sheet: None,
                field: Some("sheets".into()),
                reason: "not an object".into(),
            })?;

        let mut report = MigrationReport::default();
        for (name, entry) in sheets {
            match parse_sheet(entry) {
                Ok(sheet) => {
                    report.sheets.insert(name.clone(), sheet);
                }
                Err(bad) => {
                    warn!(
                        "sheet {name:?} is malformed: {} {}",
                        bad.field.as_deref().unwrap_or("-"),
                        bad.reason
                    );
                    report.malformed.insert(name.clone(), bad);
                }
            }
        }
        Ok(report)
    }

    pub fn select_sheet(&self, name: &str) -> Result<&SheetReport, ReportError> {
        select_sheet(self, name)
    }

    /// Every sheet key in the source document, valid or not.
    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sheets
            .keys()
            .chain(self.malformed.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn status(&self, name: &str) -> Option<SheetStatus> {
        if self.sheets.contains_key(name) {
            return Some(SheetStatus::Ok);
        }
        self.malformed.get(name).map(|m| SheetStatus::Malformed {
            field: m.field.clone(),
            reason: m.reason.clone(),
        })
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &SheetReport)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn malformed_sheets(&self) -> impl Iterator<Item = (&str, &MalformedSheet)> {
        self.malformed.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_fully_valid(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Look up one sheet by name.
pub fn select_sheet<'a>(
    report: &'a MigrationReport,
    name: &str,
) -> Result<&'a SheetReport, ReportError> {
    if let Some(sheet) = report.sheets.get(name) {
        return Ok(sheet);
    }
    match report.malformed.get(name) {
        Some(bad) => Err(ReportError::Malformed {
            sheet: Some(name.to_string()),
            field: bad.field.clone(),
            reason: bad.reason.clone(),
        }),
        None => Err(ReportError::NotFound {
            name: name.to_string(),
        }),
    }
}

impl SheetReport {
    /// Sum of the four outcome counts, `None` if it does not fit in a `u64`.
    pub fn counted_rows(&self) -> Option<u64> {
        self.success_count
            .checked_add(self.upload_errors)?
            .checked_add(self.validation_errors)?
            .checked_add(self.mapping_errors)
    }

    /// Cross-checks the producer's numbers. Nothing here alters the sheet.
    pub fn consistency(&self) -> Vec<ConsistencyNote> {
        let mut notes = Vec::new();
        let counted = self.counted_rows();

        match (counted, self.total_rows) {
            (None, _) => notes.push(ConsistencyNote::CountOverflow),
            (Some(counted), Some(total_rows)) if total_rows != counted => {
                notes.push(ConsistencyNote::TotalMismatch {
                    total_rows,
                    counted,
                });
            }
            _ => {}
        }

        let total = self.total_rows.or(counted).unwrap_or(0);
        if total > 0 {
            let recomputed = self.success_count as f64 / total as f64 * 100.0;
            if (recomputed - self.success_rate).abs() > RATE_TOLERANCE {
                notes.push(ConsistencyNote::RateMismatch {
                    success_rate: self.success_rate,
                    recomputed,
                });
            }
        }

        notes
    }
}

fn parse_sheet(entry: &Value) -> Result<SheetReport, MalformedSheet> {
    let obj = entry.as_object().ok_or_else(|| MalformedSheet {
        field: None,
        reason: "sheet is not an object".into(),
    })?;

    let mut counts = [0u64; 4];
    for (slot, field) in counts.iter_mut().zip(COUNT_FIELDS) {
        *slot = count_field(obj, field)?;
    }

    let success_rate = match obj.get("success_rate") {
        None => return Err(missing("success_rate")),
        Some(v) => v.as_f64().ok_or_else(|| MalformedSheet {
            field: Some("success_rate".into()),
            reason: format!("expected a number, found {}", kind_of(v)),
        })?,
    };

    let total_rows = match obj.get("total_rows") {
        None | Some(Value::Null) => None,
        Some(_) => Some(count_field(obj, "total_rows")?),
    };

    let [success_count, upload_errors, validation_errors, mapping_errors] = counts;
    Ok(SheetReport {
        success_count,
        upload_errors,
        validation_errors,
        mapping_errors,
        success_rate,
        total_rows,
    })
}

fn count_field(obj: &Map<String, Value>, field: &str) -> Result<u64, MalformedSheet> {
    let v = obj.get(field).ok_or_else(|| missing(field))?;
    if let Some(n) = v.as_u64() {
        return Ok(n);
    }
    // Producers sometimes write integral counts as floats (e.g. 80.0).
    if let Some(f) = v.as_f64() {
        if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
            return Ok(f as u64);
        }
        return Err(MalformedSheet {
            field: Some(field.into()),
            reason: format!("expected a non-negative integer, found {f}"),
        });
    }
    Err(MalformedSheet {
        field: Some(field.into()),
        reason: format!("expected a non-negative integer, found {}", kind_of(v)),
    })
}

fn missing(field: &str) -> MalformedSheet {
    MalformedSheet {
        field: Some(field.into()),
        reason: "missing".into(),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
