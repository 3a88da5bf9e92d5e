//! Per-sensor day-by-day status matrix.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::{HistoryRecord, MaintenanceFlag};
use crate::models::DeviceStatus;

/// Sentinel for "no data recorded for this date". Absence of data is not
/// evidence of an offline state.
pub const GAP_MARKER: &str = "—";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StatusCell {
    On,
    Off,
    Gap,
}

impl StatusCell {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCell::On => "ON",
            StatusCell::Off => "OFF",
            StatusCell::Gap => GAP_MARKER,
        }
    }
}

impl From<DeviceStatus> for StatusCell {
    fn from(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::On => StatusCell::On,
            DeviceStatus::Off => StatusCell::Off,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub tag: String,
    pub nome: String,
    pub plataforma: String,
    pub tipo_medidor: String,
    pub manutencao: MaintenanceFlag,
    /// One cell per date in the matrix's (pruned) date set, same order.
    pub cells: Vec<StatusCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMatrix {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<MatrixRow>,
}

/// Identity filters over the built matrix. Empty lists mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct MatrixFilters {
    pub tags: Vec<String>,
    pub nomes: Vec<String>,
    pub plataformas: Vec<String>,
    pub tipos: Vec<String>,
}

/// Post-hoc status filters across the visible date columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    AllVariations,
    AllOn,
    AllOff,
    AllGap,
}

/// Build the device × date status table for `[start, end]` inclusive.
///
/// Each distinct device identity in range gets one row; a date with no
/// history entry for that device yields the gap marker. Dates where every
/// device is a gap are dropped from the output entirely.
pub fn build_status_matrix(
    records: &[HistoryRecord],
    start: NaiveDate,
    end: NaiveDate,
    filters: &MatrixFilters,
) -> StatusMatrix {
    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        dates.push(cursor);
        match cursor.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    // Distinct device identities, first-seen order.
    let mut rows: Vec<MatrixRow> = Vec::new();
    for record in records {
        let entry = &record.entry;
        let exists = rows.iter().any(|row| {
            row.tag == entry.descricao_sensor
                && row.nome == entry.nome
                && row.plataforma == entry.plataforma
                && row.tipo_medidor == entry.tipo_medidor.clone().unwrap_or_default()
                && row.manutencao == entry.manutencao
        });
        if !exists {
            rows.push(MatrixRow {
                tag: entry.descricao_sensor.clone(),
                nome: entry.nome.clone(),
                plataforma: entry.plataforma.clone(),
                tipo_medidor: entry.tipo_medidor.clone().unwrap_or_default(),
                manutencao: entry.manutencao,
                cells: Vec::new(),
            });
        }
    }

    for row in &mut rows {
        row.cells = dates
            .iter()
            .map(|date| {
                records
                    .iter()
                    .find(|r| {
                        r.entry.descricao_sensor == row.tag
                            && r.entry.nome == row.nome
                            && r.entry.data_registro == *date
                    })
                    .map(|r| StatusCell::from(r.entry.status))
                    .unwrap_or(StatusCell::Gap)
            })
            .collect();
    }

    let matrix = prune_all_gap_dates(StatusMatrix { dates, rows });
    apply_filters(matrix, filters)
}

fn prune_all_gap_dates(matrix: StatusMatrix) -> StatusMatrix {
    let keep: Vec<bool> = (0..matrix.dates.len())
        .map(|i| matrix.rows.iter().any(|row| row.cells[i] != StatusCell::Gap))
        .collect();

    let dates = matrix
        .dates
        .into_iter()
        .zip(&keep)
        .filter_map(|(date, keep)| keep.then_some(date))
        .collect();

    let rows = matrix
        .rows
        .into_iter()
        .map(|mut row| {
            row.cells = row
                .cells
                .into_iter()
                .zip(&keep)
                .filter_map(|(cell, keep)| keep.then_some(cell))
                .collect();
            row
        })
        .collect();

    StatusMatrix { dates, rows }
}

/// Restrict rows by identity columns. Pure; does not touch the date set.
pub fn apply_filters(matrix: StatusMatrix, filters: &MatrixFilters) -> StatusMatrix {
    let matches = |allowed: &[String], value: &str| {
        allowed.is_empty() || allowed.iter().any(|a| a == value)
    };

    let rows = matrix
        .rows
        .into_iter()
        .filter(|row| {
            matches(&filters.tags, &row.tag)
                && matches(&filters.nomes, &row.nome)
                && matches(&filters.plataformas, &row.plataforma)
                && matches(&filters.tipos, &row.tipo_medidor)
        })
        .collect();

    StatusMatrix {
        dates: matrix.dates,
        rows,
    }
}

/// Keep only rows matching the requested status shape across all visible
/// columns. Computed over the already-built matrix, never re-queried.
pub fn filter_by_status(matrix: StatusMatrix, filter: StatusFilter) -> StatusMatrix {
    let rows = matrix
        .rows
        .into_iter()
        .filter(|row| match filter {
            StatusFilter::AllVariations => {
                row.cells.windows(2).any(|pair| pair[0] != pair[1])
            }
            StatusFilter::AllOn => row.cells.iter().all(|c| *c == StatusCell::On),
            StatusFilter::AllOff => row.cells.iter().all(|c| *c == StatusCell::Off),
            StatusFilter::AllGap => row.cells.iter().all(|c| *c == StatusCell::Gap),
        })
        .collect();

    StatusMatrix {
        dates: matrix.dates,
        rows,
    }
}
