//! Pipeline coordinator: composes the fit engine, charts and table storage

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::PipelineError;
use crate::acquisition::read_table_file;
use crate::charts::{build_charts, ChartSink};
use crate::config::defaults::{RESULT_DEVIATION_COLUMN, RESULT_LABEL_COLUMN, RESULT_TABLE};
use crate::config::{InputConfig, TableNames};
use crate::fit_engine::{classify, normalize, select_best_fit};
use crate::storage::TableRepository;
use crate::types::{
    BestFit, Classification, ClassifiedRow, ColumnValues, NormalizedTable, RecordTable, Table,
};

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub train_rows: usize,
    pub ideal_rows: usize,
    pub test_rows: usize,
    /// Test rows dropped for missing values (labelled Unassigned, no deviation)
    pub dropped_test_rows: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub charts_emitted: usize,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// One entry per training Y column, in column order
    pub best_fit: Vec<BestFit>,
    /// One entry per raw test row, in row order
    pub classification: Classification,
    /// Raw test columns plus the label and deviation columns
    pub result: RecordTable,
    pub stats: PipelineStats,
}

/// Run the full pipeline on in-memory tables
///
/// The returned result table is named `result`; [`run_with_store`] renames it
/// to the configured table before saving.
pub fn run(
    train: &Table,
    ideal: &Table,
    test: &Table,
    sink: &mut dyn ChartSink,
) -> Result<PipelineOutput, PipelineError> {
    let start = Instant::now();

    let norm_train = normalize(train);
    let norm_ideal = normalize(ideal);
    let norm_test = normalize(test);

    let best_fit = select_best_fit(&norm_train, &norm_ideal)?;
    info!(
        pairs = best_fit.len(),
        mapping = %best_fit
            .iter()
            .map(|f| format!("{}->Y{}", f.train_column, f.ideal_index))
            .collect::<Vec<_>>()
            .join(", "),
        "Best fit selected"
    );

    let charts = build_charts(&norm_train, &norm_ideal, &best_fit)?;
    let charts_emitted = charts.len();
    for chart in charts {
        sink.emit(chart)?;
    }

    let normalized_rows = classify(&norm_test, &norm_train, &norm_ideal, &best_fit)?;
    let classification = align_to_source(&norm_test, normalized_rows, test.len());

    let mut result = RecordTable::from(test).renamed(RESULT_TABLE);
    result.push_column(
        RESULT_LABEL_COLUMN,
        ColumnValues::Text(classification.labels().into_iter().map(Some).collect()),
    )?;
    result.push_column(
        RESULT_DEVIATION_COLUMN,
        ColumnValues::Float(classification.deviations()),
    )?;

    let assigned = classification.assigned_count();
    let stats = PipelineStats {
        train_rows: train.len(),
        ideal_rows: ideal.len(),
        test_rows: test.len(),
        dropped_test_rows: test.len() - norm_test.len(),
        assigned,
        unassigned: classification.len() - assigned,
        charts_emitted,
    };

    info!(
        test_rows = stats.test_rows,
        assigned = stats.assigned,
        unassigned = stats.unassigned,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Test rows classified"
    );

    Ok(PipelineOutput {
        best_fit,
        classification,
        result,
        stats,
    })
}

/// Spread classified normalized rows back over the raw test rows
///
/// Rows the normalizer dropped stay unmatched.
fn align_to_source(
    norm_test: &NormalizedTable,
    classified: Classification,
    source_len: usize,
) -> Classification {
    let mut rows = vec![ClassifiedRow::unmatched(); source_len];
    for (&source_row, row) in norm_test.source_rows.iter().zip(classified.rows) {
        rows[source_row] = row;
    }
    Classification { rows }
}

/// Load the named tables, run the pipeline and save the result table
///
/// The result replaces any stored table of the same name. Nothing is written
/// if loading or any pipeline stage fails.
pub fn run_with_store(
    repo: &dyn TableRepository,
    tables: &TableNames,
    sink: &mut dyn ChartSink,
) -> Result<PipelineOutput, PipelineError> {
    let train = load(repo, &tables.train)?;
    let ideal = load(repo, &tables.ideal)?;
    let test = load(repo, &tables.test)?;

    let mut output = run(&train, &ideal, &test, sink)?;
    output.result.name.clone_from(&tables.result);

    repo.save_table(&output.result)?;
    info!(
        table = %tables.result,
        backend = repo.backend_name(),
        rows = output.result.row_count(),
        "Result table saved"
    );

    Ok(output)
}

fn load(repo: &dyn TableRepository, name: &str) -> Result<Table, PipelineError> {
    let record = repo.load_table(name)?;
    let table = Table::try_from(record)?;
    debug!(table = %name, rows = table.len(), y_columns = table.y_count(), "Loaded input table");
    Ok(table)
}

/// Read the three input CSVs and store them under the configured names
///
/// All three files are parsed before anything is written.
pub fn import_csv_inputs(
    repo: &dyn TableRepository,
    input: &InputConfig,
    tables: &TableNames,
) -> Result<(), PipelineError> {
    let sources = [
        (&tables.train, input.train_path()),
        (&tables.ideal, input.ideal_path()),
        (&tables.test, input.test_path()),
    ];

    let mut parsed = Vec::with_capacity(sources.len());
    for (name, path) in &sources {
        let table = read_table_file(name, path)?;
        if table.y_count() == 0 {
            warn!(table = %name, path = %path.display(), "Input has no Y columns");
        }
        parsed.push(RecordTable::from(&table));
    }

    for record in &parsed {
        repo.save_table(record)?;
    }

    info!(
        dir = %input.dir.display(),
        backend = repo.backend_name(),
        "Imported input tables"
    );
    Ok(())
}
