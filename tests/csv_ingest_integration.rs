//! CSV Ingest Integration Tests
//!
//! Imports the three input CSVs into an on-disk store, runs the pipeline from
//! the store and exports the result table back to CSV.

use std::fs;
use std::path::Path;

use ideal_fit::acquisition::{read_table, write_record_table};
use ideal_fit::charts::JsonDirSink;
use ideal_fit::config::defaults::{RESULT_DEVIATION_COLUMN, RESULT_LABEL_COLUMN};
use ideal_fit::config::{InputConfig, TableNames};
use ideal_fit::{
    import_csv_inputs, run_with_store, ColumnValues, PipelineError, TableRepository, TableStore,
};

fn write_inputs(dir: &Path) {
    let mut train = String::from("x,y1,y2\n");
    let mut ideal = String::from("x,y1,y2,y3\n");
    for i in 0..20 {
        let x = f64::from(i) * 0.5;
        train.push_str(&format!("{x},{},{}\n", x * x + 0.01, (x * 0.8).cos() - 0.01));
        ideal.push_str(&format!("{x},{},{},{}\n", (x * 0.8).cos(), x * x, x.sin()));
    }
    // four test rows, the third with a missing value
    let test = "x,y\n1.0,1.0\n2.0,4.0\n3.0,\n4.0,500.0\n";

    fs::write(dir.join("train.csv"), train).unwrap();
    fs::write(dir.join("ideal.csv"), ideal).unwrap();
    fs::write(dir.join("test.csv"), test).unwrap();
}

#[test]
fn import_run_export() {
    let data_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    write_inputs(data_dir.path());

    let input = InputConfig {
        dir: data_dir.path().to_path_buf(),
        ..InputConfig::default()
    };
    let tables = TableNames::default();

    let store = TableStore::open(store_dir.path()).unwrap();
    import_csv_inputs(&store, &input, &tables).unwrap();
    assert_eq!(store.table_names().unwrap(), vec!["ideal_data", "test_data", "train_data"]);

    let chart_dir = data_dir.path().join("charts");
    let mut sink = JsonDirSink::create(&chart_dir).unwrap();
    let output = run_with_store(&store, &tables, &mut sink).unwrap();

    // y1 ~ x^2 -> ideal y2, y2 ~ cos(0.8x) -> ideal y1
    let chosen: Vec<usize> = output.best_fit.iter().map(|f| f.ideal_index).collect();
    assert_eq!(chosen, vec![2, 1]);

    // 2 pairs: 6 per-pair charts plus 7 summary charts
    assert_eq!(sink.written(), 13);
    assert!(chart_dir.join("01_line.json").exists());
    assert!(chart_dir.join("13_heatmap.json").exists());

    let labels = output.classification.labels();
    assert_eq!(labels.len(), 4);
    assert_eq!(labels[2], "Unassigned");
    assert_eq!(output.classification.rows[2].deviation, None);
    assert_eq!(labels[3], "Unassigned");

    let mut csv_out = Vec::new();
    let result = store.load_table("result").unwrap();
    write_record_table(&result, &mut csv_out).unwrap();
    let text = String::from_utf8(csv_out).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, format!("x,y,{RESULT_LABEL_COLUMN},{RESULT_DEVIATION_COLUMN}"));
    assert_eq!(text.lines().count(), 5);

    store.close().unwrap();
}

#[test]
fn exported_result_reads_back_as_numeric_columns() {
    let data_dir = tempfile::tempdir().unwrap();
    write_inputs(data_dir.path());

    let store = TableStore::open_temporary().unwrap();
    let input = InputConfig {
        dir: data_dir.path().to_path_buf(),
        ..InputConfig::default()
    };
    import_csv_inputs(&store, &input, &TableNames::default()).unwrap();

    let test = store.load_table("test_data").unwrap();
    let mut csv_out = Vec::new();
    write_record_table(&test, &mut csv_out).unwrap();

    let reread = read_table("test_data", csv_out.as_slice()).unwrap();
    assert_eq!(reread.x.values, vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
    assert_eq!(reread.ys[0].values, vec![Some(1.0), Some(4.0), None, Some(500.0)]);
    assert_eq!(
        test.column("y"),
        Some(&ColumnValues::Float(vec![Some(1.0), Some(4.0), None, Some(500.0)]))
    );
}

#[test]
fn missing_input_file_aborts_import() {
    let data_dir = tempfile::tempdir().unwrap();
    fs::write(data_dir.path().join("train.csv"), "x,y1\n1,1\n").unwrap();

    let store = TableStore::open_temporary().unwrap();
    let input = InputConfig {
        dir: data_dir.path().to_path_buf(),
        ..InputConfig::default()
    };
    let err = import_csv_inputs(&store, &input, &TableNames::default()).unwrap_err();

    assert!(matches!(err, PipelineError::Ingest(_)));
    assert!(store.table_names().unwrap().is_empty());
}
