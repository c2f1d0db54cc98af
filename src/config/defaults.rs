//! System-wide default constants.
//!
//! The fitting metric and the acceptance threshold are fixed here and are
//! deliberately not exposed through `ideal_fit.toml`.

// ============================================================================
// Fit Engine
// ============================================================================

/// Multiplier applied to the training max absolute deviation to form the
/// acceptance bound for a test point.
pub const DEVIATION_BOUND_FACTOR: f64 = std::f64::consts::SQRT_2;

/// Decimal places kept on reported test deviations.
pub const DEVIATION_DECIMALS: usize = 3;

// ============================================================================
// Result Table
// ============================================================================

/// Column holding the assigned ideal function label.
pub const RESULT_LABEL_COLUMN: &str = "No. of ideal func";

/// Column holding the rounded test deviation.
pub const RESULT_DEVIATION_COLUMN: &str = "Delta Y (test func)";

// ============================================================================
// Store & Tables
// ============================================================================

/// Location of the sled table store.
pub const STORE_PATH: &str = "db/database";

pub const TRAIN_TABLE: &str = "train_data";
pub const IDEAL_TABLE: &str = "ideal_data";
pub const TEST_TABLE: &str = "test_data";
pub const RESULT_TABLE: &str = "result";

// ============================================================================
// Input Files
// ============================================================================

pub const INPUT_DIR: &str = "data";
pub const TRAIN_FILE: &str = "train.csv";
pub const IDEAL_FILE: &str = "ideal.csv";
pub const TEST_FILE: &str = "test.csv";

// ============================================================================
// Charts
// ============================================================================

/// Directory receiving chart JSON files.
pub const CHART_DIR: &str = "charts";

/// Bin count of the deviation histogram.
pub const HISTOGRAM_BINS: usize = 10;

/// Evaluation points per violin density curve.
pub const VIOLIN_GRID_POINTS: usize = 64;

/// Half-width of the scatter reference diagonal (normalized units).
pub const SCATTER_DIAGONAL_EXTENT: f64 = 3.0;
