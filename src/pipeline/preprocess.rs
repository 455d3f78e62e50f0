//! Training-side preprocessing: reduction, elimination, outlier rejection
//!
//! [`Preprocessor::fit`] only ever sees training rows. Its column decisions
//! come back as a [`ColumnMask`] that is then applied to held-out or test
//! features, so nothing learned here depends on data outside the training
//! partition.

use log::info;

use crate::model::Regressor;

use super::correlation::{reduce_features, FeatureReduction, DEFAULT_CORRELATION_THRESHOLD};
use super::elimination::{eliminate_features, Elimination, DEFAULT_P_VALUE_THRESHOLD};
use super::error::{PipelineError, Result};
use super::frame::{ColumnMask, Table, TableView};
use super::outliers::{scan_outliers, OutlierScan, DEFAULT_OUTLIER_THRESHOLD};

/// Which label column each feature column predicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPairing {
    /// Label table column id for every feature table column id
    label_for_feature: Vec<usize>,
    by_name: bool,
}

impl LabelPairing {
    /// Pair features with labels by column name, or by position when the two
    /// schemas share no names but have the same width.
    pub fn resolve(features: &Table, labels: &Table) -> Result<Self> {
        let by_name: Vec<Option<usize>> = features
            .names()
            .iter()
            .map(|name| labels.position(name))
            .collect();

        if by_name.iter().all(Option::is_some) {
            return Ok(Self {
                label_for_feature: by_name.into_iter().flatten().collect(),
                by_name: true,
            });
        }

        let matched = by_name.iter().filter(|p| p.is_some()).count();
        if matched == 0 && features.n_cols() == labels.n_cols() {
            return Ok(Self {
                label_for_feature: (0..features.n_cols()).collect(),
                by_name: false,
            });
        }

        Err(PipelineError::Schema(format!(
            "cannot pair {} feature columns with {} label columns ({} names in common)",
            features.n_cols(),
            labels.n_cols(),
            matched
        )))
    }

    /// Whether the pairing matched column names.
    pub fn is_by_name(&self) -> bool {
        self.by_name
    }

    /// Label columns paired with the columns of `x`, in `x`'s column order,
    /// over the rows of `y`.
    pub fn paired_labels<'b>(&self, x: &TableView<'_>, y: &TableView<'b>) -> TableView<'b> {
        let cols = x
            .col_ids()
            .iter()
            .map(|&c| self.label_for_feature[c])
            .collect();
        y.with_table_columns(cols)
    }
}

/// Thresholds and stage switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessConfig {
    pub correlation_threshold: f64,
    pub p_value_threshold: f64,
    pub outlier_threshold: f64,
    pub eliminate: bool,
    pub filter_outliers: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            p_value_threshold: DEFAULT_P_VALUE_THRESHOLD,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            eliminate: true,
            filter_outliers: true,
        }
    }
}

/// Runs the preprocessing stages on a training partition.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
    /// Needed only when elimination is enabled
    pairing: Option<LabelPairing>,
}

/// Training data after preprocessing, plus what each stage decided.
#[derive(Debug, Clone)]
pub struct Prepared<'a, 'b> {
    pub x: TableView<'a>,
    pub y: TableView<'b>,
    /// Retained feature columns
    pub features: ColumnMask,
    pub reduction: FeatureReduction,
    pub elimination: Option<Elimination>,
    pub outliers: Option<OutlierScan>,
}

impl Prepared<'_, '_> {
    /// Project held-out or test features onto the retained columns.
    pub fn project<'c>(&self, view: &TableView<'c>) -> TableView<'c> {
        view.project(&self.features)
    }

    /// Original row ids of the training rows rejected as outliers.
    pub fn outlier_row_ids(&self) -> Vec<usize> {
        self.outliers
            .as_ref()
            .map(OutlierScan::outlier_row_ids)
            .unwrap_or_default()
    }
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig, pairing: Option<LabelPairing>) -> Self {
        Self { config, pairing }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Reduce, eliminate and filter a training partition.
    ///
    /// `y` is the full label view; only the columns paired with surviving
    /// features are used for elimination, while the outlier scan fits on all
    /// of them.
    pub fn fit<'a, 'b, R: Regressor>(
        &self,
        regressor: &R,
        x: &TableView<'a>,
        y: &TableView<'b>,
    ) -> Result<Prepared<'a, 'b>> {
        let reduction = reduce_features(x, self.config.correlation_threshold)?;
        let reduced = reduction.apply(x);
        info!(
            "Correlation reduction: {} -> {} features",
            x.n_cols(),
            reduced.n_cols()
        );

        let (selected, elimination) = if self.config.eliminate {
            let pairing = self.pairing.as_ref().ok_or_else(|| {
                PipelineError::Schema(
                    "significance elimination needs features paired with labels".to_string(),
                )
            })?;
            let paired = pairing.paired_labels(&reduced, y);
            let elimination = eliminate_features(&reduced, &paired, self.config.p_value_threshold)?;
            let selected = elimination.apply(&reduced);
            info!(
                "Significance elimination: {} -> {} features",
                reduced.n_cols(),
                selected.n_cols()
            );
            (selected, Some(elimination))
        } else {
            (reduced, None)
        };

        let features = ColumnMask::from_view(&selected);

        let (x, y, outliers) = if self.config.filter_outliers {
            let scan = scan_outliers(regressor, &selected, y, self.config.outlier_threshold)?;
            let (x, y) = scan.apply(&selected, y);
            (x, y, Some(scan))
        } else {
            (selected, y.clone(), None)
        };

        Ok(Prepared {
            x,
            y,
            features,
            reduction,
            elimination,
            outliers,
        })
    }
}
