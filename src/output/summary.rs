//! Per-reference mutation summary.

use serde::Serialize;

use crate::histogram::histogram::MutationHistogram;
use crate::histogram::quality_control::QualityReport;
use crate::histogram::stats::count_to_f64;
use crate::histogram::store::HistogramSet;

/// One reference's row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub reads: u64,
    /// Accepted read groups as a percent of all read groups
    pub aligned_percent: f64,
    pub no_mut: f64,
    #[serde(rename = "1_mut")]
    pub one_mut: f64,
    #[serde(rename = "2_mut")]
    pub two_mut: f64,
    #[serde(rename = "3_mut")]
    pub three_mut: f64,
    #[serde(rename = "4plus_mut")]
    pub four_plus_mut: f64,
    /// Signal-to-noise ratio, when defined
    pub sn: Option<f64>,
}

impl SummaryRow {
    #[must_use]
    pub fn from_histogram(histogram: &MutationHistogram) -> Self {
        let aligned_percent = if histogram.num_reads == 0 {
            0.0
        } else {
            count_to_f64(histogram.num_aligned) * 100.0 / count_to_f64(histogram.num_reads)
        };
        let [no_mut, one_mut, two_mut, three_mut, four_plus_mut] = histogram.percent_mutations();

        Self {
            name: histogram.name.clone(),
            reads: histogram.num_reads,
            aligned_percent,
            no_mut,
            one_mut,
            two_mut,
            three_mut,
            four_plus_mut,
            sn: histogram.signal_to_noise(),
        }
    }
}

/// Summary rows for every histogram, in name order
#[must_use]
pub fn summarize(histograms: &HistogramSet) -> Vec<SummaryRow> {
    histograms.iter().map(SummaryRow::from_histogram).collect()
}

const TSV_HEADER: &str = "name\treads\taligned_percent\tno_mut\t1_mut\t2_mut\t3_mut\t4plus_mut\tsn";

fn format_sn(sn: Option<f64>) -> String {
    sn.map_or_else(|| "NA".to_string(), |v| format!("{v:.2}"))
}

/// Aligned plain-text table
#[must_use]
pub fn render_text(rows: &[SummaryRow]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("name".len());

    let mut out = format!(
        "{:<name_width$}  {:>10}  {:>8}  {:>7}  {:>7}  {:>7}  {:>7}  {:>9}  {:>6}\n",
        "name", "reads", "aligned", "no_mut", "1_mut", "2_mut", "3_mut", "4plus_mut", "sn"
    );
    for r in rows {
        out.push_str(&format!(
            "{:<name_width$}  {:>10}  {:>7.2}%  {:>7.2}  {:>7.2}  {:>7.2}  {:>7.2}  {:>9.2}  {:>6}\n",
            r.name,
            r.reads,
            r.aligned_percent,
            r.no_mut,
            r.one_mut,
            r.two_mut,
            r.three_mut,
            r.four_plus_mut,
            format_sn(r.sn),
        ));
    }
    out
}

/// Tab-separated table with a header row
#[must_use]
pub fn render_tsv(rows: &[SummaryRow]) -> String {
    let mut out = format!("{TSV_HEADER}\n");
    for r in rows {
        out.push_str(&format!(
            "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}\n",
            r.name,
            r.reads,
            r.aligned_percent,
            r.no_mut,
            r.one_mut,
            r.two_mut,
            r.three_mut,
            r.four_plus_mut,
            format_sn(r.sn),
        ));
    }
    out
}

/// Pretty-printed JSON array
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(rows: &[SummaryRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

/// Quality-control reports for every histogram, as text
#[must_use]
pub fn render_quality_text(histograms: &HistogramSet) -> String {
    histograms
        .iter()
        .map(|h| QualityReport::assess(h).to_text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quality-control reports for every histogram, one tab-separated row each
#[must_use]
pub fn render_quality_tsv(histograms: &HistogramSet) -> String {
    let mut out = String::from(
        "name\treads\tread_depth\tsn\tsn_grade\tcoverage_lt_50\tcoverage_50_75\tcoverage_gt_75\n",
    );
    for report in histograms.iter().map(QualityReport::assess) {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\n",
            report.name,
            report.num_reads,
            report.read_depth,
            format_sn(report.signal_to_noise),
            report
                .signal_to_noise_grade
                .map_or_else(|| "NA".to_string(), |g| g.to_string()),
            report.coverage.below_half,
            report.coverage.half_to_three_quarters,
            report.coverage.above_three_quarters,
        ));
    }
    out
}
