//! Recording pipeline: analyze a sample and write it, its findings, and
//! their fixes to a [`FindingStore`].

use crate::aggregator::BugEngine;
use cscout_core::{Finding, FindingStore, Fix, StoreError};
use serde::Serialize;

/// Findings and fixes for one analyzed source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub name: String,
    /// Store id of the recorded sample, if it was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<i64>,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub finding: Finding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl AnalysisReport {
    /// Analyze without recording anything.
    pub fn analyze(engine: &BugEngine, name: &str, source_text: &str) -> Self {
        let entries = engine
            .analyze_with_fixes(source_text)
            .into_iter()
            .map(|(finding, fix)| ReportEntry { finding, fix })
            .collect();
        Self {
            name: name.to_string(),
            sample_id: None,
            entries,
        }
    }

    pub fn has_bugs(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.entries.iter().map(|e| &e.finding)
    }

    pub fn fixes(&self) -> impl Iterator<Item = &Fix> {
        self.entries.iter().filter_map(|e| e.fix.as_ref())
    }
}

/// Analyze a source and record the sample, every finding, and every fix.
pub fn record_analysis(
    engine: &BugEngine,
    store: &dyn FindingStore,
    name: &str,
    source_text: &str,
) -> Result<AnalysisReport, StoreError> {
    let mut report = AnalysisReport::analyze(engine, name, source_text);
    record_report(store, &mut report, source_text)?;
    Ok(report)
}

/// Record an already computed report against the source it came from.
pub fn record_report(
    store: &dyn FindingStore,
    report: &mut AnalysisReport,
    source_text: &str,
) -> Result<(), StoreError> {
    let sample_id = store.store_sample(&report.name, source_text, report.has_bugs())?;

    for entry in &report.entries {
        let finding_id = store.store_finding(sample_id, &entry.finding)?;
        if let Some(fix) = &entry.fix {
            store.store_fix(finding_id, fix)?;
        }
    }

    tracing::info!(
        sample = %report.name,
        sample_id,
        findings = report.entries.len(),
        fixes = report.fixes().count(),
        "Analysis recorded"
    );
    report.sample_id = Some(sample_id);
    Ok(())
}
