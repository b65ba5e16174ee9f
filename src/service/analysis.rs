//! Orchestration of the discrepancy-analysis pipeline
//!
//! Assembles the three evidence sources, runs the vision step, feeds its
//! output into the discrepancy step, and persists the final decision record.
//! Precondition failures (missing statement, missing photos) are surfaced to
//! the caller and are checked before any analyzer is invoked; analyzer
//! degradation is invisible here because both analyzers are infallible.

use std::sync::Arc;
use std::time::Instant;

use crate::db::DbError;
use crate::model::{
    AnalysisRecord, CompleteAnalysis, EvidenceBundle, NewAnalysisRecord, ReportStatus,
};
use crate::service::discrepancy::DiscrepancyAnalyzer;
use crate::service::evidence::EvidenceStore;
use crate::service::vision::PhotoAnalyzer;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Accident report not found: {0}")]
    ReportNotFound(i64),

    #[error("Officer statement required before analysis can run for report {0}")]
    StatementMissing(i64),

    #[error("No photos registered for report {0}")]
    PhotosMissing(i64),

    #[error("Analysis already exists for report {0}")]
    AlreadyAnalyzed(i64),

    #[error("No analysis recorded for report {0}")]
    AnalysisNotFound(i64),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

/// Service orchestrating the analysis pipeline and decision persistence
pub struct AnalysisService {
    store: Arc<dyn EvidenceStore>,
    vision: Arc<dyn PhotoAnalyzer>,
    discrepancy: Arc<dyn DiscrepancyAnalyzer>,
}

impl AnalysisService {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        vision: Arc<dyn PhotoAnalyzer>,
        discrepancy: Arc<dyn DiscrepancyAnalyzer>,
    ) -> Self {
        Self {
            store,
            vision,
            discrepancy,
        }
    }

    /// Run the full pipeline for a report: vision first, then discrepancy
    /// analysis consuming the vision output.
    pub async fn analyze_report(&self, report_id: i64) -> Result<CompleteAnalysis, AnalysisError> {
        let start_time = Instant::now();

        let report = self
            .store
            .fetch_report(report_id)
            .await?
            .ok_or(AnalysisError::ReportNotFound(report_id))?;

        // Preconditions come before any photo work or network call
        let statement = self
            .store
            .fetch_statement(report_id)
            .await?
            .ok_or(AnalysisError::StatementMissing(report_id))?;

        let photos = self.store.fetch_photos(report_id).await?;
        if photos.is_empty() {
            return Err(AnalysisError::PhotosMissing(report_id));
        }

        let bundle = EvidenceBundle::from_report(&report);
        let photo_paths: Vec<String> = photos.into_iter().map(|p| p.file_path).collect();

        tracing::info!(
            report = %report_id,
            photos = photo_paths.len(),
            "Starting complete analysis"
        );

        let vision_start = Instant::now();
        let vision = self
            .vision
            .analyze_photos(
                &photo_paths,
                &report.damage_description,
                &report.incident_description,
            )
            .await;
        tracing::info!(
            report = %report_id,
            elapsed_ms = vision_start.elapsed().as_millis(),
            consistency_score = vision.consistency_score,
            "Vision analysis step completed"
        );

        let discrepancy_start = Instant::now();
        let discrepancy = self.discrepancy.analyze(&bundle, &statement, &vision).await;
        tracing::info!(
            report = %report_id,
            elapsed_ms = discrepancy_start.elapsed().as_millis(),
            confidence_score = discrepancy.confidence_score,
            recommendation = %discrepancy.recommendation,
            "Discrepancy analysis step completed"
        );

        tracing::debug!(
            report = %report_id,
            elapsed_ms = start_time.elapsed().as_millis(),
            "Complete analysis finished"
        );

        Ok(CompleteAnalysis {
            vision,
            discrepancy,
        })
    }

    /// Persist the final decision record for a report.
    ///
    /// Append-only: an existing record blocks re-creation. The
    /// check-then-insert race is closed by the storage UNIQUE constraint,
    /// which surfaces here as the same conflict error.
    pub async fn record_decision(
        &self,
        record: NewAnalysisRecord,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let report_id = record.accident_report_id;

        self.store
            .fetch_report(report_id)
            .await?
            .ok_or(AnalysisError::ReportNotFound(report_id))?;

        if self.store.fetch_analysis(report_id).await?.is_some() {
            return Err(AnalysisError::AlreadyAnalyzed(report_id));
        }

        let stored = self.store.insert_analysis(&record).await.map_err(|e| match e {
            DbError::Conflict(_) => AnalysisError::AlreadyAnalyzed(report_id),
            other => AnalysisError::Db(other),
        })?;

        self.store
            .update_report_status(report_id, ReportStatus::Completed)
            .await?;

        tracing::info!(
            report = %report_id,
            claim_status = ?stored.claim_status,
            confidence_score = stored.confidence_score,
            "Analysis record created"
        );

        Ok(stored)
    }

    /// Fetch the persisted analysis record for a report
    pub async fn analysis_for_report(
        &self,
        report_id: i64,
    ) -> Result<AnalysisRecord, AnalysisError> {
        self.store
            .fetch_report(report_id)
            .await?
            .ok_or(AnalysisError::ReportNotFound(report_id))?;

        self.store
            .fetch_analysis(report_id)
            .await?
            .ok_or(AnalysisError::AnalysisNotFound(report_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::model::{
        AccidentPhoto, AccidentReport, ClaimStatus, DiscrepancyResult, OfficerStatement,
        Recommendation, StatementStatus, VisionResult,
    };

    fn sample_report(id: i64) -> AccidentReport {
        AccidentReport {
            id,
            reporter_id: 11,
            accident_date: Utc::now(),
            accident_location: "Jalan Tun Razak".to_string(),
            weather_condition: "Rain".to_string(),
            road_condition: "Wet".to_string(),
            traffic_condition: "Heavy".to_string(),
            vehicle_make: "Perodua".to_string(),
            vehicle_model: "Myvi".to_string(),
            vehicle_year: 2021,
            vehicle_plate: "WXY 1234".to_string(),
            vehicle_color: "Silver".to_string(),
            incident_description: "Skidded into the divider".to_string(),
            damage_description: "Front bumper cracked".to_string(),
            injuries_description: None,
            other_party_name: None,
            other_party_ic: None,
            other_party_phone: None,
            other_party_vehicle: None,
            status: ReportStatus::UnderReview,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_statement(report_id: i64) -> OfficerStatement {
        OfficerStatement {
            id: 5,
            accident_report_id: report_id,
            officer_id: 2,
            officer_findings: "Single-vehicle accident in wet conditions".to_string(),
            fault_determination: "No other party involved".to_string(),
            recommended_action: "Process claim".to_string(),
            case_number: "CASE-9".to_string(),
            status: StatementStatus::Submitted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_photo(report_id: i64) -> AccidentPhoto {
        AccidentPhoto {
            id: 1,
            report_id,
            filename: "front.jpg".to_string(),
            file_path: "/uploads/front.jpg".to_string(),
            description: Some("front view".to_string()),
            uploaded_at: Utc::now(),
        }
    }

    fn sample_new_record(report_id: i64) -> NewAnalysisRecord {
        NewAnalysisRecord {
            accident_report_id: report_id,
            photo_analysis: "analysis".to_string(),
            damage_assessment: "assessment".to_string(),
            consistency_score: 0.8,
            confidence_score: 0.75,
            discrepancy_analysis: "no issues".to_string(),
            key_discrepancies: vec![],
            consistency_assessment: "consistent".to_string(),
            recommendation: Recommendation::Investigate,
            risk_factors: vec![],
            supporting_evidence: vec!["aligned".to_string()],
            claim_status: ClaimStatus::PendingInvestigation,
            claim_amount: Some(4200.0),
            notes: None,
        }
    }

    /// In-memory store with a single configurable report
    struct MemoryStore {
        report: Option<AccidentReport>,
        statement: Option<OfficerStatement>,
        photos: Vec<AccidentPhoto>,
        analysis: Mutex<Option<AnalysisRecord>>,
        status_updates: Mutex<Vec<(i64, ReportStatus)>>,
    }

    impl MemoryStore {
        fn new(
            report: Option<AccidentReport>,
            statement: Option<OfficerStatement>,
            photos: Vec<AccidentPhoto>,
        ) -> Self {
            Self {
                report,
                statement,
                photos,
                analysis: Mutex::new(None),
                status_updates: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EvidenceStore for MemoryStore {
        async fn fetch_report(&self, report_id: i64) -> Result<Option<AccidentReport>, DbError> {
            Ok(self.report.clone().filter(|r| r.id == report_id))
        }

        async fn fetch_statement(
            &self,
            report_id: i64,
        ) -> Result<Option<OfficerStatement>, DbError> {
            Ok(self
                .statement
                .clone()
                .filter(|s| s.accident_report_id == report_id))
        }

        async fn fetch_photos(&self, report_id: i64) -> Result<Vec<AccidentPhoto>, DbError> {
            Ok(self
                .photos
                .iter()
                .filter(|p| p.report_id == report_id)
                .cloned()
                .collect())
        }

        async fn fetch_analysis(&self, _report_id: i64) -> Result<Option<AnalysisRecord>, DbError> {
            Ok(self.analysis.lock().unwrap().clone())
        }

        async fn insert_analysis(
            &self,
            record: &NewAnalysisRecord,
        ) -> Result<AnalysisRecord, DbError> {
            let mut guard = self.analysis.lock().unwrap();
            if guard.is_some() {
                return Err(DbError::Conflict(format!(
                    "analysis for report {}",
                    record.accident_report_id
                )));
            }
            let stored = AnalysisRecord {
                id: 1,
                accident_report_id: record.accident_report_id,
                photo_analysis: record.photo_analysis.clone(),
                damage_assessment: record.damage_assessment.clone(),
                consistency_score: record.consistency_score,
                confidence_score: record.confidence_score,
                discrepancy_analysis: record.discrepancy_analysis.clone(),
                key_discrepancies: record.key_discrepancies.clone(),
                consistency_assessment: record.consistency_assessment.clone(),
                recommendation: record.recommendation,
                risk_factors: record.risk_factors.clone(),
                supporting_evidence: record.supporting_evidence.clone(),
                claim_status: record.claim_status,
                claim_amount: record.claim_amount,
                notes: record.notes.clone(),
                analyzed_at: Utc::now(),
            };
            *guard = Some(stored.clone());
            Ok(stored)
        }

        async fn update_report_status(
            &self,
            report_id: i64,
            status: ReportStatus,
        ) -> Result<(), DbError> {
            self.status_updates.lock().unwrap().push((report_id, status));
            Ok(())
        }
    }

    /// Analyzer stub that counts invocations
    struct CountingVision {
        calls: AtomicUsize,
        result: VisionResult,
    }

    impl CountingVision {
        fn new(result: VisionResult) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
            }
        }
    }

    #[async_trait]
    impl PhotoAnalyzer for CountingVision {
        async fn analyze_photos(
            &self,
            _photo_paths: &[String],
            _damage_description: &str,
            _incident_description: &str,
        ) -> VisionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct CountingDiscrepancy {
        calls: AtomicUsize,
        result: DiscrepancyResult,
    }

    impl CountingDiscrepancy {
        fn new(result: DiscrepancyResult) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
            }
        }
    }

    #[async_trait]
    impl DiscrepancyAnalyzer for CountingDiscrepancy {
        async fn analyze(
            &self,
            _bundle: &EvidenceBundle,
            _statement: &OfficerStatement,
            _vision: &VisionResult,
        ) -> DiscrepancyResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn stub_vision_result() -> VisionResult {
        VisionResult {
            analysis: "stub analysis".to_string(),
            consistency_score: 0.8,
            damage_assessment: "stub assessment".to_string(),
        }
    }

    fn stub_discrepancy_result() -> DiscrepancyResult {
        DiscrepancyResult {
            confidence_score: 0.7,
            discrepancy_analysis: "stub".to_string(),
            key_discrepancies: vec![],
            consistency_assessment: "stub".to_string(),
            recommendation: Recommendation::Investigate,
            risk_factors: vec![],
            supporting_evidence: vec![],
        }
    }

    fn service_with(
        store: MemoryStore,
    ) -> (AnalysisService, Arc<CountingVision>, Arc<CountingDiscrepancy>) {
        let vision = Arc::new(CountingVision::new(stub_vision_result()));
        let discrepancy = Arc::new(CountingDiscrepancy::new(stub_discrepancy_result()));
        let service = AnalysisService::new(
            Arc::new(store),
            Arc::clone(&vision) as Arc<dyn PhotoAnalyzer>,
            Arc::clone(&discrepancy) as Arc<dyn DiscrepancyAnalyzer>,
        );
        (service, vision, discrepancy)
    }

    #[tokio::test]
    async fn missing_statement_fails_before_any_analyzer_runs() {
        let store = MemoryStore::new(Some(sample_report(7)), None, vec![sample_photo(7)]);
        let (service, vision, discrepancy) = service_with(store);

        let err = service.analyze_report(7).await.unwrap_err();
        assert!(matches!(err, AnalysisError::StatementMissing(7)));
        assert_eq!(vision.calls.load(Ordering::SeqCst), 0);
        assert_eq!(discrepancy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_photos_fails_before_any_analyzer_runs() {
        let store = MemoryStore::new(Some(sample_report(7)), Some(sample_statement(7)), vec![]);
        let (service, vision, discrepancy) = service_with(store);

        let err = service.analyze_report(7).await.unwrap_err();
        assert!(matches!(err, AnalysisError::PhotosMissing(7)));
        assert_eq!(vision.calls.load(Ordering::SeqCst), 0);
        assert_eq!(discrepancy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_report_is_a_distinct_error() {
        let store = MemoryStore::new(None, None, vec![]);
        let (service, _, _) = service_with(store);

        let err = service.analyze_report(42).await.unwrap_err();
        assert!(matches!(err, AnalysisError::ReportNotFound(42)));
    }

    #[tokio::test]
    async fn pipeline_runs_both_steps_in_order() {
        let store = MemoryStore::new(
            Some(sample_report(7)),
            Some(sample_statement(7)),
            vec![sample_photo(7)],
        );
        let (service, vision, discrepancy) = service_with(store);

        let result = service.analyze_report(7).await.unwrap();
        assert_eq!(result.vision, stub_vision_result());
        assert_eq!(result.discrepancy, stub_discrepancy_result());
        assert_eq!(vision.calls.load(Ordering::SeqCst), 1);
        assert_eq!(discrepancy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_decision_record_is_a_conflict() {
        let store = MemoryStore::new(
            Some(sample_report(42)),
            Some(sample_statement(42)),
            vec![sample_photo(42)],
        );
        let (service, _, _) = service_with(store);

        let first = service.record_decision(sample_new_record(42)).await.unwrap();
        assert_eq!(first.accident_report_id, 42);

        let err = service
            .record_decision(sample_new_record(42))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::AlreadyAnalyzed(42)));

        // Still exactly one record
        let stored = service.analysis_for_report(42).await.unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[tokio::test]
    async fn recording_a_decision_completes_the_report() {
        let store = Arc::new(MemoryStore::new(
            Some(sample_report(9)),
            Some(sample_statement(9)),
            vec![sample_photo(9)],
        ));
        let service = AnalysisService::new(
            Arc::clone(&store) as Arc<dyn EvidenceStore>,
            Arc::new(CountingVision::new(stub_vision_result())),
            Arc::new(CountingDiscrepancy::new(stub_discrepancy_result())),
        );

        service.record_decision(sample_new_record(9)).await.unwrap();

        let updates = store.status_updates.lock().unwrap();
        assert_eq!(updates.as_slice(), &[(9, ReportStatus::Completed)]);
    }

    #[tokio::test]
    async fn analysis_lookup_distinguishes_absence() {
        let store = MemoryStore::new(
            Some(sample_report(9)),
            Some(sample_statement(9)),
            vec![sample_photo(9)],
        );
        let (service, _, _) = service_with(store);

        let err = service.analysis_for_report(9).await.unwrap_err();
        assert!(matches!(err, AnalysisError::AnalysisNotFound(9)));
    }
}
