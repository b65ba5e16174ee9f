pub mod analysis;
pub mod discrepancy;
pub mod evidence;
pub mod intake;
pub mod vision;

pub use analysis::{AnalysisError, AnalysisService};
pub use discrepancy::{DiscrepancyAnalyzer, DiscrepancyClient};
pub use evidence::{EvidenceStore, PgEvidenceStore};
pub use intake::{IntakeError, IntakeService};
pub use vision::{PhotoAnalyzer, VisionClient};
