pub mod fraud;
pub mod invoice;
pub mod matching;
pub mod procurement;

pub use fraud::{FraudAnalysisResult, FraudIndicator, FraudIndicatorKind, RiskLevel};
pub use invoice::{Invoice, InvoiceLine};
pub use matching::{LineItemMatch, MatchConfidence, MatchResult, MatchStatus};
pub use procurement::{
    sum_totals, DocumentLine, LineFields, PoLine, PoStatus, PurchaseOrder, Receipt, ReceiptLine,
    ReceiptStatus,
};
