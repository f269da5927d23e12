pub mod analysis;
pub mod request;

pub use analysis::{AnalysisResult, ProductRecommendation};
pub use request::{AnalysisRequest, Language};
