pub mod fraud;
pub mod line_matcher;
pub mod similarity;
pub mod three_way;

pub use fraud::{FraudContext, FraudDetector};
pub use three_way::ThreeWayMatcher;
