pub mod mock;
pub mod session;
pub mod text;

pub use mock::mock_session;
pub use session::{read_session, ConfidenceBand, SessionSeries};
