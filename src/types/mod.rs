mod precinct_id;
mod stat;

pub use precinct_id::PrecinctId;
pub use stat::{CandidateVotes, PrecinctStat, turnout};

pub(crate) use stat::{count_from_value, lenient_count};
