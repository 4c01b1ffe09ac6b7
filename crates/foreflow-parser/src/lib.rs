pub mod adp;
pub mod clickup;
pub mod duration;
pub mod errors;
mod frame;

pub use adp::{read_adp_file, validate_adp_file_structure, ADP_REQUIRED_COLUMNS};
pub use clickup::{read_clickup_export, validate_clickup_columns};
pub use duration::{parse_duration_to_decimal, round2};
pub use errors::ParserError;
pub use frame::{missing_columns, text_frame};
