//! Fixed rules of the dungeon.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Time budget granted for one attempt, in seconds. The fractional digits
/// are part of the game data and must survive every subtraction intact.
pub const STARTING_TIME: Decimal = dec!(123456.0987654321);

/// Experience required to open the hatch.
pub const EXP_TO_OPEN_HATCH: u32 = 280;

/// Column order of the session log, fixed by the file's consumers.
pub const SESSION_FIELDS: [&str; 3] =
    ["current_location", "current_experience", "current_date"];

/// Timestamp format used in session snapshots.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H.%M.%S";
