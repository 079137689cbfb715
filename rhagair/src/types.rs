/// Frequency scores as stored, and the weighted scores derived from them.
pub type Score = i64;

/// Negated number of context words a candidate was found with.
pub type Magnitude = i64;
