//! Database access for lmri-ei
//!
//! Repository functions over the LORIS tables the electrode import touches.
//! Single-statement lookups are generic over the executor so they run on the
//! pool or inside the import transaction; multi-statement writes take a
//! connection.

pub mod candidates;
pub mod physiological;
pub mod sessions;
