//! File-backed storage for the local JSON records.

pub(crate) mod json_file;
