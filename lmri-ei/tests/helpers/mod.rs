//! Test Helper Utilities
//!
//! Shared utilities for testing lmri-ei

#![allow(dead_code)]

pub mod dataset;
pub mod db_utils;

// Re-export commonly used items
pub use dataset::{seed_identity, seed_recording, write_electrode_file, write_tar_gz};
pub use db_utils::{
    archive_hash, count_rows, create_test_env, create_test_env_without_data_dir,
    fail_commit_after_archive_update, freeze_archive_rows, seed_config, seed_electrode,
    write_profile, TestEnv,
};
