/*!
 * Main test entry point for syncstore test suite
 */

// Import common test utilities
pub mod common;

// Import integration tests
mod integration {
    // End-to-end store lifecycle and CRUD workflow tests
    pub mod store_workflow_tests;
}
