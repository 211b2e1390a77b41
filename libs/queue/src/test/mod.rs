//! Helpers shared by the implementation crates: a conformance suite for their unit tests and a
//! threaded stress harness for the `stress_tester` binary.
