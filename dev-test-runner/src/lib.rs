//! Builds and tests what json2model generates for `samples/api.yaml`.
//!
//! `cargo test -p dev-test-runner` compiles every generated model, mapper and
//! test module, then runs the generated tests against their fixtures.
include!(concat!(env!("OUT_DIR"), "/api.rs"));
