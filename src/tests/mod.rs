//! Cross-module tests: configuration through composed frames.

mod face_tests;
