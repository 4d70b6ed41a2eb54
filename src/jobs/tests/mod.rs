// src/jobs/tests/mod.rs

mod job_service_tests;
