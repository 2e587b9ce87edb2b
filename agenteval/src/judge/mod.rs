//! LLM-as-judge grading (spec §4.3 "Judge").
//!
//! [`client`] is the transport (real or [`MockJudge`]); [`grading`] renders
//! templates and distributes verdicts back onto a test case's assertion
//! shapes; [`bool_coerce`] is the tolerant truthy/falsy parser judges'
//! free-text verdicts are run through.

mod bool_coerce;
mod client;
mod grading;
mod mock;
mod templates;

pub use bool_coerce::coerce_bool;
pub use client::{JudgeClient, LlmJudge};
pub use grading::{grade, GradeOutcome};
pub use mock::MockJudge;
pub use templates::render;
