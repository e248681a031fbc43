pub mod input_csv;
pub mod notifier;
pub mod processor;
pub mod queue;
pub mod report;
pub mod storage;
