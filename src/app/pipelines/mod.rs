pub mod audit_pipeline;
