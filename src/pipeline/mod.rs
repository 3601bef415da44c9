//! Export pipeline: planning and execution.

mod coordinator;
mod processor;

pub use coordinator::{
    ExportOptions, ExportPlan, FailurePolicy, FileJob, SourceTree, format_root, is_diagram_file,
    output_path_for, plan_export, prepare_output_dirs, scan_source_tree,
};
pub use processor::export_plan;
