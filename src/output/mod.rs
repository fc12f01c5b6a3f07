pub mod formatter;

pub use formatter::{
    format_analysis_detail, format_breakdown, format_report_table, format_response_time,
    format_score, format_transcript, format_tsv, should_use_colors, ReportRow,
};
