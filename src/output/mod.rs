pub mod formatter;

pub use formatter::{
    format_assessment, format_assessment_json, format_attribution_bars, format_preprocess_report,
    format_score, should_use_colors,
};
pub(crate) use formatter::truncate_label;
