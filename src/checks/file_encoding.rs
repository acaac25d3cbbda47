use super::{Check, CheckContext};

/// Flags files whose bytes could not all be decoded with the configured charset
pub struct FileEncodingCheck;

impl Check for FileEncodingCheck {
    fn key(&self) -> &'static str {
        "FileEncoding"
    }

    fn visit_file(&mut self, ctx: &mut CheckContext<'_>) {
        if ctx.analysis.decode_error {
            let message = format!(
                "Not all characters of the file can be encoded with the predefined charset {}.",
                ctx.analysis.charset
            );
            ctx.report_file(message);
        }
    }
}
