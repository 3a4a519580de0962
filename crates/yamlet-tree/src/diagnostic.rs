//! Diagnostic rendering for build errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::error::Error;

impl Error {
    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source
    /// context.
    pub fn render(&self, filename: &str, source: &[u8]) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &[u8], writer: W) {
        let text = String::from_utf8_lossy(source);
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(text.as_ref())), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range: std::ops::Range<usize> = self.span().into();

        match self {
            Error::Decode { .. } => Report::build(ReportKind::Error, (filename, range.clone()))
                .with_message("invalid UTF-8 in scalar")
                .with_label(
                    Label::new((filename, range))
                        .with_message("not valid UTF-8")
                        .with_color(Color::Red),
                )
                .with_help("scalar bytes must be strictly valid UTF-8"),

            Error::Source(err) => {
                let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(err.to_string())
                    .with_label(
                        Label::new((filename, range))
                            .with_message(err.problem)
                            .with_color(Color::Red),
                    );
                if let Some(context) = err.context {
                    report = report.with_note(context);
                }
                report
            }

            Error::Resource => Report::build(ReportKind::Error, (filename, range))
                .with_message("not enough memory for parsing"),
        }
    }
}
