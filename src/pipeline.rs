// src/pipeline.rs
use std::io::{BufRead, ErrorKind, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{OutputMode, PipelineConfig};
use crate::error::TransformError;
use crate::escalate::{self, ReportingContext, SyntheticError};
use crate::record::LogRecord;
use crate::render::{PrettyRenderer, Renderer};
use crate::sink::ReportingSink;
use crate::tty::should_use_colors;

/// Runtime statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub records_processed: usize,
    pub records_output: usize,
    pub records_suppressed: usize,
    pub records_escalated: usize,
    pub sink_failures: usize,
    pub processing_time: Duration,
}

/// One-record-in, one-record-out transform over a line stream.
///
/// Records are processed strictly in arrival order; the output stream
/// preserves the input order exactly. The sink handle, when present, is
/// constructed before the first record and shared for the whole run.
pub struct TransformPipeline {
    config: PipelineConfig,
    sink: Option<Arc<dyn ReportingSink>>,
    renderer: PrettyRenderer,
    stats: ProcessingStats,
    line_number: usize,
}

impl TransformPipeline {
    pub fn new(config: PipelineConfig) -> TransformPipeline {
        TransformPipeline::build(config, None)
    }

    pub fn with_sink(config: PipelineConfig, sink: Arc<dyn ReportingSink>) -> TransformPipeline {
        TransformPipeline::build(config, Some(sink))
    }

    fn build(config: PipelineConfig, sink: Option<Arc<dyn ReportingSink>>) -> TransformPipeline {
        let use_colors = config.color.unwrap_or_else(should_use_colors);
        TransformPipeline {
            renderer: PrettyRenderer::new(use_colors),
            config,
            sink,
            stats: ProcessingStats::default(),
            line_number: 0,
        }
    }

    /// Transform one line into one output chunk (already newline-terminated).
    /// `None` means the renderer suppressed the line.
    pub fn transform_line(&mut self, line: &str) -> Result<Option<String>, TransformError> {
        self.line_number += 1;
        self.stats.records_processed += 1;
        let line = line.trim();

        // structured parsing is required for escalation and for the
        // level-name substitution; plain passthrough skips it
        let record = if self.sink.is_some() || self.config.mode == OutputMode::JsonLevelName {
            Some(self.parse_record(line)?)
        } else {
            None
        };

        match (self.sink.clone(), record) {
            (Some(sink), Some(mut record)) if escalate::should_escalate(&record, true) => {
                let correlation_id = self.report(sink.as_ref(), &record);
                escalate::apply_escalation(&mut record, correlation_id.as_deref());
                self.stats.records_escalated += 1;
                Ok(self.format_record(&record))
            }
            (_, record) => Ok(self.pass_through(line, record)),
        }
    }

    /// Submit one severe record to the sink. Failures are contained: a
    /// warning goes to stderr and the record is emitted without an id.
    fn report(&mut self, sink: &dyn ReportingSink, record: &LogRecord) -> Option<String> {
        let context = ReportingContext::from_record(record);
        let error = SyntheticError::from_record(record);
        match sink.submit(&context, &error) {
            Ok(id) => Some(id),
            Err(err) => {
                self.stats.sink_failures += 1;
                eprintln!(
                    "escalog: line {}: report submission failed: {}",
                    self.line_number, err
                );
                None
            }
        }
    }

    fn pass_through(&mut self, line: &str, record: Option<LogRecord>) -> Option<String> {
        match self.config.mode {
            OutputMode::Pretty => match record {
                Some(record) => self.renderer.render_record(&record),
                // raw lines go straight to the renderer when nothing
                // upstream needed them parsed
                None => self.renderer.render_line(line),
            },
            OutputMode::Json => Some(format!("{}\n", line)),
            OutputMode::JsonLevelName => {
                let json = match record {
                    Some(record) => record.to_json_with_level_name(),
                    None => line.to_string(),
                };
                Some(format!("{}\n", json))
            }
        }
    }

    fn format_record(&self, record: &LogRecord) -> Option<String> {
        match self.config.mode {
            OutputMode::Pretty => self.renderer.render_record(record),
            OutputMode::Json => Some(format!("{}\n", record.to_json())),
            OutputMode::JsonLevelName => Some(format!("{}\n", record.to_json_with_level_name())),
        }
    }

    fn parse_record(&self, line: &str) -> Result<LogRecord, TransformError> {
        LogRecord::parse(line).map_err(|message| TransformError::MalformedRecord {
            line: self.line_number,
            message,
        })
    }

    /// Process a whole stream, one output line per input line
    pub fn process_stream<R: BufRead, W: Write>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<ProcessingStats, TransformError> {
        let start_time = Instant::now();

        for line_result in input.lines() {
            let line = match line_result {
                Ok(line) => line,
                Err(e) => {
                    if e.kind() == ErrorKind::UnexpectedEof {
                        break;
                    }
                    return Err(TransformError::IoError(e));
                }
            };

            if line.len() > self.config.max_line_length {
                return Err(TransformError::LineTooLong {
                    length: line.len(),
                    max_length: self.config.max_line_length,
                });
            }

            match self.transform_line(&line)? {
                Some(rendered) => {
                    if let Err(e) = output.write_all(rendered.as_bytes()) {
                        // downstream went away; stop without failing the run
                        if e.kind() == ErrorKind::BrokenPipe {
                            break;
                        }
                        return Err(TransformError::IoError(e));
                    }
                    self.stats.records_output += 1;
                }
                None => {
                    self.stats.records_suppressed += 1;
                    if self.config.debug {
                        eprintln!("escalog: line {}: suppressed by renderer", self.line_number);
                    }
                }
            }
        }

        self.stats.processing_time += start_time.elapsed();
        Ok(self.stats.clone())
    }

    pub fn get_stats(&self) -> &ProcessingStats {
        &self.stats
    }
}
