//! Batch pipeline: parse, build and link many files in parallel.
//!
//! Files are independent, so each one runs on its own rayon task and the
//! results are merged into one map keyed by filename. A failure for one file
//! becomes `None` for that key and never aborts the batch.

use crate::language::LanguageId;
use crate::markdown::{render, RenderedDoc};
use crate::parser::SourceParser;
use crate::skeleton::{BuildOptions, FileSkeleton, LineRange, SkeletonBuilder};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    pub language: LanguageId,
    pub text: String,
    /// Lines touched by a change set. `None` keeps every declaration.
    pub changed: Option<Vec<LineRange>>,
}

/// Supplies deep links into a hosted source viewer.
pub trait UrlLinker: Send + Sync {
    fn link(&self, filename: &str, range: LineRange) -> Option<String>;
}

/// Leaves every URL empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLinks;

impl UrlLinker for NoLinks {
    fn link(&self, _filename: &str, _range: LineRange) -> Option<String> {
        None
    }
}

/// Fills `{file}`, `{start}` and `{end}` in a URL template. Lines are 1-based.
///
/// `https://github.com/org/repo/blob/main/{file}#L{start}-L{end}`
#[derive(Debug, Clone)]
pub struct TemplateLinker {
    template: String,
}

impl TemplateLinker {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl UrlLinker for TemplateLinker {
    fn link(&self, filename: &str, range: LineRange) -> Option<String> {
        Some(
            self.template
                .replace("{file}", filename)
                .replace("{start}", &(range.start + 1).to_string())
                .replace("{end}", &(range.end + 1).to_string()),
        )
    }
}

/// Parse, build, filter to changed lines, then link one file.
pub fn skeletonize_file(
    file: &SourceFile,
    parser: &dyn SourceParser,
    linker: &dyn UrlLinker,
    options: &BuildOptions,
) -> Result<FileSkeleton> {
    let parsed = parser
        .parse(&file.text, file.language)
        .with_context(|| format!("Failed to parse {}", file.filename))?;

    let mut skeleton =
        SkeletonBuilder::new(file.language, parsed.source(), options.clone()).build(&parsed, Some(&file.filename));

    if let Some(changed) = &file.changed {
        skeleton.retain_overlapping(changed);
    }
    for s in &mut skeleton.skeletons {
        if let Some(range) = s.line_range {
            s.url = linker.link(&file.filename, range);
        }
    }
    Ok(skeleton)
}

/// Runs [`skeletonize_file`] for every input on the rayon pool.
///
/// Inputs that already failed upstream (content fetch) and files that fail
/// to parse map to `None`.
pub fn skeletonize_batch(
    inputs: Vec<(String, Result<SourceFile>)>,
    parser: &dyn SourceParser,
    linker: &dyn UrlLinker,
    options: &BuildOptions,
) -> BTreeMap<String, Option<FileSkeleton>> {
    inputs
        .into_par_iter()
        .map(|(name, input)| {
            let result = input.and_then(|file| skeletonize_file(&file, parser, linker, options));
            match result {
                Ok(skeleton) => (name, Some(skeleton)),
                Err(e) => {
                    crate::debug_log!("[batch] skipping {name}: {e:#}");
                    (name, None)
                }
            }
        })
        .collect()
}

/// Encodes every present skeleton under `namespace`, in filename order.
pub fn render_batch(results: &BTreeMap<String, Option<FileSkeleton>>, namespace: &str) -> Vec<RenderedDoc> {
    results
        .values()
        .flatten()
        .filter_map(|skeleton| render(skeleton, namespace))
        .collect()
}
