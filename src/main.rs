use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use skeldoc::batch::{render_batch, skeletonize_batch, NoLinks, SourceFile, TemplateLinker, UrlLinker};
use skeldoc::config::{load_config, Config};
use skeldoc::language::LanguageId;
use skeldoc::markdown::{decode, unlisted_docs, update_index, IndexSettings};
use skeldoc::parser::{parse_with, TreeSitterParser};
use skeldoc::scanner::{scan_sources, FileEntry, ScanOptions};
use skeldoc::skeleton::{BuildOptions, SkeletonBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "skeldoc")]
#[command(version)]
#[command(about = "Extract declaration skeletons and doc comments into Markdown reference docs")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the skeleton of a single source file as JSON
    Inspect {
        #[arg(value_name = "FILE_PATH")]
        file: PathBuf,

        /// Use a JSON syntax tree from an external parser instead of the built-in grammars
        #[arg(long, value_name = "JSON_PATH")]
        tree: Option<PathBuf>,

        /// Override language detection (name or extension, e.g. "dart", "ts")
        #[arg(long)]
        language: Option<String>,
    },

    /// Render Markdown docs for the given files/directories and update the index
    Render {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Decode a rendered Markdown doc back into a skeleton (JSON)
    Decode {
        #[arg(value_name = "MD_PATH")]
        file: PathBuf,
    },
}

fn spinner(template: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template(template)
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

fn linker_for(cfg: &Config) -> Box<dyn UrlLinker> {
    if cfg.link_template.trim().is_empty() {
        Box::new(NoLinks)
    } else {
        Box::new(TemplateLinker::new(cfg.link_template.clone()))
    }
}

fn relative_name(abs: &Path, repo_root: &Path) -> String {
    let rel = abs.strip_prefix(repo_root).unwrap_or(abs);
    rel.to_string_lossy().replace('\\', "/")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let repo_root = std::env::current_dir().context("Failed to get current dir")?;
    let cfg = load_config(&repo_root);

    match cli.cmd {
        Command::Inspect { file, tree, language } => inspect(&repo_root, &cfg, &file, tree.as_deref(), language.as_deref()),
        Command::Render { paths } => render(&repo_root, &cfg, &paths),
        Command::Decode { file } => {
            let abs = if file.is_absolute() { file } else { repo_root.join(&file) };
            let content =
                std::fs::read_to_string(&abs).with_context(|| format!("Failed to read {}", abs.display()))?;
            println!("{}", serde_json::to_string_pretty(&decode(&content))?);
            Ok(())
        }
    }
}

fn inspect(repo_root: &Path, cfg: &Config, file: &Path, tree: Option<&Path>, language: Option<&str>) -> Result<()> {
    let abs = if file.is_absolute() { file.to_path_buf() } else { repo_root.join(file) };
    let language = match language {
        Some(name) => LanguageId::from_name(name).ok_or_else(|| anyhow!("Unknown language: {name}"))?,
        None => LanguageId::from_path(&abs).ok_or_else(|| anyhow!("Unsupported file extension: {}", abs.display()))?,
    };

    let source = std::fs::read_to_string(&abs).with_context(|| format!("Failed to read {}", abs.display()))?;
    let json_tree = match tree {
        Some(p) => Some(std::fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))?),
        None => None,
    };

    let parsed = parse_with(&TreeSitterParser::new(), &source, language, json_tree.as_deref())?;
    let name = relative_name(&abs, repo_root);
    let options = BuildOptions {
        adjacency: cfg.adjacency,
    };
    let mut skeleton = SkeletonBuilder::new(language, parsed.source(), options).build(&parsed, Some(&name));

    let linker = linker_for(cfg);
    for s in &mut skeleton.skeletons {
        if let Some(range) = s.line_range {
            s.url = linker.link(&name, range);
        }
    }

    println!("{}", serde_json::to_string_pretty(&skeleton)?);
    Ok(())
}

fn render(repo_root: &Path, cfg: &Config, paths: &[PathBuf]) -> Result<()> {
    let mut exclude_dir_names = cfg.scan.exclude_dir_names.clone();
    if let Some(name) = cfg.output_dir.file_name() {
        exclude_dir_names.push(name.to_string_lossy().to_string());
    }

    let scan_spinner = spinner("{spinner} scanning files...");
    let mut entries: BTreeMap<String, FileEntry> = BTreeMap::new();
    for target in paths {
        let opts = ScanOptions {
            repo_root: repo_root.to_path_buf(),
            target: target.clone(),
            max_file_bytes: cfg.scan.effective_max_file_bytes(),
            exclude_dir_names: exclude_dir_names.clone(),
        };
        for entry in scan_sources(&opts)? {
            entries.entry(entry.display_name()).or_insert(entry);
        }
    }
    scan_spinner.finish_with_message(format!("scanned {} files", entries.len()));

    let inputs: Vec<_> = entries
        .into_iter()
        .map(|(name, entry)| {
            let file = std::fs::read_to_string(&entry.abs_path)
                .with_context(|| format!("Failed to read {}", entry.abs_path.display()))
                .map(|text| SourceFile {
                    filename: name.clone(),
                    language: entry.language,
                    text,
                    changed: None,
                });
            (name, file)
        })
        .collect();

    let build_spinner = spinner("{spinner} {msg}");
    build_spinner.set_message(format!("extracting skeletons from {} files...", inputs.len()));
    let options = BuildOptions {
        adjacency: cfg.adjacency,
    };
    let linker = linker_for(cfg);
    let results = skeletonize_batch(inputs, &TreeSitterParser::new(), linker.as_ref(), &options);
    let skipped = results.values().filter(|r| r.is_none()).count();
    build_spinner.finish_with_message(format!("extracted {} files ({skipped} skipped)", results.len() - skipped));

    let out_dir = repo_root.join(&cfg.output_dir);
    let docs = render_batch(&results, &cfg.namespace);
    for doc in &docs {
        let path = out_dir.join(&doc.filename);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, &doc.content).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let index_path = out_dir.join(&cfg.index_file);
    let existing = std::fs::read_to_string(&index_path).unwrap_or_default();
    let fresh: Vec<_> = unlisted_docs(&existing, &docs).into_iter().cloned().collect();
    if !fresh.is_empty() {
        let settings = IndexSettings {
            file: &cfg.index_file,
            sentinel: &cfg.index_sentinel,
            namespace: &cfg.namespace,
        };
        let index = update_index(&existing, &fresh, &settings);
        std::fs::create_dir_all(&out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;
        std::fs::write(out_dir.join(&index.filename), &index.content)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;
    }

    eprintln!(
        "Wrote {} docs to {} ({} new index entries)",
        docs.len(),
        out_dir.display(),
        fresh.len()
    );
    Ok(())
}
