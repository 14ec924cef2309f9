use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clonegen::config::{load_from_path, EngineConfig};
use clonegen::cst::{read_document, save_tree};
use clonegen::driver::{BatchReport, Driver, FileOutcome};
use clonegen::pool::with_parser;
use clonegen::rules::{Rule, RuleSet, UnknownRule};
use clonegen::telemetry;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx"];

#[derive(Parser)]
#[command(name = "clonegen")]
#[command(about = "Semantics-preserving rewrites of C and C++ syntax trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available rules
    List {
        /// Engine configuration (rename suffix, entry point, reserved names)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Parse C/C++ sources into persisted syntax trees
    Parse {
        /// Directory of source files
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the trees are written to
        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Apply one rule to every tree in a directory
    Apply {
        /// Rule name (see `clonegen list`)
        #[arg(short, long)]
        rule: String,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fixed seed for the constant rewriter
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Apply every configured rule, each into its own output directory
    Pipeline {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Rewrite a single source file and print the result
    Rewrite {
        #[arg(short, long)]
        rule: String,

        /// C/C++ source file
        file: PathBuf,

        /// Show unified diff instead of the rewritten source
        #[arg(short, long)]
        diff: bool,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write each persisted tree's text back out as a source file
    Reconstruct {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose)?;

    match cli.command {
        Commands::List { config } => cmd_list(config),

        Commands::Parse {
            input,
            output,
            config,
        } => cmd_parse(&input, &output, config),

        Commands::Apply {
            rule,
            input,
            output,
            config,
            seed,
        } => cmd_apply(&rule, &input, &output, config, seed),

        Commands::Pipeline {
            input,
            output,
            config,
            seed,
        } => cmd_pipeline(&input, &output, config, seed),

        Commands::Rewrite {
            rule,
            file,
            diff,
            config,
            seed,
        } => cmd_rewrite(&rule, &file, diff, config, seed),

        Commands::Reconstruct {
            input,
            output,
            config,
        } => cmd_reconstruct(&input, &output, config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(load_from_path(&path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Files directly inside `dir` whose extension passes `keep`, sorted by name.
fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot read {}", dir.display()))?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(&keep)
        {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

fn unknown_rule(error: UnknownRule) -> anyhow::Error {
    anyhow::anyhow!("{error}; run `clonegen list` to see the available rules")
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_list(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let rules = RuleSet::standard(&config.rule_options());

    println!("{}", "Available rules:".bold());
    for rule in rules.iter() {
        println!("  {:<32} {}", rule.name().cyan(), rule.description());
    }
    Ok(())
}

fn cmd_parse(input: &Path, output: &Path, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let sources = list_files(input, |ext| SOURCE_EXTENSIONS.contains(&ext))?;
    if sources.is_empty() {
        anyhow::bail!("No C/C++ source files found in {}", input.display());
    }
    fs::create_dir_all(output)
        .with_context(|| format!("cannot create {}", output.display()))?;

    let mut parsed = 0;
    let mut failed = 0;
    for path in sources {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let result = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))
            .and_then(|source| {
                let (tree, issues) = with_parser(|parser| {
                    let parsed = parser.parse_with_source(&source)?;
                    Ok::<_, clonegen::TreeSitterError>((parsed.to_cst()?, parsed.syntax_issues()))
                })??;
                let target = output.join(format!("{name}.{}", config.pipeline.extension));
                save_tree(&target, &tree)?;
                Ok(issues)
            });

        match result {
            Ok(issues) if issues.is_empty() => {
                println!("{} {}", "✓".green(), path.display());
                parsed += 1;
            }
            Ok(issues) => {
                let first = &issues[0];
                println!(
                    "{} {}: {} syntax error(s), first at {}:{}",
                    "⊙".yellow(),
                    path.display(),
                    issues.len(),
                    first.line,
                    first.column
                );
                parsed += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), path.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} parsed", format!("{}", parsed).green());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_batch(report: &BatchReport) {
    for file in &report.files {
        match file {
            FileOutcome::Rewritten { path, report } => {
                let skipped = if report.skipped.is_empty() {
                    String::new()
                } else {
                    format!(", {} skipped", report.skipped.len())
                };
                println!(
                    "{} {}: {} rewritten{}",
                    "✓".green(),
                    path.display(),
                    report.applied,
                    skipped
                );
            }
            FileOutcome::Unchanged { path } => {
                println!("{} {}: no matches", "⊙".yellow(), path.display());
            }
            FileOutcome::Failed { path, reason } => {
                eprintln!("{} {}: Failed - {}", "✗".red(), path.display(), reason);
            }
        }
    }
}

fn print_summary(rewritten: usize, unchanged: usize, failed: usize) {
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} rewritten", format!("{}", rewritten).green());
    println!("  {} unchanged", format!("{}", unchanged).yellow());
    println!("  {} failed", format!("{}", failed).red());
}

fn cmd_apply(
    rule: &str,
    input: &Path,
    output: &Path,
    config: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let config = load_config(config)?;
    let rules = RuleSet::standard(&config.rule_options());
    let rule = rules.lookup(rule).map_err(unknown_rule)?;

    println!("{} {}", "Applying".bold(), rule.name().cyan());
    let mut driver =
        Driver::seeded(seed.or(config.constant.seed)).with_extension(&config.pipeline.extension);
    let report = driver.apply_to_all(rule, input, output)?;

    print_batch(&report);
    print_summary(report.rewritten(), report.unchanged(), report.failed());

    if report.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_pipeline(
    input: &Path,
    output: &Path,
    config: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let config = load_config(config)?;
    let rules = RuleSet::standard(&config.rule_options());
    let selected: Vec<&dyn Rule> = if config.pipeline.rules.is_empty() {
        rules.iter().collect()
    } else {
        config
            .pipeline
            .rules
            .iter()
            .map(|name| rules.lookup(name).map_err(unknown_rule))
            .collect::<Result<Vec<_>>>()?
    };

    let mut driver =
        Driver::seeded(seed.or(config.constant.seed)).with_extension(&config.pipeline.extension);
    let (mut rewritten, mut unchanged, mut failed) = (0, 0, 0);
    for rule in selected {
        println!("{} {}", "Applying".bold(), rule.name().cyan());
        let report = driver.apply_to_all(rule, input, &output.join(rule.name()))?;
        print_batch(&report);
        println!();
        rewritten += report.rewritten();
        unchanged += report.unchanged();
        failed += report.failed();
    }

    print_summary(rewritten, unchanged, failed);

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_rewrite(
    rule: &str,
    file: &Path,
    show_diff: bool,
    config: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let config = load_config(config)?;
    let rules = RuleSet::standard(&config.rule_options());
    let rule = rules.lookup(rule).map_err(unknown_rule)?;

    let source =
        fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    let tree = clonegen::pool::parse_cpp(&source)?;
    let pass = Driver::seeded(seed.or(config.constant.seed)).apply_to_tree(rule, &tree)?;

    if show_diff {
        if pass.report.changed() {
            display_diff(file, &source, pass.tree.root_text());
        } else {
            println!("{} {}: no matches", "⊙".yellow(), file.display());
        }
    } else {
        print!("{}", pass.tree.root_text());
    }
    Ok(())
}

fn cmd_reconstruct(input: &Path, output: &Path, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let extension = config.pipeline.extension.as_str();
    let trees = list_files(input, |ext| ext == extension)?;
    fs::create_dir_all(output)
        .with_context(|| format!("cannot create {}", output.display()))?;

    let mut written = 0;
    let mut failed = 0;
    for path in trees {
        // `foo.cpp.json` becomes `foo.cpp`, whatever the tree extension
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let result = read_document(&path)
            .map_err(anyhow::Error::from)
            .and_then(|doc| {
                let target = output.join(stem);
                fs::write(&target, doc.text)
                    .with_context(|| format!("cannot write {}", target.display()))
            });
        match result {
            Ok(()) => {
                println!("{} {}", "✓".green(), output.join(stem).display());
                written += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), path.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} written", format!("{}", written).green());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
