use anyhow::Context;
use clap::{Parser, Subcommand};
use crossval_app::{
    render_comparison_document, render_validation_document, ComparisonRun, CrossValidator,
    ValidationRun,
};
use crossval_domain::Formula;
use crossval_generate::{CategoryCounts, TestCaseGenerator};
use crossval_types::{
    DocumentSpec, FormulaSpec, TestCategory, TestSuiteDoc, COMPARISON_SCHEMA_V1, SUITE_SCHEMA_V1,
    VALIDATION_SCHEMA_V1,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod builtins;

#[derive(Debug, Parser)]
#[command(
    name = "crossval",
    version,
    about = "Cross-validate formula implementations against references in CI"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a categorized test suite from a formula spec (JSON).
    Generate {
        /// Formula spec path; a DocumentSpec when --document is set
        #[arg(long)]
        spec: PathBuf,

        /// Treat --spec as a DocumentSpec holding several formulas
        #[arg(long, default_value_t = false)]
        document: bool,

        /// Normal cases per formula
        #[arg(long, default_value_t = 5)]
        normal: u32,

        /// Boundary cases per formula
        #[arg(long, default_value_t = 4)]
        boundary: u32,

        /// Edge cases per formula
        #[arg(long, default_value_t = 4)]
        edge: u32,

        /// Error cases per formula
        #[arg(long, default_value_t = 4)]
        error: u32,

        /// Output suite path; with --document, a directory taking one suite per formula
        #[arg(long, default_value = "crossval-suite.json")]
        out: PathBuf,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Validate one implementation against a reference over a suite.
    Validate {
        #[arg(long)]
        suite: PathBuf,

        /// Candidate name from the built-in registry
        #[arg(long)]
        implementation: String,

        /// Reference name from the built-in registry
        #[arg(long)]
        reference: String,

        /// Default absolute tolerance for cases declaring none
        #[arg(long)]
        tolerance: Option<f64>,

        /// Gate on pass rate (percent) instead of requiring every case to pass
        #[arg(long)]
        min_pass_rate: Option<f64>,

        /// Fail the gate when any nonzero numeric discrepancy was recorded
        #[arg(long, default_value_t = false)]
        fail_on_discrepancy: bool,

        /// Output validation document
        #[arg(long, default_value = "crossval-validation.json")]
        out: PathBuf,

        /// Also write a markdown summary
        #[arg(long)]
        md: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Compare two or more implementations against each other over a suite.
    Compare {
        #[arg(long)]
        suite: PathBuf,

        /// Implementation name from the built-in registry. Repeat at least twice.
        #[arg(long = "implementation", required = true)]
        implementations: Vec<String>,

        /// Default absolute tolerance for cases declaring none
        #[arg(long)]
        tolerance: Option<f64>,

        /// Output comparison document
        #[arg(long, default_value = "crossval-comparison.json")]
        out: PathBuf,

        /// Also write a markdown summary
        #[arg(long)]
        md: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Render a markdown summary from a persisted report document.
    Md {
        #[arg(long)]
        report: PathBuf,

        /// Output markdown path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(err) = real_main() {
        eprintln!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Generate {
            spec,
            document,
            normal,
            boundary,
            edge,
            error,
            out,
            pretty,
        } => {
            let counts = category_counts(normal, boundary, edge, error);
            let generator = TestCaseGenerator::default();

            if document {
                let doc: DocumentSpec = read_json(&spec)?;
                let suites = generator
                    .generate_for_document(&doc, &counts)
                    .with_context(|| format!("generate from {}", spec.display()))?;
                for (formula_id, test_cases) in suites {
                    let path = out.join(format!("{formula_id}.suite.json"));
                    let suite = TestSuiteDoc {
                        schema: SUITE_SCHEMA_V1.to_string(),
                        document_id: Some(doc.document_id.clone()),
                        formula_id,
                        test_cases,
                    };
                    write_json(&path, &suite, pretty)?;
                }
            } else {
                let formula: FormulaSpec = read_json(&spec)?;
                let test_cases = generator
                    .generate_for_formula(&formula, &counts)
                    .with_context(|| format!("generate from {}", spec.display()))?;
                let suite = TestSuiteDoc {
                    schema: SUITE_SCHEMA_V1.to_string(),
                    document_id: None,
                    formula_id: formula.id,
                    test_cases,
                };
                write_json(&out, &suite, pretty)?;
            }

            Ok(())
        }

        Command::Validate {
            suite,
            implementation,
            reference,
            tolerance,
            min_pass_rate,
            fail_on_discrepancy,
            out,
            md,
            pretty,
        } => {
            let suite_doc = read_suite(&suite)?;
            let candidate_formula = resolve(&implementation)?;
            let reference_formula = resolve(&reference)?;

            let mut validator = CrossValidator::new();
            if let Some(t) = tolerance {
                validator = validator.default_tolerance(t);
            }

            let mut metadata = BTreeMap::new();
            metadata.insert("suite".to_string(), suite.display().to_string());
            metadata.insert("formula".to_string(), suite_doc.formula_id.clone());

            let report = validator.validate_implementation(&ValidationRun {
                reference_name: reference,
                reference: &reference_formula,
                candidate_name: implementation,
                candidate: &candidate_formula,
                cases: &suite_doc.test_cases,
                metadata,
            });

            let doc = report.to_document();
            write_json(&out, &doc, pretty)?;
            if let Some(path) = md {
                write_text(&path, &render_validation_document(&doc))?;
            }

            let mut gate_ok = match min_pass_rate {
                Some(min) => doc.pass_rate >= min,
                None => doc.success,
            };
            if fail_on_discrepancy && doc.discrepancy_summary.nonzero > 0 {
                gate_ok = false;
            }
            if !gate_ok {
                std::process::exit(2);
            }
            Ok(())
        }

        Command::Compare {
            suite,
            implementations,
            tolerance,
            out,
            md,
            pretty,
        } => {
            let suite_doc = read_suite(&suite)?;
            let resolved: Vec<(String, builtins::BuiltinFormula)> = implementations
                .into_iter()
                .map(|name| resolve(&name).map(|f| (name, f)))
                .collect::<anyhow::Result<_>>()?;
            let implementations: Vec<(String, &dyn Formula)> = resolved
                .iter()
                .map(|(name, f)| (name.clone(), f as &dyn Formula))
                .collect();

            let mut validator = CrossValidator::new();
            if let Some(t) = tolerance {
                validator = validator.default_tolerance(t);
            }

            let mut metadata = BTreeMap::new();
            metadata.insert("suite".to_string(), suite.display().to_string());
            metadata.insert("formula".to_string(), suite_doc.formula_id.clone());

            let report = validator.compare_implementations(&ComparisonRun {
                implementations,
                cases: &suite_doc.test_cases,
                metadata,
            })?;

            let doc = report.to_document();
            write_json(&out, &doc, pretty)?;
            if let Some(path) = md {
                write_text(&path, &render_comparison_document(&doc))?;
            }

            if !doc.success {
                std::process::exit(2);
            }
            Ok(())
        }

        Command::Md { report, out } => {
            let raw: serde_json::Value = read_json(&report)?;
            let schema = raw.get("schema").and_then(|s| s.as_str()).unwrap_or("");
            let rendered = match schema {
                VALIDATION_SCHEMA_V1 => {
                    let doc: crossval_types::ValidationDocument = serde_json::from_value(raw)
                        .with_context(|| format!("parse {}", report.display()))?;
                    render_validation_document(&doc)
                }
                COMPARISON_SCHEMA_V1 => {
                    let doc: crossval_types::ComparisonDocument = serde_json::from_value(raw)
                        .with_context(|| format!("parse {}", report.display()))?;
                    render_comparison_document(&doc)
                }
                other => anyhow::bail!(
                    "unsupported report schema '{other}' in {}",
                    report.display()
                ),
            };

            match out {
                Some(path) => write_text(&path, &rendered)?,
                None => print!("{rendered}"),
            }
            Ok(())
        }
    }
}

fn category_counts(normal: u32, boundary: u32, edge: u32, error: u32) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    counts.insert(TestCategory::Normal, normal);
    counts.insert(TestCategory::Boundary, boundary);
    counts.insert(TestCategory::Edge, edge);
    counts.insert(TestCategory::Error, error);
    counts
}

fn resolve(name: &str) -> anyhow::Result<builtins::BuiltinFormula> {
    builtins::lookup(name).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown implementation '{name}' (known: {})",
            builtins::NAMES.join(", ")
        )
    })
}

fn read_suite(path: &Path) -> anyhow::Result<TestSuiteDoc> {
    let doc: TestSuiteDoc = read_json(path)?;
    anyhow::ensure!(
        doc.schema == SUITE_SCHEMA_V1,
        "unsupported suite schema '{}' in {}",
        doc.schema,
        path.display()
    );
    Ok(doc)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let v =
        serde_json::from_slice(&bytes).with_context(|| format!("parse json {}", path.display()))?;
    Ok(v)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, pretty: bool) -> anyhow::Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    write_bytes(path, &bytes)
}

fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    write_bytes(path, text.as_bytes())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }
    atomic_write(path, bytes)
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = parent.to_path_buf();
    tmp.push(format!(".{}.tmp", uuid::Uuid::new_v4()));

    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create temp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
