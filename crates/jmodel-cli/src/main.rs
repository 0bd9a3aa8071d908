use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jmodel_classpath::ClasspathEntry;
use jmodel_config::ModelConfig;
use jmodel_model::{CompilationUnit, CompileError, LookupEnvironment, Origin, Printer, Type, TypeKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jmodel",
    version,
    about = "Inspect Java declarations from source roots and class files"
)]
struct Cli {
    #[command(flatten)]
    inputs: InputArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct InputArgs {
    /// Config file; defaults to `jmodel.toml` discovery in the current directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source root to add (repeatable)
    #[arg(long = "source", value_name = "DIR", global = true)]
    sources: Vec<PathBuf>,

    /// Class directory or jar to add (repeatable)
    #[arg(long = "classpath", value_name = "PATH", global = true)]
    binaries: Vec<PathBuf>,

    /// Leave out the built-in java.lang stubs
    #[arg(long, global = true)]
    no_jdk: bool,

    /// Emit JSON suitable for scripts and CI
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the outline of one type
    Show(ShowArgs),
    /// List the qualified names of all source types
    List,
    /// Report compile errors of every source file
    Check,
    /// Evaluate a constant expression
    Eval(EvalArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// Qualified, binary or simple name
    name: String,

    /// Print declaration headers without members
    #[arg(long)]
    headers_only: bool,
}

#[derive(Args)]
struct EvalArgs {
    expression: String,

    /// Resolve simple names as if written inside this type
    #[arg(long, value_name = "TYPE")]
    context: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli.inputs)?;
    jmodel_config::init_tracing(&config.logging);
    let env = LookupEnvironment::from_config(&config).context("failed to build lookup environment")?;
    tracing::debug!(
        target: "jmodel.cli",
        entries = config.classpath.len(),
        builtin_jdk = config.builtin_jdk,
        "lookup environment ready"
    );
    let json = cli.inputs.json;

    match cli.command {
        Command::Show(args) => {
            let ty = env
                .find_type(&args.name)
                .with_context(|| format!("type `{}` not found", args.name))?;
            if json {
                print_json(&TypeReport::new(&ty))?;
            } else {
                print!("{}", Printer::new().members(!args.headers_only).print_type(&ty));
            }
            Ok(0)
        }
        Command::List => {
            let entries: Vec<ListEntry> = env
                .type_names()
                .into_iter()
                .filter_map(|name| {
                    let kind = env.find_type(&name)?.kind();
                    Some(ListEntry { name, kind })
                })
                .collect();
            if json {
                print_json(&entries)?;
            } else {
                for entry in &entries {
                    println!("{}", entry.name);
                }
            }
            Ok(0)
        }
        Command::Check => {
            let report = check(&env);
            let exit_code = if report.summary.errors > 0 { 1 } else { 0 };
            if json {
                print_json(&report)?;
            } else {
                for diagnostic in &report.diagnostics {
                    println!(
                        "{}:{}:{}: error: {}",
                        diagnostic.file.display(),
                        diagnostic.line,
                        diagnostic.column,
                        diagnostic.message
                    );
                }
                println!(
                    "summary: {} errors in {} files",
                    report.summary.errors, report.summary.files
                );
            }
            Ok(exit_code)
        }
        Command::Eval(args) => {
            let context = match &args.context {
                Some(name) => Some(
                    env.find_type(name)
                        .with_context(|| format!("type `{name}` not found"))?,
                ),
                None => None,
            };
            let value = env.evaluate(&args.expression, context.as_ref());
            let exit_code = if value.is_unknown() { 1 } else { 0 };
            if json {
                print_json(&EvalReport {
                    expression: args.expression,
                    value: (!value.is_unknown()).then(|| value.to_string()),
                })?;
            } else if value.is_unknown() {
                println!("<not a constant>");
            } else {
                println!("{value}");
            }
            Ok(exit_code)
        }
    }
}

/// The explicit `--config` file, else the one discovered from the current directory, with the
/// command-line entries appended.
fn load_config(args: &InputArgs) -> Result<ModelConfig> {
    let mut config = match &args.config {
        Some(path) => ModelConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            jmodel_config::load_for_root(&cwd)?.0
        }
    };
    config
        .classpath
        .extend(args.sources.iter().cloned().map(ClasspathEntry::source));
    config
        .classpath
        .extend(args.binaries.iter().cloned().map(ClasspathEntry::binary));
    if args.no_jdk {
        config.builtin_jdk = false;
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ListEntry {
    name: String,
    kind: TypeKind,
}

#[derive(Serialize)]
struct TypeReport {
    name: String,
    binary_name: String,
    kind: TypeKind,
    origin: Option<Origin>,
    modifiers: Vec<&'static str>,
    #[serde(rename = "super", skip_serializing_if = "Option::is_none")]
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<String>,
    methods: Vec<String>,
    member_types: Vec<String>,
}

impl TypeReport {
    fn new(ty: &Type) -> Self {
        let super_class = match ty.super_class() {
            Ok(sup) => sup.map(|sup| sup.to_string()),
            Err(err) => Some(format!("<{err}>")),
        };
        let interfaces = match ty.interfaces() {
            Ok(list) => list.iter().map(ToString::to_string).collect(),
            Err(err) => vec![format!("<{err}>")],
        };
        Self {
            name: ty.qualified_name().to_string(),
            binary_name: ty.binary_name().to_string(),
            kind: ty.kind(),
            origin: ty.origin(),
            modifiers: ty.modifiers().keywords(),
            super_class,
            interfaces,
            fields: ty.fields().iter().map(ToString::to_string).collect(),
            methods: ty.methods().iter().map(ToString::to_string).collect(),
            member_types: ty
                .member_types()
                .iter()
                .map(|member| member.qualified_name().to_string())
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct EvalReport {
    expression: String,
    value: Option<String>,
}

#[derive(Serialize)]
struct CheckReport {
    diagnostics: Vec<Diagnostic>,
    summary: CheckSummary,
}

#[derive(Serialize)]
struct CheckSummary {
    files: usize,
    errors: usize,
}

#[derive(Serialize)]
struct Diagnostic {
    file: PathBuf,
    /// One-based.
    line: usize,
    /// One-based, in bytes.
    column: usize,
    message: String,
}

impl Diagnostic {
    fn new(unit: &CompilationUnit, error: &CompileError) -> Self {
        let (line, column) = jmodel_syntax::line_col(unit.text(), error.range.start);
        Self {
            file: unit.path().to_path_buf(),
            line: line + 1,
            column: column + 1,
            message: error.message.clone(),
        }
    }
}

/// Errors of each unit's top-level types (nested types included), then syntax errors outside
/// every type declaration.
fn check(env: &LookupEnvironment) -> CheckReport {
    let units = env.compilation_units();
    let mut diagnostics = Vec::new();
    for unit in &units {
        let mut seen = BTreeSet::new();
        let errors = unit
            .types()
            .iter()
            .flat_map(|ty| env.compile_errors(ty))
            .chain(unit.parse_errors());
        for error in errors {
            if seen.insert((error.range, error.message.clone())) {
                diagnostics.push(Diagnostic::new(unit, &error));
            }
        }
    }
    diagnostics.sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
    tracing::debug!(target: "jmodel.cli", units = units.len(), errors = diagnostics.len(), "check finished");

    CheckReport {
        summary: CheckSummary {
            files: units.len(),
            errors: diagnostics.len(),
        },
        diagnostics,
    }
}
