#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use std::borrow::Cow;
use std::io::Write;
use trackup_core::types::{InputConfig, TraceSeverity, UpdateOutcome, Verdict};

#[derive(Parser)]
#[command(name = "trackup", version, about = "Batch issue-tracker updater for CI pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Resolve templates, query the tracker, and update matching issues
    Update(UpdateArgs),
}

#[derive(clap::Args)]
struct UpdateArgs {
    /// Base REST API URL (must start with http:// or https://)
    #[arg(long, env = "TRACKUP_API_URL")]
    api_url: String,

    /// Tracker user name
    #[arg(long, env = "TRACKUP_USER")]
    user: String,

    /// Tracker password or API token
    #[arg(long, env = "TRACKUP_PASSWORD")]
    password: String,

    /// Issue query template; $NAME tokens are replaced by build variables
    #[arg(long, env = "TRACKUP_JQL")]
    jql: Option<String>,

    /// Workflow transition name template to apply to each issue
    #[arg(long, env = "TRACKUP_ACTION")]
    action: Option<String>,

    /// Comment template to add to each issue
    #[arg(long, env = "TRACKUP_COMMENT")]
    comment: Option<String>,

    /// Custom field id to set on each issue
    #[arg(long, env = "TRACKUP_CUSTOM_FIELD_ID")]
    custom_field_id: Option<String>,

    /// Custom field value template
    #[arg(long, env = "TRACKUP_CUSTOM_FIELD_VALUE")]
    custom_field_value: Option<String>,

    /// Comma-delimited fixed-version names template
    #[arg(long, env = "TRACKUP_FIXED_VERSIONS")]
    fixed_versions: Option<String>,

    /// Replace the fixed-version list instead of leaving untracked issues alone
    #[arg(long, env = "TRACKUP_RESET_FIXED_VERSIONS")]
    reset_fixed_versions: bool,

    /// Create fixed versions that do not exist in the project yet
    #[arg(long, env = "TRACKUP_CREATE_MISSING_FIXED_VERSIONS")]
    create_missing_fixed_versions: bool,

    /// Fail the build when the tracker rejects the query
    #[arg(long, env = "TRACKUP_FAIL_IF_JQL_FAILS")]
    fail_if_jql_fails: bool,

    /// Fail the build when no issues match the query
    #[arg(long, env = "TRACKUP_FAIL_IF_NO_ISSUES")]
    fail_if_no_issues: bool,

    /// Fail the build when the tracker cannot be reached
    #[arg(long, env = "TRACKUP_FAIL_IF_NO_CONNECTION")]
    fail_if_no_connection: bool,

    /// Build-scoped parameter as NAME=VALUE; repeatable, overrides the
    /// environment variable of the same name
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Output format: json or text (default: text)
    #[arg(long, env = "TRACKUP_OUTPUT_FORMAT")]
    output_format: Option<String>,
}

/// Output format for the CLI
enum OutputFormat {
    /// Full JSON to stdout
    Json,
    /// Human-readable text to stdout
    Text,
}

impl OutputFormat {
    fn detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Update(args) => run_update_command(args),
    };
    std::process::exit(code);
}

/// Filter empty string from Option (CI systems set "" for unset inputs)
fn clean_opt(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Parse a NAME=VALUE pair
fn parse_param(raw: &str) -> Option<(&str, &str)> {
    raw.split_once('=').filter(|(name, _)| !name.is_empty())
}

fn run_update_command(args: UpdateArgs) -> i32 {
    let output_format = OutputFormat::detect(args.output_format.as_deref());

    let mut parameters: Vec<(Cow<'_, str>, Cow<'_, str>)> = Vec::with_capacity(args.params.len());
    for raw in &args.params {
        match parse_param(raw) {
            Some((name, value)) => {
                parameters.push((Cow::Borrowed(name), Cow::Borrowed(value)));
            }
            None => {
                eprintln!("Error: invalid --param '{raw}', expected NAME=VALUE");
                return 1;
            }
        }
    }

    // Build InputConfig — borrowing from args (zero-copy)
    let config = InputConfig {
        rest_api_url: Cow::Borrowed(args.api_url.as_str()),
        user_name: Cow::Borrowed(args.user.as_str()),
        password: Cow::Borrowed(args.password.as_str()),
        jql: clean_opt(&args.jql).map(Cow::Borrowed),
        workflow_action_name: clean_opt(&args.action).map(Cow::Borrowed),
        comment: clean_opt(&args.comment).map(Cow::Borrowed),
        custom_field_id: clean_opt(&args.custom_field_id).map(Cow::Borrowed),
        custom_field_value: clean_opt(&args.custom_field_value).map(Cow::Borrowed),
        fixed_versions: clean_opt(&args.fixed_versions).map(Cow::Borrowed),
        resetting_fixed_versions: args.reset_fixed_versions,
        create_non_existing_fixed_versions: args.create_missing_fixed_versions,
        fail_if_jql_fails: args.fail_if_jql_fails,
        fail_if_no_issues_returned: args.fail_if_no_issues,
        fail_if_no_connection: args.fail_if_no_connection,
        parameters,
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build();
    let rt = match rt {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {e}");
            return 1;
        }
    };

    let outcome = match rt.block_on(trackup_core::run_update(config)) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    match output_format {
        OutputFormat::Json => write_json_output(&outcome),
        OutputFormat::Text => write_text_output(&outcome),
    }

    match outcome.verdict {
        Verdict::Continue => 0,
        Verdict::Abort(_) => 2,
    }
}

/// Write full JSON output to stdout
fn write_json_output(outcome: &UpdateOutcome) {
    let (verdict, reason) = match outcome.verdict {
        Verdict::Continue => ("continue", None),
        Verdict::Abort(reason) => ("abort", Some(reason.as_str())),
    };

    let trace: Vec<serde_json::Value> = outcome
        .trace
        .iter()
        .map(|e| {
            serde_json::json!({
                "severity": format!("{:?}", e.severity).to_lowercase(),
                "category": format!("{:?}", e.category),
                "message": e.message,
            })
        })
        .collect();

    let output = serde_json::json!({
        "verdict": verdict,
        "abort_reason": reason,
        "matched": outcome.matched,
        "updated": outcome.updated,
        "trace": trace,
    });

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = serde_json::to_writer(&mut lock, &output);
    let _ = writeln!(lock);
}

/// Write human-readable text to stdout
fn write_text_output(outcome: &UpdateOutcome) {
    let stdout = std::io::stdout();
    let mut w = stdout.lock();

    let _ = writeln!(w, "-------------------------------------------------------");
    let _ = writeln!(w, "Issue Tracker Update");
    let _ = writeln!(w, "-------------------------------------------------------");

    for e in &outcome.trace {
        let marker = match e.severity {
            TraceSeverity::Info => " ",
            TraceSeverity::Warning => "!",
            TraceSeverity::SoftError => "x",
        };
        let _ = writeln!(w, "{marker} {}", e.message);
    }

    let _ = writeln!(w);
    let _ = writeln!(w, "Issues matched: {}", outcome.matched);
    let _ = writeln!(w, "Issues updated: {}", outcome.updated);
    let verdict = match outcome.verdict {
        Verdict::Continue => "continue".to_string(),
        Verdict::Abort(reason) => format!("abort ({})", reason.as_str()),
    };
    let _ = writeln!(w, "Verdict: {verdict}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("STAGE=prod"), Some(("STAGE", "prod")));
        assert_eq!(parse_param("A=b=c"), Some(("A", "b=c")));
        assert_eq!(parse_param("EMPTY="), Some(("EMPTY", "")));
        assert_eq!(parse_param("=value"), None);
        assert_eq!(parse_param("novalue"), None);
    }

    #[test]
    fn test_clean_opt() {
        assert_eq!(clean_opt(&Some("x".to_string())), Some("x"));
        assert_eq!(clean_opt(&Some(String::new())), None);
        assert_eq!(clean_opt(&None), None);
    }
}
