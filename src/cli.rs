use crate::{
    analysis,
    backend::{Backend, http::HttpBackend},
    config::Config,
    config_sync,
    payload::ReportForm,
    task::{TaskClient, TaskState},
    util::{ensure_dir, now_rfc3339, timestamped_path, write_text},
    workflow,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "intellihunt")]
#[command(about = "Submit IntelliHunt report and repository scan jobs, follow them, read the results")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./intellihunt.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the payload a form file would submit, without submitting.
    Preview {
        #[arg(long)]
        form: PathBuf,
    },
    /// Run a report generation job and open the finished report.
    Generate {
        #[arg(long)]
        form: PathBuf,
    },
    /// Scan a repository URL, local directory, or local file.
    Scan {
        #[arg(long)]
        repo: String,
    },
    /// One status request for a task id.
    Status {
        #[arg(long)]
        task_id: String,
    },
    /// Download the current report markdown.
    Report {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// CVE count and last-updated time of the current report.
    Summary {},
    /// CVE identifiers referenced by the current report.
    Cves {
        #[arg(long)]
        query: Option<String>,
    },
    /// Save the configuration template.
    Template {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Upload a configuration document.
    Upload {
        #[arg(long)]
        file: PathBuf,
    },
    /// Show the configuration the server is using.
    Config {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Preview { form } => preview(form),
        Command::Generate { form } => generate(&cfg, form),
        Command::Scan { repo } => scan(&cfg, repo),
        Command::Status { task_id } => status(&cfg, task_id),
        Command::Report { out } => report(&cfg, out.as_deref()),
        Command::Summary {} => summary(&cfg),
        Command::Cves { query } => cves(&cfg, query.as_deref().unwrap_or("")),
        Command::Template { out_dir } => template(&cfg, out_dir.as_deref()),
        Command::Upload { file } => upload(&cfg, file),
        Command::Config {} => server_config(&cfg),
    }
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    for candidate in ["intellihunt.toml", "intellihunt.example.toml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return Config::load(&p);
        }
    }
    let mut cfg = Config::default();
    cfg.apply_env();
    Ok(cfg)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.output.dir).join("intellihunt.log"))
}

fn load_form(path: &Path) -> Result<ReportForm> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading form: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing form TOML: {}", path.display()))
}

fn log_progress(state: &TaskState) {
    if let TaskState::Polling(p) = state {
        info!("task {} {}% {}", p.task_id, p.progress, p.message);
    }
}

fn preview(form: &Path) -> Result<()> {
    let payload = load_form(form)?.build();
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn generate(cfg: &Config, form: &Path) -> Result<()> {
    let payload = load_form(form)?.build();
    let mut client = TaskClient::new(cfg, HttpBackend::new(cfg)?);
    let run = workflow::run_report(cfg, &mut client, payload, log_progress)?;

    if cfg.output.print_payload_preview {
        info!("payload preview:\n{}", run.payload_preview);
    }

    let mut saved = None;
    if let Some(md) = &run.markdown {
        let path = PathBuf::from(&cfg.output.dir).join(&cfg.output.report_filename);
        write_text(&path, md)?;
        saved = Some(path);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "state": run.state.name(),
            "message": run.message,
            "report": saved,
            "summary": run.summary,
            "detached_task": run.detached_task,
        }))?
    );
    if matches!(run.state, TaskState::SubmitFailed { .. } | TaskState::Errored { .. }) {
        return Err(anyhow!(run.message));
    }
    Ok(())
}

fn scan(cfg: &Config, repo: &str) -> Result<()> {
    let mut client = TaskClient::new(cfg, HttpBackend::new(cfg)?);
    let run = workflow::run_scan(&mut client, repo, log_progress);

    let mut saved = None;
    if let Some(results) = &run.results {
        let path = timestamped_path(Path::new(&cfg.output.dir), &cfg.output.scan_results_prefix);
        write_text(&path, results)?;
        saved = Some(path);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "state": run.state.name(),
            "message": run.message,
            "results": saved,
            "detached_task": run.detached_task,
        }))?
    );
    if run.results.is_none() && run.detached_task.is_none() {
        return Err(anyhow!(run.message));
    }
    Ok(())
}

fn status(cfg: &Config, task_id: &str) -> Result<()> {
    let backend = HttpBackend::new(cfg)?;
    let status = backend.task_status(task_id)?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn report(cfg: &Config, out: Option<&Path>) -> Result<()> {
    let backend = HttpBackend::new(cfg)?;
    let md = backend.fetch_report()?;
    let path = out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.dir).join(&cfg.output.report_filename));
    write_text(&path, &md)?;
    info!("report saved bytes={} path={}", md.len(), path.display());
    Ok(())
}

fn summary(cfg: &Config) -> Result<()> {
    let backend = HttpBackend::new(cfg)?;
    let md = backend.fetch_report()?;
    let summary = analysis::summarize(&md);
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "referenced_cves": summary.cve_count,
            "last_report": summary.last_updated.value,
            "last_report_authoritative": summary.last_updated.is_authoritative(),
            "fetched_at": now_rfc3339(),
        }))?
    );
    Ok(())
}

fn cves(cfg: &Config, query: &str) -> Result<()> {
    let backend = HttpBackend::new(cfg)?;
    let md = backend.fetch_report()?;
    let ids = analysis::extract_cve_ids(&md);
    let rows: Vec<_> = analysis::filter_ids(&ids, query)
        .into_iter()
        .map(|id| serde_json::json!({ "id": id, "nvd": analysis::nvd_url(id) }))
        .collect();
    info!("{} item{}", rows.len(), if rows.len() == 1 { "" } else { "s" });
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn template(cfg: &Config, out_dir: Option<&Path>) -> Result<()> {
    let backend = HttpBackend::new(cfg)?;
    let dir = out_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.dir));
    let path = config_sync::download_template(cfg, &backend, &dir)?;
    println!("{}", path.display());
    Ok(())
}

fn upload(cfg: &Config, file: &Path) -> Result<()> {
    let backend = HttpBackend::new(cfg)?;
    let reply = config_sync::upload_config(&backend, file)?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

fn server_config(cfg: &Config) -> Result<()> {
    let backend = HttpBackend::new(cfg)?;
    let current = config_sync::current_config(&backend)?;
    println!("{}", serde_json::to_string_pretty(&current)?);
    Ok(())
}
