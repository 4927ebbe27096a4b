use crate::{
    backend::{Backend, CurrentConfig, UploadReply},
    config::Config,
    util::ensure_dir,
};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

/// Saves the server's configuration template as
/// `<dir>/<output.template_filename>`.
pub fn download_template(cfg: &Config, backend: &dyn Backend, dir: &Path) -> Result<PathBuf> {
    let bytes = backend.download_template()?;
    ensure_dir(dir)?;
    let path = dir.join(&cfg.output.template_filename);
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    info!("template saved bytes={} path={}", bytes.len(), path.display());
    Ok(path)
}

/// Uploads a configuration document. Schema checks happen on the server.
pub fn upload_config(backend: &dyn Backend, file: &Path) -> Result<UploadReply> {
    if !file.is_file() {
        bail!("config file does not exist: {}", file.display());
    }
    let reply = backend.upload_config(file)?;
    info!("config uploaded: {}", reply.message);
    Ok(reply)
}

pub fn current_config(backend: &dyn Backend) -> Result<CurrentConfig> {
    backend.current_config()
}
