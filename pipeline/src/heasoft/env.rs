use anyhow::{bail, Context};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where HEAsoft and CALDB are installed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeasoftConfig {
    /// `$HEADAS`, e.g. `.../heasoft-6.30.1/x86_64-apple-darwin21.5.0`.
    pub headas: Option<PathBuf>,
    /// `$CALDB`.
    pub caldb: Option<PathBuf>,
    /// Init script, relative to `headas`.
    pub headas_init: String,
    /// Init script, relative to `caldb`.
    pub caldb_init: String,
    /// Value for `HEADASPROMPT`; `/dev/null` keeps tasks off the terminal.
    pub prompt: String,
}

impl Default for HeasoftConfig {
    fn default() -> Self {
        Self {
            headas: None,
            caldb: None,
            headas_init: "headas-init.sh".into(),
            caldb_init: "caldbinit.sh".into(),
            prompt: "/dev/null".into(),
        }
    }
}

/// Environment handed to every HEAsoft task.
///
/// Built once per run and passed by value; the current process environment is
/// never modified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeasoftEnv {
    vars: BTreeMap<String, String>,
}

impl HeasoftEnv {
    pub fn from_vars(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Sources the configured init scripts and collects the resulting variables.
    pub fn from_config(config: &HeasoftConfig) -> anyhow::Result<Self> {
        let mut vars = BTreeMap::new();
        if let Some(headas) = &config.headas {
            vars.insert("HEADAS".to_string(), headas.display().to_string());
        }
        if let Some(caldb) = &config.caldb {
            vars.insert("CALDB".to_string(), caldb.display().to_string());
        }

        if let Some(headas) = &config.headas {
            let sourced = source_script(&headas.join(&config.headas_init), &vars)
                .context("initialising HEAsoft")?;
            vars.extend(sourced);
        } else {
            warn!("HEADAS not configured; relying on an already initialised shell");
        }
        if let Some(caldb) = &config.caldb {
            let sourced = source_script(&caldb.join(&config.caldb_init), &vars)
                .context("initialising CALDB")?;
            vars.extend(sourced);
        }

        vars.insert("HEADASPROMPT".to_string(), config.prompt.clone());
        debug!("HEAsoft environment carries {} variables", vars.len());
        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn apply(&self, command: &mut Command) {
        command.envs(&self.vars);
    }
}

/// Runs `. <script>; env` and returns the environment it leaves behind.
pub fn source_script(
    script: &Path,
    base: &BTreeMap<String, String>,
) -> anyhow::Result<BTreeMap<String, String>> {
    if !script.is_file() {
        bail!("init script {} not found", script.display());
    }
    let output = Command::new("sh")
        .arg("-c")
        .arg(r#". "$1"; env"#)
        .arg("sh")
        .arg(script)
        .envs(base)
        .output()
        .with_context(|| format!("sourcing {}", script.display()))?;
    if !output.status.success() {
        bail!(
            "sourcing {} failed ({}): {}",
            script.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(parse_env_dump(&String::from_utf8_lossy(&output.stdout)))
}

/// Parses `KEY=VALUE` lines as printed by `env`; lines without `=` are skipped.
pub fn parse_env_dump(dump: &str) -> BTreeMap<String, String> {
    dump.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
