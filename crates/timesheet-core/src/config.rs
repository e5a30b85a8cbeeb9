use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::adapter::ViewMode;
use crate::event::DEFAULT_PLACEHOLDER_TITLE;
use crate::modal::{
  DEFAULT_CLOSE_DELAY,
  DEFAULT_MOUNT_DELAY,
  ModalTimings
};

const DEFAULT_API_VERSION: &str = "9.2";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

/// Connection details for the host
/// integration. Absent when no URL is
/// configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
  pub url:          String,
  pub access_token: Option<String>,
  pub user_id:      String,
  pub api_version:  String,
  pub timeout:      Duration
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "calendar.view".to_string(),
      ViewMode::Week.as_key().to_string()
    );
    map.insert(
      "calendar.timezone".to_string(),
      "UTC".to_string()
    );
    map.insert(
      "entry.placeholder_title"
        .to_string(),
      DEFAULT_PLACEHOLDER_TITLE
        .to_string()
    );
    Config {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc =
      resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading timesheetrc");
      cfg.load_file(&path, &mut Vec::new())?;
    } else {
      warn!(
        "no timesheetrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  fn get_u64(
    &self,
    key: &str
  ) -> Option<u64> {
    let raw = self.map.get(key)?;
    match raw.trim().parse::<u64>() {
      | Ok(value) => Some(value),
      | Err(error) => {
        warn!(
          key,
          value = %raw,
          %error,
          "ignoring non-numeric config value"
        );
        None
      }
    }
  }

  pub fn default_view(&self) -> ViewMode {
    self
      .get("calendar.view")
      .and_then(|raw| {
        let view =
          ViewMode::from_key(&raw);
        if view.is_none() {
          warn!(value = %raw, "unknown calendar.view; using week");
        }
        view
      })
      .unwrap_or(ViewMode::Week)
  }

  pub fn timezone(&self) -> Tz {
    let Some(raw) =
      self.get("calendar.timezone")
    else {
      return chrono_tz::UTC;
    };
    match raw.trim().parse::<Tz>() {
      | Ok(tz) => tz,
      | Err(error) => {
        warn!(
          timezone = %raw,
          %error,
          "invalid timezone id; using UTC"
        );
        chrono_tz::UTC
      }
    }
  }

  pub fn modal_timings(
    &self
  ) -> ModalTimings {
    ModalTimings {
      mount_delay: self
        .get_u64("modal.mount_delay_ms")
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_MOUNT_DELAY),
      close_delay: self
        .get_u64("modal.close_delay_ms")
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_CLOSE_DELAY)
    }
  }

  pub fn placeholder_title(
    &self
  ) -> String {
    self
      .get("entry.placeholder_title")
      .filter(|t| !t.trim().is_empty())
      .unwrap_or_else(|| {
        DEFAULT_PLACEHOLDER_TITLE
          .to_string()
      })
  }

  pub fn host_settings(
    &self
  ) -> Option<HostSettings> {
    let url = self
      .get("dataverse.url")
      .filter(|u| !u.trim().is_empty())?;
    let Some(user_id) = self
      .get("dataverse.user_id")
      .filter(|u| !u.trim().is_empty())
    else {
      warn!(
        "dataverse.url set without \
         dataverse.user_id; staying \
         detached"
      );
      return None;
    };

    Some(HostSettings {
      url: url
        .trim()
        .trim_end_matches('/')
        .to_string(),
      access_token: self
        .get("dataverse.token")
        .filter(|t| !t.trim().is_empty()),
      user_id,
      api_version: self
        .get("dataverse.api_version")
        .unwrap_or_else(|| {
          DEFAULT_API_VERSION.to_string()
        }),
      timeout: Duration::from_secs(
        self
          .get_u64("dataverse.timeout_secs")
          .unwrap_or(DEFAULT_TIMEOUT_SECS)
      )
    })
  }

  /// `chain` holds the files currently
  /// being loaded, outermost first.
  #[tracing::instrument(skip(self, chain))]
  fn load_file(
    &mut self,
    path: &Path,
    chain: &mut Vec<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    let canonical = fs::canonicalize(&path)
      .unwrap_or_else(|_| path.clone());
    if chain.contains(&canonical) {
      let cycle = chain
        .iter()
        .chain(std::iter::once(&canonical))
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
      return Err(anyhow!(
        "include cycle: {cycle}"
      ));
    }
    chain.push(canonical);

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
          file = %path.display(),
          include = %include_path.display(),
          line = line_num + 1,
          "processing include"
        );

        if include_path.exists() {
          self.load_file(
            &include_path,
            chain
          )?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      if key.ends_with("token") {
        trace!(key = %key, "loaded config key (value redacted)");
      } else {
        trace!(key = %key, value = %value, "loaded config key");
      }
      self.map.insert(key, value);
    }

    chain.pop();
    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("TIMESHEETRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory"
    );
    return Ok(None);
  };
  let candidate =
    home.join(".timesheetrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
