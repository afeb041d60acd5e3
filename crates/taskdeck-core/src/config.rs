use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{
  Path,
  PathBuf
};
use std::str::FromStr;

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

use crate::datetime::parse_timezone;

const RC_ENV_VAR: &str = "TASKDECK_RC";
const RC_FILE_NAME: &str =
  ".taskdeckrc";

pub const DEFAULT_BIND: &str =
  "127.0.0.1:3000";
pub const DEFAULT_ENDPOINT: &str =
  "http://127.0.0.1:3000";
pub const DEFAULT_DUE_SOON_DAYS: i64 =
  2;

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    for (key, value) in [
      ("server.bind", DEFAULT_BIND),
      ("server.seed", "on"),
      (
        "client.endpoint",
        DEFAULT_ENDPOINT
      ),
      ("timezone", "UTC"),
      ("color", "on"),
      ("due.soon_days", "2")
    ] {
      map.insert(
        key.to_string(),
        value.to_string()
      );
    }

    Self {
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

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading taskdeckrc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no taskdeckrc found; using \
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
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn get_parsed<T>(
    &self,
    key: &str
  ) -> anyhow::Result<Option<T>>
  where
    T: FromStr,
    T::Err: std::fmt::Display
  {
    self
      .map
      .get(key)
      .map(|raw| {
        raw.trim().parse::<T>().map_err(
          |err| {
            anyhow!(
              "invalid value for \
               {key}: {raw} ({err})"
            )
          }
        )
      })
      .transpose()
  }

  pub fn bind_addr(
    &self
  ) -> anyhow::Result<SocketAddr> {
    Ok(
      self
        .get_parsed::<SocketAddr>(
          "server.bind"
        )?
        .unwrap_or_else(|| {
          SocketAddr::from((
            [127, 0, 0, 1],
            3000
          ))
        })
    )
  }

  pub fn seed_enabled(&self) -> bool {
    self
      .get_bool("server.seed")
      .unwrap_or(true)
  }

  pub fn endpoint(&self) -> String {
    self
      .get("client.endpoint")
      .map(|raw| {
        raw
          .trim()
          .trim_end_matches('/')
          .to_string()
      })
      .unwrap_or_else(|| {
        DEFAULT_ENDPOINT.to_string()
      })
  }

  pub fn color_enabled(&self) -> bool {
    self
      .get_bool("color")
      .unwrap_or(true)
  }

  pub fn timezone(
    &self
  ) -> anyhow::Result<Tz> {
    let raw = self
      .get("timezone")
      .unwrap_or_else(|| {
        "UTC".to_string()
      });
    parse_timezone(&raw, "taskdeckrc")
      .ok_or_else(|| {
        anyhow!(
          "invalid timezone setting: \
           {raw}"
        )
      })
  }

  pub fn due_soon_days(
    &self
  ) -> anyhow::Result<i64> {
    let days = self
      .get_parsed::<i64>(
        "due.soon_days"
      )?
      .unwrap_or(DEFAULT_DUE_SOON_DAYS);
    if days < 0 {
      return Err(anyhow!(
        "due.soon_days cannot be \
         negative: {days}"
      ));
    }
    Ok(days)
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
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

      if line.is_empty() {
        continue;
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
          self
            .load_file(&include_path)?;
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
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

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
    std::env::var(RC_ENV_VAR)
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
       directory; skipping \
       taskdeckrc lookup"
    );
    return Ok(None);
  };
  let candidate =
    home.join(RC_FILE_NAME);
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

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::fs;

  use pretty_assertions::assert_eq;
  use tempfile::tempdir;

  use super::Config;

  #[test]
  fn defaults_cover_every_setting() {
    let cfg = Config::default();
    assert_eq!(
      cfg
        .bind_addr()
        .expect("default bind")
        .to_string(),
      "127.0.0.1:3000"
    );
    assert!(cfg.seed_enabled());
    assert_eq!(
      cfg.endpoint(),
      "http://127.0.0.1:3000"
    );
    assert_eq!(
      cfg
        .due_soon_days()
        .expect("default days"),
      2
    );
    assert_eq!(
      cfg
        .timezone()
        .expect("default tz"),
      chrono_tz::UTC
    );
  }

  #[test]
  fn loads_file_with_comments_and_includes()
  {
    let dir =
      tempdir().expect("tempdir");
    fs::write(
      dir.path().join("extra.rc"),
      "timezone = Europe/Madrid\n"
    )
    .expect("write include");
    let main = dir.path().join("main.rc");
    fs::write(
      &main,
      "# dashboard settings\n\
       server.bind = 0.0.0.0:8080 \
       # public\n\
       server.seed = off\n\
       include extra.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&main))
      .expect("load rc");

    assert_eq!(
      cfg
        .bind_addr()
        .expect("bind")
        .to_string(),
      "0.0.0.0:8080"
    );
    assert!(!cfg.seed_enabled());
    assert_eq!(
      cfg.timezone().expect("tz"),
      chrono_tz::Europe::Madrid
    );
    assert_eq!(cfg.loaded_files.len(), 2);
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![
      (
        "rc.due.soon_days".to_string(),
        "5".to_string()
      ),
      (
        "client.endpoint".to_string(),
        "http://dash.local/".to_string()
      ),
    ]);

    assert_eq!(
      cfg.due_soon_days().expect("days"),
      5
    );
    assert_eq!(
      cfg.endpoint(),
      "http://dash.local"
    );
  }

  #[test]
  fn rejects_malformed_lines() {
    let dir =
      tempdir().expect("tempdir");
    let main = dir.path().join("bad.rc");
    fs::write(&main, "just words\n")
      .expect("write rc");

    assert!(
      Config::load(Some(&main)).is_err()
    );
  }

  #[test]
  fn negative_due_window_is_an_error() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![(
      "due.soon_days".to_string(),
      "-1".to_string()
    )]);
    assert!(
      cfg.due_soon_days().is_err()
    );
  }
}
