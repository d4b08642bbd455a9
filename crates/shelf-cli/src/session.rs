//! The saved bearer token, one line in a file.

use std::{
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// `~/.config/shelf/token`, or `./.shelf-token` when `HOME` is unset.
pub fn default_path() -> PathBuf {
  match std::env::var("HOME") {
    Ok(home) => PathBuf::from(home).join(".config").join("shelf").join("token"),
    Err(_) => PathBuf::from(".shelf-token"),
  }
}

pub struct TokenFile {
  path: PathBuf,
}

impl TokenFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// `Ok(None)` when no token has been saved.
  pub fn load(&self) -> Result<Option<String>> {
    match fs::read_to_string(&self.path) {
      Ok(raw) => Ok(Some(raw.trim().to_string()).filter(|t| !t.is_empty())),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
    }
  }

  pub fn save(&self, token: &str) -> Result<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&self.path, token).with_context(|| format!("writing {}", self.path.display()))?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restricting {}", self.path.display()))?;
    }
    Ok(())
  }

  /// Returns whether a token was removed.
  pub fn clear(&self) -> Result<bool> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
    }
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn scratch() -> TokenFile {
    TokenFile::new(std::env::temp_dir().join(format!("shelf-{}", Uuid::new_v4())).join("token"))
  }

  #[test]
  fn save_load_clear() {
    let file = scratch();
    assert_eq!(file.load().unwrap(), None);

    file.save("abc.def.ghi").unwrap();
    assert_eq!(file.load().unwrap().as_deref(), Some("abc.def.ghi"));

    assert!(file.clear().unwrap());
    assert!(!file.clear().unwrap());
    assert_eq!(file.load().unwrap(), None);

    if let Some(dir) = file.path().parent() {
      fs::remove_dir_all(dir).ok();
    }
  }

  #[test]
  fn blank_file_means_logged_out() {
    let file = scratch();
    file.save("  \n").unwrap();
    assert_eq!(file.load().unwrap(), None);
    if let Some(dir) = file.path().parent() {
      fs::remove_dir_all(dir).ok();
    }
  }
}
