use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::engine::{DEFAULT_TAPE_SIZE, UnmatchedOpenPolicy};

/// File name looked up in the user's config directory.
pub const CONFIG_FILE_NAME: &str = "brfucky.toml";

pub const ENV_TAPE_SIZE: &str = "BRFUCKY_TAPE_SIZE";
pub const ENV_UNMATCHED_OPEN: &str = "BRFUCKY_UNMATCHED_OPEN";

/// Engine settings resolved from defaults, the config file and the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub tape_size: usize,
    pub unmatched_open: UnmatchedOpenPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            unmatched_open: UnmatchedOpenPolicy::default(),
        }
    }
}

/// Shape of `brfucky.toml`. Sections other than `[engine]` are ignored.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: Overrides,
}

/// One layer of optional settings, from the file or the environment.
#[derive(Debug, Default, Deserialize)]
struct Overrides {
    tape_size: Option<i64>,
    unmatched_open: Option<String>,
}

impl Overrides {
    fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ConfigFile>(content).map(|file| file.engine)
    }

    fn from_env() -> Self {
        let tape_size = env::var(ENV_TAPE_SIZE).ok().and_then(|v| {
            let parsed = v.trim().parse::<i64>().ok();
            if parsed.is_none() {
                warn!(value = %v, origin = "environment", "ignoring invalid tape_size");
            }
            parsed
        });
        Self {
            tape_size,
            unmatched_open: env::var(ENV_UNMATCHED_OPEN).ok(),
        }
    }
}

impl Config {
    /// Defaults, then the config file (`path` or the XDG location), then the environment.
    pub fn load(path: Option<&Path>) -> Self {
        let mut cfg = Config::default();

        let path = path.map(Path::to_path_buf).or_else(default_path);
        if let Some(path) = path {
            match fs::read_to_string(&path) {
                Ok(content) => match Overrides::from_toml(&content) {
                    Ok(overrides) => {
                        debug!(path = %path.display(), "loaded config file");
                        cfg.apply(&overrides, "config file");
                    }
                    Err(e) => {
                        warn!(path = %path.display(), "ignoring malformed config file: {e}")
                    }
                },
                Err(e) => debug!(path = %path.display(), error = %e, "no config file read"),
            }
        }

        cfg.apply(&Overrides::from_env(), "environment");
        cfg
    }

    /// Overlay the values present in `overrides`; bad values are logged and skipped.
    fn apply(&mut self, overrides: &Overrides, origin: &str) {
        if let Some(n) = overrides.tape_size {
            match usize::try_from(n) {
                Ok(n) if n > 0 => self.tape_size = n,
                _ => warn!(value = n, origin, "ignoring invalid tape_size"),
            }
        }
        if let Some(v) = &overrides.unmatched_open {
            match v.parse::<UnmatchedOpenPolicy>() {
                Ok(p) => self.unmatched_open = p,
                Err(e) => warn!(origin, "ignoring {e}"),
            }
        }
    }
}

fn default_path() -> Option<PathBuf> {
    // On Linux: resolves to /home/<user>/.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().into_iter().next()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE_NAME);
    Some(path)
}
