use std::env;
use std::path::PathBuf;

/// Where `webrag` looks for `config.yml` and writes its logs.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Resolve paths from the process environment.
    pub fn discover() -> Self {
        Self::resolve(|key| env::var(key).ok())
    }

    pub fn from_roots(project_root: PathBuf, data_dir: PathBuf) -> Self {
        let log_dir = data_dir.join("logs");
        Self {
            project_root,
            data_dir,
            log_dir,
        }
    }

    /// `WEBRAG_ROOT` or the working directory is the project root. The data
    /// dir is `WEBRAG_DATA_DIR`, else `$XDG_DATA_HOME/webrag`, else
    /// `$HOME/.local/share/webrag`, else the project root.
    fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = lookup("WEBRAG_ROOT")
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let data_dir = lookup("WEBRAG_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| lookup("XDG_DATA_HOME").map(|dir| PathBuf::from(dir).join("webrag")))
            .or_else(|| {
                lookup("HOME").map(|home| PathBuf::from(home).join(".local/share/webrag"))
            })
            .unwrap_or_else(|| project_root.clone());

        Self::from_roots(project_root, data_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve_with(vars: &[(&str, &str)]) -> AppPaths {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppPaths::resolve(|key| vars.get(key).cloned())
    }

    #[test]
    fn explicit_directories_win() {
        let paths = resolve_with(&[
            ("WEBRAG_ROOT", "/srv/webrag"),
            ("WEBRAG_DATA_DIR", "/var/lib/webrag"),
            ("XDG_DATA_HOME", "/home/me/.data"),
        ]);

        assert_eq!(paths.project_root, PathBuf::from("/srv/webrag"));
        assert_eq!(paths.data_dir, PathBuf::from("/var/lib/webrag"));
        assert_eq!(paths.log_dir, PathBuf::from("/var/lib/webrag/logs"));
    }

    #[test]
    fn data_dir_falls_back_to_xdg_then_home() {
        let xdg = resolve_with(&[("XDG_DATA_HOME", "/home/me/.data"), ("HOME", "/home/me")]);
        assert_eq!(xdg.data_dir, PathBuf::from("/home/me/.data/webrag"));

        let home = resolve_with(&[("HOME", "/home/me")]);
        assert_eq!(home.data_dir, PathBuf::from("/home/me/.local/share/webrag"));
    }

    #[test]
    fn without_any_hint_data_lives_in_the_project_root() {
        let paths = resolve_with(&[("WEBRAG_ROOT", "/srv/webrag")]);
        assert_eq!(paths.data_dir, PathBuf::from("/srv/webrag"));
    }
}
