#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub const FULL_VERSION: &str = "cpython-3.12.1-linux-x86_64-gnu";

/// A throwaway home for environments plus fake `python` and `uv` programs.
pub struct Workspace {
    pub temp: TempDir,
    pub root: PathBuf,
    python: PathBuf,
    uv: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = tempfile::Builder::new()
            .prefix("uvn-cli-")
            .tempdir()
            .expect("tempdir");
        let root = temp.path().join("envs");
        fs::create_dir_all(&root).expect("root");
        let python = temp
            .path()
            .join("pythons")
            .join(FULL_VERSION)
            .join("bin/python3.12");
        write_script(&python, "#!/bin/sh\nprintf '3.12.1'\n");
        let uv = temp.path().join("bin/uv");
        write_script(&uv, &fake_uv(&python));
        Self {
            temp,
            root,
            python,
            uv,
        }
    }

    pub fn uvn(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("uvn");
        cmd.current_dir(self.temp.path())
            .env("UVN_DIR", &self.root)
            .env("UVN_UV", &self.uv)
            .env("NO_COLOR", "1")
            .env_remove("UVN_LOG")
            .env_remove("UV_PYTHON")
            .env_remove("UV_LINK_MODE");
        cmd
    }

    pub fn env(&self, name: &str, packages: &[&str]) -> PathBuf {
        self.env_in(&self.root, name, packages)
    }

    pub fn env_in(&self, root: &Path, name: &str, packages: &[&str]) -> PathBuf {
        let path = root.join(name);
        fs::create_dir_all(path.join("bin")).expect("bin dir");
        symlink(&self.python, path.join("bin/python")).expect("symlink");
        let listing = packages.iter().map(|p| format!("{p}\n")).collect::<String>();
        fs::write(path.join(".fake-packages"), listing).expect("packages");
        path
    }

    pub fn corrupted_env(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        write_script(
            &path.join("bin/python"),
            "#!/bin/sh\necho 'interpreter crashed' >&2\nexit 1\n",
        );
        path
    }
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

pub fn stderr(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

fn fake_uv(python: &Path) -> String {
    format!(
        r#"#!/bin/sh
cmd="$1"
shift
case "$cmd" in
venv)
    target=""
    while [ "$#" -gt 0 ]; do
        case "$1" in
            --python|--link-mode|--python-preference) shift 2 ;;
            --*) shift ;;
            *) target="$1"; shift ;;
        esac
    done
    mkdir -p "$target/bin"
    ln -s '{python}' "$target/bin/python"
    ;;
pip)
    case "$1" in
    freeze) cat "$VIRTUAL_ENV/.fake-packages" 2>/dev/null || true ;;
    tree) sed 's/==/ v/' "$VIRTUAL_ENV/.fake-packages" 2>/dev/null || true ;;
    install) grep -v '^#' "$3" > "$VIRTUAL_ENV/.fake-packages" || true ;;
    esac
    ;;
lock)
    {{ echo 'version = 1'; echo; cat "$2/pyproject.toml"; }} > "$2/uv.lock"
    ;;
esac
"#,
        python = python.display()
    )
}

fn write_script(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("script dir");
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}
